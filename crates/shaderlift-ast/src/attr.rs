//! Raw annotations and their typed schema.
//!
//! The front-end hands over annotations as a name plus positional
//! arguments. [`AttrSet::parse`] validates them once into [`ShaderAttr`]
//! values so that translation never indexes raw argument lists.

use serde::{Deserialize, Serialize};

use crate::decl::Decl;
use crate::error::AttrError;
use crate::unit::{SourceLoc, TypeId};

/// One positional annotation argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationArg {
    Str(String),
    Int(i64),
    Type(TypeId),
}

/// An annotation as written in source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub args: Vec<AnnotationArg>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, args: Vec<AnnotationArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn with_str(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self::new(name, vec![AnnotationArg::Str(arg.into())])
    }
}

/// A validated annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShaderAttr {
    Ignore,
    NoIgnore,
    /// Maps the declaration to a fixed builtin construct named by `what`.
    Builtin(String),
    Dump,
    Kernel([u32; 3]),
    Swizzle,
    UnaOp(String),
    BinOp(String),
    CallOp(String),
    Access,
    Interpolation(String),
    GroupShared,
    Stage {
        stage: String,
        entry_name: Option<String>,
    },
    StageInout,
    /// `!0` marks an unassigned slot.
    Binding {
        binding: u32,
        group: u32,
    },
    PushConstant,
}

struct Args<'a> {
    ann: &'a Annotation,
    loc: &'a SourceLoc,
}

impl Args<'_> {
    fn get(&self, index: usize) -> Option<&AnnotationArg> {
        self.ann.args.get(index)
    }

    fn missing(&self, index: usize) -> AttrError {
        AttrError::MissingArg {
            name: self.ann.name.clone(),
            index,
            loc: self.loc.clone(),
        }
    }

    fn wrong(&self, index: usize, expected: &'static str) -> AttrError {
        AttrError::WrongArg {
            name: self.ann.name.clone(),
            index,
            expected,
            loc: self.loc.clone(),
        }
    }

    fn opt_str(&self, index: usize) -> Result<Option<String>, AttrError> {
        match self.get(index) {
            None => Ok(None),
            Some(AnnotationArg::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.wrong(index, "a string")),
        }
    }

    fn str(&self, index: usize) -> Result<String, AttrError> {
        self.opt_str(index)?.ok_or_else(|| self.missing(index))
    }

    fn opt_u32(&self, index: usize) -> Result<Option<u32>, AttrError> {
        match self.get(index) {
            None => Ok(None),
            Some(&AnnotationArg::Int(v)) => u32::try_from(v).map(Some).map_err(|_| {
                AttrError::OutOfRange {
                    name: self.ann.name.clone(),
                    index,
                    value: v,
                    loc: self.loc.clone(),
                }
            }),
            Some(_) => Err(self.wrong(index, "an integer")),
        }
    }
}

impl ShaderAttr {
    /// Parses one annotation. Unrecognized names yield `Ok(None)`.
    pub fn parse(ann: &Annotation, loc: &SourceLoc) -> Result<Option<Self>, AttrError> {
        let args = Args { ann, loc };
        let attr = match ann.name.as_str() {
            "ignore" => Self::Ignore,
            "noignore" => Self::NoIgnore,
            "builtin" => Self::Builtin(args.str(0)?),
            "dump" => Self::Dump,
            "kernel" => {
                let x = args.opt_u32(0)?.ok_or_else(|| args.missing(0))?;
                let y = args.opt_u32(1)?.unwrap_or(1);
                let z = args.opt_u32(2)?.unwrap_or(1);
                Self::Kernel([x, y, z])
            }
            "swizzle" => Self::Swizzle,
            "unaop" => Self::UnaOp(args.str(0)?),
            "binop" => Self::BinOp(args.str(0)?),
            "callop" => Self::CallOp(args.str(0)?),
            "access" => Self::Access,
            "interpolation" => Self::Interpolation(args.str(0)?),
            "groupshared" => Self::GroupShared,
            "stage" => Self::Stage {
                stage: args.str(0)?,
                entry_name: args.opt_str(1)?,
            },
            "stage_inout" => Self::StageInout,
            "binding" => Self::Binding {
                binding: args.opt_u32(0)?.unwrap_or(!0),
                group: args.opt_u32(1)?.unwrap_or(!0),
            },
            "push_constant" => Self::PushConstant,
            _ => return Ok(None),
        };
        Ok(Some(attr))
    }
}

/// The validated annotations of one declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrSet(Vec<ShaderAttr>);

impl AttrSet {
    pub fn parse(decl: &Decl) -> Result<Self, AttrError> {
        let mut attrs = Vec::new();
        for ann in &decl.annotations {
            match ShaderAttr::parse(ann, &decl.loc)? {
                Some(attr) => attrs.push(attr),
                None => log::trace!("{}: ignoring annotation `{}`", decl.loc, ann.name),
            }
        }
        Ok(Self(attrs))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderAttr> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn find<'a, T>(&'a self, f: impl FnMut(&'a ShaderAttr) -> Option<T>) -> Option<T> {
        self.0.iter().find_map(f)
    }

    fn has(&self, attr: &ShaderAttr) -> bool {
        self.0.contains(attr)
    }

    pub fn is_ignored(&self) -> bool {
        self.has(&ShaderAttr::Ignore)
    }

    pub fn is_noignore(&self) -> bool {
        self.has(&ShaderAttr::NoIgnore)
    }

    pub fn is_dump(&self) -> bool {
        self.has(&ShaderAttr::Dump)
    }

    pub fn is_swizzle(&self) -> bool {
        self.has(&ShaderAttr::Swizzle)
    }

    pub fn is_access(&self) -> bool {
        self.has(&ShaderAttr::Access)
    }

    pub fn is_groupshared(&self) -> bool {
        self.has(&ShaderAttr::GroupShared)
    }

    pub fn is_stage_inout(&self) -> bool {
        self.has(&ShaderAttr::StageInout)
    }

    pub fn is_push_constant(&self) -> bool {
        self.has(&ShaderAttr::PushConstant)
    }

    pub fn builtin(&self) -> Option<&str> {
        self.find(|a| match a {
            ShaderAttr::Builtin(what) => Some(what.as_str()),
            _ => None,
        })
    }

    pub fn kernel(&self) -> Option<[u32; 3]> {
        self.find(|a| match *a {
            ShaderAttr::Kernel(size) => Some(size),
            _ => None,
        })
    }

    pub fn unaop(&self) -> Option<&str> {
        self.find(|a| match a {
            ShaderAttr::UnaOp(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn binop(&self) -> Option<&str> {
        self.find(|a| match a {
            ShaderAttr::BinOp(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn callop(&self) -> Option<&str> {
        self.find(|a| match a {
            ShaderAttr::CallOp(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn interpolation(&self) -> Option<&str> {
        self.find(|a| match a {
            ShaderAttr::Interpolation(mode) => Some(mode.as_str()),
            _ => None,
        })
    }

    /// Stage name and optional overriding entry name.
    pub fn stage(&self) -> Option<(&str, Option<&str>)> {
        self.find(|a| match a {
            ShaderAttr::Stage { stage, entry_name } => {
                Some((stage.as_str(), entry_name.as_deref()))
            }
            _ => None,
        })
    }

    /// `(binding, group)`.
    pub fn binding(&self) -> Option<(u32, u32)> {
        self.find(|a| match *a {
            ShaderAttr::Binding { binding, group } => Some((binding, group)),
            _ => None,
        })
    }
}
