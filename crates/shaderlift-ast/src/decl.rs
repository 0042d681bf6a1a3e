//! Declarations.

use serde::{Deserialize, Serialize};

use crate::attr::Annotation;
use crate::error::AstError;
use crate::expr::{ConstValue, Expr};
use crate::stmt::Stmt;
use crate::types::QualType;
use crate::unit::{DeclId, SourceLoc, TypeId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    /// Short (unqualified) name; empty for anonymous declarations.
    #[serde(default)]
    pub name: String,
    pub kind: DeclKind,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub loc: SourceLoc,
    /// The enclosing declaration.
    #[serde(default)]
    pub context: Option<DeclId>,
    /// First declaration of a redeclared entity; `None` means this one.
    #[serde(default)]
    pub canonical: Option<DeclId>,
    /// Compiler-generated.
    #[serde(default)]
    pub implicit: bool,
}

impl Decl {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            loc: SourceLoc::default(),
            context: None,
            canonical: None,
            implicit: false,
        }
    }

    pub(crate) fn wrong_kind(&self, expected: &'static str) -> AstError {
        AstError::WrongKind {
            name: self.name.clone(),
            expected,
            loc: self.loc.clone(),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match self.kind {
            DeclKind::Function(ref f) => Some(f),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordDecl> {
        match self.kind {
            DeclKind::Record(ref r) => Some(r),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&VarDecl> {
        match self.kind {
            DeclKind::Var(ref v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Namespace {
        #[serde(default)]
        decls: Vec<DeclId>,
    },
    Record(RecordDecl),
    Enum(EnumDecl),
    EnumConstant {
        value: i64,
    },
    Field(FieldDecl),
    Function(FunctionDecl),
    Param(ParamDecl),
    Var(VarDecl),
    TypeAlias,
    StaticAssert,
    UsingDirective,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateArg {
    Type(TypeId),
    Integral(i64),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    #[default]
    None,
    /// An un-specialized template pattern.
    Pattern,
    Specialization {
        args: Vec<TemplateArg>,
        #[serde(default)]
        pattern: Option<DeclId>,
        #[serde(default)]
        partial: bool,
    },
}

/// One entry of a closure's capture list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capture {
    This,
    Var {
        var: DeclId,
        #[serde(default)]
        by_ref: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Closure {
    #[serde(default)]
    pub captures: Vec<Capture>,
    pub call_operator: DeclId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub ty: TypeId,
    #[serde(default)]
    pub fields: Vec<DeclId>,
    /// Nested declarations other than fields, in source order.
    #[serde(default)]
    pub decls: Vec<DeclId>,
    #[serde(default)]
    pub union: bool,
    #[serde(default = "default_true")]
    pub complete: bool,
    #[serde(default)]
    pub template: TemplateKind,
    #[serde(default)]
    pub closure: Option<Closure>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub ty: TypeId,
    pub integer_type: TypeId,
    #[serde(default)]
    pub enumerators: Vec<DeclId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub ty: QualType,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub ty: QualType,
    #[serde(default)]
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub ty: QualType,
    #[serde(default)]
    pub init: Option<Expr>,
    /// Namespace-scope (or static) storage.
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub constexpr: bool,
    /// Front-end evaluated value of a constant initializer.
    #[serde(default)]
    pub evaluated: Option<ConstValue>,
    /// Arguments of a variable-template specialization.
    #[serde(default)]
    pub template_args: Vec<TemplateArg>,
}

/// Overloadable operators of the input dialect.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverloadedOperator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Exclaim,
    Equal,
    Less,
    Greater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    CaretEqual,
    AmpEqual,
    PipeEqual,
    LessLess,
    GreaterGreater,
    EqualEqual,
    ExclaimEqual,
    LessEqual,
    GreaterEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Subscript,
    Call,
}

/// Compiler-provided special members that calls pass through.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialMember {
    CopyConstructor,
    MoveConstructor,
    CopyAssign,
    MoveAssign,
}

/// One entry of a constructor's member-initializer list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtorInit {
    Field { field: DeclId, init: Expr },
    Base { ty: TypeId },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    /// The owning record.
    pub parent: DeclId,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_const: bool,
    /// `Some` for constructors.
    #[serde(default)]
    pub constructor_inits: Option<Vec<CtorInit>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub params: Vec<DeclId>,
    pub result: QualType,
    #[serde(default)]
    pub body: Option<Stmt>,
    #[serde(default)]
    pub method: Option<MethodInfo>,
    #[serde(default)]
    pub operator: Option<OverloadedOperator>,
    /// A conversion operator to `result`.
    #[serde(default)]
    pub conversion: bool,
    #[serde(default)]
    pub special_member: Option<SpecialMember>,
    #[serde(default)]
    pub template_args: Vec<TemplateArg>,
}

impl FunctionDecl {
    pub fn is_constructor(&self) -> bool {
        self.method
            .as_ref()
            .is_some_and(|m| m.constructor_inits.is_some())
    }

    pub fn is_static(&self) -> bool {
        self.method.as_ref().is_some_and(|m| m.is_static)
    }

    pub fn parent(&self) -> Option<DeclId> {
        self.method.as_ref().map(|m| m.parent)
    }
}
