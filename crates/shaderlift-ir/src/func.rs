//! Functions, methods, constructors, and their variables.

use crate::arena::{Arena, Handle};
use crate::attr::Attribute;
use crate::expr::Expression;
use crate::intrinsic::IntrinsicTemplate;
use crate::stmt::Block;
use crate::types::TypeDecl;

/// Parameter passing / mutability qualifier.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub enum Qualifier {
    /// By value.
    #[default]
    None,
    /// Read-only reference.
    Const,
    /// Mutable reference.
    Inout,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum VariableKind {
    Param,
    Local,
}

/// A parameter or local of a function.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub ty: Handle<TypeDecl>,
    pub qualifier: Qualifier,
    pub kind: VariableKind,
    pub init: Option<Expression>,
    pub attrs: Vec<Attribute>,
}

/// What a [`Function`] is, and what owns it.
#[derive(Clone, Debug)]
pub enum FunctionKind {
    Free,
    Method {
        owner: Handle<TypeDecl>,
    },
    /// `member_inits` pairs a field index of `owner` with its initializer.
    Constructor {
        owner: Handle<TypeDecl>,
        member_inits: Vec<(u32, Expression)>,
    },
    /// A specialization of an intrinsic template; has no body.
    Intrinsic {
        template: Handle<IntrinsicTemplate>,
    },
}

/// A function-family declaration.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub kind: FunctionKind,
    /// `None` for constructors.
    pub result: Option<Handle<TypeDecl>>,
    pub params: Vec<Handle<Variable>>,
    /// Storage for parameters and locals.
    pub variables: Arena<Variable>,
    pub body: Option<Block>,
    pub attrs: Vec<Attribute>,
}

impl Function {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            result: None,
            params: Vec::new(),
            variables: Arena::new(),
            body: None,
            attrs: Vec::new(),
        }
    }

    /// Appends a parameter and returns its handle.
    pub fn add_param(
        &mut self,
        name: impl Into<String>,
        ty: Handle<TypeDecl>,
        qualifier: Qualifier,
    ) -> Handle<Variable> {
        let handle = self.variables.append(Variable {
            name: name.into(),
            ty,
            qualifier,
            kind: VariableKind::Param,
            init: None,
            attrs: Vec::new(),
        });
        self.params.push(handle);
        handle
    }

    pub fn param(&self, index: usize) -> Option<&Variable> {
        self.params.get(index).map(|&h| &self.variables[h])
    }

    pub fn has_attr(&self, attr: Attribute) -> bool {
        self.attrs.contains(&attr)
    }

    /// Returns the type that owns this function, if it is a method or
    /// constructor.
    pub fn owner(&self) -> Option<Handle<TypeDecl>> {
        match self.kind {
            FunctionKind::Method { owner } | FunctionKind::Constructor { owner, .. } => Some(owner),
            FunctionKind::Free | FunctionKind::Intrinsic { .. } => None,
        }
    }
}
