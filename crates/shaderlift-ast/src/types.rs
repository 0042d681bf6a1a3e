//! Canonical input types.

use serde::{Deserialize, Serialize};

use crate::unit::{DeclId, TypeId};

/// Builtin scalar kinds of the input dialect.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    NullPtr,
}

/// The shape of a canonical, desugared type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Builtin(BuiltinKind),
    Record(DeclId),
    Enum(DeclId),
    ConstantArray { element: TypeId, size: u64 },
    Pointer(TypeId),
    FunctionPointer,
    /// Any other shape; always unsupported.
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    /// Printed form, used for sanitized name suffixes.
    #[serde(default)]
    pub spelling: String,
}

/// Reference-ness of a qualified type.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    None,
    LValue,
    RValue,
}

/// A type with its top-level qualifiers.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct QualType {
    pub ty: TypeId,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub reference: RefKind,
}

impl QualType {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            is_const: false,
            reference: RefKind::None,
        }
    }

    pub fn constant(self) -> Self {
        Self {
            is_const: true,
            ..self
        }
    }

    pub fn lvalue_ref(self) -> Self {
        Self {
            reference: RefKind::LValue,
            ..self
        }
    }

    pub fn is_reference(self) -> bool {
        self.reference != RefKind::None
    }

    /// Strips the reference and const qualifier.
    pub fn decay(self) -> Self {
        Self::new(self.ty)
    }
}

impl From<TypeId> for QualType {
    fn from(ty: TypeId) -> Self {
        Self::new(ty)
    }
}
