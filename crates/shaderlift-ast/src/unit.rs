//! The compilation unit and its identity keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decl::{Decl, DeclKind, FunctionDecl, RecordDecl};
use crate::error::AstError;
use crate::types::{Type, TypeKind};

/// Dense index of a declaration in [`Unit::decls`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

/// Dense index of a type in [`Unit::types`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A position in the original source file.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.file.is_empty() {
            "<unknown>"
        } else {
            &self.file
        };
        write!(f, "{file}:{}:{}", self.line, self.column)
    }
}

/// A fully resolved compilation unit as produced by the front-end.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub decls: Vec<Decl>,
    #[serde(default)]
    pub types: Vec<Type>,
    /// Top-level declarations in source order.
    #[serde(default)]
    pub root: Vec<DeclId>,
}

impl Unit {
    pub fn from_json(text: &str) -> Result<Self, AstError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, AstError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn decl(&self, id: DeclId) -> Result<&Decl, AstError> {
        self.decls
            .get(id.0 as usize)
            .ok_or(AstError::DanglingDecl(id))
    }

    pub fn ty(&self, id: TypeId) -> Result<&Type, AstError> {
        self.types
            .get(id.0 as usize)
            .ok_or(AstError::DanglingType(id))
    }

    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len() as u32).map(DeclId)
    }

    pub fn record(&self, id: DeclId) -> Result<&RecordDecl, AstError> {
        let decl = self.decl(id)?;
        match decl.kind {
            DeclKind::Record(ref record) => Ok(record),
            _ => Err(decl.wrong_kind("record")),
        }
    }

    pub fn function(&self, id: DeclId) -> Result<&FunctionDecl, AstError> {
        let decl = self.decl(id)?;
        match decl.kind {
            DeclKind::Function(ref function) => Ok(function),
            _ => Err(decl.wrong_kind("function")),
        }
    }

    /// The canonical declaration of `id`.
    pub fn canonical(&self, id: DeclId) -> Result<DeclId, AstError> {
        Ok(self.decl(id)?.canonical.unwrap_or(id))
    }

    /// The record declaration behind a record type, if `ty` is one.
    pub fn record_of(&self, ty: TypeId) -> Result<Option<DeclId>, AstError> {
        Ok(match self.ty(ty)?.kind {
            TypeKind::Record(id) => Some(id),
            _ => None,
        })
    }

    /// Returns the closure class behind `ty`, if `ty` is a closure type.
    pub fn closure_of(&self, ty: TypeId) -> Result<Option<DeclId>, AstError> {
        let Some(id) = self.record_of(ty)? else {
            return Ok(None);
        };
        Ok(self.record(id)?.closure.as_ref().map(|_| id))
    }

    /// Walks the context chain of `id` to the nearest enclosing namespace
    /// and returns that namespace's canonical declaration.
    pub fn enclosing_namespace(&self, id: DeclId) -> Result<Option<DeclId>, AstError> {
        let mut current = self.decl(id)?.context;
        // A context chain is never longer than the unit; bail out on cycles.
        for _ in 0..self.decls.len() {
            let Some(ctx) = current else {
                break;
            };
            let decl = self.decl(ctx)?;
            if matches!(decl.kind, DeclKind::Namespace { .. }) {
                return self.canonical(ctx).map(Some);
            }
            current = decl.context;
        }
        Ok(None)
    }

    /// Declarations that share `canonical` as their canonical declaration,
    /// including `canonical` itself, in id order.
    pub fn redeclarations(&self, canonical: DeclId) -> Vec<DeclId> {
        self.decl_ids()
            .filter(|&id| self.decls[id.0 as usize].canonical.unwrap_or(id) == canonical)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_loc_display() {
        assert_eq!(SourceLoc::new("a.cpp", 3, 7).to_string(), "a.cpp:3:7");
        assert_eq!(SourceLoc::default().to_string(), "<unknown>:0:0");
    }

    #[test]
    fn dangling_ids_are_errors() {
        let unit = Unit::default();
        assert!(matches!(
            unit.decl(DeclId(0)),
            Err(AstError::DanglingDecl(DeclId(0)))
        ));
        assert!(matches!(
            unit.ty(TypeId(4)),
            Err(AstError::DanglingType(TypeId(4)))
        ));
    }

    #[test]
    fn empty_json_unit() {
        let unit = Unit::from_json("{}").expect("all fields default");
        assert!(unit.decls.is_empty());
        assert!(Unit::from_json("{\"decls\": 3}").is_err());
    }
}
