//! Error types for loading and querying a [`Unit`](crate::Unit).

use crate::unit::{DeclId, SourceLoc, TypeId};

/// Structural errors in a unit: dangling ids, wrong declaration kinds, or
/// malformed JSON.
#[derive(Debug, thiserror::Error)]
pub enum AstError {
    #[error("declaration id {0} out of bounds")]
    DanglingDecl(DeclId),

    #[error("type id {0} out of bounds")]
    DanglingType(TypeId),

    /// A declaration was found, but of a different kind than required.
    #[error("{loc}: declaration `{name}` is not a {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        loc: SourceLoc,
    },

    #[error("invalid unit JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A recognized annotation carried malformed arguments.
#[derive(Debug, thiserror::Error)]
pub enum AttrError {
    #[error("{loc}: annotation `{name}` is missing argument {index}")]
    MissingArg {
        name: String,
        index: usize,
        loc: SourceLoc,
    },

    #[error("{loc}: annotation `{name}` argument {index} must be {expected}")]
    WrongArg {
        name: String,
        index: usize,
        expected: &'static str,
        loc: SourceLoc,
    },

    #[error("{loc}: annotation `{name}` argument {index} is out of range ({value})")]
    OutOfRange {
        name: String,
        index: usize,
        value: i64,
        loc: SourceLoc,
    },
}
