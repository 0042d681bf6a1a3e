//! Error types for the shader IR.

/// Errors raised by the [`Module`](crate::Module) builder API.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A declaration tried to take a name owned by a builtin type.
    #[error("`{0}` is a reserved type name")]
    ReservedName(String),

    /// Two structures were declared with the same name.
    #[error("duplicate type declaration `{0}`")]
    DuplicateType(String),

    /// A handle does not belong to the arena it was used with.
    #[error("handle index {index} out of bounds (arena size: {size})")]
    BadHandle { index: usize, size: usize },

    /// A field or constructor was added to a type that is not a structure.
    #[error("type `{0}` is not a structure")]
    NotAStruct(String),

    /// An array was requested with zero elements.
    #[error("array of `{0}` must have at least one element")]
    EmptyArray(String),

    /// An intrinsic could not be specialized for the given arguments.
    #[error("cannot specialize `{name}`: {reason}")]
    Specialization { name: String, reason: String },
}
