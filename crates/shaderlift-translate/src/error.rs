use shaderlift_ast::{AstError, AttrError, SourceLoc};
use shaderlift_ir::IrError;

/// A fatal translation error. The first one stops the pass.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("{loc}: unsupported {what}")]
    Unsupported { what: String, loc: SourceLoc },
    #[error("{loc}: duplicate declaration of {what}")]
    Duplicate { what: String, loc: SourceLoc },
    #[error("{loc}: {message}")]
    ContractViolation { message: String, loc: SourceLoc },
    #[error("{loc}: {message}")]
    Resolution { message: String, loc: SourceLoc },
    #[error("{loc}: recursive call to `{name}`; shader functions may not recurse")]
    RecursiveCall { name: String, loc: SourceLoc },
    #[error("{loc}: {source}")]
    Ir {
        #[source]
        source: IrError,
        loc: SourceLoc,
    },
    #[error(transparent)]
    Attr(#[from] AttrError),
    #[error(transparent)]
    Ast(#[from] AstError),
}

impl TranslateError {
    pub(crate) fn unsupported(what: impl Into<String>, loc: &SourceLoc) -> Self {
        Self::Unsupported {
            what: what.into(),
            loc: loc.clone(),
        }
    }

    pub(crate) fn duplicate(what: impl Into<String>, loc: &SourceLoc) -> Self {
        Self::Duplicate {
            what: what.into(),
            loc: loc.clone(),
        }
    }

    pub(crate) fn contract(message: impl Into<String>, loc: &SourceLoc) -> Self {
        Self::ContractViolation {
            message: message.into(),
            loc: loc.clone(),
        }
    }

    pub(crate) fn resolution(message: impl Into<String>, loc: &SourceLoc) -> Self {
        Self::Resolution {
            message: message.into(),
            loc: loc.clone(),
        }
    }

    /// Wraps an IR builder error. Duplicate type names become
    /// [`TranslateError::Duplicate`].
    pub(crate) fn ir(source: IrError, loc: &SourceLoc) -> Self {
        match source {
            IrError::DuplicateType(name) => Self::duplicate(format!("type `{name}`"), loc),
            source => Self::Ir {
                source,
                loc: loc.clone(),
            },
        }
    }

    /// Source location the error points at, when it carries one directly.
    pub fn loc(&self) -> Option<&SourceLoc> {
        match self {
            Self::Unsupported { loc, .. }
            | Self::Duplicate { loc, .. }
            | Self::ContractViolation { loc, .. }
            | Self::Resolution { loc, .. }
            | Self::RecursiveCall { loc, .. }
            | Self::Ir { loc, .. } => Some(loc),
            Self::Attr(_) | Self::Ast(_) => None,
        }
    }
}
