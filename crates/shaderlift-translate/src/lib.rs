//! Translation of resolved shader-dialect units into shaderlift IR.
//!
//! [`translate`] runs one pass over a [`shaderlift_ast::Unit`]: it seeds the
//! builtin scalar types, walks every declaration, translates stage entries
//! and whatever they reach, and finally assigns the results to namespaces.

mod capture;
mod context;
mod driver;
mod error;
mod expr;
mod function;
mod namespace;
mod stage;
mod stmt;
mod types;

pub use driver::{TranslateOptions, translate};
pub use error::TranslateError;
