//! Statements.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::unit::DeclId;

/// A loop hint attached through an attributed statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopHint {
    /// `unroll` / `nounroll` without a count.
    Unroll { enable: bool },
    UnrollCount(u32),
    /// Any other hint option; ignored.
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Compound(Vec<Stmt>),
    Attributed {
        hints: Vec<LoopHint>,
        stmt: Box<Stmt>,
    },
    If {
        cond: Expr,
        /// Absent when the front-end discarded it.
        #[serde(default)]
        then: Option<Box<Stmt>>,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    /// `body` holds the `case`/`default` labels in source order.
    Switch {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Case {
        value: Expr,
        body: Box<Stmt>,
    },
    Default {
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        inc: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Decl(Vec<DeclId>),
    Null,
    Expr(Expr),
    /// A statement class the front-end could not classify.
    Unknown {
        class: String,
    },
}

impl Stmt {
    pub fn compound(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Self::Compound(stmts.into_iter().collect())
    }
}
