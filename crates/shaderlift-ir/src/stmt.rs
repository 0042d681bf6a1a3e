//! Statements: control flow and side effects.

use crate::arena::Handle;
use crate::attr::Attribute;
use crate::expr::Expression;
use crate::func::Variable;

/// A block of statements.
pub type Block = Vec<Statement>;

/// One arm of a `switch`. `value` is `None` for the default arm.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Option<Expression>,
    pub body: Block,
}

/// A statement in the IR.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Block(Block),
    Expr(Expression),
    /// Declares a local; the initializer lives on the [`Variable`].
    Declare(Handle<Variable>),
    /// Several locals declared by one source statement.
    DeclGroup(Vec<Handle<Variable>>),
    If {
        condition: Expression,
        accept: Block,
        reject: Option<Block>,
    },
    Switch {
        selector: Expression,
        cases: Vec<SwitchCase>,
    },
    While {
        condition: Expression,
        body: Block,
        attrs: Vec<Attribute>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        step: Option<Expression>,
        body: Block,
        attrs: Vec<Attribute>,
    },
    Break,
    Continue,
    Return(Option<Expression>),
    /// Text carried through to generated code, e.g. for folded branches.
    Comment(String),
}

impl Statement {
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    /// Wraps a statement into a block unless it already is one.
    pub fn into_block(self) -> Block {
        match self {
            Self::Block(block) => block,
            other => vec![other],
        }
    }

    /// Loop attributes, if this statement is a loop.
    pub fn loop_attrs_mut(&mut self) -> Option<&mut Vec<Attribute>> {
        match self {
            Self::While { attrs, .. } | Self::For { attrs, .. } => Some(attrs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;

    #[test]
    fn into_block_wraps_single_statements() {
        assert_eq!(Statement::Break.into_block(), vec![Statement::Break]);
        let block = Statement::Block(vec![Statement::Continue, Statement::Break]);
        assert_eq!(block.into_block().len(), 2);
    }

    #[test]
    fn loop_attrs_only_on_loops() {
        let mut w = Statement::While {
            condition: Expression::Literal(Literal::Bool(true)),
            body: vec![Statement::Break],
            attrs: vec![],
        };
        w.loop_attrs_mut()
            .expect("while is a loop")
            .push(Attribute::Unroll(4));
        assert!(matches!(w, Statement::While { ref attrs, .. } if attrs == &[Attribute::Unroll(4)]));
        assert!(Statement::Break.loop_attrs_mut().is_none());
    }
}
