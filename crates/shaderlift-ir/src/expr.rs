//! Expressions: value-producing tree nodes.

use crate::arena::Handle;
use crate::func::{Function, Variable};
use crate::global::GlobalVariable;
use crate::types::TypeDecl;

/// A vector swizzle component.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum SwizzleComponent {
    X = 0,
    Y = 1,
    Z = 2,
    W = 3,
}

impl SwizzleComponent {
    /// Accepts both the `xyzw` and `rgba` spellings.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'x' | 'r' => Some(Self::X),
            'y' | 'g' => Some(Self::Y),
            'z' | 'b' => Some(Self::Z),
            'w' | 'a' => Some(Self::W),
            _ => None,
        }
    }
}

/// A literal constant value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
}

macro_rules! named_ops {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            /// Parses the upper-case operator name used by `unaop`/`binop`
            /// annotations.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }
    };
}

named_ops! {
    /// A unary operator.
    UnaryOp {
        Plus => "PLUS",
        Minus => "MINUS",
        Not => "NOT",
        BitNot => "BIT_NOT",
        PreInc => "PRE_INC",
        PreDec => "PRE_DEC",
        PostInc => "POST_INC",
        PostDec => "POST_DEC",
    }
}

named_ops! {
    /// A binary operator, including assignments.
    BinaryOp {
        Add => "ADD",
        Sub => "SUB",
        Mul => "MUL",
        Div => "DIV",
        Mod => "MOD",
        BitAnd => "BIT_AND",
        BitOr => "BIT_OR",
        BitXor => "BIT_XOR",
        Shl => "SHL",
        Shr => "SHR",
        And => "AND",
        Or => "OR",
        Less => "LESS",
        Greater => "GREATER",
        LessEqual => "LESS_EQUAL",
        GreaterEqual => "GREATER_EQUAL",
        Equal => "EQUAL",
        NotEqual => "NOT_EQUAL",
        Assign => "ASSIGN",
        AddAssign => "ADD_ASSIGN",
        SubAssign => "SUB_ASSIGN",
        MulAssign => "MUL_ASSIGN",
        DivAssign => "DIV_ASSIGN",
        ModAssign => "MOD_ASSIGN",
        BitAndAssign => "BIT_AND_ASSIGN",
        BitOrAssign => "BIT_OR_ASSIGN",
        BitXorAssign => "BIT_XOR_ASSIGN",
        ShlAssign => "SHL_ASSIGN",
        ShrAssign => "SHR_ASSIGN",
    }
}

/// Whether a cast was written in source or inserted by the front-end.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum CastKind {
    Static,
    Implicit,
}

/// An expression tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// A parameter or local of the enclosing function.
    Local(Handle<Variable>),
    Global(Handle<GlobalVariable>),
    /// A reference to a function, e.g. passed as a callable.
    Function(Handle<Function>),
    /// The implicit receiver of a method.
    This(Handle<TypeDecl>),
    /// Member `index` of a value of structure type `owner`.
    Field {
        base: Box<Expression>,
        owner: Handle<TypeDecl>,
        index: u32,
    },
    Swizzle {
        vector: Box<Expression>,
        ty: Handle<TypeDecl>,
        pattern: Vec<SwizzleComponent>,
    },
    /// Subscript of an array, vector, matrix, or buffer.
    Access {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// A bound method reference.
    Method {
        base: Box<Expression>,
        method: Handle<Function>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        function: Handle<Function>,
        arguments: Vec<Expression>,
    },
    MethodCall {
        receiver: Box<Expression>,
        method: Handle<Function>,
        arguments: Vec<Expression>,
    },
    Construct {
        ty: Handle<TypeDecl>,
        arguments: Vec<Expression>,
    },
    InitList(Vec<Expression>),
    Conditional {
        condition: Box<Expression>,
        accept: Box<Expression>,
        reject: Box<Expression>,
    },
    Cast {
        kind: CastKind,
        ty: Handle<TypeDecl>,
        expr: Box<Expression>,
    },
}

impl Expression {
    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Int(value))
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expression) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn access(base: Expression, index: Expression) -> Self {
        Self::Access {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// Returns the local variable this expression names directly, if any.
    pub fn as_local(&self) -> Option<Handle<Variable>> {
        match *self {
            Self::Local(h) => Some(h),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip() {
        assert_eq!(BinaryOp::from_name("SHR_ASSIGN"), Some(BinaryOp::ShrAssign));
        assert_eq!(BinaryOp::LessEqual.name(), "LESS_EQUAL");
        assert_eq!(UnaryOp::from_name("POST_INC"), Some(UnaryOp::PostInc));
        assert_eq!(UnaryOp::from_name("post_inc"), None);
        assert_eq!(BinaryOp::from_name("POW"), None);
    }

    #[test]
    fn swizzle_spellings() {
        assert_eq!(SwizzleComponent::from_char('r'), Some(SwizzleComponent::X));
        assert_eq!(SwizzleComponent::from_char('w'), Some(SwizzleComponent::W));
        assert_eq!(SwizzleComponent::from_char('q'), None);
    }

    #[test]
    fn helper_constructors() {
        let e = Expression::binary(BinaryOp::Add, Expression::int(1), Expression::int(2));
        match e {
            Expression::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(*left, Expression::int(1));
                assert_eq!(*right, Expression::int(2));
            }
            other => panic!("expected Binary, got {other:?}"),
        }
    }
}
