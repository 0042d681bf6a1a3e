//! Expressions.

use serde::{Deserialize, Serialize};

use crate::unit::{DeclId, SourceLoc, TypeId};

/// A value computed by the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Int(i64),
    Float(f64),
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitNot,
    LogicalNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Deref,
    AddrOf,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    LogicalAnd,
    LogicalOr,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    Comma,
}

/// Front-end cast classification, as far as translation cares.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    ArrayToPointerDecay,
    FunctionToPointerDecay,
    LValueToRValue,
    NoOp,
    IntegralCast,
    FloatingCast,
    IntegralToFloating,
    FloatingToIntegral,
    Other,
}

/// How a call names its callee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallForm {
    /// `f(args)`.
    Free,
    /// `base.f(args)`.
    Member { base: Box<Expr> },
    /// An overloaded operator; for methods the receiver is `args[0]`.
    Operator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    BoolLiteral(bool),
    IntLiteral(i64),
    FloatLiteral(f64),
    /// A constant-evaluated expression; `value` is absent when the result
    /// is neither an integer nor a float.
    Constant {
        #[serde(default)]
        value: Option<ConstValue>,
        expr: Box<Expr>,
    },
    DeclRef(DeclId),
    Member {
        base: Box<Expr>,
        member: DeclId,
    },
    Call {
        callee: DeclId,
        #[serde(default = "default_form")]
        form: CallForm,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Constructor call producing a value of the expression's type.
    Construct {
        ctor: DeclId,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// A closure literal of closure class `class`.
    Lambda {
        class: DeclId,
    },
    Unary {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    ArraySubscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Parentheses, temporaries, cleanups, and other transparent wrappers.
    PassThrough(Box<Expr>),
    ExplicitCast {
        kind: CastKind,
        expr: Box<Expr>,
    },
    ImplicitCast {
        kind: CastKind,
        expr: Box<Expr>,
    },
    ImplicitValueInit,
    ScalarValueInit,
    InitList(Vec<Expr>),
    SizeOf(TypeId),
    AlignOf(TypeId),
    This,
    /// An expression class the front-end could not classify.
    Unknown {
        class: String,
    },
}

fn default_form() -> CallForm {
    CallForm::Free
}

/// A typed expression node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// The expression's type, without reference qualifiers.
    pub ty: TypeId,
    #[serde(default)]
    pub loc: SourceLoc,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeId) -> Self {
        Self {
            kind,
            ty,
            loc: SourceLoc::default(),
        }
    }

    pub fn int(value: i64, ty: TypeId) -> Self {
        Self::new(ExprKind::IntLiteral(value), ty)
    }

    pub fn float(value: f64, ty: TypeId) -> Self {
        Self::new(ExprKind::FloatLiteral(value), ty)
    }

    pub fn decl_ref(decl: DeclId, ty: TypeId) -> Self {
        Self::new(ExprKind::DeclRef(decl), ty)
    }

    pub fn this(ty: TypeId) -> Self {
        Self::new(ExprKind::This, ty)
    }

    pub fn member(base: Expr, member: DeclId, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Member {
                base: Box::new(base),
                member,
            },
            ty,
        )
    }

    pub fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn unary(op: UnaryOperator, expr: Expr, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            ty,
        )
    }

    pub fn call(callee: DeclId, args: Vec<Expr>, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Call {
                callee,
                form: CallForm::Free,
                args,
            },
            ty,
        )
    }

    pub fn member_call(base: Expr, callee: DeclId, args: Vec<Expr>, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Call {
                callee,
                form: CallForm::Member {
                    base: Box::new(base),
                },
                args,
            },
            ty,
        )
    }

    pub fn operator_call(callee: DeclId, args: Vec<Expr>, ty: TypeId) -> Self {
        Self::new(
            ExprKind::Call {
                callee,
                form: CallForm::Operator,
                args,
            },
            ty,
        )
    }

    pub fn implicit_cast(kind: CastKind, expr: Expr, ty: TypeId) -> Self {
        Self::new(
            ExprKind::ImplicitCast {
                kind,
                expr: Box::new(expr),
            },
            ty,
        )
    }

    pub fn at(mut self, loc: SourceLoc) -> Self {
        self.loc = loc;
        self
    }

    /// Strips pass-through wrappers and implicit casts.
    pub fn ignore_implicit(&self) -> &Expr {
        let mut e = self;
        loop {
            match e.kind {
                ExprKind::PassThrough(ref inner)
                | ExprKind::ImplicitCast {
                    expr: ref inner, ..
                } => e = &**inner,
                _ => return e,
            }
        }
    }

    /// Visits this expression and every sub-expression in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self.kind {
            ExprKind::Constant { ref expr, .. }
            | ExprKind::Unary { ref expr, .. }
            | ExprKind::PassThrough(ref expr)
            | ExprKind::ExplicitCast { ref expr, .. }
            | ExprKind::ImplicitCast { ref expr, .. } => expr.walk(visit),
            ExprKind::Member { ref base, .. } => base.walk(visit),
            ExprKind::Call {
                ref form, ref args, ..
            } => {
                if let CallForm::Member { base } = form {
                    base.walk(visit);
                }
                args.iter().for_each(|a| a.walk(visit));
            }
            ExprKind::Construct { ref args, .. } | ExprKind::InitList(ref args) => {
                args.iter().for_each(|a| a.walk(visit))
            }
            ExprKind::Binary {
                ref lhs, ref rhs, ..
            } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            ExprKind::ArraySubscript {
                ref base,
                ref index,
            } => {
                base.walk(visit);
                index.walk(visit);
            }
            ExprKind::Conditional {
                ref cond,
                ref then,
                ref otherwise,
            } => {
                cond.walk(visit);
                then.walk(visit);
                otherwise.walk(visit);
            }
            ExprKind::BoolLiteral(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::DeclRef(_)
            | ExprKind::Lambda { .. }
            | ExprKind::ImplicitValueInit
            | ExprKind::ScalarValueInit
            | ExprKind::SizeOf(_)
            | ExprKind::AlignOf(_)
            | ExprKind::This
            | ExprKind::Unknown { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_implicit_strips_wrappers() {
        let t = TypeId(0);
        let inner = Expr::this(t);
        let wrapped = Expr::implicit_cast(
            CastKind::NoOp,
            Expr::new(ExprKind::PassThrough(Box::new(inner.clone())), t),
            t,
        );
        assert_eq!(wrapped.ignore_implicit(), &inner);
    }

    #[test]
    fn walk_visits_every_node() {
        let t = TypeId(0);
        let e = Expr::binary(
            BinaryOperator::Add,
            Expr::int(1, t),
            Expr::call(DeclId(3), vec![Expr::int(2, t), Expr::this(t)], t),
            t,
        );
        let mut count = 0;
        e.walk(&mut |_| count += 1);
        assert_eq!(count, 5);
    }
}
