//! Integer constant folding over input expressions.

use crate::decl::DeclKind;
use crate::expr::{BinaryOperator, ConstValue, Expr, ExprKind, UnaryOperator};
use crate::unit::Unit;

impl Expr {
    /// Evaluates this expression as an integer constant, if it is one.
    pub fn integer_constant(&self, unit: &Unit) -> Option<i64> {
        match self.kind {
            ExprKind::IntLiteral(v) => Some(v),
            ExprKind::BoolLiteral(b) => Some(i64::from(b)),
            ExprKind::Constant {
                value: Some(ConstValue::Int(v)),
                ..
            } => Some(v),
            ExprKind::Constant { ref expr, .. }
            | ExprKind::PassThrough(ref expr)
            | ExprKind::ExplicitCast { ref expr, .. }
            | ExprKind::ImplicitCast { ref expr, .. } => expr.integer_constant(unit),
            ExprKind::Unary { op, ref expr } => {
                let v = expr.integer_constant(unit)?;
                match op {
                    UnaryOperator::Plus => Some(v),
                    UnaryOperator::Minus => Some(v.wrapping_neg()),
                    UnaryOperator::LogicalNot => Some(i64::from(v == 0)),
                    UnaryOperator::BitNot => Some(!v),
                    _ => None,
                }
            }
            ExprKind::Binary { op, ref lhs, ref rhs } => {
                let l = lhs.integer_constant(unit)?;
                let r = rhs.integer_constant(unit)?;
                fold_binary(op, l, r)
            }
            ExprKind::Conditional {
                ref cond,
                ref then,
                ref otherwise,
            } => {
                if cond.integer_constant(unit)? != 0 {
                    then.integer_constant(unit)
                } else {
                    otherwise.integer_constant(unit)
                }
            }
            ExprKind::DeclRef(id) => match unit.decl(id).ok()?.kind {
                DeclKind::EnumConstant { value } => Some(value),
                DeclKind::Var(ref var) if var.constexpr => match var.evaluated {
                    Some(ConstValue::Int(v)) => Some(v),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }
}

fn fold_binary(op: BinaryOperator, l: i64, r: i64) -> Option<i64> {
    use BinaryOperator::*;
    Some(match op {
        Add => l.wrapping_add(r),
        Sub => l.wrapping_sub(r),
        Mul => l.wrapping_mul(r),
        Div => l.checked_div(r)?,
        Rem => l.checked_rem(r)?,
        BitAnd => l & r,
        BitOr => l | r,
        BitXor => l ^ r,
        Shl => l.checked_shl(u32::try_from(r).ok()?)?,
        Shr => l.checked_shr(u32::try_from(r).ok()?)?,
        LogicalAnd => i64::from(l != 0 && r != 0),
        LogicalOr => i64::from(l != 0 || r != 0),
        Less => i64::from(l < r),
        Greater => i64::from(l > r),
        LessEqual => i64::from(l <= r),
        GreaterEqual => i64::from(l >= r),
        Equal => i64::from(l == r),
        NotEqual => i64::from(l != r),
        Comma => r,
        Assign | AddAssign | SubAssign | MulAssign | DivAssign | RemAssign | AndAssign
        | OrAssign | XorAssign | ShlAssign | ShrAssign => return None,
    })
}
