//! Expression lowering, including the attribute-driven call forms.

use shaderlift_ast::{
    BinaryOperator, BuiltinKind, CallForm, CastKind, ConstValue, DeclId, DeclKind, Expr, ExprKind,
    SourceLoc, SpecialMember, TypeId, TypeKind, UnaryOperator,
};
use shaderlift_ir::{
    ArrayFlags, Attribute, BinaryOp, CastKind as IrCastKind, Expression, GlobalKind,
    GlobalVariable, Handle, Literal, Qualifier, SwizzleComponent, TypeInner, UnaryOp,
};

use crate::context::Translator;
use crate::error::TranslateError;
use crate::function::Shape;

fn binary_op(op: BinaryOperator) -> Option<BinaryOp> {
    use BinaryOperator as B;
    Some(match op {
        B::Add => BinaryOp::Add,
        B::Sub => BinaryOp::Sub,
        B::Mul => BinaryOp::Mul,
        B::Div => BinaryOp::Div,
        B::Rem => BinaryOp::Mod,
        B::BitAnd => BinaryOp::BitAnd,
        B::BitOr => BinaryOp::BitOr,
        B::BitXor => BinaryOp::BitXor,
        B::Shl => BinaryOp::Shl,
        B::Shr => BinaryOp::Shr,
        B::LogicalAnd => BinaryOp::And,
        B::LogicalOr => BinaryOp::Or,
        B::Less => BinaryOp::Less,
        B::Greater => BinaryOp::Greater,
        B::LessEqual => BinaryOp::LessEqual,
        B::GreaterEqual => BinaryOp::GreaterEqual,
        B::Equal => BinaryOp::Equal,
        B::NotEqual => BinaryOp::NotEqual,
        B::Assign => BinaryOp::Assign,
        B::AddAssign => BinaryOp::AddAssign,
        B::SubAssign => BinaryOp::SubAssign,
        B::MulAssign => BinaryOp::MulAssign,
        B::DivAssign => BinaryOp::DivAssign,
        B::RemAssign => BinaryOp::ModAssign,
        B::AndAssign => BinaryOp::BitAndAssign,
        B::OrAssign => BinaryOp::BitOrAssign,
        B::XorAssign => BinaryOp::BitXorAssign,
        B::ShlAssign => BinaryOp::ShlAssign,
        B::ShrAssign => BinaryOp::ShrAssign,
        B::Comma => return None,
    })
}

fn unary_op(op: UnaryOperator) -> Option<UnaryOp> {
    Some(match op {
        UnaryOperator::Plus => UnaryOp::Plus,
        UnaryOperator::Minus => UnaryOp::Minus,
        UnaryOperator::BitNot => UnaryOp::BitNot,
        UnaryOperator::LogicalNot => UnaryOp::Not,
        UnaryOperator::PreInc => UnaryOp::PreInc,
        UnaryOperator::PreDec => UnaryOp::PreDec,
        UnaryOperator::PostInc => UnaryOp::PostInc,
        UnaryOperator::PostDec => UnaryOp::PostDec,
        UnaryOperator::Deref | UnaryOperator::AddrOf => return None,
    })
}

fn is_this(expr: &Expr) -> bool {
    matches!(expr.ignore_implicit().kind, ExprKind::This)
}

impl<'u> Translator<'u> {
    pub(crate) fn translate_expr(&mut self, expr: &Expr) -> Result<Expression, TranslateError> {
        let loc = &expr.loc;
        let unit = self.unit;
        let e = match expr.kind {
            ExprKind::BoolLiteral(b) => Expression::Literal(Literal::Bool(b)),
            ExprKind::IntLiteral(v) => Expression::int(v),
            ExprKind::FloatLiteral(v) => Expression::Literal(Literal::Float(v)),
            ExprKind::Constant {
                value,
                expr: ref inner,
            } => match value {
                Some(value) => self.literal(value, expr.ty)?,
                None => self.translate_expr(inner)?,
            },
            ExprKind::DeclRef(id) => self.decl_ref(id, loc)?,
            ExprKind::Member { ref base, member } => self.member_expr(expr, base, member)?,
            ExprKind::Call {
                callee,
                ref form,
                ref args,
            } => self.call_expr(expr, callee, form, args)?,
            ExprKind::Construct { ctor, ref args } => self.construct_expr(expr, ctor, args)?,
            ExprKind::Lambda { class } => {
                if let Some(info) = unit.record(class)?.closure.as_ref() {
                    self.translate_function(info.call_operator, loc)?;
                }
                Expression::Construct {
                    ty: self.lambda_proxy()?,
                    arguments: Vec::new(),
                }
            }
            ExprKind::Unary { op, expr: ref inner } => match unary_op(op) {
                Some(op) => Expression::unary(op, self.translate_expr(inner)?),
                None if op == UnaryOperator::Deref && is_this(inner) => self.this_expr(loc)?,
                None => {
                    return Err(TranslateError::unsupported(
                        format!("pointer operator {op:?}"),
                        loc,
                    ));
                }
            },
            ExprKind::Binary {
                op,
                ref lhs,
                ref rhs,
            } => {
                let op = binary_op(op)
                    .ok_or_else(|| TranslateError::unsupported("comma operator", loc))?;
                Expression::binary(op, self.translate_expr(lhs)?, self.translate_expr(rhs)?)
            }
            ExprKind::ArraySubscript {
                ref base,
                ref index,
            } => Expression::access(self.translate_expr(base)?, self.translate_expr(index)?),
            ExprKind::Conditional {
                ref cond,
                ref then,
                ref otherwise,
            } => Expression::Conditional {
                condition: Box::new(self.translate_expr(cond)?),
                accept: Box::new(self.translate_expr(then)?),
                reject: Box::new(self.translate_expr(otherwise)?),
            },
            ExprKind::PassThrough(ref inner) => self.translate_expr(inner)?,
            ExprKind::ExplicitCast {
                expr: ref inner, ..
            } => Expression::Cast {
                kind: IrCastKind::Static,
                ty: self.resolve_type(expr.ty, loc)?,
                expr: Box::new(self.translate_expr(inner)?),
            },
            ExprKind::ImplicitCast {
                kind,
                expr: ref inner,
            } => match kind {
                CastKind::ArrayToPointerDecay
                | CastKind::FunctionToPointerDecay
                | CastKind::LValueToRValue
                | CastKind::NoOp => self.translate_expr(inner)?,
                _ => Expression::Cast {
                    kind: IrCastKind::Implicit,
                    ty: self.resolve_type(expr.ty, loc)?,
                    expr: Box::new(self.translate_expr(inner)?),
                },
            },
            ExprKind::ImplicitValueInit | ExprKind::ScalarValueInit => Expression::Construct {
                ty: self.resolve_type(expr.ty, loc)?,
                arguments: Vec::new(),
            },
            ExprKind::InitList(ref items) => Expression::InitList(
                items
                    .iter()
                    .map(|item| self.translate_expr(item))
                    .collect::<Result<_, _>>()?,
            ),
            ExprKind::SizeOf(ty) => {
                let ty = self.resolve_type(ty, loc)?;
                Expression::int(i64::from(self.module.types[ty].size))
            }
            ExprKind::AlignOf(ty) => {
                let ty = self.resolve_type(ty, loc)?;
                Expression::int(i64::from(self.module.types[ty].alignment))
            }
            ExprKind::This => self.this_expr(loc)?,
            ExprKind::Unknown { ref class } => {
                return Err(TranslateError::unsupported(
                    format!("expression `{class}`"),
                    loc,
                ));
            }
        };
        Ok(e)
    }

    fn literal(&self, value: ConstValue, ty: TypeId) -> Result<Expression, TranslateError> {
        let is_bool = matches!(self.unit.ty(ty)?.kind, TypeKind::Builtin(BuiltinKind::Bool));
        Ok(Expression::Literal(match value {
            ConstValue::Int(v) if is_bool => Literal::Bool(v != 0),
            ConstValue::Int(v) => Literal::Int(v),
            ConstValue::Float(v) => Literal::Float(v),
        }))
    }

    /// The receiver of the function under translation.
    pub(crate) fn this_expr(&self, loc: &SourceLoc) -> Result<Expression, TranslateError> {
        let frame = self.frame(loc)?;
        match (frame.this_redirect, frame.this_type) {
            (Some(param), _) => Ok(Expression::Local(param)),
            (None, Some(ty)) => Ok(Expression::This(ty)),
            (None, None) => Err(TranslateError::resolution("`this` outside of a method", loc)),
        }
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    fn decl_ref(&mut self, id: DeclId, loc: &SourceLoc) -> Result<Expression, TranslateError> {
        let decl = self.decl(id)?;
        match decl.kind {
            DeclKind::Var(_) | DeclKind::Param(_) => self.variable_ref(id, loc),
            DeclKind::EnumConstant { .. } => {
                if let Some(owner) = decl.context {
                    self.translate_enum(owner)?;
                }
                self.enum_constants
                    .get(&id)
                    .map(|&g| Expression::Global(g))
                    .ok_or_else(|| {
                        TranslateError::resolution(
                            format!("enumerator `{}` has no translation", decl.name),
                            loc,
                        )
                    })
            }
            DeclKind::Function(_) => self
                .translate_function(id, loc)?
                .map(Expression::Function)
                .ok_or_else(|| {
                    TranslateError::resolution(
                        format!("function `{}` has no translation", decl.name),
                        loc,
                    )
                }),
            _ => Err(TranslateError::unsupported(
                format!("reference to `{}`", decl.name),
                loc,
            )),
        }
    }

    /// Resolves a variable: scope first, then globals, then folded
    /// `constexpr` values.
    pub(crate) fn variable_ref(
        &mut self,
        var: DeclId,
        loc: &SourceLoc,
    ) -> Result<Expression, TranslateError> {
        if let Some(local) = self.stack.last().and_then(|frame| frame.lookup(var)) {
            return Ok(Expression::Local(local));
        }
        let decl = self.decl(var)?;
        let Some(v) = decl.as_var() else {
            return Err(TranslateError::resolution(
                format!("parameter `{}` is not in scope", decl.name),
                loc,
            ));
        };
        if self.unit.closure_of(v.ty.ty)?.is_some() {
            return Ok(Expression::Construct {
                ty: self.lambda_proxy()?,
                arguments: Vec::new(),
            });
        }
        if let Some(&global) = self.globals.get(&var) {
            log::trace!("global `{}` already translated", decl.name);
            return Ok(Expression::Global(global));
        }
        if v.global {
            return self.translate_global(var).map(Expression::Global);
        }
        if v.constexpr {
            if let Some(value) = v.evaluated {
                return self.literal(value, v.ty.ty);
            }
        }
        Err(TranslateError::resolution(
            format!("variable `{}` failed to instantiate", decl.name),
            loc,
        ))
    }

    /// Emits a namespace-scope variable once.
    pub(crate) fn translate_global(
        &mut self,
        id: DeclId,
    ) -> Result<Handle<GlobalVariable>, TranslateError> {
        if let Some(&global) = self.globals.get(&id) {
            return Ok(global);
        }
        let decl = self.decl(id)?;
        let Some(var) = decl.as_var() else {
            return Err(TranslateError::unsupported(
                format!("global declaration `{}`", decl.name),
                &decl.loc,
            ));
        };
        let name = if var.template_args.is_empty() {
            decl.name.clone()
        } else {
            format!("{}_{}", decl.name, self.template_suffix(&var.template_args)?)
        };
        let mut ty = self.resolve_type(var.ty.ty, &decl.loc)?;
        let attrs = self.attrs(id);

        let global = if self.module.types[ty].is_resource() {
            let (binding, group) = attrs.binding().unwrap_or((!0, !0));
            let mut ir_attrs = vec![Attribute::ResourceBind { group, binding }];
            if attrs.is_push_constant() {
                ir_attrs.push(Attribute::PushConstant);
            }
            GlobalVariable {
                name,
                ty,
                kind: GlobalKind::Resource,
                init: None,
                attrs: ir_attrs,
            }
        } else {
            let init = var
                .init
                .as_ref()
                .map(|e| self.translate_expr(e))
                .transpose()?;
            let kind = if attrs.is_groupshared() {
                if let TypeInner::Array { element, count, .. } = self.module.types[ty].inner {
                    ty = self
                        .module
                        .array(element, count, ArrayFlags::SHARED)
                        .map_err(|e| TranslateError::ir(e, &decl.loc))?;
                }
                GlobalKind::GroupShared
            } else {
                GlobalKind::Constant
            };
            GlobalVariable {
                name,
                ty,
                kind,
                init,
                attrs: Vec::new(),
            }
        };
        let handle = self
            .module
            .declare_global(global)
            .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        self.globals.insert(id, handle);
        log::debug!("translated global `{}`", decl.name);
        Ok(handle)
    }

    fn member_expr(
        &mut self,
        expr: &Expr,
        base: &Expr,
        member: DeclId,
    ) -> Result<Expression, TranslateError> {
        let loc = &expr.loc;
        let decl = self.decl(member)?;
        match decl.kind {
            DeclKind::Field(_) => {
                if is_this(base) {
                    let redirect = self
                        .stack
                        .last()
                        .and_then(|frame| frame.member_redirects.get(&member).copied());
                    if let Some(param) = redirect {
                        return Ok(Expression::Local(param));
                    }
                }
                if self.attrs(member).is_swizzle() {
                    let pattern = decl
                        .name
                        .chars()
                        .map(|c| {
                            SwizzleComponent::from_char(c).ok_or_else(|| {
                                TranslateError::unsupported(format!("swizzle component `{c}`"), loc)
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Expression::Swizzle {
                        vector: Box::new(self.translate_expr(base)?),
                        ty: self.resolve_type(expr.ty, loc)?,
                        pattern,
                    });
                }
                let record = decl.context.ok_or_else(|| {
                    TranslateError::resolution(format!("field `{}` has no owner", decl.name), loc)
                })?;
                let owner = self.translate_record(record)?.ok_or_else(|| {
                    TranslateError::unsupported(
                        format!("field `{}` of an untranslatable type", decl.name),
                        loc,
                    )
                })?;
                let index = self.field_index(member, loc)?;
                Ok(Expression::Field {
                    base: Box::new(self.translate_expr(base)?),
                    owner,
                    index,
                })
            }
            DeclKind::Function(_) => {
                let method = self.translate_function(member, loc)?.ok_or_else(|| {
                    TranslateError::resolution(
                        format!("method `{}` has no translation", decl.name),
                        loc,
                    )
                })?;
                Ok(Expression::Method {
                    base: Box::new(self.translate_expr(base)?),
                    method,
                })
            }
            DeclKind::Var(_) => self.variable_ref(member, loc),
            _ => Err(TranslateError::unsupported(
                format!("member `{}`", decl.name),
                loc,
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------------

    fn call_expr(
        &mut self,
        expr: &Expr,
        callee: DeclId,
        form: &CallForm,
        args: &[Expr],
    ) -> Result<Expression, TranslateError> {
        let loc = &expr.loc;
        let unit = self.unit;
        let decl = self.decl(callee)?;
        let function = unit.function(callee)?;
        let attrs = self.attrs(callee);

        let (receiver, args) = match *form {
            CallForm::Member { ref base } => (Some(&**base), args),
            CallForm::Operator if function.method.is_some() && !function.is_static() => {
                match args.split_first() {
                    Some((receiver, rest)) => (Some(receiver), rest),
                    None => (None, args),
                }
            }
            _ => (None, args),
        };
        let operands: Vec<&Expr> = receiver.into_iter().chain(args).collect();
        let arity = |n: usize| {
            TranslateError::contract(
                format!("`{}` must be called with {n} operand(s)", decl.name),
                loc,
            )
        };

        if decl.implicit
            && matches!(
                function.special_member,
                Some(SpecialMember::CopyAssign | SpecialMember::MoveAssign)
            )
        {
            let [lhs, rhs] = operands[..] else {
                return Err(arity(2));
            };
            return Ok(Expression::binary(
                BinaryOp::Assign,
                self.translate_expr(lhs)?,
                self.translate_expr(rhs)?,
            ));
        }
        if attrs.is_access() {
            let [base, index] = operands[..] else {
                return Err(arity(2));
            };
            return Ok(Expression::access(
                self.translate_expr(base)?,
                self.translate_expr(index)?,
            ));
        }
        if let Some(name) = attrs.unaop() {
            let op = UnaryOp::from_name(name).ok_or_else(|| {
                TranslateError::unsupported(format!("unary operator `{name}`"), loc)
            })?;
            let [operand] = operands[..] else {
                return Err(arity(1));
            };
            return Ok(Expression::unary(op, self.translate_expr(operand)?));
        }
        if let Some(name) = attrs.binop() {
            let op = BinaryOp::from_name(name).ok_or_else(|| {
                TranslateError::unsupported(format!("binary operator `{name}`"), loc)
            })?;
            let [lhs, rhs] = operands[..] else {
                return Err(arity(2));
            };
            return Ok(Expression::binary(
                op,
                self.translate_expr(lhs)?,
                self.translate_expr(rhs)?,
            ));
        }
        if let Some(name) = attrs.callop() {
            let member = matches!(*form, CallForm::Member { .. });
            return self.intrinsic_call(expr, name, member, &operands);
        }

        let shape = self.shape_of(function)?;
        let receiver = match (shape, receiver) {
            (Shape::Method | Shape::FreeWithThis, Some(receiver)) => {
                Some(self.translate_expr(receiver)?)
            }
            (Shape::Method | Shape::FreeWithThis, None) => Some(self.this_expr(loc)?),
            _ => None,
        };
        let mut arguments = args
            .iter()
            .map(|a| self.translate_expr(a))
            .collect::<Result<Vec<_>, _>>()?;
        let handle = self.translate_function(callee, loc)?.ok_or_else(|| {
            TranslateError::resolution(format!("call to `{}` has no translation", decl.name), loc)
        })?;
        arguments.extend(self.capture_arguments(callee, loc)?);

        Ok(match (shape, receiver) {
            (Shape::Method, Some(receiver)) => Expression::MethodCall {
                receiver: Box::new(receiver),
                method: handle,
                arguments,
            },
            (_, Some(receiver)) => {
                arguments.insert(0, receiver);
                Expression::Call {
                    function: handle,
                    arguments,
                }
            }
            (_, None) => Expression::Call {
                function: handle,
                arguments,
            },
        })
    }

    /// Specializes the intrinsic named by a `callop` tag for the actual
    /// operand types. The receiver of a member call is `inout`; every other
    /// operand is passed by value.
    fn intrinsic_call(
        &mut self,
        expr: &Expr,
        name: &str,
        member: bool,
        operands: &[&Expr],
    ) -> Result<Expression, TranslateError> {
        let loc = &expr.loc;
        let template = self.module.find_intrinsic(name).ok_or_else(|| {
            TranslateError::resolution(format!("unknown intrinsic `{name}`"), loc)
        })?;

        let mut qualifiers = vec![Qualifier::None; operands.len()];
        if member {
            if let Some(receiver) = qualifiers.first_mut() {
                *receiver = Qualifier::Inout;
            }
        }

        let mut types = Vec::with_capacity(operands.len());
        let mut arguments = Vec::with_capacity(operands.len());
        for &operand in operands {
            types.push(self.resolve_type(operand.ty, loc)?);
            arguments.push(self.translate_expr(operand)?);
        }
        let call_site = self.resolve_type(expr.ty, loc)?;
        let function = self
            .module
            .specialize(template, &types, &qualifiers, Some(call_site))
            .map_err(|e| TranslateError::resolution(e.to_string(), loc))?;
        Ok(Expression::Call {
            function,
            arguments,
        })
    }

    fn construct_expr(
        &mut self,
        expr: &Expr,
        ctor: DeclId,
        args: &[Expr],
    ) -> Result<Expression, TranslateError> {
        let loc = &expr.loc;
        let unit = self.unit;
        let decl = self.decl(ctor)?;
        let function = unit.function(ctor)?;
        if decl.implicit
            && matches!(
                function.special_member,
                Some(SpecialMember::CopyConstructor | SpecialMember::MoveConstructor)
            )
        {
            if let [ref source] = args[..] {
                return self.translate_expr(source);
            }
        }
        let mut arguments = args
            .iter()
            .map(|a| self.translate_expr(a))
            .collect::<Result<Vec<_>, _>>()?;
        let ty = self.resolve_type(expr.ty, loc)?;
        self.translate_function(ctor, loc)?;
        arguments.extend(self.capture_arguments(ctor, loc)?);
        Ok(Expression::Construct { ty, arguments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_mapping() {
        assert_eq!(binary_op(BinaryOperator::Rem), Some(BinaryOp::Mod));
        assert_eq!(binary_op(BinaryOperator::XorAssign), Some(BinaryOp::BitXorAssign));
        assert_eq!(binary_op(BinaryOperator::LogicalOr), Some(BinaryOp::Or));
        assert_eq!(binary_op(BinaryOperator::Comma), None);
        assert_eq!(unary_op(UnaryOperator::LogicalNot), Some(UnaryOp::Not));
        assert_eq!(unary_op(UnaryOperator::AddrOf), None);
    }
}
