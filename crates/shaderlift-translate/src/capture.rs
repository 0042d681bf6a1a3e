//! Closure captures lowered to explicit parameters.
//!
//! A closure's call operator receives one `cap_*` parameter per captured
//! variable, and one per field it reads through a captured `this`. Any
//! function taking the closure as a parameter receives the same set so it
//! can forward them to the call operator.

use shaderlift_ast::{Capture, DeclId, DeclKind, Expr, ExprKind, QualType, SourceLoc, Stmt, Unit};
use shaderlift_ir::{Expression, Handle, Qualifier, TypeDecl, Variable};

use crate::context::{CaptureKey, CaptureSource, Translator};
use crate::error::TranslateError;

/// Visits every expression of a statement tree, including local variable
/// initializers.
fn for_each_expr<'a>(
    unit: &'a Unit,
    stmt: &'a Stmt,
    visit: &mut impl FnMut(&'a Expr),
) -> Result<(), TranslateError> {
    match *stmt {
        Stmt::Compound(ref stmts) => {
            for s in stmts {
                for_each_expr(unit, s, visit)?;
            }
        }
        Stmt::Switch { ref cond, ref body } => {
            cond.walk(visit);
            for s in body {
                for_each_expr(unit, s, visit)?;
            }
        }
        Stmt::Attributed { stmt: ref inner, .. }
        | Stmt::Default { body: ref inner } => for_each_expr(unit, inner, visit)?,
        Stmt::Case {
            ref value,
            ref body,
        } => {
            value.walk(visit);
            for_each_expr(unit, body, visit)?;
        }
        Stmt::If {
            ref cond,
            ref then,
            ref otherwise,
        } => {
            cond.walk(visit);
            for branch in then.iter().chain(otherwise) {
                for_each_expr(unit, branch, visit)?;
            }
        }
        Stmt::While { ref cond, ref body } => {
            cond.walk(visit);
            for_each_expr(unit, body, visit)?;
        }
        Stmt::For {
            ref init,
            ref cond,
            ref inc,
            ref body,
        } => {
            if let Some(init) = init {
                for_each_expr(unit, init, visit)?;
            }
            for e in cond.iter().chain(inc) {
                e.walk(visit);
            }
            for_each_expr(unit, body, visit)?;
        }
        Stmt::Return(Some(ref e)) | Stmt::Expr(ref e) => e.walk(visit),
        Stmt::Decl(ref ids) => {
            for &id in ids {
                if let Some(init) = unit.decl(id)?.as_var().and_then(|v| v.init.as_ref()) {
                    init.walk(visit);
                }
            }
        }
        Stmt::Return(None)
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Null
        | Stmt::Unknown { .. } => {}
    }
    Ok(())
}

/// Fields read through `this` in a call operator body, unique and in
/// first-use order.
fn accessed_this_fields(unit: &Unit, call_operator: DeclId) -> Result<Vec<DeclId>, TranslateError> {
    let Some(ref body) = unit.function(call_operator)?.body else {
        return Ok(Vec::new());
    };
    let mut members = Vec::new();
    for_each_expr(unit, body, &mut |e| {
        if let ExprKind::Member { ref base, member } = e.kind {
            if matches!(base.ignore_implicit().kind, ExprKind::This) {
                members.push(member);
            }
        }
    })?;

    let mut fields = Vec::new();
    for member in members {
        if matches!(unit.decl(member)?.kind, DeclKind::Field(_)) && !fields.contains(&member) {
            fields.push(member);
        }
    }
    Ok(fields)
}

impl Translator<'_> {
    /// Adds the capture parameters of `closure` to the open frame. With
    /// `own` set, the frame is the closure's own call operator and reads of
    /// captured entities are redirected to the new parameters.
    pub(crate) fn lower_captures(
        &mut self,
        closure: DeclId,
        own: bool,
        loc: &SourceLoc,
    ) -> Result<(), TranslateError> {
        let unit = self.unit;
        let Some(ref info) = unit.record(closure)?.closure else {
            return Ok(());
        };
        for capture in &info.captures {
            match *capture {
                Capture::Var { var, by_ref } => {
                    let decl = self.decl(var)?;
                    let qt = captured_type(unit, var)?;
                    let ty = self.resolve_type(qt.ty, loc)?;
                    let qualifier = if by_ref && !qt.is_const {
                        Qualifier::Inout
                    } else {
                        Qualifier::None
                    };
                    let key = CaptureKey {
                        closure,
                        source: CaptureSource::Var(var),
                    };
                    if let Some(param) =
                        self.capture_param(key, format!("cap_{}", decl.name), ty, qualifier, loc)?
                    {
                        if own {
                            self.frame_mut(loc)?.value_redirects.insert(var, param);
                        }
                    }
                }
                Capture::This => {
                    for field in accessed_this_fields(unit, info.call_operator)? {
                        let decl = self.decl(field)?;
                        let DeclKind::Field(ref f) = decl.kind else {
                            continue;
                        };
                        let ty = self.resolve_type(f.ty.ty, loc)?;
                        let key = CaptureKey {
                            closure,
                            source: CaptureSource::Field(field),
                        };
                        let name = format!("cap_{}", decl.name);
                        if let Some(param) =
                            self.capture_param(key, name, ty, Qualifier::Inout, loc)?
                        {
                            if own {
                                self.frame_mut(loc)?.member_redirects.insert(field, param);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Creates one capture parameter; `None` if the frame already has it.
    fn capture_param(
        &mut self,
        key: CaptureKey,
        name: String,
        ty: Handle<TypeDecl>,
        qualifier: Qualifier,
        loc: &SourceLoc,
    ) -> Result<Option<Handle<Variable>>, TranslateError> {
        let frame = self.frame_mut(loc)?;
        if frame.captured.contains_key(&key) {
            return Ok(None);
        }
        let param = frame.new_param(name, ty, qualifier);
        frame.capture_params.push(param);
        frame.captures.push(key);
        frame.captured.insert(key, param);
        log::trace!("capture parameter {param:?} for {key:?}");
        Ok(Some(param))
    }

    /// Trailing arguments a call to `callee` passes for its captures.
    pub(crate) fn capture_arguments(
        &mut self,
        callee: DeclId,
        loc: &SourceLoc,
    ) -> Result<Vec<Expression>, TranslateError> {
        let Some(keys) = self.function_captures.get(&callee).cloned() else {
            return Ok(Vec::new());
        };
        let mut args = Vec::with_capacity(keys.len());
        for key in keys {
            let frame = self.frame(loc)?;
            if let Some(&forwarded) = frame.captured.get(&key) {
                args.push(Expression::Local(forwarded));
                continue;
            }
            args.push(match key.source {
                CaptureSource::Var(var) => self.variable_ref(var, loc)?,
                CaptureSource::Field(field) => {
                    if let Some(&redirect) = frame.member_redirects.get(&field) {
                        Expression::Local(redirect)
                    } else {
                        let owner = frame.this_type.ok_or_else(|| {
                            TranslateError::resolution("captured `this` outside of a method", loc)
                        })?;
                        let index = self.field_index(field, loc)?;
                        Expression::Field {
                            base: Box::new(self.this_expr(loc)?),
                            owner,
                            index,
                        }
                    }
                }
            });
        }
        Ok(args)
    }

    /// Position of a field within its record.
    pub(crate) fn field_index(&self, field: DeclId, loc: &SourceLoc) -> Result<u32, TranslateError> {
        let decl = self.decl(field)?;
        let record = decl
            .context
            .ok_or_else(|| TranslateError::resolution(format!("field `{}` has no owner", decl.name), loc))?;
        self.unit
            .record(record)?
            .fields
            .iter()
            .position(|&f| f == field)
            .map(|i| i as u32)
            .ok_or_else(|| {
                TranslateError::resolution(format!("field `{}` is not a member", decl.name), loc)
            })
    }
}

fn captured_type(unit: &Unit, var: DeclId) -> Result<QualType, TranslateError> {
    let decl = unit.decl(var)?;
    match decl.kind {
        DeclKind::Var(ref v) => Ok(v.ty),
        DeclKind::Param(ref p) => Ok(p.ty),
        _ => Err(TranslateError::unsupported(
            format!("capture of `{}`", decl.name),
            &decl.loc,
        )),
    }
}

#[cfg(test)]
mod tests {
    use shaderlift_ast::{BinaryOperator, BuiltinKind, UnitBuilder};

    use super::*;

    #[test]
    fn this_fields_are_unique_and_ordered() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (rec, rec_ty) = b.record(None, "Light");
        let intensity = b.field(rec, "intensity", float);
        let radius = b.field(rec, "radius", float);
        let method = b.method(rec, "eval", float);
        let (_, call, _) = b.closure(method, vec![Capture::This], float);
        let this = || Expr::this(rec_ty);
        let body = Stmt::compound([
            Stmt::Expr(Expr::member(this(), radius, float)),
            Stmt::Return(Some(Expr::binary(
                BinaryOperator::Add,
                Expr::member(this(), intensity, float),
                Expr::member(this(), radius, float),
                float,
            ))),
        ]);
        b.set_body(call, body);
        let unit = b.finish();

        let fields = accessed_this_fields(&unit, call).expect("valid");
        assert_eq!(fields, [radius, intensity]);
    }
}
