//! Function table: functions, methods, and constructors.

use shaderlift_ast::{
    CtorInit, Decl, DeclId, DeclKind, FunctionDecl, OverloadedOperator, QualType, RefKind, SourceLoc,
    TemplateArg, TemplateKind,
};
use shaderlift_ir::{
    Attribute, Function, FunctionKind, Handle, Qualifier, SemanticType, TypeDecl,
    Variable, VariableKind,
};

use crate::context::{FnState, Frame, Translator, sanitize};
use crate::error::TranslateError;

/// How an input function is represented in the IR.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Shape {
    Free,
    /// A non-static method lowered to a free function with a leading
    /// `_this` parameter.
    FreeWithThis,
    Method,
    Constructor,
}

/// Canonical names of the overloadable operators the IR accepts.
fn operator_name(op: OverloadedOperator) -> Option<&'static str> {
    use OverloadedOperator::*;
    Some(match op {
        Plus => "operator_plus",
        Minus => "operator_minus",
        Star => "operator_multiply",
        Slash => "operator_divide",
        PlusEqual => "operator_plus_assign",
        MinusEqual => "operator_minus_assign",
        StarEqual => "operator_multiply_assign",
        SlashEqual => "operator_divide_assign",
        EqualEqual => "operator_equal",
        ExclaimEqual => "operator_not_equal",
        Less => "operator_less",
        Greater => "operator_greater",
        LessEqual => "operator_less_equal",
        GreaterEqual => "operator_greater_equal",
        Subscript => "operator_subscript",
        Call => "operator_call",
        Pipe => "operator_pipe",
        PipeEqual => "operator_pipe_equal",
        Amp => "operator_amp",
        AmpEqual => "operator_amp_assign",
        _ => return None,
    })
}

/// `const&` parameters are read-only, other lvalue references are
/// read-write, and everything else is passed by value.
pub(crate) fn param_qualifier(ty: &QualType) -> Qualifier {
    match ty.reference {
        RefKind::LValue if ty.is_const => Qualifier::Const,
        RefKind::LValue => Qualifier::Inout,
        RefKind::None | RefKind::RValue => Qualifier::None,
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

impl<'u> Translator<'u> {
    /// Whether a record is mapped onto a builtin type rather than a struct.
    pub(crate) fn is_builtin_record(&self, id: DeclId) -> Result<bool, TranslateError> {
        let record = self.unit.record(id)?;
        Ok(self.builtin_tag(id, record).is_some())
    }

    pub(crate) fn shape_of(&self, function: &FunctionDecl) -> Result<Shape, TranslateError> {
        let Some(ref method) = function.method else {
            return Ok(Shape::Free);
        };
        if method.constructor_inits.is_some() {
            return Ok(Shape::Constructor);
        }
        if method.is_static {
            return Ok(Shape::Free);
        }
        let closure = self.unit.record(method.parent)?.closure.is_some();
        if closure || self.is_builtin_record(method.parent)? {
            Ok(Shape::FreeWithThis)
        } else {
            Ok(Shape::Method)
        }
    }

    /// `_`-joined, sanitized template arguments.
    pub(crate) fn template_suffix(&self, args: &[TemplateArg]) -> Result<String, TranslateError> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(match *arg {
                TemplateArg::Type(ty) => sanitize(&self.unit.ty(ty)?.spelling),
                TemplateArg::Integral(v) => sanitize(&v.to_string()),
            });
        }
        Ok(parts.join("_"))
    }

    fn function_name(
        &self,
        decl: &Decl,
        function: &FunctionDecl,
        entry_name: Option<&str>,
    ) -> Result<String, TranslateError> {
        if let Some(name) = entry_name {
            return Ok(name.to_string());
        }
        if function.is_constructor() {
            return Ok("ctor".into());
        }
        if let Some(op) = function.operator {
            return operator_name(op).map(str::to_string).ok_or_else(|| {
                TranslateError::unsupported(format!("operator `{}`", decl.name), &decl.loc)
            });
        }
        if function.conversion {
            let target = &self.unit.ty(function.result.ty)?.spelling;
            return Ok(format!("cast_to_{}", sanitize(target)));
        }

        let mut args: &[TemplateArg] = &function.template_args;
        if args.is_empty() {
            if let Some(parent) = function.parent() {
                if let TemplateKind::Specialization { args: ref owner_args, .. } =
                    self.unit.record(parent)?.template
                {
                    args = owner_args;
                }
            }
        }
        if args.is_empty() {
            Ok(decl.name.clone())
        } else {
            Ok(format!("{}_{}", decl.name, self.template_suffix(args)?))
        }
    }

    pub(crate) fn translate_function(
        &mut self,
        id: DeclId,
        site: &SourceLoc,
    ) -> Result<Option<Handle<Function>>, TranslateError> {
        self.translate_function_named(id, None, site)
    }

    /// Translates a function once. `site` is where translation was
    /// requested from and locates recursion errors.
    pub(crate) fn translate_function_named(
        &mut self,
        id: DeclId,
        entry_name: Option<&str>,
        site: &SourceLoc,
    ) -> Result<Option<Handle<Function>>, TranslateError> {
        let decl = self.decl(id)?;
        match self.functions.get(&id) {
            Some(&FnState::Done(handle)) => {
                log::trace!("function `{}` already translated", decl.name);
                return Ok(handle);
            }
            Some(FnState::InProgress) => {
                return Err(TranslateError::RecursiveCall {
                    name: decl.name.clone(),
                    loc: site.clone(),
                });
            }
            None => {}
        }

        let unit = self.unit;
        let function = unit.function(id)?;
        let shape = self.shape_of(function)?;
        let skip = decl.implicit
            || self.attrs(id).is_ignored()
            || match function.parent() {
                Some(parent) if shape == Shape::Constructor => self.is_builtin_record(parent)?,
                _ => false,
            };
        if skip {
            self.functions.insert(id, FnState::Done(None));
            return Ok(None);
        }

        let owner = match function.parent() {
            Some(parent) if shape != Shape::Free => Some(
                self.translate_record(parent)?.ok_or_else(|| {
                    TranslateError::unsupported(
                        format!("member `{}` of an untranslatable type", decl.name),
                        &decl.loc,
                    )
                })?,
            ),
            _ => None,
        };
        let kind = match (shape, owner) {
            (Shape::Method, Some(owner)) => FunctionKind::Method { owner },
            (Shape::Constructor, Some(owner)) => FunctionKind::Constructor {
                owner,
                member_inits: Vec::new(),
            },
            _ => FunctionKind::Free,
        };
        let name = self.function_name(decl, function, entry_name)?;

        self.functions.insert(id, FnState::InProgress);
        self.stack
            .push(Frame::new(decl.loc.clone(), Function::new(name, kind)));
        let filled = self.fill_function(decl, function, shape, owner);
        let frame = self.stack.pop();
        filled?;
        let Some(frame) = frame else {
            return Err(TranslateError::resolution(
                "translation scope stack underflow",
                &decl.loc,
            ));
        };

        let mut ir = frame.function;
        ir.params = frame
            .this_param
            .into_iter()
            .chain(frame.params)
            .chain(frame.capture_params)
            .collect();
        let handle = self
            .module
            .declare_function(ir)
            .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        self.functions.insert(id, FnState::Done(Some(handle)));
        self.function_captures.insert(id, frame.captures);
        log::debug!("translated function `{}` as {handle:?}", decl.name);
        Ok(Some(handle))
    }

    /// Populates the open frame: receiver, result, parameters, captures,
    /// body, and constructor initializers.
    fn fill_function(
        &mut self,
        decl: &Decl,
        function: &FunctionDecl,
        shape: Shape,
        owner: Option<Handle<TypeDecl>>,
    ) -> Result<(), TranslateError> {
        let loc = &decl.loc;
        match (shape, owner) {
            (Shape::FreeWithThis, Some(owner)) => {
                let is_const = function.method.as_ref().is_some_and(|m| m.is_const);
                let qualifier = if is_const {
                    Qualifier::Const
                } else {
                    Qualifier::Inout
                };
                let frame = self.frame_mut(loc)?;
                let this = frame.new_param("_this", owner, qualifier);
                frame.this_param = Some(this);
                frame.this_redirect = Some(this);
                frame.this_type = Some(owner);
            }
            (Shape::Method | Shape::Constructor, Some(owner)) => {
                self.frame_mut(loc)?.this_type = Some(owner);
            }
            _ => {}
        }

        if shape != Shape::Constructor {
            let result = self.resolve_type(function.result.ty, loc)?;
            self.frame_mut(loc)?.function.result = Some(result);
        }

        self.translate_params(function)?;

        if let Some(parent) = function.parent() {
            if self.unit.record(parent)?.closure.is_some() {
                self.lower_captures(parent, true, loc)?;
            }
        }

        let body = match function.body {
            Some(ref body) => Some(self.translate_stmt(body)?.into_block()),
            None if shape == Shape::Constructor => Some(Vec::new()),
            None => None,
        };
        self.frame_mut(loc)?.function.body = body;

        if let Some(inits) = function
            .method
            .as_ref()
            .and_then(|m| m.constructor_inits.as_ref())
        {
            self.translate_ctor_inits(function, inits, loc)?;
        }
        Ok(())
    }

    fn translate_params(&mut self, function: &FunctionDecl) -> Result<(), TranslateError> {
        for &id in &function.params {
            let decl = self.decl(id)?;
            let DeclKind::Param(ref param) = decl.kind else {
                return Err(TranslateError::unsupported(
                    format!("parameter declaration `{}`", decl.name),
                    &decl.loc,
                ));
            };
            let ty = self.resolve_type(param.ty.ty, &decl.loc)?;
            let qualifier = param_qualifier(&param.ty);
            let name = if decl.name.is_empty() {
                format!("param_{}", param.index)
            } else {
                format!("{}_{}", decl.name, param.index)
            };
            let semantic = self.attrs(id).builtin();

            let frame = self.frame_mut(&decl.loc)?;
            let handle = frame.new_param(name, ty, qualifier);
            if let Some(what) = semantic {
                frame.function.variables[handle]
                    .attrs
                    .push(Attribute::Semantic(SemanticType::from_name(what)));
            }
            frame.params.push(handle);
            frame.bind(decl, id, handle)?;

            if let Some(closure) = self.unit.closure_of(param.ty.ty)? {
                self.lower_captures(closure, false, &decl.loc)?;
            }
        }
        Ok(())
    }

    fn translate_ctor_inits(
        &mut self,
        function: &FunctionDecl,
        inits: &[CtorInit],
        loc: &SourceLoc,
    ) -> Result<(), TranslateError> {
        let Some(parent) = function.parent() else {
            return Ok(());
        };
        let unit = self.unit;
        let record = unit.record(parent)?;
        let mut member_inits = Vec::with_capacity(inits.len());
        for init in inits {
            match *init {
                CtorInit::Field { field, init: ref value } => {
                    let index = record
                        .fields
                        .iter()
                        .position(|&f| f == field)
                        .ok_or_else(|| {
                            TranslateError::resolution(
                                format!("initialized field {field} is not a member"),
                                loc,
                            )
                        })?;
                    let value = self.translate_expr(value)?;
                    member_inits.push((index as u32, value));
                }
                CtorInit::Base { .. } => {
                    return Err(TranslateError::unsupported("base class initializer", loc));
                }
            }
        }
        if let FunctionKind::Constructor {
            member_inits: ref mut slot,
            ..
        } = self.frame_mut(loc)?.function.kind
        {
            *slot = member_inits;
        }
        Ok(())
    }

    /// Declares a local variable in the open frame.
    pub(crate) fn declare_local(&mut self, id: DeclId) -> Result<Handle<Variable>, TranslateError> {
        let decl = self.decl(id)?;
        let DeclKind::Var(ref var) = decl.kind else {
            return Err(TranslateError::unsupported(
                format!("local declaration `{}`", decl.name),
                &decl.loc,
            ));
        };
        if var.ty.is_reference() {
            return Err(TranslateError::unsupported(
                format!("reference variable `{}`", decl.name),
                &decl.loc,
            ));
        }
        let ty = self.resolve_type(var.ty.ty, &decl.loc)?;
        let init = var
            .init
            .as_ref()
            .map(|e| self.translate_expr(e))
            .transpose()?;
        let name = if decl.name.is_empty() {
            self.anonymous_name()
        } else {
            decl.name.clone()
        };
        let frame = self.frame_mut(&decl.loc)?;
        let handle = frame.function.variables.append(Variable {
            name,
            ty,
            qualifier: if var.ty.is_const {
                Qualifier::Const
            } else {
                Qualifier::None
            },
            kind: VariableKind::Local,
            init,
            attrs: Vec::new(),
        });
        frame.bind(decl, id, handle)?;
        Ok(handle)
    }
}
