use shaderlift_ast::{DeclId, DeclKind, LoopHint, Stmt};
use shaderlift_ir::{Attribute, Block, Statement, SwitchCase};

use crate::context::Translator;
use crate::error::TranslateError;

impl Translator<'_> {
    pub(crate) fn translate_stmt(&mut self, stmt: &Stmt) -> Result<Statement, TranslateError> {
        let statement = match *stmt {
            Stmt::Compound(ref stmts) => Statement::Block(self.translate_block(stmts)?),
            Stmt::Attributed {
                ref hints,
                stmt: ref inner,
            } => {
                let mut statement = self.translate_stmt(inner)?;
                let attrs = hints.iter().filter_map(|hint| match *hint {
                    LoopHint::Unroll { enable: true } => Some(Attribute::Unroll(u32::MAX)),
                    LoopHint::Unroll { enable: false } => Some(Attribute::Loop),
                    LoopHint::UnrollCount(n) => Some(Attribute::Unroll(n)),
                    LoopHint::Other(_) => None,
                });
                match statement.loop_attrs_mut() {
                    Some(slot) => slot.extend(attrs),
                    None => log::warn!(
                        "{}: loop hints on a statement that is not a loop",
                        self.scope_loc()
                    ),
                }
                statement
            }
            Stmt::If {
                ref cond,
                ref then,
                ref otherwise,
            } => match cond.integer_constant(self.unit) {
                Some(value) => self.fold_if(value != 0, then.as_deref(), otherwise.as_deref())?,
                None => Statement::If {
                    condition: self.translate_expr(cond)?,
                    accept: self.translate_branch(then.as_deref())?,
                    reject: otherwise
                        .as_deref()
                        .map(|s| self.translate_stmt(s).map(Statement::into_block))
                        .transpose()?,
                },
            },
            Stmt::Switch { ref cond, ref body } => {
                let selector = self.translate_expr(cond)?;
                let mut cases = Vec::with_capacity(body.len());
                for arm in body {
                    match *arm {
                        Stmt::Case {
                            ref value,
                            body: ref arm_body,
                        } => cases.push(SwitchCase {
                            value: Some(self.translate_expr(value)?),
                            body: self.translate_stmt(arm_body)?.into_block(),
                        }),
                        Stmt::Default { body: ref arm_body } => cases.push(SwitchCase {
                            value: None,
                            body: self.translate_stmt(arm_body)?.into_block(),
                        }),
                        Stmt::Null => {}
                        _ => {
                            return Err(TranslateError::unsupported(
                                "statement outside of a switch case",
                                &cond.loc,
                            ));
                        }
                    }
                }
                Statement::Switch { selector, cases }
            }
            Stmt::Case { ref value, .. } => {
                return Err(TranslateError::unsupported(
                    "`case` outside of a switch",
                    &value.loc,
                ));
            }
            Stmt::Default { .. } => {
                return Err(TranslateError::unsupported(
                    "`default` outside of a switch",
                    &self.scope_loc(),
                ));
            }
            Stmt::While { ref cond, ref body } => Statement::While {
                condition: self.translate_expr(cond)?,
                body: self.translate_stmt(body)?.into_block(),
                attrs: Vec::new(),
            },
            Stmt::For {
                ref init,
                ref cond,
                ref inc,
                ref body,
            } => {
                let init = init
                    .as_deref()
                    .map(|s| self.translate_stmt(s).map(Box::new))
                    .transpose()?;
                let condition = cond.as_ref().map(|c| self.translate_expr(c)).transpose()?;
                let step = inc.as_ref().map(|e| self.translate_expr(e)).transpose()?;
                Statement::For {
                    init,
                    condition,
                    step,
                    body: self.translate_stmt(body)?.into_block(),
                    attrs: Vec::new(),
                }
            }
            Stmt::Break => Statement::Break,
            Stmt::Continue => Statement::Continue,
            Stmt::Return(ref value) => {
                Statement::Return(value.as_ref().map(|e| self.translate_expr(e)).transpose()?)
            }
            Stmt::Decl(ref ids) => self.translate_decl_stmt(ids)?,
            Stmt::Null => Statement::Block(Vec::new()),
            Stmt::Expr(ref e) => Statement::Expr(self.translate_expr(e)?),
            Stmt::Unknown { ref class } => {
                return Err(TranslateError::unsupported(
                    format!("statement `{class}`"),
                    &self.scope_loc(),
                ));
            }
        };
        Ok(statement)
    }

    fn translate_block(&mut self, stmts: &[Stmt]) -> Result<Block, TranslateError> {
        stmts.iter().map(|s| self.translate_stmt(s)).collect()
    }

    fn translate_branch(&mut self, stmt: Option<&Stmt>) -> Result<Block, TranslateError> {
        match stmt {
            Some(s) => Ok(self.translate_stmt(s)?.into_block()),
            None => Ok(Vec::new()),
        }
    }

    /// Keeps only the taken branch of an `if` with a constant condition.
    fn fold_if(
        &mut self,
        taken: bool,
        then: Option<&Stmt>,
        otherwise: Option<&Stmt>,
    ) -> Result<Statement, TranslateError> {
        let mut block = Vec::new();
        if taken {
            block.extend(self.translate_branch(then)?);
            if otherwise.is_some() {
                block.push(Statement::comment("optimized if constexpr false branch"));
            }
        } else {
            if then.is_some() {
                block.push(Statement::comment("optimized if constexpr true branch"));
            }
            block.extend(self.translate_branch(otherwise)?);
        }
        Ok(Statement::Block(block))
    }

    // -----------------------------------------------------------------------
    // Declaration statements
    // -----------------------------------------------------------------------

    fn translate_decl_stmt(&mut self, ids: &[DeclId]) -> Result<Statement, TranslateError> {
        let unit = self.unit;
        let mut locals = Vec::new();
        let mut note = None;
        for &id in ids {
            let decl = self.decl(id)?;
            match decl.kind {
                DeclKind::Var(ref var) if var.global => {
                    self.translate_global(id)?;
                    note = Some("this line is a static variable decl");
                }
                DeclKind::Var(ref var) => match unit.closure_of(var.ty.ty)? {
                    Some(closure) => {
                        if let Some(info) = unit.record(closure)?.closure.as_ref() {
                            self.translate_function(info.call_operator, &decl.loc)?;
                        }
                        note = Some("this line is a lambda decl");
                    }
                    None => locals.push(self.declare_local(id)?),
                },
                DeclKind::TypeAlias => note = Some("this line is a typedef"),
                DeclKind::StaticAssert => note = Some("this line is a static_assert"),
                DeclKind::UsingDirective => note = Some("this line is a using decl"),
                DeclKind::Record(_) => {
                    self.translate_record(id)?;
                    note = Some("this line is a type decl");
                }
                DeclKind::Enum(_) => {
                    self.translate_enum(id)?;
                    note = Some("this line is a type decl");
                }
                _ => {
                    return Err(TranslateError::unsupported(
                        format!("declaration of `{}` in a function body", decl.name),
                        &decl.loc,
                    ));
                }
            }
        }
        Ok(match locals.len() {
            0 => Statement::comment(note.unwrap_or("this line is a decl stmt with no variables")),
            1 => Statement::Declare(locals[0]),
            _ => Statement::DeclGroup(locals),
        })
    }
}
