//! Stage entry points.

use shaderlift_ast::{DeclId, DeclKind};
use shaderlift_ir::{Attribute, Function, Handle, ShaderStage};

use crate::context::Translator;
use crate::error::TranslateError;

impl Translator<'_> {
    /// Name an entry is emitted under: the stage override, else its own.
    pub(crate) fn entry_name(&self, id: DeclId) -> Result<&str, TranslateError> {
        let decl = self.decl(id)?;
        Ok(match self.attrs(id).stage() {
            Some((_, Some(name))) => name,
            _ => &decl.name,
        })
    }

    /// Translates a `stage`-tagged function and validates its interface.
    pub(crate) fn translate_stage_entry(
        &mut self,
        id: DeclId,
    ) -> Result<Option<Handle<Function>>, TranslateError> {
        let decl = self.decl(id)?;
        let attrs = self.attrs(id);
        let Some((stage_name, entry_name)) = attrs.stage() else {
            return Ok(None);
        };
        let stage = ShaderStage::from_name(stage_name).ok_or_else(|| {
            TranslateError::unsupported(format!("shader stage `{stage_name}`"), &decl.loc)
        })?;
        let kernel = attrs.kernel();
        if stage == ShaderStage::Compute && kernel.is_none() {
            return Err(TranslateError::contract(
                format!("compute entry `{}` has no kernel size", decl.name),
                &decl.loc,
            ));
        }

        let function = self.unit.function(id)?;
        for &param in &function.params {
            let p = self.decl(param)?;
            let DeclKind::Param(ref pd) = p.kind else {
                continue;
            };
            if self.attrs(param).builtin().is_some() {
                continue;
            }
            let stage_inout = match stage {
                ShaderStage::Compute => false,
                ShaderStage::Vertex | ShaderStage::Fragment => {
                    match self.unit.record_of(pd.ty.ty)? {
                        Some(record) => self.attrs(record).is_stage_inout(),
                        None => false,
                    }
                }
            };
            if !stage_inout {
                let allowed = match stage {
                    ShaderStage::Compute => "a builtin",
                    _ => "a builtin or a stage_inout struct",
                };
                return Err(TranslateError::contract(
                    format!(
                        "parameter `{}` of {stage_name} entry `{}` must be {allowed}",
                        p.name, decl.name
                    ),
                    &p.loc,
                ));
            }
        }

        let Some(handle) = self.translate_function_named(id, entry_name, &decl.loc)? else {
            return Ok(None);
        };
        let attrs = &mut self.module.functions[handle].attrs;
        attrs.push(Attribute::Stage(stage));
        if let (ShaderStage::Compute, Some(size)) = (stage, kernel) {
            attrs.push(Attribute::KernelSize(size));
        }
        log::debug!("entry `{}` bound to {stage:?}", decl.name);
        Ok(Some(handle))
    }
}

#[cfg(test)]
mod tests {
    use shaderlift_ast::{Annotation, AnnotationArg, BuiltinKind, Stmt, Unit, UnitBuilder};

    use super::*;
    use crate::context::AttrTable;

    fn stage(b: &mut UnitBuilder, f: DeclId, name: &str) {
        b.annotate_with(f, "stage", vec![AnnotationArg::Str(name.into())]);
    }

    fn run(unit: &Unit, f: DeclId) -> Result<Option<Handle<Function>>, TranslateError> {
        let attrs = AttrTable::parse(unit)?;
        let mut t = Translator::new(unit, &attrs);
        t.seed_builtins();
        t.translate_stage_entry(f)
    }

    #[test]
    fn compute_entries_need_a_kernel() {
        let mut b = UnitBuilder::new();
        let void = b.builtin(BuiltinKind::Void);
        let main = b.function(None, "main", void);
        b.set_body(main, Stmt::Compound(Vec::new()));
        stage(&mut b, main, "compute");
        let unit = b.finish();
        let err = run(&unit, main).expect_err("no kernel size");
        assert!(matches!(err, TranslateError::ContractViolation { .. }));
    }

    #[test]
    fn vertex_inputs_accept_stage_inout_structs() {
        let mut b = UnitBuilder::new();
        let void = b.builtin(BuiltinKind::Void);
        let float = b.builtin(BuiltinKind::Float);
        let (io, io_ty) = b.record(None, "VertexIn");
        b.field(io, "pos", float);
        b.annotate(io, Annotation::flag("stage_inout"));
        let main = b.function(None, "vs", void);
        b.param(main, "input", io_ty);
        b.set_body(main, Stmt::Compound(Vec::new()));
        b.annotate_with(
            main,
            "stage",
            vec![AnnotationArg::Str("vertex".into()), AnnotationArg::Str("vs_main".into())],
        );
        let unit = b.finish();

        let attrs = AttrTable::parse(&unit).expect("valid annotations");
        let mut t = Translator::new(&unit, &attrs);
        t.seed_builtins();
        let handle = t
            .translate_stage_entry(main)
            .expect("valid entry")
            .expect("emitted");
        let function = &t.module.functions[handle];
        assert_eq!(function.name, "vs_main");
        assert_eq!(function.attrs, [Attribute::Stage(ShaderStage::Vertex)]);
        let input = function.variables[function.params[0]].ty;
        assert!(t.module.types[input].has_attr(Attribute::StageInout));
    }

    #[test]
    fn vertex_inputs_reject_plain_values() {
        let mut b = UnitBuilder::new();
        let void = b.builtin(BuiltinKind::Void);
        let float = b.builtin(BuiltinKind::Float);
        let main = b.function(None, "vs", void);
        b.param(main, "depth", float);
        b.set_body(main, Stmt::Compound(Vec::new()));
        stage(&mut b, main, "vertex");
        let unit = b.finish();
        let err = run(&unit, main).expect_err("plain float input");
        assert!(matches!(err, TranslateError::ContractViolation { .. }));
    }
}
