//! The pass driver.

use std::collections::HashSet;

use shaderlift_ast::{BuiltinKind, DeclId, DeclKind, TemplateKind, TypeKind, Unit};
use shaderlift_ir::Module;

use crate::context::{AttrTable, Translator};
use crate::error::TranslateError;

/// Options for one translation pass.
#[derive(Clone, Debug, Default)]
pub struct TranslateOptions {
    /// When non-empty, only stage entries with one of these names (source
    /// name or stage override) are translated.
    pub entries: Vec<String>,
}

impl TranslateOptions {
    fn wants(&self, names: [&str; 2]) -> bool {
        self.entries.is_empty() || self.entries.iter().any(|e| names.contains(&e.as_str()))
    }
}

/// Translates a whole unit into a fresh module.
///
/// The first error stops the pass.
pub fn translate(unit: &Unit, options: &TranslateOptions) -> Result<Module, TranslateError> {
    let attrs = AttrTable::parse(unit)?;
    let mut t = Translator::new(unit, &attrs);
    t.seed_builtins();

    let mut seen = HashSet::new();
    for &id in &unit.root {
        t.walk_decl(id, &mut seen)?;
    }

    let stages = std::mem::take(&mut t.stages);
    for id in stages {
        let names = [unit.decl(id)?.name.as_str(), t.entry_name(id)?];
        if !options.wants(names) {
            log::debug!("skipping entry `{}`", names[0]);
            continue;
        }
        t.translate_stage_entry(id)?;
    }
    let forced = std::mem::take(&mut t.noignore);
    for id in forced {
        let loc = unit.decl(id)?.loc.clone();
        t.translate_function(id, &loc)?;
    }

    t.assign_to_namespaces()?;
    Ok(t.module)
}

impl Translator<'_> {
    /// Pre-order walk over namespaces, records, and their members.
    fn walk_decl(&mut self, id: DeclId, seen: &mut HashSet<DeclId>) -> Result<(), TranslateError> {
        let unit = self.unit;
        let decl = self.decl(id)?;
        if decl.implicit || !seen.insert(id) {
            return Ok(());
        }
        let attrs = self.attrs(id);
        if attrs.is_dump() {
            log::debug!("{}: {decl:#?}", decl.loc);
        }

        match decl.kind {
            DeclKind::Namespace { ref decls } => {
                if self.translate_namespace(id)?.is_none() {
                    return Ok(());
                }
                for &member in decls {
                    self.walk_decl(member, seen)?;
                }
            }
            DeclKind::Record(ref record) => {
                if record.closure.is_some() {
                    return Ok(());
                }
                for &field in &record.fields {
                    let f = self.decl(field)?;
                    if let DeclKind::Field(ref fd) = f.kind {
                        if matches!(unit.ty(fd.ty.ty)?.kind, TypeKind::Builtin(BuiltinKind::Double))
                        {
                            return Err(TranslateError::unsupported(
                                format!("double field `{}`", f.name),
                                &f.loc,
                            ));
                        }
                    }
                }
                self.translate_record(id)?;
                if attrs.is_ignored() || record.template == TemplateKind::Pattern {
                    return Ok(());
                }
                for &member in &record.decls {
                    self.walk_decl(member, seen)?;
                }
            }
            DeclKind::Enum(_) => {
                self.translate_enum(id)?;
            }
            DeclKind::Function(_) => {
                if attrs.stage().is_some() {
                    self.stages.push(id);
                } else if attrs.is_noignore() {
                    self.noignore.push(id);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
