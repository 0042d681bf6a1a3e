//! Namespace tree and the final assignment sweep.

use shaderlift_ast::DeclId;
use shaderlift_ir::{Function, FunctionKind, GlobalVariable, Handle, Namespace, TypeDecl, TypeInner};

use crate::context::{FnState, TypeKey, Translator};
use crate::error::TranslateError;

/// A translated declaration waiting for its namespace.
#[derive(Clone, Copy)]
enum Member {
    Type(Handle<TypeDecl>),
    Function(Handle<Function>),
    Global(Handle<GlobalVariable>),
}

impl Translator<'_> {
    /// Resolves a namespace, memoized by its canonical declaration so that
    /// reopened namespaces collapse into one node. Ignored namespaces
    /// resolve to `None`.
    pub(crate) fn translate_namespace(
        &mut self,
        id: DeclId,
    ) -> Result<Option<Handle<Namespace>>, TranslateError> {
        let canonical = self.unit.canonical(id)?;
        if let Some(&ns) = self.namespaces.get(&canonical) {
            return Ok(ns);
        }
        let ignored = self
            .unit
            .redeclarations(canonical)
            .into_iter()
            .any(|redecl| self.attrs(redecl).is_ignored());
        if ignored {
            self.namespaces.insert(canonical, None);
            return Ok(None);
        }

        // Placeholder so a malformed context cycle terminates.
        self.namespaces.insert(canonical, None);
        let parent = match self.unit.enclosing_namespace(canonical)? {
            Some(parent) => self.translate_namespace(parent)?,
            None => None,
        };
        let decl = self.decl(canonical)?;
        let name = if decl.name.is_empty() {
            self.anonymous_name()
        } else {
            decl.name.clone()
        };
        let ns = self
            .module
            .declare_namespace(&name, parent)
            .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        self.namespaces.insert(canonical, Some(ns));
        log::debug!("translated namespace `{name}`");
        Ok(Some(ns))
    }

    /// Attaches every translated structure, free function, global, and
    /// enum constant to the namespace its declaration lives in.
    pub(crate) fn assign_to_namespaces(&mut self) -> Result<(), TranslateError> {
        let mut members = Vec::new();
        for (&key, &ty) in &self.types {
            if let TypeKey::Decl(id) = key {
                if matches!(self.module.types[ty].inner, TypeInner::Struct { .. }) {
                    members.push((id, Member::Type(ty)));
                }
            }
        }
        for (&id, &state) in &self.functions {
            if let FnState::Done(Some(f)) = state {
                if matches!(self.module.functions[f].kind, FunctionKind::Free) {
                    members.push((id, Member::Function(f)));
                }
            }
        }
        for (&id, &g) in self.globals.iter().chain(&self.enum_constants) {
            members.push((id, Member::Global(g)));
        }
        members.sort_by_key(|&(id, _)| id);

        for (id, member) in members {
            let Some(owner) = self.unit.enclosing_namespace(id)? else {
                continue;
            };
            let Some(ns) = self.translate_namespace(owner)? else {
                continue;
            };
            let ns = &mut self.module.namespaces[ns];
            match member {
                Member::Type(ty) => ns.add_type(ty),
                Member::Function(f) => ns.add_function(f),
                Member::Global(g) => ns.add_global(g),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shaderlift_ast::{Annotation, UnitBuilder};

    use super::*;
    use crate::context::AttrTable;

    #[test]
    fn reopened_namespaces_collapse() {
        let mut b = UnitBuilder::new();
        let outer = b.namespace(None, "gfx");
        let inner = b.namespace(Some(outer), "detail");
        let again = b.reopen_namespace(outer);
        let unit = b.finish();
        let attrs = AttrTable::parse(&unit).expect("no annotations");
        let mut t = Translator::new(&unit, &attrs);

        let first = t.translate_namespace(outer).expect("valid").expect("not ignored");
        let second = t.translate_namespace(again).expect("valid").expect("not ignored");
        assert_eq!(first, second);
        let nested = t.translate_namespace(inner).expect("valid").expect("not ignored");
        assert_eq!(t.module.namespaces[nested].parent, Some(first));
        assert_eq!(t.module.namespaces[first].nested, [nested]);
        assert_eq!(t.module.namespaces.len(), 2);
    }

    #[test]
    fn ignored_namespaces_resolve_to_none() {
        let mut b = UnitBuilder::new();
        let ns = b.namespace(None, "host");
        let again = b.reopen_namespace(ns);
        b.annotate(again, Annotation::flag("ignore"));
        let unit = b.finish();
        let attrs = AttrTable::parse(&unit).expect("valid");
        let mut t = Translator::new(&unit, &attrs);
        assert_eq!(t.translate_namespace(ns).expect("valid"), None);
        assert!(t.module.namespaces.is_empty());
    }
}
