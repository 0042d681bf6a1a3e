//! Namespace nesting of translated declarations.

use crate::arena::Handle;
use crate::func::Function;
use crate::global::GlobalVariable;
use crate::types::TypeDecl;

/// A namespace and the declarations assigned to it.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    pub name: String,
    pub parent: Option<Handle<Namespace>>,
    pub nested: Vec<Handle<Namespace>>,
    pub types: Vec<Handle<TypeDecl>>,
    pub functions: Vec<Handle<Function>>,
    pub globals: Vec<Handle<GlobalVariable>>,
}

impl Namespace {
    pub fn add_nested(&mut self, ns: Handle<Namespace>) {
        if !self.nested.contains(&ns) {
            self.nested.push(ns);
        }
    }

    pub fn add_type(&mut self, ty: Handle<TypeDecl>) {
        if !self.types.contains(&ty) {
            self.types.push(ty);
        }
    }

    pub fn add_function(&mut self, function: Handle<Function>) {
        if !self.functions.contains(&function) {
            self.functions.push(function);
        }
    }

    pub fn add_global(&mut self, global: Handle<GlobalVariable>) {
        if !self.globals.contains(&global) {
            self.globals.push(global);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.functions.is_empty() && self.globals.is_empty()
    }
}
