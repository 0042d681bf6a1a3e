//! Pass-wide translation state and per-function scopes.

use std::collections::{HashMap, HashSet};

use shaderlift_ast::{AttrError, AttrSet, BuiltinKind, Decl, DeclId, SourceLoc, TypeId, Unit};
use shaderlift_ir::{
    Function, GlobalVariable, Handle, Module, Namespace, Qualifier, TypeDecl, Variable,
    VariableKind,
};

use crate::error::TranslateError;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Identity of an input type in the type memo.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub(crate) enum TypeKey {
    Builtin(BuiltinKind),
    Decl(DeclId),
}

/// Translation state of one input function.
#[derive(Clone, Copy, Debug)]
pub(crate) enum FnState {
    InProgress,
    /// `None` for functions that are deliberately not emitted (implicit
    /// copies, constructors of builtin types).
    Done(Option<Handle<Function>>),
}

/// What a synthesized capture parameter stands for.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub(crate) enum CaptureSource {
    Var(DeclId),
    /// A field read through a captured `this`.
    Field(DeclId),
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub(crate) struct CaptureKey {
    pub closure: DeclId,
    pub source: CaptureSource,
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Validated attributes of every declaration, parsed once per pass.
pub(crate) struct AttrTable {
    sets: Vec<AttrSet>,
    empty: AttrSet,
}

impl AttrTable {
    pub fn parse(unit: &Unit) -> Result<Self, AttrError> {
        let sets = unit
            .decls
            .iter()
            .map(AttrSet::parse)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            sets,
            empty: AttrSet::default(),
        })
    }

    pub fn get(&self, id: DeclId) -> &AttrSet {
        self.sets.get(id.0 as usize).unwrap_or(&self.empty)
    }
}

// ---------------------------------------------------------------------------
// Function scopes
// ---------------------------------------------------------------------------

/// Scope of one function under translation.
pub(crate) struct Frame {
    pub loc: SourceLoc,
    pub function: Function,
    pub this_param: Option<Handle<Variable>>,
    pub params: Vec<Handle<Variable>>,
    pub capture_params: Vec<Handle<Variable>>,
    pub locals: HashMap<DeclId, Handle<Variable>>,
    /// Captured variables now read through a capture parameter.
    pub value_redirects: HashMap<DeclId, Handle<Variable>>,
    pub captures: Vec<CaptureKey>,
    pub captured: HashMap<CaptureKey, Handle<Variable>>,
    /// Fields of a captured `this` now read through a capture parameter.
    pub member_redirects: HashMap<DeclId, Handle<Variable>>,
    pub this_redirect: Option<Handle<Variable>>,
    pub this_type: Option<Handle<TypeDecl>>,
}

impl Frame {
    pub fn new(loc: SourceLoc, function: Function) -> Self {
        Self {
            loc,
            function,
            this_param: None,
            params: Vec::new(),
            capture_params: Vec::new(),
            locals: HashMap::new(),
            value_redirects: HashMap::new(),
            captures: Vec::new(),
            captured: HashMap::new(),
            member_redirects: HashMap::new(),
            this_redirect: None,
            this_type: None,
        }
    }

    /// Creates a parameter variable without placing it in the parameter
    /// list; the final order is fixed when the frame is closed.
    pub fn new_param(
        &mut self,
        name: impl Into<String>,
        ty: Handle<TypeDecl>,
        qualifier: Qualifier,
    ) -> Handle<Variable> {
        self.function.variables.append(Variable {
            name: name.into(),
            ty,
            qualifier,
            kind: VariableKind::Param,
            init: None,
            attrs: Vec::new(),
        })
    }

    /// Resolves an input variable visible in this scope.
    pub fn lookup(&self, var: DeclId) -> Option<Handle<Variable>> {
        self.value_redirects
            .get(&var)
            .or_else(|| self.locals.get(&var))
            .copied()
    }

    pub fn bind(&mut self, decl: &Decl, var: DeclId, handle: Handle<Variable>) -> Result<(), TranslateError> {
        if self.locals.insert(var, handle).is_some() {
            return Err(TranslateError::duplicate(
                format!("variable `{}`", decl.name),
                &decl.loc,
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pass context
// ---------------------------------------------------------------------------

/// All memoization tables and the scope stack of one translation pass.
pub(crate) struct Translator<'u> {
    pub unit: &'u Unit,
    attrs: &'u AttrTable,
    pub module: Module,
    pub types: HashMap<TypeKey, Handle<TypeDecl>>,
    pub records_in_progress: HashSet<DeclId>,
    /// Array and enum types whose element or underlying type is resolving.
    pub types_in_progress: HashSet<TypeId>,
    pub template_counter: u32,
    pub lambda_proxy: Option<Handle<TypeDecl>>,
    pub functions: HashMap<DeclId, FnState>,
    pub function_captures: HashMap<DeclId, Vec<CaptureKey>>,
    pub globals: HashMap<DeclId, Handle<GlobalVariable>>,
    pub enum_constants: HashMap<DeclId, Handle<GlobalVariable>>,
    /// Keyed by canonical namespace; `None` for ignored namespaces.
    pub namespaces: HashMap<DeclId, Option<Handle<Namespace>>>,
    pub stack: Vec<Frame>,
    pub anonymous_counter: u32,
    pub stages: Vec<DeclId>,
    pub noignore: Vec<DeclId>,
}

impl<'u> Translator<'u> {
    pub fn new(unit: &'u Unit, attrs: &'u AttrTable) -> Self {
        Self {
            unit,
            attrs,
            module: Module::new(),
            types: HashMap::new(),
            records_in_progress: HashSet::new(),
            types_in_progress: HashSet::new(),
            template_counter: 0,
            lambda_proxy: None,
            functions: HashMap::new(),
            function_captures: HashMap::new(),
            globals: HashMap::new(),
            enum_constants: HashMap::new(),
            namespaces: HashMap::new(),
            stack: Vec::new(),
            anonymous_counter: 0,
            stages: Vec::new(),
            noignore: Vec::new(),
        }
    }

    pub fn attrs(&self, id: DeclId) -> &'u AttrSet {
        self.attrs.get(id)
    }

    pub fn decl(&self, id: DeclId) -> Result<&'u Decl, TranslateError> {
        Ok(self.unit.decl(id)?)
    }

    pub fn frame(&self, loc: &SourceLoc) -> Result<&Frame, TranslateError> {
        self.stack
            .last()
            .ok_or_else(|| TranslateError::resolution("expression outside of any function", loc))
    }

    pub fn frame_mut(&mut self, loc: &SourceLoc) -> Result<&mut Frame, TranslateError> {
        self.stack
            .last_mut()
            .ok_or_else(|| TranslateError::resolution("expression outside of any function", loc))
    }

    /// Location of the function currently being translated.
    pub fn scope_loc(&self) -> SourceLoc {
        self.stack.last().map(|f| f.loc.clone()).unwrap_or_default()
    }

    /// Maps input builtin kinds onto the module's seeded scalar types.
    pub fn seed_builtins(&mut self) {
        let b = &self.module.builtins;
        let seeds = [
            (BuiltinKind::Void, b.void),
            (BuiltinKind::Bool, b.bool),
            (BuiltinKind::Float, b.float),
            (BuiltinKind::UInt, b.uint),
            (BuiltinKind::Int, b.int),
            (BuiltinKind::Double, b.float),
            (BuiltinKind::ULong, b.uint64),
            (BuiltinKind::ULongLong, b.uint64),
            (BuiltinKind::LongLong, b.int64),
        ];
        for (kind, ty) in seeds {
            self.types.insert(TypeKey::Builtin(kind), ty);
        }
    }
}

/// Replaces characters that cannot appear in identifiers.
pub(crate) fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' ' | '<' | '>' | ',' | ':' | '(' | ')' => '_',
            '*' => 'p',
            '&' => 'r',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use shaderlift_ir::FunctionKind;

    use super::*;

    #[test]
    fn sanitize_identifiers() {
        assert_eq!(sanitize("vec<float,3>"), "vec_float_3_");
        assert_eq!(sanitize("unsigned int"), "unsigned_int");
        assert_eq!(sanitize("gfx::Light *"), "gfx__Light_p");
        assert_eq!(sanitize("const T &"), "const_T_r");
    }

    #[test]
    fn frame_lookup_prefers_redirects() {
        let module = Module::new();
        let function = Function::new("main", FunctionKind::Free);
        let mut frame = Frame::new(SourceLoc::default(), function);
        let local = frame.new_param("x_0", module.builtins.float, Qualifier::None);
        let cap = frame.new_param("cap_x", module.builtins.float, Qualifier::Inout);
        frame.locals.insert(DeclId(4), local);
        assert_eq!(frame.lookup(DeclId(4)), Some(local));
        frame.value_redirects.insert(DeclId(4), cap);
        assert_eq!(frame.lookup(DeclId(4)), Some(cap));
        assert_eq!(frame.lookup(DeclId(5)), None);
        assert!(frame.params.is_empty());
    }
}
