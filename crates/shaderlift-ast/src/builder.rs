//! Programmatic construction of units.
//!
//! Front-ends normally emit JSON; [`UnitBuilder`] is the in-process way to
//! assemble the same structure, mainly for tests and tooling.

use std::collections::HashMap;

use crate::attr::{Annotation, AnnotationArg};
use crate::decl::{
    Capture, Closure, CtorInit, Decl, DeclKind, EnumDecl, FieldDecl, FunctionDecl, MethodInfo,
    OverloadedOperator, ParamDecl, RecordDecl, TemplateArg, TemplateKind, VarDecl,
};
use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::{BuiltinKind, QualType, Type, TypeKind};
use crate::unit::{DeclId, TypeId, Unit};

fn builtin_spelling(kind: BuiltinKind) -> &'static str {
    match kind {
        BuiltinKind::Void => "void",
        BuiltinKind::Bool => "bool",
        BuiltinKind::Char => "char",
        BuiltinKind::UChar => "unsigned char",
        BuiltinKind::Short => "short",
        BuiltinKind::UShort => "unsigned short",
        BuiltinKind::Int => "int",
        BuiltinKind::UInt => "unsigned int",
        BuiltinKind::Long => "long",
        BuiltinKind::ULong => "unsigned long",
        BuiltinKind::LongLong => "long long",
        BuiltinKind::ULongLong => "unsigned long long",
        BuiltinKind::Float => "float",
        BuiltinKind::Double => "double",
        BuiltinKind::NullPtr => "std::nullptr_t",
    }
}

/// Incrementally builds a [`Unit`].
///
/// Declarations are attached to their parent as they are created: namespace
/// and record members go into the parent's member list, everything without
/// a parent goes into [`Unit::root`].
#[derive(Debug, Default)]
pub struct UnitBuilder {
    unit: Unit,
    builtins: HashMap<BuiltinKind, TypeId>,
    patterns: HashMap<String, DeclId>,
    specializations: HashMap<String, TypeId>,
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Unit {
        self.unit
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.unit.decls[id.0 as usize]
    }

    pub fn spelling(&self, ty: TypeId) -> &str {
        &self.unit.types[ty.0 as usize].spelling
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    pub fn push_type(&mut self, kind: TypeKind, spelling: impl Into<String>) -> TypeId {
        let id = TypeId(self.unit.types.len() as u32);
        self.unit.types.push(Type {
            kind,
            spelling: spelling.into(),
        });
        id
    }

    pub fn builtin(&mut self, kind: BuiltinKind) -> TypeId {
        if let Some(&ty) = self.builtins.get(&kind) {
            return ty;
        }
        let ty = self.push_type(TypeKind::Builtin(kind), builtin_spelling(kind));
        self.builtins.insert(kind, ty);
        ty
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        let spelling = format!("{} *", self.spelling(pointee));
        self.push_type(TypeKind::Pointer(pointee), spelling)
    }

    pub fn constant_array(&mut self, element: TypeId, size: u64) -> TypeId {
        let spelling = format!("{}[{size}]", self.spelling(element));
        self.push_type(TypeKind::ConstantArray { element, size }, spelling)
    }

    /// A record tagged `builtin(what)`. With template arguments it is a
    /// specialization of a shared, tagged pattern.
    pub fn builtin_template(&mut self, what: &str, args: Vec<TemplateArg>) -> TypeId {
        if args.is_empty() {
            if let Some(&ty) = self.specializations.get(what) {
                return ty;
            }
            let (id, ty) = self.record_with(None, what, TemplateKind::None);
            self.annotate(id, Annotation::with_str("builtin", what));
            self.specializations.insert(what.to_string(), ty);
            return ty;
        }

        let rendered: Vec<String> = args
            .iter()
            .map(|a| match *a {
                TemplateArg::Type(t) => self.spelling(t).to_string(),
                TemplateArg::Integral(v) => v.to_string(),
            })
            .collect();
        let spelling = format!("{what}<{}>", rendered.join(","));
        if let Some(&ty) = self.specializations.get(&spelling) {
            return ty;
        }
        let pattern = match self.patterns.get(what) {
            Some(&p) => p,
            None => {
                let (p, _) = self.record_with(None, what, TemplateKind::Pattern);
                self.annotate(p, Annotation::with_str("builtin", what));
                self.patterns.insert(what.to_string(), p);
                p
            }
        };
        let (_, ty) = self.record_with(
            None,
            what,
            TemplateKind::Specialization {
                args,
                pattern: Some(pattern),
                partial: false,
            },
        );
        self.unit.types[ty.0 as usize].spelling = spelling.clone();
        self.specializations.insert(spelling, ty);
        ty
    }

    /// `vec<T, n>` of a builtin scalar.
    pub fn vector(&mut self, scalar: BuiltinKind, n: i64) -> TypeId {
        let t = self.builtin(scalar);
        self.builtin_template("vec", vec![TemplateArg::Type(t), TemplateArg::Integral(n)])
    }

    /// `buffer<T, flags>`; flags `1` is read-only.
    pub fn buffer(&mut self, element: TypeId, flags: i64) -> TypeId {
        self.builtin_template(
            "buffer",
            vec![TemplateArg::Type(element), TemplateArg::Integral(flags)],
        )
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Adds a declaration under `parent` and returns its id.
    pub fn push_decl(&mut self, parent: Option<DeclId>, mut decl: Decl) -> DeclId {
        let id = DeclId(self.unit.decls.len() as u32);
        decl.context = parent;
        let is_field = matches!(decl.kind, DeclKind::Field(_));
        let is_param = matches!(decl.kind, DeclKind::Param(_));
        self.unit.decls.push(decl);

        // Locals stay reachable only through the statements that declare them.
        match parent {
            None => self.unit.root.push(id),
            Some(p) => match self.unit.decls[p.0 as usize].kind {
                DeclKind::Namespace { ref mut decls } => decls.push(id),
                DeclKind::Record(ref mut record) if is_field => record.fields.push(id),
                DeclKind::Record(ref mut record) => record.decls.push(id),
                DeclKind::Function(ref mut function) if is_param => function.params.push(id),
                _ => {}
            },
        }
        id
    }

    pub fn annotate(&mut self, id: DeclId, annotation: Annotation) {
        self.decl_mut(id).annotations.push(annotation);
    }

    pub fn annotate_with(&mut self, id: DeclId, name: &str, args: Vec<AnnotationArg>) {
        self.annotate(id, Annotation::new(name, args));
    }

    pub fn namespace(&mut self, parent: Option<DeclId>, name: &str) -> DeclId {
        self.push_decl(parent, Decl::new(name, DeclKind::Namespace { decls: Vec::new() }))
    }

    /// Reopens `canonical` under the same parent.
    pub fn reopen_namespace(&mut self, canonical: DeclId) -> DeclId {
        let original = &self.unit.decls[canonical.0 as usize];
        let (name, parent) = (original.name.clone(), original.context);
        let id = self.namespace(parent, &name);
        self.decl_mut(id).canonical = Some(canonical);
        id
    }

    fn record_with(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        template: TemplateKind,
    ) -> (DeclId, TypeId) {
        let next = DeclId(self.unit.decls.len() as u32);
        let ty = self.push_type(TypeKind::Record(next), name);
        let id = self.push_decl(
            parent,
            Decl::new(
                name,
                DeclKind::Record(RecordDecl {
                    ty,
                    fields: Vec::new(),
                    decls: Vec::new(),
                    union: false,
                    complete: true,
                    template,
                    closure: None,
                }),
            ),
        );
        (id, ty)
    }

    pub fn record(&mut self, parent: Option<DeclId>, name: &str) -> (DeclId, TypeId) {
        self.record_with(parent, name, TemplateKind::None)
    }

    pub fn field(&mut self, record: DeclId, name: &str, ty: TypeId) -> DeclId {
        self.push_decl(
            Some(record),
            Decl::new(
                name,
                DeclKind::Field(FieldDecl {
                    ty: QualType::new(ty),
                    anonymous: false,
                }),
            ),
        )
    }

    pub fn enumeration(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        integer_type: TypeId,
        enumerators: &[(&str, i64)],
    ) -> (DeclId, TypeId) {
        let next = DeclId(self.unit.decls.len() as u32);
        let ty = self.push_type(TypeKind::Enum(next), name);
        let id = self.push_decl(
            parent,
            Decl::new(
                name,
                DeclKind::Enum(EnumDecl {
                    ty,
                    integer_type,
                    enumerators: Vec::new(),
                }),
            ),
        );
        for &(constant, value) in enumerators {
            let c = DeclId(self.unit.decls.len() as u32);
            let mut decl = Decl::new(constant, DeclKind::EnumConstant { value });
            decl.context = Some(id);
            self.unit.decls.push(decl);
            if let DeclKind::Enum(ref mut e) = self.decl_mut(id).kind {
                e.enumerators.push(c);
            }
        }
        (id, ty)
    }

    fn function_decl(result: QualType, method: Option<MethodInfo>) -> FunctionDecl {
        FunctionDecl {
            params: Vec::new(),
            result,
            body: None,
            method,
            operator: None,
            conversion: false,
            special_member: None,
            template_args: Vec::new(),
        }
    }

    pub fn function(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        result: impl Into<QualType>,
    ) -> DeclId {
        let f = Self::function_decl(result.into(), None);
        self.push_decl(parent, Decl::new(name, DeclKind::Function(f)))
    }

    pub fn method(&mut self, record: DeclId, name: &str, result: impl Into<QualType>) -> DeclId {
        let info = MethodInfo {
            parent: record,
            is_static: false,
            is_const: false,
            constructor_inits: None,
        };
        let f = Self::function_decl(result.into(), Some(info));
        self.push_decl(Some(record), Decl::new(name, DeclKind::Function(f)))
    }

    pub fn constructor(&mut self, record: DeclId, inits: Vec<CtorInit>) -> DeclId {
        let void = self.builtin(BuiltinKind::Void);
        let name = self.unit.decls[record.0 as usize].name.clone();
        let info = MethodInfo {
            parent: record,
            is_static: false,
            is_const: false,
            constructor_inits: Some(inits),
        };
        let f = Self::function_decl(QualType::new(void), Some(info));
        self.push_decl(Some(record), Decl::new(name, DeclKind::Function(f)))
    }

    /// # Panics
    ///
    /// Panics if `id` is not a function.
    pub fn function_mut(&mut self, id: DeclId) -> &mut FunctionDecl {
        match self.decl_mut(id).kind {
            DeclKind::Function(ref mut f) => f,
            ref other => panic!("{id} is not a function: {other:?}"),
        }
    }

    pub fn param(&mut self, function: DeclId, name: &str, ty: impl Into<QualType>) -> DeclId {
        let index = self
            .unit
            .decls
            .get(function.0 as usize)
            .and_then(Decl::as_function)
            .map_or(0, |f| f.params.len() as u32);
        self.push_decl(
            Some(function),
            Decl::new(
                name,
                DeclKind::Param(ParamDecl {
                    ty: ty.into(),
                    index,
                }),
            ),
        )
    }

    pub fn set_body(&mut self, function: DeclId, body: Stmt) {
        self.function_mut(function).body = Some(body);
    }

    fn var_decl(ty: QualType, init: Option<Expr>, global: bool) -> VarDecl {
        VarDecl {
            ty,
            init,
            global,
            constexpr: false,
            evaluated: None,
            template_args: Vec::new(),
        }
    }

    /// A local variable of `function`.
    pub fn local(
        &mut self,
        function: DeclId,
        name: &str,
        ty: impl Into<QualType>,
        init: Option<Expr>,
    ) -> DeclId {
        let v = Self::var_decl(ty.into(), init, false);
        self.push_decl(Some(function), Decl::new(name, DeclKind::Var(v)))
    }

    pub fn global(
        &mut self,
        parent: Option<DeclId>,
        name: &str,
        ty: impl Into<QualType>,
        init: Option<Expr>,
    ) -> DeclId {
        let v = Self::var_decl(ty.into(), init, true);
        self.push_decl(parent, Decl::new(name, DeclKind::Var(v)))
    }

    /// A closure class defined inside `function`, with its call operator.
    ///
    /// Returns `(class, call_operator, class type)`. The class is not
    /// listed among any parent's members.
    pub fn closure(
        &mut self,
        function: DeclId,
        captures: Vec<Capture>,
        result: impl Into<QualType>,
    ) -> (DeclId, DeclId, TypeId) {
        let class = DeclId(self.unit.decls.len() as u32);
        let ty = self.push_type(TypeKind::Record(class), "(lambda)");
        let mut decl = Decl::new(
            "",
            DeclKind::Record(RecordDecl {
                ty,
                fields: Vec::new(),
                decls: Vec::new(),
                union: false,
                complete: true,
                template: TemplateKind::None,
                closure: None,
            }),
        );
        decl.context = Some(function);
        decl.implicit = true;
        self.unit.decls.push(decl);

        let info = MethodInfo {
            parent: class,
            is_static: false,
            is_const: true,
            constructor_inits: None,
        };
        let mut call = Self::function_decl(result.into(), Some(info));
        call.operator = Some(OverloadedOperator::Call);
        let call_operator =
            self.push_decl(Some(class), Decl::new("operator()", DeclKind::Function(call)));

        if let DeclKind::Record(ref mut record) = self.decl_mut(class).kind {
            record.closure = Some(Closure {
                captures,
                call_operator,
            });
        }
        (class, call_operator, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_attach_to_parents() {
        let mut b = UnitBuilder::new();
        let ns = b.namespace(None, "gfx");
        let (rec, _) = b.record(Some(ns), "Light");
        let float = b.builtin(BuiltinKind::Float);
        let f = b.field(rec, "power", float);
        let m = b.method(rec, "scaled", float);
        let p = b.param(m, "k", float);
        let unit = b.finish();

        assert_eq!(unit.root, vec![ns]);
        let record = unit.record(rec).expect("record");
        assert_eq!(record.fields, vec![f]);
        assert_eq!(record.decls, vec![m]);
        assert_eq!(unit.function(m).expect("method").params, vec![p]);
        assert_eq!(unit.enclosing_namespace(f).expect("valid"), Some(ns));
    }

    #[test]
    fn builtin_templates_are_interned() {
        let mut b = UnitBuilder::new();
        let v3 = b.vector(BuiltinKind::Float, 3);
        assert_eq!(b.vector(BuiltinKind::Float, 3), v3);
        assert_ne!(b.vector(BuiltinKind::Float, 2), v3);
        assert_eq!(b.spelling(v3), "vec<float,3>");
        let unit = b.finish();
        let id = unit.record_of(v3).expect("valid").expect("record type");
        let TemplateKind::Specialization { pattern, .. } = &unit.record(id).expect("record").template
        else {
            panic!("expected a specialization");
        };
        let pattern = pattern.expect("pattern recorded");
        assert_eq!(unit.decl(pattern).expect("decl").annotations.len(), 1);
    }

    #[test]
    fn reopened_namespaces_share_a_canonical() {
        let mut b = UnitBuilder::new();
        let first = b.namespace(None, "util");
        let second = b.reopen_namespace(first);
        let unit = b.finish();
        assert_eq!(unit.canonical(second).expect("valid"), first);
        assert_eq!(unit.redeclarations(first), vec![first, second]);
    }

    #[test]
    fn closures_carry_their_call_operator() {
        let mut b = UnitBuilder::new();
        let void = b.builtin(BuiltinKind::Void);
        let f = b.function(None, "main", void);
        let (class, call, ty) = b.closure(f, vec![Capture::This], void);
        let unit = b.finish();
        assert_eq!(unit.closure_of(ty).expect("valid"), Some(class));
        let closure = unit
            .record(class)
            .expect("record")
            .closure
            .clone()
            .expect("closure");
        assert_eq!(closure.call_operator, call);
        assert_eq!(unit.root, vec![f]);
    }
}
