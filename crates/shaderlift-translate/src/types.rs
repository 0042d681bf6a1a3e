//! Type table: input types to IR type declarations.

use shaderlift_ast::{
    BuiltinKind, DeclId, DeclKind, RecordDecl, SourceLoc, TemplateArg, TemplateKind, TypeId,
    TypeKind,
};
use shaderlift_ir::{
    ArrayFlags, Attribute, Expression, Function, FunctionKind, GlobalKind, GlobalVariable, Handle,
    InterpolationMode, SemanticType, StorageAccess, TypeDecl, TypeInner, VectorSize,
};

use crate::context::{TypeKey, Translator};
use crate::error::TranslateError;

enum Resolved {
    Builtin(Handle<TypeDecl>),
    Fields(Vec<PendingField>),
}

/// One resolved field, ready to be appended to its structure.
struct PendingField {
    name: String,
    ty: Handle<TypeDecl>,
    attrs: Vec<Attribute>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl<'u> Translator<'u> {
    /// Resolves an input type, translating records and enums on first use.
    pub(crate) fn resolve_type(
        &mut self,
        ty: TypeId,
        loc: &SourceLoc,
    ) -> Result<Handle<TypeDecl>, TranslateError> {
        let unit = self.unit;
        let t = unit.ty(ty)?;
        match t.kind {
            TypeKind::Builtin(kind) => self
                .types
                .get(&TypeKey::Builtin(kind))
                .copied()
                .ok_or_else(|| TranslateError::unsupported(format!("type `{}`", t.spelling), loc)),
            TypeKind::Record(id) => self.translate_record(id)?.ok_or_else(|| {
                TranslateError::unsupported(format!("type `{}`", t.spelling), loc)
            }),
            TypeKind::Enum(id) => self.translate_enum(id),
            TypeKind::ConstantArray { element, size } => {
                let element = self.resolve_nested(ty, element, loc)?;
                let count = u32::try_from(size).map_err(|_| {
                    TranslateError::unsupported(format!("array size {size}"), loc)
                })?;
                self.module
                    .array(element, count, ArrayFlags::NONE)
                    .map_err(|e| TranslateError::ir(e, loc))
            }
            TypeKind::Pointer(_) | TypeKind::FunctionPointer | TypeKind::Other => Err(
                TranslateError::unsupported(format!("type `{}`", t.spelling), loc),
            ),
        }
    }

    /// Resolves `inner` on behalf of `outer`; a type reached again through
    /// itself is rejected.
    fn resolve_nested(
        &mut self,
        outer: TypeId,
        inner: TypeId,
        loc: &SourceLoc,
    ) -> Result<Handle<TypeDecl>, TranslateError> {
        if !self.types_in_progress.insert(outer) {
            let spelling = &self.unit.ty(outer)?.spelling;
            return Err(TranslateError::unsupported(
                format!("recursive type `{spelling}`"),
                loc,
            ));
        }
        let resolved = self.resolve_type(inner, loc);
        self.types_in_progress.remove(&outer);
        resolved
    }

    /// Whether `ty` is the input `void` type.
    fn is_void(&self, ty: TypeId) -> Result<bool, TranslateError> {
        Ok(matches!(
            self.unit.ty(ty)?.kind,
            TypeKind::Builtin(BuiltinKind::Void)
        ))
    }

    // -----------------------------------------------------------------------
    // Enums
    // -----------------------------------------------------------------------

    /// Maps an enum onto its underlying integer type and emits one global
    /// constant per enumerator.
    pub(crate) fn translate_enum(&mut self, id: DeclId) -> Result<Handle<TypeDecl>, TranslateError> {
        if let Some(&ty) = self.types.get(&TypeKey::Decl(id)) {
            return Ok(ty);
        }
        let decl = self.decl(id)?;
        let DeclKind::Enum(ref enumeration) = decl.kind else {
            return Err(TranslateError::unsupported(
                format!("enum declaration `{}`", decl.name),
                &decl.loc,
            ));
        };
        let int_ty = self.resolve_nested(enumeration.ty, enumeration.integer_type, &decl.loc)?;
        self.types.insert(TypeKey::Decl(id), int_ty);

        for &constant in &enumeration.enumerators {
            let c = self.decl(constant)?;
            let DeclKind::EnumConstant { value } = c.kind else {
                continue;
            };
            let global = self
                .module
                .declare_global(GlobalVariable {
                    name: format!("{}__{}", decl.name, c.name),
                    ty: int_ty,
                    kind: GlobalKind::Constant,
                    init: Some(Expression::int(value)),
                    attrs: Vec::new(),
                })
                .map_err(|e| TranslateError::ir(e, &c.loc))?;
            self.enum_constants.insert(constant, global);
        }
        log::debug!("translated enum `{}`", decl.name);
        Ok(int_ty)
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Translates a record. `None` means the record has no IR counterpart
    /// (ignored, union, template pattern, incomplete).
    pub(crate) fn translate_record(
        &mut self,
        id: DeclId,
    ) -> Result<Option<Handle<TypeDecl>>, TranslateError> {
        if let Some(&ty) = self.types.get(&TypeKey::Decl(id)) {
            log::trace!("type {id} already translated");
            return Ok(Some(ty));
        }
        let unit = self.unit;
        let decl = self.decl(id)?;
        let record = unit.record(id)?;

        if record.closure.is_some() {
            return self.lambda_proxy().map(Some);
        }
        if record.union || self.attrs(id).is_ignored() {
            return Ok(None);
        }
        match record.template {
            TemplateKind::Specialization { partial: true, .. } | TemplateKind::Pattern => {
                return Ok(None);
            }
            _ => {}
        }
        if !record.complete {
            return Ok(None);
        }

        if !self.records_in_progress.insert(id) {
            return Err(TranslateError::unsupported(
                format!("recursive type `{}`", decl.name),
                &decl.loc,
            ));
        }
        let resolved = self.resolve_record(id, record, &decl.loc);
        self.records_in_progress.remove(&id);
        let fields = match resolved? {
            Resolved::Builtin(ty) => {
                self.types.insert(TypeKey::Decl(id), ty);
                log::debug!("mapped `{}` onto builtin `{}`", decl.name, self.module.type_name(ty));
                return Ok(Some(ty));
            }
            Resolved::Fields(fields) => fields,
        };

        let name = match record.template {
            TemplateKind::Specialization { .. } => {
                let n = self.template_counter;
                self.template_counter += 1;
                format!("{}_{n}", decl.name)
            }
            _ if decl.name.is_empty() => self.anonymous_name(),
            _ => decl.name.clone(),
        };
        let ty = self
            .module
            .declare_struct(&name)
            .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        self.types.insert(TypeKey::Decl(id), ty);
        if self.attrs(id).is_stage_inout() {
            self.module
                .add_type_attr(ty, Attribute::StageInout)
                .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        }
        for field in fields {
            self.module
                .add_field(ty, &field.name, field.ty, field.attrs)
                .map_err(|e| TranslateError::ir(e, &decl.loc))?;
        }
        log::debug!("translated struct `{name}`");
        Ok(Some(ty))
    }

    /// Nested declarations first, then either the builtin mapping or the
    /// resolved fields.
    fn resolve_record(
        &mut self,
        id: DeclId,
        record: &RecordDecl,
        loc: &SourceLoc,
    ) -> Result<Resolved, TranslateError> {
        for &member in &record.decls {
            match self.decl(member)?.kind {
                DeclKind::Record(_) => {
                    self.translate_record(member)?;
                }
                DeclKind::Enum(_) => {
                    self.translate_enum(member)?;
                }
                _ => {}
            }
        }
        match self.builtin_tag(id, record) {
            Some(what) => self.translate_builtin(what, record, loc).map(Resolved::Builtin),
            None => self.resolve_fields(id, record).map(Resolved::Fields),
        }
    }

    fn resolve_fields(
        &mut self,
        owner: DeclId,
        record: &RecordDecl,
    ) -> Result<Vec<PendingField>, TranslateError> {
        let stage_inout = self.attrs(owner).is_stage_inout();
        let mut fields = Vec::with_capacity(record.fields.len());
        for &id in &record.fields {
            let decl = self.decl(id)?;
            let DeclKind::Field(ref field) = decl.kind else {
                continue;
            };
            if field.ty.is_reference() {
                return Err(TranslateError::unsupported(
                    format!("reference field `{}`", decl.name),
                    &decl.loc,
                ));
            }
            let ty = self.resolve_type(field.ty.ty, &decl.loc)?;

            let attrs = self.attrs(id);
            let mut ir_attrs = Vec::new();
            if let Some(what) = attrs.builtin() {
                ir_attrs.push(Attribute::Semantic(SemanticType::from_name(what)));
            }
            if let Some(mode) = attrs.interpolation() {
                if !stage_inout {
                    return Err(TranslateError::contract(
                        format!(
                            "interpolation on field `{}` is only allowed in a stage_inout struct",
                            decl.name
                        ),
                        &decl.loc,
                    ));
                }
                ir_attrs.push(Attribute::Interpolation(InterpolationMode::from_name(mode)));
            }

            let name = if decl.name.is_empty() {
                self.anonymous_name()
            } else {
                decl.name.clone()
            };
            fields.push(PendingField {
                name,
                ty,
                attrs: ir_attrs,
            });
        }
        Ok(fields)
    }

    pub(crate) fn anonymous_name(&mut self) -> String {
        let n = self.anonymous_counter;
        self.anonymous_counter += 1;
        format!("anonymous{n}")
    }

    /// The `builtin` tag of a record, its specialization pattern included.
    pub(crate) fn builtin_tag(&self, id: DeclId, record: &RecordDecl) -> Option<&'u str> {
        if let Some(what) = self.attrs(id).builtin() {
            return Some(what);
        }
        match record.template {
            TemplateKind::Specialization {
                pattern: Some(pattern),
                ..
            } => self.attrs(pattern).builtin(),
            _ => None,
        }
    }

    /// The shared structure every closure class maps to.
    pub(crate) fn lambda_proxy(&mut self) -> Result<Handle<TypeDecl>, TranslateError> {
        if let Some(ty) = self.lambda_proxy {
            return Ok(ty);
        }
        let loc = self.scope_loc();
        let ty = self
            .module
            .declare_struct("lambda_proxy")
            .map_err(|e| TranslateError::ir(e, &loc))?;
        let mut ctor = Function::new(
            "lambda_ctor",
            FunctionKind::Constructor {
                owner: ty,
                member_inits: Vec::new(),
            },
        );
        ctor.body = Some(Vec::new());
        self.module
            .declare_function(ctor)
            .map_err(|e| TranslateError::ir(e, &loc))?;
        self.lambda_proxy = Some(ty);
        Ok(ty)
    }

    // -----------------------------------------------------------------------
    // Builtin-tagged records
    // -----------------------------------------------------------------------

    fn translate_builtin(
        &mut self,
        what: &str,
        record: &RecordDecl,
        loc: &SourceLoc,
    ) -> Result<Handle<TypeDecl>, TranslateError> {
        let args: &[TemplateArg] = match record.template {
            TemplateKind::Specialization { ref args, .. } => args,
            _ => &[],
        };
        let missing = |index: usize| {
            TranslateError::unsupported(format!("builtin `{what}` without argument {index}"), loc)
        };
        let type_arg = |index: usize| match args.get(index) {
            Some(&TemplateArg::Type(ty)) => Ok(ty),
            _ => Err(missing(index)),
        };
        let int_arg = |index: usize| match args.get(index) {
            Some(&TemplateArg::Integral(v)) => Ok(v),
            _ => Err(missing(index)),
        };
        let access = |flags: i64| {
            if flags == 1 {
                StorageAccess::READ
            } else {
                StorageAccess::READ_WRITE
            }
        };

        let ty = match what {
            "vec" => {
                let element = self.resolve_type(type_arg(0)?, loc)?;
                let n = int_arg(1)?;
                let size = u64::try_from(n).ok().and_then(VectorSize::from_count);
                let vector = match (&self.module.types[element].inner, size) {
                    (&TypeInner::Scalar(kind), Some(size)) => {
                        self.module.builtins.vector(kind, size)
                    }
                    _ => None,
                };
                vector.ok_or_else(|| {
                    TranslateError::unsupported(
                        format!("vector of `{}` x {n}", self.module.type_name(element)),
                        loc,
                    )
                })?
            }
            "array" => {
                let element = self.resolve_type(type_arg(0)?, loc)?;
                let n = int_arg(1)?;
                let count = u32::try_from(n)
                    .map_err(|_| TranslateError::unsupported(format!("array size {n}"), loc))?;
                self.module
                    .array(element, count, ArrayFlags::NONE)
                    .map_err(|e| TranslateError::ir(e, loc))?
            }
            "matrix" => {
                let n = int_arg(0)?;
                let size = u64::try_from(n)
                    .ok()
                    .and_then(VectorSize::from_count)
                    .ok_or_else(|| {
                        TranslateError::unsupported(format!("matrix dimension {n}"), loc)
                    })?;
                self.module.builtins.matrix(size)
            }
            "half" => self.module.builtins.half,
            "buffer" => {
                let element = type_arg(0)?;
                let access = access(int_arg(1)?);
                if self.is_void(element)? {
                    self.module.byte_buffer(access)
                } else {
                    let element = self.resolve_type(element, loc)?;
                    self.module.structured_buffer(element, access)
                }
            }
            "constant_buffer" => {
                let element = type_arg(0)?;
                if self.is_void(element)? {
                    return Err(TranslateError::unsupported("constant buffer of `void`", loc));
                }
                let element = self.resolve_type(element, loc)?;
                self.module.constant_buffer(element)
            }
            "image" => {
                let element = self.resolve_type(type_arg(0)?, loc)?;
                let access = access(int_arg(1)?);
                self.module.texture2d(element, access)
            }
            "volume" => {
                let element = self.resolve_type(type_arg(0)?, loc)?;
                let access = access(int_arg(1)?);
                self.module.texture3d(element, access)
            }
            "sampler" => self.module.sampler(),
            "accel" => self.module.accel(),
            "ray_query" => {
                let flags = int_arg(0)?;
                let flags = u32::try_from(flags).map_err(|_| {
                    TranslateError::unsupported(format!("ray query flags {flags}"), loc)
                })?;
                self.module.ray_query(flags)
            }
            "bindless_array" => self.module.bindless_array(),
            other => {
                return Err(TranslateError::unsupported(
                    format!("builtin type `{other}`"),
                    loc,
                ));
            }
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use shaderlift_ast::{Annotation, AnnotationArg, QualType, UnitBuilder};
    use shaderlift_ir::ScalarKind;

    use super::*;
    use crate::context::AttrTable;

    fn with_translator<R>(
        unit: &shaderlift_ast::Unit,
        f: impl FnOnce(&mut Translator<'_>) -> R,
    ) -> R {
        let attrs = AttrTable::parse(unit).expect("valid annotations");
        let mut t = Translator::new(unit, &attrs);
        t.seed_builtins();
        f(&mut t)
    }

    #[test]
    fn builtin_templates_map_onto_seeded_types() {
        let mut b = UnitBuilder::new();
        let v3 = b.vector(BuiltinKind::Float, 3);
        let u2 = b.vector(BuiltinKind::UInt, 2);
        let v5 = b.vector(BuiltinKind::Float, 5);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            let float3 = t.resolve_type(v3, &loc).expect("float3");
            assert_eq!(float3, t.module.builtins.float3);
            assert_eq!(t.resolve_type(v3, &loc).expect("memoized"), float3);
            assert_eq!(t.resolve_type(u2, &loc).expect("uint2"), t.module.builtins.uint2);
            let err = t.resolve_type(v5, &loc).unwrap_err();
            assert!(matches!(err, TranslateError::Unsupported { .. }), "{err}");
        });
    }

    #[test]
    fn buffers_pick_access_and_element() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let void = b.builtin(BuiltinKind::Void);
        let ro = b.buffer(float, 1);
        let rw = b.buffer(float, 0);
        let bytes = b.buffer(void, 0);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            let ro = t.resolve_type(ro, &loc).expect("read-only buffer");
            let rw = t.resolve_type(rw, &loc).expect("read-write buffer");
            let bytes = t.resolve_type(bytes, &loc).expect("byte buffer");
            assert!(matches!(
                t.module.types[ro].inner,
                TypeInner::StructuredBuffer { access: StorageAccess::READ, .. }
            ));
            assert!(matches!(
                t.module.types[rw].inner,
                TypeInner::StructuredBuffer { access: StorageAccess::READ_WRITE, .. }
            ));
            assert!(matches!(t.module.types[bytes].inner, TypeInner::ByteBuffer { .. }));
        });
    }

    #[test]
    fn nested_records_resolve_before_their_owner() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (outer, outer_ty) = b.record(None, "Particle");
        let (inner, inner_ty) = b.record(Some(outer), "State");
        b.field(inner, "mass", float);
        b.field(outer, "state", inner_ty);
        let arr = b.constant_array(float, 4);
        b.field(outer, "weights", arr);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            let particle = t.resolve_type(outer_ty, &loc).expect("struct");
            let state = t.types[&TypeKey::Decl(inner)];
            assert!(state < particle);
            let fields = t.module.types[particle].fields();
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].ty, state);
            assert_eq!(t.module.type_name(fields[1].ty), "array<float,4>");
        });
    }

    #[test]
    fn enum_constants_become_globals() {
        let mut b = UnitBuilder::new();
        let int = b.builtin(BuiltinKind::Int);
        let (color, color_ty) = b.enumeration(None, "Color", int, &[("Red", 0), ("Green", 1)]);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let ty = t.resolve_type(color_ty, &SourceLoc::default()).expect("enum");
            assert_eq!(ty, t.module.builtins.scalar(ScalarKind::Int));
            assert_eq!(t.types[&TypeKey::Decl(color)], ty);
            let names: Vec<_> = t.module.globals.iter().map(|(_, g)| g.name.clone()).collect();
            assert_eq!(names, ["Color__Red", "Color__Green"]);
        });
    }

    #[test]
    fn interpolation_requires_stage_inout() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (rec, ty) = b.record(None, "Varyings");
        let uv = b.field(rec, "uv", float);
        b.annotate(uv, Annotation::with_str("interpolation", "linear"));
        let unit = b.finish();
        with_translator(&unit, |t| {
            let err = t.resolve_type(ty, &SourceLoc::default()).unwrap_err();
            assert!(matches!(err, TranslateError::ContractViolation { .. }), "{err}");
        });

        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (rec, ty) = b.record(None, "Varyings");
        b.annotate(rec, Annotation::flag("stage_inout"));
        let uv = b.field(rec, "uv", float);
        b.annotate(uv, Annotation::with_str("interpolation", "linear"));
        let unit = b.finish();
        with_translator(&unit, |t| {
            let ty = t.resolve_type(ty, &SourceLoc::default()).expect("stage_inout struct");
            let decl = &t.module.types[ty];
            assert!(decl.has_attr(Attribute::StageInout));
            assert_eq!(
                decl.fields()[0].attrs,
                [Attribute::Interpolation(InterpolationMode::Linear)]
            );
        });
    }

    #[test]
    fn self_referencing_types_are_rejected() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let ring = TypeId(b.unit().types.len() as u32);
        b.push_type(TypeKind::ConstantArray { element: ring, size: 2 }, "Ring[2]");
        let (looped, looped_ty) = b.enumeration(None, "Looped", float, &[("Once", 0)]);
        if let DeclKind::Enum(ref mut e) = b.decl_mut(looped).kind {
            e.integer_type = looped_ty;
        }
        let pair = b.constant_array(float, 2);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            for ty in [ring, looped_ty] {
                let err = t.resolve_type(ty, &loc).unwrap_err();
                assert!(matches!(err, TranslateError::Unsupported { .. }), "{err}");
                assert!(err.to_string().contains("recursive type"), "{err}");
            }
            assert!(t.types_in_progress.is_empty());
            let pair = t.resolve_type(pair, &loc).expect("plain array");
            assert_eq!(t.module.type_name(pair), "array<float,2>");
            assert!(t.module.globals.is_empty());
        });
    }

    #[test]
    fn reference_fields_are_rejected() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (rec, ty) = b.record(None, "Holder");
        let f = b.field(rec, "value", float);
        if let DeclKind::Field(ref mut field) = b.decl_mut(f).kind {
            field.ty = QualType::new(float).lvalue_ref();
        }
        let ptr = b.pointer(float);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            assert!(matches!(
                t.resolve_type(ty, &loc),
                Err(TranslateError::Unsupported { .. })
            ));
            assert!(matches!(
                t.resolve_type(ptr, &loc),
                Err(TranslateError::Unsupported { .. })
            ));
        });
    }

    #[test]
    fn template_specializations_are_numbered() {
        let mut b = UnitBuilder::new();
        let float = b.builtin(BuiltinKind::Float);
        let (rec, ty) = b.record(None, "Pair");
        b.field(rec, "first", float);
        if let DeclKind::Record(ref mut r) = b.decl_mut(rec).kind {
            r.template = TemplateKind::Specialization {
                args: vec![TemplateArg::Type(float)],
                pattern: None,
                partial: false,
            };
        }
        let (img, _) = b.record(None, "Image");
        b.annotate_with(img, "builtin", vec![AnnotationArg::Str("image".into())]);
        let unit = b.finish();
        with_translator(&unit, |t| {
            let loc = SourceLoc::default();
            let pair = t.resolve_type(ty, &loc).expect("specialization");
            assert_eq!(t.module.type_name(pair), "Pair_0");
            let err = t.translate_record(img).unwrap_err();
            assert!(err.to_string().contains("builtin `image` without argument 0"), "{err}");
        });
    }
}
