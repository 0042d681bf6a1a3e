//! The [`Module`] container and its builder API.

use std::collections::HashMap;

use crate::arena::{Arena, Handle};
use crate::attr::Attribute;
use crate::error::IrError;
use crate::func::{Function, FunctionKind};
use crate::global::{GlobalVariable, StorageAccess};
use crate::intrinsic::{IntrinsicTemplate, SpecializationKey, intrinsic_table};
use crate::namespace::Namespace;
use crate::types::{
    ArrayFlags, Field, ScalarKind, TypeDecl, TypeInner, VectorSize, align_to, vector_layout,
};

/// Names no user declaration may take.
pub const RESERVED_NAMES: &[&str] = &[
    "float", "int", "uint", "bool", "void", "half", "double", "int64_t", "uint64_t",
];

/// Fails with [`IrError::ReservedName`] if `name` is reserved.
pub fn check_name(name: &str) -> Result<(), IrError> {
    if RESERVED_NAMES.contains(&name) {
        return Err(IrError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Handles of the types every module is seeded with.
#[derive(Clone, Debug)]
pub struct Builtins {
    pub void: Handle<TypeDecl>,
    pub bool: Handle<TypeDecl>,
    pub bool2: Handle<TypeDecl>,
    pub bool3: Handle<TypeDecl>,
    pub bool4: Handle<TypeDecl>,
    pub half: Handle<TypeDecl>,
    pub half2: Handle<TypeDecl>,
    pub half3: Handle<TypeDecl>,
    pub half4: Handle<TypeDecl>,
    pub float: Handle<TypeDecl>,
    pub float2: Handle<TypeDecl>,
    pub float3: Handle<TypeDecl>,
    pub float4: Handle<TypeDecl>,
    pub float2x2: Handle<TypeDecl>,
    pub float3x3: Handle<TypeDecl>,
    pub float4x4: Handle<TypeDecl>,
    pub int: Handle<TypeDecl>,
    pub int2: Handle<TypeDecl>,
    pub int3: Handle<TypeDecl>,
    pub int4: Handle<TypeDecl>,
    pub uint: Handle<TypeDecl>,
    pub uint2: Handle<TypeDecl>,
    pub uint3: Handle<TypeDecl>,
    pub uint4: Handle<TypeDecl>,
    pub int64: Handle<TypeDecl>,
    pub uint64: Handle<TypeDecl>,
}

impl Builtins {
    pub fn scalar(&self, kind: ScalarKind) -> Handle<TypeDecl> {
        match kind {
            ScalarKind::Bool => self.bool,
            ScalarKind::Half => self.half,
            ScalarKind::Float => self.float,
            ScalarKind::Int => self.int,
            ScalarKind::UInt => self.uint,
            ScalarKind::I64 => self.int64,
            ScalarKind::U64 => self.uint64,
        }
    }

    /// The vector of `size` elements of `kind`. 64-bit vectors do not exist.
    pub fn vector(&self, kind: ScalarKind, size: VectorSize) -> Option<Handle<TypeDecl>> {
        let [v2, v3, v4] = match kind {
            ScalarKind::Bool => [self.bool2, self.bool3, self.bool4],
            ScalarKind::Half => [self.half2, self.half3, self.half4],
            ScalarKind::Float => [self.float2, self.float3, self.float4],
            ScalarKind::Int => [self.int2, self.int3, self.int4],
            ScalarKind::UInt => [self.uint2, self.uint3, self.uint4],
            ScalarKind::I64 | ScalarKind::U64 => return None,
        };
        Some(match size {
            VectorSize::Bi => v2,
            VectorSize::Tri => v3,
            VectorSize::Quad => v4,
        })
    }

    pub fn matrix(&self, size: VectorSize) -> Handle<TypeDecl> {
        match size {
            VectorSize::Bi => self.float2x2,
            VectorSize::Tri => self.float3x3,
            VectorSize::Quad => self.float4x4,
        }
    }
}

/// A translated shader module.
#[derive(Clone, Debug)]
pub struct Module {
    pub types: Arena<TypeDecl>,
    /// Functions, methods, constructors, and intrinsic specializations.
    pub functions: Arena<Function>,
    pub globals: Arena<GlobalVariable>,
    pub namespaces: Arena<Namespace>,
    pub intrinsics: Arena<IntrinsicTemplate>,
    pub builtins: Builtins,
    pub(crate) intrinsic_names: HashMap<&'static str, Handle<IntrinsicTemplate>>,
    interned: HashMap<TypeInner, Handle<TypeDecl>>,
    pub(crate) specializations: HashMap<SpecializationKey, Handle<Function>>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::Half => "half",
        ScalarKind::Float => "float",
        ScalarKind::Int => "int",
        ScalarKind::UInt => "uint",
        ScalarKind::I64 => "int64",
        ScalarKind::U64 => "uint64",
    }
}

fn access_suffix(access: StorageAccess) -> &'static str {
    if access.contains(StorageAccess::WRITE) {
        "rw"
    } else {
        "r"
    }
}

impl Module {
    /// Creates a module seeded with every builtin type and intrinsic template.
    pub fn new() -> Self {
        let mut types = Arena::new();
        let mut interned = HashMap::new();
        let mut seed = |name: String, inner: TypeInner, size: u32, alignment: u32| {
            let handle = types.append(TypeDecl {
                name,
                inner: inner.clone(),
                attrs: Vec::new(),
                size,
                alignment,
            });
            interned.insert(inner, handle);
            handle
        };

        let void = seed("void".into(), TypeInner::Void, 0, 1);
        let mut scalar = |kind: ScalarKind| {
            let w = kind.width();
            seed(scalar_name(kind).into(), TypeInner::Scalar(kind), w, w)
        };
        let bool = scalar(ScalarKind::Bool);
        let half = scalar(ScalarKind::Half);
        let float = scalar(ScalarKind::Float);
        let int = scalar(ScalarKind::Int);
        let uint = scalar(ScalarKind::UInt);
        let int64 = scalar(ScalarKind::I64);
        let uint64 = scalar(ScalarKind::U64);

        let mut vectors = |kind: ScalarKind| {
            [VectorSize::Bi, VectorSize::Tri, VectorSize::Quad].map(|size| {
                let (bytes, align) = vector_layout(kind, size);
                seed(
                    format!("{}{}", scalar_name(kind), size.count()),
                    TypeInner::Vector { scalar: kind, size },
                    bytes,
                    align,
                )
            })
        };
        let [bool2, bool3, bool4] = vectors(ScalarKind::Bool);
        let [half2, half3, half4] = vectors(ScalarKind::Half);
        let [float2, float3, float4] = vectors(ScalarKind::Float);
        let [int2, int3, int4] = vectors(ScalarKind::Int);
        let [uint2, uint3, uint4] = vectors(ScalarKind::UInt);

        let [float2x2, float3x3, float4x4] =
            [VectorSize::Bi, VectorSize::Tri, VectorSize::Quad].map(|size| {
                let (column, align) = vector_layout(ScalarKind::Float, size);
                let n = size.count();
                seed(
                    format!("float{n}x{n}"),
                    TypeInner::Matrix { size },
                    column * n,
                    align,
                )
            });

        let builtins = Builtins {
            void,
            bool,
            bool2,
            bool3,
            bool4,
            half,
            half2,
            half3,
            half4,
            float,
            float2,
            float3,
            float4,
            float2x2,
            float3x3,
            float4x4,
            int,
            int2,
            int3,
            int4,
            uint,
            uint2,
            uint3,
            uint4,
            int64,
            uint64,
        };

        let mut intrinsics = Arena::new();
        let mut intrinsic_names = HashMap::new();
        for (key, name, params, ret) in intrinsic_table(&builtins) {
            let handle = intrinsics.append(IntrinsicTemplate {
                name: name.to_string(),
                params,
                ret,
            });
            intrinsic_names.insert(key, handle);
        }

        Self {
            types,
            functions: Arena::new(),
            globals: Arena::new(),
            namespaces: Arena::new(),
            intrinsics,
            builtins,
            intrinsic_names,
            interned,
            specializations: HashMap::new(),
        }
    }

    /// Name of a type, or `"<invalid>"` for a foreign handle.
    pub fn type_name(&self, ty: Handle<TypeDecl>) -> &str {
        self.types.try_get(ty).map_or("<invalid>", |t| t.name.as_str())
    }

    pub fn find_type(&self, name: &str) -> Option<Handle<TypeDecl>> {
        self.types.find(|t| t.name == name)
    }

    fn get_type(&self, ty: Handle<TypeDecl>) -> Result<&TypeDecl, IrError> {
        self.types.try_get(ty).ok_or(IrError::BadHandle {
            index: ty.index(),
            size: self.types.len(),
        })
    }

    fn intern(
        &mut self,
        name: String,
        inner: TypeInner,
        size: u32,
        alignment: u32,
    ) -> Handle<TypeDecl> {
        if let Some(&existing) = self.interned.get(&inner) {
            return existing;
        }
        let handle = self.types.append(TypeDecl {
            name,
            inner: inner.clone(),
            attrs: Vec::new(),
            size,
            alignment,
        });
        self.interned.insert(inner, handle);
        handle
    }

    // ------------------------------------------------------------------
    // Structures
    // ------------------------------------------------------------------

    /// Declares an empty user structure.
    pub fn declare_struct(&mut self, name: &str) -> Result<Handle<TypeDecl>, IrError> {
        check_name(name)?;
        if self.find_type(name).is_some() {
            return Err(IrError::DuplicateType(name.to_string()));
        }
        Ok(self.types.append(TypeDecl {
            name: name.to_string(),
            inner: TypeInner::Struct {
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
            },
            attrs: Vec::new(),
            size: 0,
            alignment: 1,
        }))
    }

    /// Appends a field to a structure and returns its index.
    pub fn add_field(
        &mut self,
        owner: Handle<TypeDecl>,
        name: &str,
        ty: Handle<TypeDecl>,
        attrs: Vec<Attribute>,
    ) -> Result<u32, IrError> {
        check_name(name)?;
        let field_layout = {
            let field_ty = self.get_type(ty)?;
            (field_ty.size, field_ty.alignment)
        };
        self.get_type(owner)?;
        let decl = &mut self.types[owner];
        let TypeInner::Struct { ref mut fields, .. } = decl.inner else {
            return Err(IrError::NotAStruct(decl.name.clone()));
        };
        let index = fields.len() as u32;
        fields.push(Field {
            name: name.to_string(),
            ty,
            attrs,
        });

        // C layout: place after the unpadded end of the previous fields.
        let (size, align) = field_layout;
        let offset = align_to(decl.size, align);
        decl.alignment = decl.alignment.max(align);
        decl.size = align_to(offset + size, decl.alignment);
        Ok(index)
    }

    pub fn add_type_attr(&mut self, ty: Handle<TypeDecl>, attr: Attribute) -> Result<(), IrError> {
        self.get_type(ty)?;
        let decl = &mut self.types[ty];
        if !decl.attrs.contains(&attr) {
            decl.attrs.push(attr);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Builtin composites
    // ------------------------------------------------------------------

    pub fn array(
        &mut self,
        element: Handle<TypeDecl>,
        count: u32,
        flags: ArrayFlags,
    ) -> Result<Handle<TypeDecl>, IrError> {
        let elem = self.get_type(element)?;
        if count == 0 {
            return Err(IrError::EmptyArray(elem.name.clone()));
        }
        let stride = align_to(elem.size, elem.alignment);
        let alignment = elem.alignment;
        let name = format!("array<{},{count}>", elem.name);
        Ok(self.intern(
            name,
            TypeInner::Array {
                element,
                count,
                flags,
            },
            stride * count,
            alignment,
        ))
    }

    pub fn structured_buffer(
        &mut self,
        element: Handle<TypeDecl>,
        access: StorageAccess,
    ) -> Handle<TypeDecl> {
        let name = format!(
            "buffer_{}<{}>",
            access_suffix(access),
            self.type_name(element)
        );
        self.intern(name, TypeInner::StructuredBuffer { element, access }, 0, 1)
    }

    pub fn byte_buffer(&mut self, access: StorageAccess) -> Handle<TypeDecl> {
        let name = format!("byte_buffer_{}", access_suffix(access));
        self.intern(name, TypeInner::ByteBuffer { access }, 0, 1)
    }

    pub fn constant_buffer(&mut self, element: Handle<TypeDecl>) -> Handle<TypeDecl> {
        let name = format!("constant_buffer<{}>", self.type_name(element));
        self.intern(name, TypeInner::ConstantBuffer { element }, 0, 1)
    }

    pub fn texture2d(
        &mut self,
        element: Handle<TypeDecl>,
        access: StorageAccess,
    ) -> Handle<TypeDecl> {
        let name = format!(
            "texture2d_{}<{}>",
            access_suffix(access),
            self.type_name(element)
        );
        self.intern(name, TypeInner::Texture2D { element, access }, 0, 1)
    }

    pub fn texture3d(
        &mut self,
        element: Handle<TypeDecl>,
        access: StorageAccess,
    ) -> Handle<TypeDecl> {
        let name = format!(
            "texture3d_{}<{}>",
            access_suffix(access),
            self.type_name(element)
        );
        self.intern(name, TypeInner::Texture3D { element, access }, 0, 1)
    }

    pub fn sampler(&mut self) -> Handle<TypeDecl> {
        self.intern("sampler".into(), TypeInner::Sampler, 0, 1)
    }

    pub fn accel(&mut self) -> Handle<TypeDecl> {
        self.intern("accel".into(), TypeInner::Accel, 0, 1)
    }

    pub fn ray_query(&mut self, flags: u32) -> Handle<TypeDecl> {
        self.intern(
            format!("ray_query<{flags}>"),
            TypeInner::RayQuery { flags },
            0,
            1,
        )
    }

    pub fn bindless_array(&mut self) -> Handle<TypeDecl> {
        self.intern("bindless_array".into(), TypeInner::BindlessArray, 0, 1)
    }

    // ------------------------------------------------------------------
    // Functions, globals, namespaces
    // ------------------------------------------------------------------

    /// Adds a function. Methods and constructors are also registered on
    /// their owner.
    pub fn declare_function(&mut self, function: Function) -> Result<Handle<Function>, IrError> {
        check_name(&function.name)?;
        for &param in &function.params {
            check_name(&function.variables[param].name)?;
        }
        let owner = function.owner();
        if let Some(owner) = owner {
            let decl = self.get_type(owner)?;
            if !matches!(decl.inner, TypeInner::Struct { .. }) {
                return Err(IrError::NotAStruct(decl.name.clone()));
            }
        }
        let is_ctor = matches!(function.kind, FunctionKind::Constructor { .. });
        let handle = self.functions.append(function);
        if let Some(owner) = owner {
            if let TypeInner::Struct {
                ref mut methods,
                ref mut constructors,
                ..
            } = self.types[owner].inner
            {
                if is_ctor {
                    constructors.push(handle);
                } else {
                    methods.push(handle);
                }
            }
        }
        Ok(handle)
    }

    pub fn declare_global(
        &mut self,
        global: GlobalVariable,
    ) -> Result<Handle<GlobalVariable>, IrError> {
        check_name(&global.name)?;
        self.get_type(global.ty)?;
        Ok(self.globals.append(global))
    }

    /// Declares a namespace and nests it under `parent`.
    pub fn declare_namespace(
        &mut self,
        name: &str,
        parent: Option<Handle<Namespace>>,
    ) -> Result<Handle<Namespace>, IrError> {
        check_name(name)?;
        if let Some(p) = parent {
            if self.namespaces.try_get(p).is_none() {
                return Err(IrError::BadHandle {
                    index: p.index(),
                    size: self.namespaces.len(),
                });
            }
        }
        let handle = self.namespaces.append(Namespace {
            name: name.to_string(),
            parent,
            ..Namespace::default()
        });
        if let Some(p) = parent {
            self.namespaces[p].add_nested(handle);
        }
        Ok(handle)
    }
}
