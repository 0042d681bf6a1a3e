//! Intrinsic templates and their specialization.
//!
//! An intrinsic is declared once as a template: a name, one [`Concept`] per
//! parameter, and a [`ReturnRule`]. Call sites specialize the template
//! against concrete argument types, which yields an ordinary
//! [`Function`](crate::Function) of kind
//! [`FunctionKind::Intrinsic`](crate::FunctionKind::Intrinsic) without a body.

use crate::arena::{Arena, Handle};
use crate::error::IrError;
use crate::func::{Function, FunctionKind, Qualifier};
use crate::module::{Builtins, Module};
use crate::types::{ArrayFlags, ScalarKind, TypeDecl, TypeInner, VectorSize};

/// A predicate over parameter types.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Concept {
    Vector2D,
    Vector3D,
    Vector4D,
    IntScalar,
    IntVector,
    FloatScalar,
    FloatVector,
    FloatVector2D,
    FloatVector3D,
    FloatVector4D,
    /// Any non-resource, non-void type.
    Value,
    IntFamily,
    FloatFamily,
    BoolFamily,
    Arithmetic,
    ArithmeticVector,
    Matrix,
    Buffer,
    ByteBuffer,
    StructuredBuffer,
    IntBuffer,
    IntSharedArray,
    AtomicOperable,
    Sampler,
    Texture,
    Texture2D,
    FloatTexture2D,
    FloatTexture3D,
    RayQuery,
    Accel,
}

fn is_int(kind: ScalarKind) -> bool {
    kind.is_integer()
}

fn scalar_of(types: &Arena<TypeDecl>, ty: Handle<TypeDecl>) -> Option<ScalarKind> {
    match types.try_get(ty)?.inner {
        TypeInner::Scalar(kind) => Some(kind),
        _ => None,
    }
}

impl Concept {
    /// Returns `true` if a value of type `ty` satisfies this concept.
    pub fn accepts(self, types: &Arena<TypeDecl>, ty: Handle<TypeDecl>) -> bool {
        let Some(decl) = types.try_get(ty) else {
            return false;
        };
        let inner = &decl.inner;
        let vector = |size: VectorSize| {
            matches!(*inner, TypeInner::Vector { scalar, size: s }
                if s == size && scalar != ScalarKind::Half)
        };
        let float_vector = |size: Option<VectorSize>| {
            matches!(*inner, TypeInner::Vector { scalar: ScalarKind::Float, size: s }
                if size.is_none_or(|want| want == s))
        };
        match self {
            Self::Vector2D => vector(VectorSize::Bi),
            Self::Vector3D => vector(VectorSize::Tri),
            Self::Vector4D => vector(VectorSize::Quad),
            Self::IntScalar => matches!(*inner, TypeInner::Scalar(k) if is_int(k)),
            Self::IntVector => matches!(
                *inner,
                TypeInner::Vector {
                    scalar: ScalarKind::Int | ScalarKind::UInt,
                    ..
                }
            ),
            Self::FloatScalar => matches!(*inner, TypeInner::Scalar(k) if k.is_float()),
            Self::FloatVector => float_vector(None),
            Self::FloatVector2D => float_vector(Some(VectorSize::Bi)),
            Self::FloatVector3D => float_vector(Some(VectorSize::Tri)),
            Self::FloatVector4D => float_vector(Some(VectorSize::Quad)),
            Self::Value => !decl.is_resource() && !matches!(*inner, TypeInner::Void),
            Self::IntFamily => {
                Self::IntScalar.accepts(types, ty) || Self::IntVector.accepts(types, ty)
            }
            Self::FloatFamily => {
                Self::FloatScalar.accepts(types, ty) || Self::FloatVector.accepts(types, ty)
            }
            Self::BoolFamily => matches!(
                *inner,
                TypeInner::Scalar(ScalarKind::Bool)
                    | TypeInner::Vector {
                        scalar: ScalarKind::Bool,
                        ..
                    }
            ),
            Self::Arithmetic => {
                Self::IntFamily.accepts(types, ty) || Self::FloatFamily.accepts(types, ty)
            }
            Self::ArithmeticVector => {
                Self::IntVector.accepts(types, ty) || Self::FloatVector.accepts(types, ty)
            }
            Self::Matrix => matches!(*inner, TypeInner::Matrix { .. }),
            Self::Buffer => matches!(
                *inner,
                TypeInner::StructuredBuffer { .. }
                    | TypeInner::ByteBuffer { .. }
                    | TypeInner::ConstantBuffer { .. }
            ),
            Self::ByteBuffer => matches!(*inner, TypeInner::ByteBuffer { .. }),
            Self::StructuredBuffer => matches!(*inner, TypeInner::StructuredBuffer { .. }),
            Self::IntBuffer => match *inner {
                TypeInner::StructuredBuffer { element, .. } => {
                    scalar_of(types, element).is_some_and(is_int)
                }
                _ => false,
            },
            Self::IntSharedArray => match *inner {
                TypeInner::Array { element, flags, .. } => {
                    flags.contains(ArrayFlags::SHARED)
                        && scalar_of(types, element).is_some_and(is_int)
                }
                _ => false,
            },
            Self::AtomicOperable => {
                Self::IntBuffer.accepts(types, ty) || Self::IntSharedArray.accepts(types, ty)
            }
            Self::Sampler => matches!(*inner, TypeInner::Sampler),
            Self::Texture => matches!(
                *inner,
                TypeInner::Texture2D { .. } | TypeInner::Texture3D { .. }
            ),
            Self::Texture2D => matches!(*inner, TypeInner::Texture2D { .. }),
            Self::FloatTexture2D => matches!(*inner, TypeInner::Texture2D { element, .. }
                if scalar_of(types, element) == Some(ScalarKind::Float)),
            Self::FloatTexture3D => matches!(*inner, TypeInner::Texture3D { element, .. }
                if scalar_of(types, element) == Some(ScalarKind::Float)),
            Self::RayQuery => matches!(*inner, TypeInner::RayQuery { .. }),
            Self::Accel => matches!(*inner, TypeInner::Accel),
        }
    }
}

/// How the result type of a specialization is derived.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ReturnRule {
    Fixed(Handle<TypeDecl>),
    FirstArg,
    /// `boolN` matching the dimension of the first argument, else `bool`.
    BoolVecSameDim,
    /// Element type of the buffer in the first argument.
    BufferElement,
    /// Element type of the texture in the first argument.
    TextureElement,
    /// Four-component vector of the element type of the texture in the
    /// second argument.
    Sample2D,
    /// Whatever the call site expects.
    CallSite,
}

/// A declared intrinsic awaiting specialization.
#[derive(Clone, Debug)]
pub struct IntrinsicTemplate {
    /// Name of the emitted function.
    pub name: String,
    pub params: Vec<Concept>,
    pub ret: ReturnRule,
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub(crate) struct SpecializationKey {
    template: Handle<IntrinsicTemplate>,
    args: Vec<Handle<TypeDecl>>,
    qualifiers: Vec<Qualifier>,
    call_site: Option<Handle<TypeDecl>>,
}

/// `(call-op key, emitted name, parameter concepts, return rule)`.
type Entry = (&'static str, &'static str, Vec<Concept>, ReturnRule);

/// The full intrinsic table, keyed by the name used in `callop` annotations.
pub(crate) fn intrinsic_table(b: &Builtins) -> Vec<Entry> {
    use Concept::*;
    use ReturnRule::{BoolVecSameDim, BufferElement, CallSite, FirstArg, Fixed, TextureElement};

    let mut t: Vec<Entry> = Vec::new();
    let mut add = |key, name, params: &[Concept], ret| t.push((key, name, params.to_vec(), ret));

    // Math.
    add("ABS", "abs", &[Arithmetic], FirstArg);
    add("MIN", "min", &[Arithmetic, Arithmetic], FirstArg);
    add("MAX", "max", &[Arithmetic, Arithmetic], FirstArg);
    add("CLAMP", "clamp", &[Arithmetic, Arithmetic, Arithmetic], FirstArg);
    add("LERP", "lerp", &[Arithmetic, Arithmetic, Arithmetic], FirstArg);
    add("ALL", "all", &[BoolFamily], Fixed(b.bool));
    add("ANY", "any", &[BoolFamily], Fixed(b.bool));
    for (key, name) in [
        ("CLZ", "clz"),
        ("CTZ", "ctz"),
        ("POPCOUNT", "popcount"),
        ("REVERSE", "reverse"),
    ] {
        add(key, name, &[IntFamily], FirstArg);
    }
    for (key, name) in [
        ("SIN", "sin"),
        ("SINH", "sinh"),
        ("COS", "cos"),
        ("COSH", "cosh"),
        ("ATAN", "atan"),
        ("ATANH", "atanh"),
        ("TAN", "tan"),
        ("TANH", "tanh"),
        ("ACOS", "acos"),
        ("ACOSH", "acosh"),
        ("ASIN", "asin"),
        ("ASINH", "asinh"),
        ("EXP", "exp"),
        ("EXP2", "exp2"),
        ("LOG", "log"),
        ("LOG2", "log2"),
        ("LOG10", "log10"),
        ("EXP10", "exp10"),
        ("SQRT", "sqrt"),
        ("RSQRT", "rsqrt"),
        ("CEIL", "ceil"),
        ("FLOOR", "floor"),
        ("FRACT", "fract"),
        ("TRUNC", "trunc"),
        ("ROUND", "round"),
        ("SATURATE", "saturate"),
        ("DDX", "ddx"),
        ("DDY", "ddy"),
    ] {
        add(key, name, &[FloatFamily], FirstArg);
    }
    add("LENGTH", "length", &[FloatFamily], Fixed(b.float));
    add("ISINF", "is_inf", &[FloatFamily], BoolVecSameDim);
    add("ISNAN", "is_nan", &[FloatFamily], BoolVecSameDim);
    for (key, name) in [
        ("POW", "pow"),
        ("COPYSIGN", "copysign"),
        ("ATAN2", "atan2"),
        ("STEP", "step"),
    ] {
        add(key, name, &[FloatFamily, FloatFamily], FirstArg);
    }
    add("FMA", "fma", &[FloatFamily, FloatFamily, FloatFamily], FirstArg);
    add("SMOOTHSTEP", "smoothstep", &[FloatFamily, FloatFamily, FloatFamily], FirstArg);
    add("NORMALIZE", "normalize", &[FloatVector], FirstArg);
    add("LENGTH_SQUARED", "length_squared", &[FloatVector], Fixed(b.float));
    add("DOT", "dot", &[FloatVector, FloatVector], Fixed(b.float));
    add("CROSS", "cross", &[FloatVector, FloatVector], FirstArg);
    add(
        "FACEFORWARD",
        "faceforward",
        &[FloatVector3D, FloatVector3D, FloatVector3D],
        Fixed(b.float3),
    );
    add("REFLECT", "reflect", &[FloatVector3D, FloatVector3D], Fixed(b.float3));
    add("TRANSPOSE", "transpose", &[Matrix], FirstArg);
    add("DETERMINANT", "determinant", &[Matrix], FirstArg);
    add("INVERSE", "inverse", &[Matrix], FirstArg);
    add("SELECT", "select", &[Value, Value, BoolFamily], FirstArg);

    // Buffers.
    add("BUFFER_READ", "buffer_read", &[Buffer, IntScalar], BufferElement);
    add("BUFFER_WRITE", "buffer_write", &[Buffer, IntScalar, Value], Fixed(b.void));
    add("BYTE_BUFFER_READ", "byte_buffer_read", &[ByteBuffer, IntScalar], CallSite);
    for (key, name) in [
        ("BYTE_BUFFER_LOAD", "byte_buffer_load"),
        ("BYTE_BUFFER_LOAD2", "byte_buffer_load2"),
        ("BYTE_BUFFER_LOAD3", "byte_buffer_load3"),
        ("BYTE_BUFFER_LOAD4", "byte_buffer_load4"),
    ] {
        add(key, name, &[ByteBuffer, IntScalar], Fixed(b.uint));
    }
    add(
        "BYTE_BUFFER_WRITE",
        "byte_buffer_write",
        &[ByteBuffer, IntScalar, Value],
        Fixed(b.void),
    );
    for (key, name) in [
        ("BYTE_BUFFER_STORE", "byte_buffer_store"),
        ("BYTE_BUFFER_STORE2", "byte_buffer_store2"),
        ("BYTE_BUFFER_STORE3", "byte_buffer_store3"),
        ("BYTE_BUFFER_STORE4", "byte_buffer_store4"),
    ] {
        add(key, name, &[ByteBuffer, IntScalar, IntFamily], Fixed(b.void));
    }

    // Atomics.
    for name in [
        "InterlockedExchange",
        "InterlockedAdd",
        "InterlockedAnd",
        "InterlockedOr",
        "InterlockedXor",
        "InterlockedMin",
        "InterlockedMax",
        "InterlockedCompareStore",
    ] {
        add(name, name, &[Value, Value, Value], Fixed(b.void));
    }
    add(
        "InterlockedCompareExchange",
        "InterlockedCompareExchange",
        &[Value, Value, Value, Value],
        Fixed(b.void),
    );

    // Textures.
    add("TEXTURE_READ", "texture_read", &[Texture, IntVector], TextureElement);
    add(
        "TEXTURE_WRITE",
        "texture_write",
        &[Texture, IntVector, Vector4D],
        Fixed(b.void),
    );
    add("TEXTURE_SIZE", "texture_size", &[Texture], Fixed(b.uint3));
    add(
        "SAMPLE2D",
        "sample2d",
        &[Sampler, Texture2D, FloatVector],
        ReturnRule::Sample2D,
    );

    // Ray queries.
    let rq = [RayQuery];
    add("RAY_QUERY_PROCEED", "ray_query_proceed", &rq, Fixed(b.bool));
    for (key, name, ret) in [
        ("RAY_QUERY_COMMITTED_STATUS", "ray_query_committed_status", b.uint),
        ("RAY_QUERY_COMMITTED_TRIANGLE_BARYCENTRICS", "ray_query_committed_triangle_bary", b.float2),
        ("RAY_QUERY_COMMITTED_PRIMIVE_INDEX", "ray_query_committed_primitive_index", b.uint),
        ("RAY_QUERY_COMMITTED_INSTANCE_ID", "ray_query_committed_instance_id", b.uint),
        ("RAY_QUERY_COMMITTED_PROCEDURAL_DISTANCE", "ray_query_committed_procedual_distance", b.uint),
        ("RAY_QUERY_COMMITTED_RAY_T", "ray_query_committed_ray_t", b.float),
        ("RAY_QUERY_CANDIDATE_STATUS", "ray_query_candidate_status", b.uint),
        ("RAY_QUERY_CANDIDATE_TRIANGLE_BARYCENTRICS", "ray_query_candidate_triangle_bary", b.float2),
        ("RAY_QUERY_CANDIDATE_PRIMIVE_INDEX", "ray_query_candidate_primitive_index", b.uint),
        ("RAY_QUERY_CANDIDATE_INSTANCE_ID", "ray_query_candidate_instance_id", b.uint),
        ("RAY_QUERY_CANDIDATE_PROCEDURAL_DISTANCE", "ray_query_candidate_procedual_distance", b.uint),
        ("RAY_QUERY_CANDIDATE_TRIANGLE_RAY_T", "ray_query_candidate_triangle_ray_t", b.float),
        ("RAY_QUERY_WORLD_RAY_ORIGIN", "ray_query_world_ray_origin", b.float3),
        ("RAY_QUERY_WORLD_RAY_DIRECTION", "ray_query_world_ray_direction", b.float3),
        ("RAY_QUERY_COMMIT_TRIANGLE", "ray_query_commit_triangle", b.bool),
        ("RAY_QUERY_TERMINATE", "ray_query_terminate", b.bool),
    ] {
        add(key, name, &rq, Fixed(ret));
    }
    add(
        "RAY_QUERY_TRACE_RAY_INLINE",
        "ray_query_trace_ray_inline",
        &[RayQuery, Accel, IntScalar, Value],
        Fixed(b.void),
    );
    add(
        "RAY_QUERY_COMMIT_PROCEDURAL",
        "ray_query_commit_procedural",
        &[FloatScalar],
        Fixed(b.void),
    );

    // Barriers.
    for name in [
        "AllMemoryBarrier",
        "AllMemoryBarrierWithGroupSync",
        "GroupMemoryBarrier",
        "GroupMemoryBarrierWithGroupSync",
        "DeviceMemoryBarrier",
        "DeviceMemoryBarrierWithGroupSync",
    ] {
        add(name, name, &[], Fixed(b.void));
    }

    // Wave and quad operations.
    add("QuadReadAcrossDiagonal", "QuadReadAcrossDiagonal", &[Value], FirstArg);
    add("QuadReadLaneAt", "QuadReadLaneAt", &[Value, IntScalar], FirstArg);
    add("QuadReadAcrossX", "QuadReadAcrossX", &[Value], FirstArg);
    add("QuadReadAcrossY", "QuadReadAcrossY", &[Value], FirstArg);
    add("WaveActiveAllEqual", "WaveActiveAllEqual", &[ArithmeticVector], BoolVecSameDim);
    for name in ["WaveActiveBitAnd", "WaveActiveBitOr", "WaveActiveBitXor"] {
        add(name, name, &[IntFamily], FirstArg);
    }
    add("WaveActiveCountBits", "WaveActiveCountBits", &[BoolFamily], Fixed(b.uint));
    for name in [
        "WaveActiveMax",
        "WaveActiveMin",
        "WaveActiveProduct",
        "WaveActiveSum",
        "WavePrefixProduct",
        "WavePrefixSum",
    ] {
        add(name, name, &[Arithmetic], FirstArg);
    }
    add("WaveActiveAllTrue", "WaveActiveAllTrue", &[BoolFamily], Fixed(b.bool));
    add("WaveActiveAnyTrue", "WaveActiveAnyTrue", &[BoolFamily], Fixed(b.bool));
    add("WaveActiveBallot", "WaveActiveBallot", &[BoolFamily], Fixed(b.uint4));
    add("WaveGetLaneCount", "WaveGetLaneCount", &[], Fixed(b.uint));
    add("WaveGetLaneIndex", "WaveGetLaneIndex", &[], Fixed(b.uint));
    add("WaveIsFirstLane", "WaveIsFirstLane", &[], Fixed(b.bool));
    add("WavePrefixCountBits", "WavePrefixCountBits", &[BoolFamily], Fixed(b.uint));
    add("WaveReadLaneFirst", "WaveReadLaneFirst", &[Value], CallSite);
    add("WaveReadLaneAt", "WaveReadLaneAt", &[Value, IntScalar], CallSite);

    t
}

impl Module {
    /// Looks up an intrinsic template by its call-op key.
    pub fn find_intrinsic(&self, key: &str) -> Option<Handle<IntrinsicTemplate>> {
        self.intrinsic_names.get(key).copied()
    }

    /// Specializes `template` for concrete argument types.
    ///
    /// Identical requests return the same function handle.
    pub fn specialize(
        &mut self,
        template: Handle<IntrinsicTemplate>,
        arg_types: &[Handle<TypeDecl>],
        qualifiers: &[Qualifier],
        call_site: Option<Handle<TypeDecl>>,
    ) -> Result<Handle<Function>, IrError> {
        let tmpl = self
            .intrinsics
            .try_get(template)
            .ok_or(IrError::BadHandle {
                index: template.index(),
                size: self.intrinsics.len(),
            })?
            .clone();
        let fail = |reason: String| IrError::Specialization {
            name: tmpl.name.clone(),
            reason,
        };

        if arg_types.len() != tmpl.params.len() {
            return Err(fail(format!(
                "expected {} argument(s), found {}",
                tmpl.params.len(),
                arg_types.len()
            )));
        }
        if qualifiers.len() != arg_types.len() {
            return Err(fail("qualifier count does not match arguments".into()));
        }
        for (i, (&concept, &ty)) in tmpl.params.iter().zip(arg_types).enumerate() {
            if !concept.accepts(&self.types, ty) {
                return Err(fail(format!(
                    "argument {i} of type `{}` does not satisfy {concept:?}",
                    self.type_name(ty)
                )));
            }
        }

        let key = SpecializationKey {
            template,
            args: arg_types.to_vec(),
            qualifiers: qualifiers.to_vec(),
            call_site,
        };
        if let Some(&existing) = self.specializations.get(&key) {
            log::trace!("reusing specialization of `{}`", tmpl.name);
            return Ok(existing);
        }

        let result = self
            .resolve_return(tmpl.ret, arg_types, call_site)
            .ok_or_else(|| fail(format!("cannot derive return type via {:?}", tmpl.ret)))?;

        let mut function = Function::new(tmpl.name.clone(), FunctionKind::Intrinsic { template });
        function.result = Some(result);
        for (i, (&ty, &qualifier)) in arg_types.iter().zip(qualifiers).enumerate() {
            function.add_param(format!("p{i}"), ty, qualifier);
        }
        let handle = self.functions.append(function);
        self.specializations.insert(key, handle);
        log::debug!("specialized intrinsic `{}` as {handle:?}", tmpl.name);
        Ok(handle)
    }

    fn resolve_return(
        &self,
        rule: ReturnRule,
        args: &[Handle<TypeDecl>],
        call_site: Option<Handle<TypeDecl>>,
    ) -> Option<Handle<TypeDecl>> {
        let b = &self.builtins;
        let inner = |i: usize| args.get(i).and_then(|&h| self.types.try_get(h)).map(|t| &t.inner);
        match rule {
            ReturnRule::Fixed(ty) => Some(ty),
            ReturnRule::FirstArg => args.first().copied(),
            ReturnRule::CallSite => call_site,
            ReturnRule::BoolVecSameDim => match inner(0)? {
                TypeInner::Vector { size, .. } => b.vector(ScalarKind::Bool, *size),
                _ => Some(b.bool),
            },
            ReturnRule::BufferElement => match inner(0)? {
                TypeInner::StructuredBuffer { element, .. }
                | TypeInner::ConstantBuffer { element } => Some(*element),
                _ => None,
            },
            ReturnRule::TextureElement => match inner(0)? {
                TypeInner::Texture2D { element, .. } | TypeInner::Texture3D { element, .. } => {
                    Some(*element)
                }
                _ => None,
            },
            ReturnRule::Sample2D => match inner(1)? {
                TypeInner::Texture2D { element, .. } => {
                    let kind = scalar_of(&self.types, *element)?;
                    b.vector(kind, VectorSize::Quad)
                }
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::StorageAccess;

    #[test]
    fn concepts_classify_builtins() {
        let module = Module::new();
        let b = &module.builtins;
        let types = &module.types;
        assert!(Concept::FloatFamily.accepts(types, b.float));
        assert!(Concept::FloatFamily.accepts(types, b.half));
        assert!(Concept::FloatFamily.accepts(types, b.float3));
        assert!(!Concept::FloatFamily.accepts(types, b.int));
        assert!(Concept::IntScalar.accepts(types, b.uint64));
        assert!(Concept::Vector4D.accepts(types, b.bool4));
        assert!(!Concept::Vector4D.accepts(types, b.half4));
        assert!(Concept::Matrix.accepts(types, b.float4x4));
        assert!(Concept::Value.accepts(types, b.float4x4));
        assert!(!Concept::Value.accepts(types, b.void));
    }

    #[test]
    fn every_table_entry_is_registered() {
        let module = Module::new();
        for key in ["SQRT", "BUFFER_READ", "GroupMemoryBarrierWithGroupSync", "WaveReadLaneFirst"] {
            assert!(module.find_intrinsic(key).is_some(), "missing {key}");
        }
        assert!(module.find_intrinsic("sqrt").is_none());
    }

    #[test]
    fn specialization_is_memoized() {
        let mut module = Module::new();
        let sqrt = module.find_intrinsic("SQRT").expect("SQRT registered");
        let f3 = module.builtins.float3;
        let a = module
            .specialize(sqrt, &[f3], &[Qualifier::None], None)
            .expect("float3 is a float family type");
        let b = module
            .specialize(sqrt, &[f3], &[Qualifier::None], None)
            .expect("second request");
        assert_eq!(a, b);
        let f = &module.functions[a];
        assert_eq!(f.name, "sqrt");
        assert_eq!(f.result, Some(f3));
        assert!(f.body.is_none());
        assert!(matches!(f.kind, FunctionKind::Intrinsic { template } if template == sqrt));
    }

    #[test]
    fn specialization_rejects_bad_arguments() {
        let mut module = Module::new();
        let sqrt = module.find_intrinsic("SQRT").expect("SQRT registered");
        let int = module.builtins.int;
        let err = module
            .specialize(sqrt, &[int], &[Qualifier::None], None)
            .unwrap_err();
        assert!(matches!(err, IrError::Specialization { .. }));

        let float = module.builtins.float;
        let err = module
            .specialize(sqrt, &[float, float], &[Qualifier::None; 2], None)
            .unwrap_err();
        assert!(err.to_string().contains("expected 1 argument"));
    }

    #[test]
    fn buffer_read_returns_element() {
        let mut module = Module::new();
        let float4 = module.builtins.float4;
        let uint = module.builtins.uint;
        let buf = module.structured_buffer(float4, StorageAccess::READ);
        let read = module.find_intrinsic("BUFFER_READ").expect("registered");
        let f = module
            .specialize(read, &[buf, uint], &[Qualifier::Inout, Qualifier::None], None)
            .expect("valid buffer read");
        assert_eq!(module.functions[f].result, Some(float4));
    }

    #[test]
    fn call_site_return_requires_expected_type() {
        let mut module = Module::new();
        let first = module.find_intrinsic("WaveReadLaneFirst").expect("registered");
        let int = module.builtins.int;
        assert!(module.specialize(first, &[int], &[Qualifier::None], None).is_err());
        let f = module
            .specialize(first, &[int], &[Qualifier::None], Some(int))
            .expect("call-site type supplied");
        assert_eq!(module.functions[f].result, Some(int));
    }

    #[test]
    fn is_inf_on_vectors_yields_bool_vectors() {
        let mut module = Module::new();
        let isinf = module.find_intrinsic("ISINF").expect("registered");
        let f2 = module.builtins.float2;
        let f = module
            .specialize(isinf, &[f2], &[Qualifier::None], None)
            .expect("float2 accepted");
        assert_eq!(module.functions[f].result, Some(module.builtins.bool2));
    }
}
