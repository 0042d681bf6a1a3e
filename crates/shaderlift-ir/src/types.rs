//! Type system for the shader IR.

use crate::arena::Handle;
use crate::attr::Attribute;
use crate::func::Function;
use crate::global::StorageAccess;

/// The kind of a scalar type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ScalarKind {
    Bool,
    Half,
    Float,
    Int,
    UInt,
    I64,
    U64,
}

impl ScalarKind {
    /// Storage width in bytes. GPU booleans and halves occupy a full word.
    pub fn width(self) -> u32 {
        match self {
            Self::I64 | Self::U64 => 8,
            _ => 4,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::I64 | Self::U64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Half | Self::Float)
    }
}

/// Number of components in a vector, or rows/columns of a square matrix.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum VectorSize {
    Bi = 2,
    Tri = 3,
    Quad = 4,
}

impl VectorSize {
    pub fn from_count(n: u64) -> Option<Self> {
        match n {
            2 => Some(Self::Bi),
            3 => Some(Self::Tri),
            4 => Some(Self::Quad),
            _ => None,
        }
    }

    pub fn count(self) -> u32 {
        self as u32
    }
}

/// Bitflags for fixed-size arrays.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ArrayFlags(u32);

impl ArrayFlags {
    pub const NONE: Self = Self(0);
    /// The array lives in workgroup-shared memory.
    pub const SHARED: Self = Self(1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A named member of a structure.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Handle<TypeDecl>,
    pub attrs: Vec<Attribute>,
}

/// The concrete shape of a type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum TypeInner {
    Void,
    Scalar(ScalarKind),
    Vector {
        scalar: ScalarKind,
        size: VectorSize,
    },
    /// A square float matrix.
    Matrix { size: VectorSize },
    Array {
        element: Handle<TypeDecl>,
        count: u32,
        flags: ArrayFlags,
    },
    /// A user structure. Methods and constructors are owned by the type.
    Struct {
        fields: Vec<Field>,
        methods: Vec<Handle<Function>>,
        constructors: Vec<Handle<Function>>,
    },
    StructuredBuffer {
        element: Handle<TypeDecl>,
        access: StorageAccess,
    },
    ByteBuffer { access: StorageAccess },
    ConstantBuffer { element: Handle<TypeDecl> },
    Texture2D {
        element: Handle<TypeDecl>,
        access: StorageAccess,
    },
    Texture3D {
        element: Handle<TypeDecl>,
        access: StorageAccess,
    },
    Sampler,
    Accel,
    RayQuery { flags: u32 },
    BindlessArray,
}

impl TypeInner {
    /// Resource types are bound from outside the shader rather than stored.
    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            Self::StructuredBuffer { .. }
                | Self::ByteBuffer { .. }
                | Self::ConstantBuffer { .. }
                | Self::Texture2D { .. }
                | Self::Texture3D { .. }
                | Self::Sampler
                | Self::Accel
                | Self::RayQuery { .. }
                | Self::BindlessArray
        )
    }
}

/// A shader-visible type.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub inner: TypeInner,
    pub attrs: Vec<Attribute>,
    /// Size in bytes, as reported by `sizeof`.
    pub size: u32,
    /// Alignment in bytes, as reported by `alignof`.
    pub alignment: u32,
}

impl TypeDecl {
    /// Every type except a user structure is builtin.
    pub fn is_builtin(&self) -> bool {
        !matches!(self.inner, TypeInner::Struct { .. })
    }

    pub fn is_resource(&self) -> bool {
        self.inner.is_resource()
    }

    pub fn fields(&self) -> &[Field] {
        match self.inner {
            TypeInner::Struct { ref fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name == name)
    }

    pub fn methods(&self) -> &[Handle<Function>] {
        match self.inner {
            TypeInner::Struct { ref methods, .. } => methods,
            _ => &[],
        }
    }

    pub fn constructors(&self) -> &[Handle<Function>] {
        match self.inner {
            TypeInner::Struct {
                ref constructors, ..
            } => constructors,
            _ => &[],
        }
    }

    pub fn has_attr(&self, attr: Attribute) -> bool {
        self.attrs.contains(&attr)
    }
}

/// Size and alignment of a vector of `size` elements of `scalar`.
pub(crate) fn vector_layout(scalar: ScalarKind, size: VectorSize) -> (u32, u32) {
    let width = scalar.width();
    let align = match size {
        VectorSize::Bi => width * 2,
        VectorSize::Tri | VectorSize::Quad => width * 4,
    };
    let bytes = width * size.count();
    (bytes.next_multiple_of(align), align)
}

/// Rounds `offset` up to `align`, treating zero alignment as one.
pub(crate) fn align_to(offset: u32, align: u32) -> u32 {
    offset.next_multiple_of(align.max(1))
}
