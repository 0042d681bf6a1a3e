//! Namespace-scope storage: constants, resources, and workgroup memory.

use crate::arena::Handle;
use crate::attr::Attribute;
use crate::expr::Expression;
use crate::types::TypeDecl;

/// Bitflags for buffer and texture access modes.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct StorageAccess(u32);

impl StorageAccess {
    /// No access.
    pub const EMPTY: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(2);
    pub const READ_WRITE: Self = Self(3);

    /// Returns `true` if `self` contains all flags in `other`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for StorageAccess {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for StorageAccess {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// How a global variable is stored.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum GlobalKind {
    /// Immutable value known at compile time.
    Constant,
    /// Externally bound resource (buffer, texture, sampler, ...).
    Resource,
    /// Workgroup-shared storage.
    GroupShared,
}

/// A namespace-scope variable.
#[derive(Clone, Debug)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: Handle<TypeDecl>,
    pub kind: GlobalKind,
    /// Resources never carry an initializer.
    pub init: Option<Expression>,
    pub attrs: Vec<Attribute>,
}
