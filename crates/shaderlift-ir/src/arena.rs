//! Append-only storage addressed by typed handles.
//!
//! Types, functions, globals, namespaces and intrinsics of a
//! [`Module`](crate::Module), and the variables of each function, live in
//! arenas. Nothing is ever removed, so a handle stays valid for as long as
//! its arena does.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed index into an [`Arena`].
pub struct Handle<T> {
    index: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) const fn new(index: u32) -> Self {
        Self {
            index,
            marker: PhantomData,
        }
    }

    /// Zero-based position in the owning arena.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

// Manual impls: derives would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.index);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.index)
    }
}

/// Declarations of one kind, in declaration order.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    items: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stores `value` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics once the arena holds `u32::MAX` items.
    pub fn append(&mut self, value: T) -> Handle<T> {
        let Ok(index) = u32::try_from(self.items.len()) else {
            panic!("arena holds more than u32::MAX items");
        };
        self.items.push(value);
        Handle::new(index)
    }

    /// `None` for a handle minted by another (larger) arena.
    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    /// The first handle whose value satisfies `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Handle<T>> {
        self.items
            .iter()
            .position(|v| pred(v))
            .map(|i| Handle::new(i as u32))
    }

    /// `(handle, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        (0u32..).zip(&self.items).map(|(i, v)| (Handle::new(i), v))
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        &self.items[handle.index()]
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.items[handle.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_follow_declaration_order() {
        let mut names = Arena::new();
        let light = names.append("Light");
        let camera = names.append("Camera");
        assert_eq!(names[camera], "Camera");
        assert!(light < camera);
        let order: Vec<_> = names.iter().map(|(h, &n)| (h.index(), n)).collect();
        assert_eq!(order, [(0, "Light"), (1, "Camera")]);
    }

    #[test]
    fn find_and_foreign_handles() {
        let mut small = Arena::new();
        small.append("float");
        let int = small.append("int");
        small.append("int");
        assert_eq!(small.find(|&n| n == "int"), Some(int));
        assert_eq!(small.find(|&n| n == "half"), None);
        assert_eq!(small.try_get(Handle::new(7)), None);
        assert_eq!(format!("{int:?}"), "[1]");
    }
}
