//! IndexVec - A vector indexed by a specific type.
//!
//! This module provides [`IndexVec`], a typed vector that uses a custom index
//! type instead of `usize`. Every arena in the compiler is an `IndexVec`:
//! the index type prevents mixing up indices from different arenas.
//!
//! # Example
//!
//! ```
//! use coltc_util::index_vec::{IndexVec, Idx};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! struct InstId(u32);
//!
//! impl Idx for InstId {
//!     fn from_usize(idx: usize) -> Self { InstId(idx as u32) }
//!     fn index(self) -> usize { self.0 as usize }
//! }
//!
//! let mut insts: IndexVec<InstId, i32> = IndexVec::new();
//! let id = insts.push(42);
//! assert_eq!(insts[id], 42);
//! ```

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for types that can be used as indices into an [`IndexVec`].
///
/// The type must be convertible to and from `usize`. Implementations may
/// panic in `from_usize` when the value does not fit the index type.
pub trait Idx: Copy + Eq + PartialEq {
    /// Convert from usize to the index type.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `idx` is too large to represent.
    fn from_usize(idx: usize) -> Self;

    /// Convert the index to usize for slice indexing.
    fn index(self) -> usize;
}

/// A vector indexed by a specific type.
///
/// `IndexVec` wraps a `Vec<T>` and only accepts indices of type `I`. The
/// index type is a zero-cost abstraction: `IndexVec` has the same size and
/// layout as `Vec<T>`.
///
/// # Example
///
/// ```
/// use coltc_util::index_vec::{IndexVec, Idx};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// struct SectionId(u32);
///
/// impl Idx for SectionId {
///     fn from_usize(idx: usize) -> Self { SectionId(idx as u32) }
///     fn index(self) -> usize { self.0 as usize }
/// }
///
/// let mut sections: IndexVec<SectionId, String> = IndexVec::new();
/// let id = sections.push("code".to_string());
/// assert_eq!(sections[id], "code");
/// ```
#[derive(Clone)]
pub struct IndexVec<I, T> {
    raw: Vec<T>,
    _marker: PhantomData<fn(&I)>,
}

impl<I, T> IndexVec<I, T> {
    /// Create an empty IndexVec.
    #[inline]
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Create an IndexVec with the specified capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use coltc_util::index_vec::IndexVec;
    ///
    /// let vec: IndexVec<usize, i32> = IndexVec::with_capacity(16);
    /// assert!(vec.capacity() >= 16);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: Vec::with_capacity(capacity),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the total capacity of the vector.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Clear all elements, keeping the allocated capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear()
    }

    /// Get a slice view of the underlying data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.raw
    }

    /// Iterate over the values.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.raw.iter()
    }
}

impl<I: Idx, T> IndexVec<I, T> {
    /// Push an element and return its typed index.
    ///
    /// # Examples
    ///
    /// ```
    /// use coltc_util::index_vec::{IndexVec, Idx};
    ///
    /// #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// struct Id(u32);
    /// impl Idx for Id {
    ///     fn from_usize(i: usize) -> Self { Id(i as u32) }
    ///     fn index(self) -> usize { self.0 as usize }
    /// }
    ///
    /// let mut vec: IndexVec<Id, i32> = IndexVec::new();
    /// let idx = vec.push(42);
    /// assert_eq!(vec[idx], 42);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> I {
        let index = self.raw.len();
        self.raw.push(value);
        I::from_usize(index)
    }

    /// The index the next `push` will return.
    #[inline]
    pub fn next_index(&self) -> I {
        I::from_usize(self.raw.len())
    }

    /// Get a reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        self.raw.get(index.index())
    }

    /// Get a mutable reference to the element at the given index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.raw.get_mut(index.index())
    }

    /// Iterate over (index, value) pairs.
    #[inline]
    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> {
        self.raw
            .iter()
            .enumerate()
            .map(|(i, v)| (I::from_usize(i), v))
    }

    /// Iterate over indices only.
    #[inline]
    pub fn indices(&self) -> impl Iterator<Item = I> {
        (0..self.raw.len()).map(I::from_usize)
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: I) -> &T {
        &self.raw[index.index()]
    }
}

impl<I: Idx, T> IndexMut<I> for IndexVec<I, T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut T {
        &mut self.raw[index.index()]
    }
}

impl<I, T> Default for IndexVec<I, T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: std::fmt::Debug> std::fmt::Debug for IndexVec<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.raw.iter()).finish()
    }
}

/// Macro to define plain index types.
///
/// Generates a newtype wrapper around `u32` implementing [`Idx`], with the
/// common derives. Use [`crate::define_handle!`] instead when the index is a
/// buffer-minted handle that needs an optional sentinel and debug ownership
/// checking.
///
/// # Examples
///
/// ```
/// use coltc_util::{define_idx, index_vec::IndexVec};
///
/// define_idx!(PayloadIdx);
///
/// let mut vec: IndexVec<PayloadIdx, i32> = IndexVec::new();
/// let idx = vec.push(42);
/// assert_eq!(vec[idx], 42);
/// ```
#[macro_export]
macro_rules! define_idx {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::index_vec::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                assert!(idx <= u32::MAX as usize, "index {} exceeds u32::MAX", idx);
                $name(idx as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

#[cfg(test)]
mod tests;
