//! Arena handles with debug-only ownership checking.
//!
//! Heavy entities (types, expressions) are referred to by 32-bit handles
//! into append-only arenas. A handle is only meaningful in the buffer that
//! minted it; in debug builds each handle carries a [`BufferId`] tag and
//! every dereference checks it, so a handle from buffer `X` used on buffer
//! `Y != X` is caught immediately. Release builds strip the tag and a handle
//! is exactly four bytes.
//!
//! The optional variant of a handle reserves `u32::MAX` as the "none"
//! sentinel, so an optional handle is no larger than a plain one.

use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of an arena-owning buffer.
///
/// Every buffer draws a fresh id at construction. The id is only consulted
/// in debug builds, where handles carry the id of the buffer that minted
/// them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BufferId(u32);

/// Next buffer id to hand out.
static NEXT_BUFFER_ID: AtomicU32 = AtomicU32::new(0);

impl BufferId {
    /// Placeholder id used by sentinel handles.
    pub const DUMMY: BufferId = BufferId(u32::MAX);

    /// Draw a fresh, process-unique buffer id.
    pub fn fresh() -> BufferId {
        BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Define a handle type and its optional variant.
///
/// Generates two `Copy` types: `$name`, a 32-bit index tagged (in debug
/// builds only) with the [`BufferId`] of the minting buffer, and `$opt`,
/// which additionally encodes absence through the `u32::MAX` sentinel.
/// Equality and hashing are index-only: two equal handles from the same
/// buffer denote the same entity.
///
/// # Examples
///
/// ```
/// use coltc_util::{define_handle, handle::BufferId};
///
/// define_handle! {
///     /// Handle to an interned widget.
///     WidgetToken,
///     /// Optional handle to an interned widget.
///     OptWidgetToken
/// }
///
/// let owner = BufferId::fresh();
/// let tok = WidgetToken::new(3, owner);
/// assert_eq!(tok.raw(), 3);
///
/// let none = OptWidgetToken::NONE;
/// assert!(none.expand().is_none());
/// assert_eq!(OptWidgetToken::from(tok).expand(), Some(tok));
/// ```
#[macro_export]
macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident, $(#[$optdoc:meta])* $opt:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $name {
            index: u32,
            #[cfg(debug_assertions)]
            owner: $crate::handle::BufferId,
        }

        impl $name {
            /// Largest mintable index; `u32::MAX` is the optional sentinel.
            pub const MAX_INDEX: u32 = u32::MAX - 1;

            /// Create a handle for `index`, minted by `owner`.
            ///
            /// # Panics
            ///
            /// Panics if `index` exceeds [`Self::MAX_INDEX`].
            #[inline]
            pub fn new(index: u32, owner: $crate::handle::BufferId) -> Self {
                assert!(
                    index <= Self::MAX_INDEX,
                    concat!(stringify!($name), " index overflow: {}"),
                    index
                );
                #[cfg(not(debug_assertions))]
                let _ = owner;
                Self {
                    index,
                    #[cfg(debug_assertions)]
                    owner,
                }
            }

            /// The arena slot this handle refers to.
            #[inline]
            pub fn index(self) -> usize {
                self.index as usize
            }

            /// The raw 32-bit value of the handle.
            #[inline]
            pub fn raw(self) -> u32 {
                self.index
            }

            /// Debug-check that this handle was minted by `owner`.
            ///
            /// No-op in release builds.
            #[inline]
            pub fn assert_owned_by(self, owner: $crate::handle::BufferId) {
                #[cfg(debug_assertions)]
                debug_assert!(
                    self.owner == owner,
                    concat!(
                        stringify!($name),
                        "({}) dereferenced on a buffer that did not mint it"
                    ),
                    self.index
                );
                #[cfg(not(debug_assertions))]
                let _ = owner;
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            #[inline]
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.index)
            }
        }

        $(#[$optdoc])*
        #[derive(Clone, Copy)]
        pub struct $opt {
            index: u32,
            #[cfg(debug_assertions)]
            owner: $crate::handle::BufferId,
        }

        impl $opt {
            /// The absent handle.
            pub const NONE: $opt = $opt {
                index: u32::MAX,
                #[cfg(debug_assertions)]
                owner: $crate::handle::BufferId::DUMMY,
            };

            /// True if this optional handle is absent.
            #[inline]
            pub fn is_none(self) -> bool {
                self.index == u32::MAX
            }

            /// True if this optional handle is present.
            #[inline]
            pub fn is_some(self) -> bool {
                !self.is_none()
            }

            /// Convert to a standard `Option`.
            #[inline]
            pub fn expand(self) -> Option<$name> {
                if self.is_none() {
                    None
                } else {
                    Some($name {
                        index: self.index,
                        #[cfg(debug_assertions)]
                        owner: self.owner,
                    })
                }
            }
        }

        impl From<$name> for $opt {
            #[inline]
            fn from(handle: $name) -> $opt {
                $opt {
                    index: handle.index,
                    #[cfg(debug_assertions)]
                    owner: handle.owner,
                }
            }
        }

        impl From<Option<$name>> for $opt {
            #[inline]
            fn from(handle: Option<$name>) -> $opt {
                match handle {
                    Some(h) => $opt::from(h),
                    None => $opt::NONE,
                }
            }
        }

        impl PartialEq for $opt {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index
            }
        }

        impl Eq for $opt {}

        impl std::hash::Hash for $opt {
            #[inline]
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.index.hash(state);
            }
        }

        impl std::fmt::Debug for $opt {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.expand() {
                    Some(h) => write!(f, concat!(stringify!($opt), "({:?})"), h),
                    None => write!(f, concat!(stringify!($opt), "(None)")),
                }
            }
        }
    };
}
