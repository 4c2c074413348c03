//! coltc-types - The Type System and Interner
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Types in the Colt front-end are compact handles ([`TypeToken`]) into one
//! interning arena per session, the [`TypeBuffer`]. Interning makes type
//! equality a 32-bit integer comparison: equal variants always share one
//! handle, so handle equality and structural equality coincide.
//!
//! ```text
//!             intern(Ptr(t_i32))
//! TypeBuffer ───────────────────▶ TypeToken ──▶ "ptr.i32"
//!    │                                │
//!    ├── IndexSet<TypeVariant>        └── 4 bytes, Copy, Eq
//!    ├── fn-type payload table
//!    └── lazy name cache
//! ```
//!
//! THE VARIANT SET
//! ---------------
//! [`TypeVariant`] is a closed sum: `Error`, `Void`, `Builtin(id)`,
//! `Ptr(target)`, `MutPtr(target)`, `OpaquePtr`, `MutOpaquePtr` and
//! `Fn(payload)`. Function types keep their payload (return type, argument
//! vector, variadic flag) in a side table so the variant stays one word;
//! payloads are themselves deduplicated structurally, which keeps `Fn`
//! equality structural even though the variant only stores an index.
//!
//! `Error` is the bottom of the type lattice for diagnostics: operator and
//! conversion queries always succeed on it, and [`TypeVariant::is_same_as`]
//! treats it as equal to everything, so one bad subexpression does not
//! cascade.
//!
//! THE SUPPORT ENGINE
//! ------------------
//! [`support`] answers, per type variant, whether a unary operator, a binary
//! operator against a right-hand type, or a conversion is available. Answers
//! are enumerations rather than booleans so callers can distinguish "this
//! operator does not exist for the type" from "wrong operand type".

pub mod builtin;
pub mod buffer;
pub mod support;
pub mod ty;

pub use builtin::{literal_builtin, BuiltinID, TypedQWord};
pub use buffer::TypeBuffer;
pub use support::{binary_support, conversion_support, unary_support};
pub use support::{BinarySupport, ConversionSupport, UnarySupport};
pub use ty::{
    ArgSpecifier, FnPayloadIdx, FnTypeArg, FnTypePayload, OptTypeToken, TypeKind, TypeToken,
    TypeVariant,
};
