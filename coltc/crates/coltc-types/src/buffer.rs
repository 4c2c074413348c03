//! The type interner.
//!
//! One `TypeBuffer` per compilation session owns every type. Interning goes
//! through an index set keyed by the variant: insertion returns the slot
//! index (minting the token) and whether the variant was new. Function-type
//! payloads are deduplicated in their own table before the `Fn` variant is
//! interned, so payload indices identify content.

use std::cell::RefCell;

use coltc_util::{BufferId, IndexVec, Symbol};
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::BuildHasherDefault;

type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

use crate::ty::{
    ArgSpecifier, FnPayloadIdx, FnTypeArg, FnTypePayload, OptTypeToken, TypeToken, TypeVariant,
};
use crate::BuiltinID;

/// Owner and interner of all types of a session.
///
/// # Examples
///
/// ```
/// use coltc_types::{BuiltinID, TypeBuffer};
///
/// let mut types = TypeBuffer::new();
/// let i32_ty = types.builtin(BuiltinID::I32);
/// let ptr = types.ptr(i32_ty);
/// let mut_ptr = types.mut_ptr(ptr);
///
/// // Interning: re-building the same structure yields the same handle.
/// let ptr_again = types.ptr(i32_ty);
/// assert_eq!(types.mut_ptr(ptr_again), mut_ptr);
/// assert_eq!(types.name_of(mut_ptr), "mutptr.ptr.i32");
/// ```
pub struct TypeBuffer {
    /// Identity of this buffer, stamped into minted tokens in debug builds.
    id: BufferId,
    /// The interned set of types; the slot index is the token value.
    types: FxIndexSet<TypeVariant>,
    /// Function-type payloads, indexed by the `Fn` variant.
    payloads: IndexVec<FnPayloadIdx, FnTypePayload>,
    /// Structural payload deduplication.
    payload_map: FxHashMap<FnTypePayload, FnPayloadIdx>,
    /// Lazily computed names; interned so returned views stay stable.
    names: RefCell<FxHashMap<u32, Symbol>>,
}

impl TypeBuffer {
    /// An empty buffer with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: BufferId::fresh(),
            types: FxIndexSet::default(),
            payloads: IndexVec::new(),
            payload_map: FxHashMap::default(),
            names: RefCell::new(FxHashMap::default()),
        }
    }

    /// This buffer's identity.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Intern a variant, minting (or finding) its token.
    pub fn intern(&mut self, variant: TypeVariant) -> TypeToken {
        let (index, _inserted) = self.types.insert_full(variant);
        assert!(index as u64 <= u64::from(TypeToken::MAX_INDEX), "type buffer overflow");
        TypeToken::new(index as u32, self.id)
    }

    /// The unique error type.
    pub fn error_type(&mut self) -> TypeToken {
        self.intern(TypeVariant::Error)
    }

    /// The unique `void` type.
    pub fn void_type(&mut self) -> TypeToken {
        self.intern(TypeVariant::Void)
    }

    /// The builtin type for `id`.
    pub fn builtin(&mut self, id: BuiltinID) -> TypeToken {
        self.intern(TypeVariant::Builtin(id))
    }

    /// Pointer to constant memory of `to`.
    pub fn ptr(&mut self, to: TypeToken) -> TypeToken {
        to.assert_owned_by(self.id);
        self.intern(TypeVariant::Ptr(to))
    }

    /// Pointer to mutable memory of `to`.
    pub fn mut_ptr(&mut self, to: TypeToken) -> TypeToken {
        to.assert_owned_by(self.id);
        self.intern(TypeVariant::MutPtr(to))
    }

    /// The unique opaque pointer type.
    pub fn opaque_ptr(&mut self) -> TypeToken {
        self.intern(TypeVariant::OpaquePtr)
    }

    /// The unique mutable opaque pointer type.
    pub fn mut_opaque_ptr(&mut self) -> TypeToken {
        self.intern(TypeVariant::MutOpaquePtr)
    }

    /// A function type; the payload is interned structurally, so distinct
    /// argument vectors with equal content collapse to one payload.
    pub fn fn_type(
        &mut self,
        return_type: TypeToken,
        args: impl Into<Box<[FnTypeArg]>>,
        is_variadic: bool,
    ) -> TypeToken {
        return_type.assert_owned_by(self.id);
        let args = args.into();
        for arg in args.iter() {
            arg.ty.assert_owned_by(self.id);
        }
        let payload = FnTypePayload {
            is_variadic,
            return_type,
            args,
        };
        let idx = match self.payload_map.get(&payload) {
            Some(idx) => *idx,
            None => {
                let idx = self.payloads.push(payload.clone());
                self.payload_map.insert(payload, idx);
                idx
            }
        };
        self.intern(TypeVariant::Fn(idx))
    }

    /// Dereference a token.
    ///
    /// The reference stays valid until the next mutating call on the
    /// buffer.
    ///
    /// # Panics
    ///
    /// Panics if the token was not minted by this buffer (checked in debug
    /// builds) or is out of range.
    #[inline]
    pub fn get(&self, token: TypeToken) -> &TypeVariant {
        token.assert_owned_by(self.id);
        self.types
            .get_index(token.index())
            .expect("type token out of range")
    }

    /// The payload of a function type.
    #[inline]
    pub fn payload(&self, idx: FnPayloadIdx) -> &FnTypePayload {
        &self.payloads[idx]
    }

    /// Error-tolerant equality between two interned types.
    pub fn is_same_as(&self, a: TypeToken, b: TypeToken) -> bool {
        self.get(a).is_same_as(self.get(b))
    }

    /// Human-readable name of a type: `"ptr.i32"`, `"mutptr.ptr.u8"`,
    /// `"fn(in i32)->void"`, builtin spellings, `"<ERROR>"`.
    ///
    /// Computed lazily and cached; the returned view stays stable for the
    /// process lifetime.
    pub fn name_of(&self, token: TypeToken) -> &'static str {
        if let Some(symbol) = self.names.borrow().get(&token.raw()) {
            return symbol.as_str();
        }
        let rendered = self.render_name(token);
        let symbol = Symbol::intern(&rendered);
        self.names.borrow_mut().insert(token.raw(), symbol);
        symbol.as_str()
    }

    fn render_name(&self, token: TypeToken) -> String {
        match self.get(token) {
            TypeVariant::Error => "<ERROR>".to_owned(),
            TypeVariant::Void => "void".to_owned(),
            TypeVariant::Builtin(id) => id.as_str().to_owned(),
            TypeVariant::Ptr(to) => format!("ptr.{}", self.name_of(*to)),
            TypeVariant::MutPtr(to) => format!("mutptr.{}", self.name_of(*to)),
            TypeVariant::OpaquePtr => "opaque_ptr".to_owned(),
            TypeVariant::MutOpaquePtr => "mut_opaque_ptr".to_owned(),
            TypeVariant::Fn(idx) => {
                let payload = self.payload(*idx).clone();
                let mut name = String::from("fn(");
                for (i, arg) in payload.args.iter().enumerate() {
                    if i > 0 {
                        name.push_str(", ");
                    }
                    name.push_str(arg.specifier.as_str());
                    name.push(' ');
                    name.push_str(self.name_of(arg.ty));
                }
                if payload.is_variadic {
                    if !payload.args.is_empty() {
                        name.push_str(", ");
                    }
                    name.push_str("...");
                }
                name.push_str(")->");
                name.push_str(self.name_of(payload.return_type));
                name
            }
        }
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if nothing was interned yet.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Build `MutPtr<T>` or `Ptr<T>` depending on mutability.
    pub fn ptr_to(&mut self, to: TypeToken, is_mut: bool) -> TypeToken {
        if is_mut {
            self.mut_ptr(to)
        } else {
            self.ptr(to)
        }
    }

    /// An optional token from a plain one, for builder plumbing.
    pub fn some(&self, token: TypeToken) -> OptTypeToken {
        OptTypeToken::from(token)
    }
}

impl Default for TypeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TypeBuffer {{ {} types, {} fn payloads }}",
            self.types.len(),
            self.payloads.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArgSpecifier;

    #[test]
    fn test_singletons_are_idempotent() {
        let mut buf = TypeBuffer::new();
        assert_eq!(buf.error_type(), buf.error_type());
        assert_eq!(buf.void_type(), buf.void_type());
        assert_eq!(buf.opaque_ptr(), buf.opaque_ptr());
        assert_eq!(buf.mut_opaque_ptr(), buf.mut_opaque_ptr());
        assert_ne!(buf.error_type(), buf.void_type());
    }

    #[test]
    fn test_builtin_interning() {
        let mut buf = TypeBuffer::new();
        let a = buf.builtin(BuiltinID::I32);
        let b = buf.builtin(BuiltinID::I32);
        let c = buf.builtin(BuiltinID::U8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(*buf.get(a), TypeVariant::Builtin(BuiltinID::I32));
    }

    #[test]
    fn test_interning_equal_variants_share_handle() {
        // intern(a) == intern(b) ⇔ a == b, and get(intern(v)) == v.
        let mut buf = TypeBuffer::new();
        let i32_ty = buf.builtin(BuiltinID::I32);
        let u8_ty = buf.builtin(BuiltinID::U8);
        let variants = [
            TypeVariant::Error,
            TypeVariant::Void,
            TypeVariant::Builtin(BuiltinID::F64),
            TypeVariant::Ptr(i32_ty),
            TypeVariant::MutPtr(u8_ty),
            TypeVariant::OpaquePtr,
            TypeVariant::MutOpaquePtr,
        ];
        for v in variants {
            let first = buf.intern(v);
            let second = buf.intern(v);
            assert_eq!(first, second);
            assert_eq!(*buf.get(first), v);
        }
        for (i, a) in variants.iter().enumerate() {
            for (j, b) in variants.iter().enumerate() {
                let ta = buf.intern(*a);
                let tb = buf.intern(*b);
                assert_eq!(ta == tb, i == j);
            }
        }
    }

    #[test]
    fn test_mutptr_ptr_i32_name() {
        let mut buf = TypeBuffer::new();
        let t1 = buf.builtin(BuiltinID::I32);
        let t2 = buf.ptr(t1);
        let t3 = buf.mut_ptr(t2);
        assert_eq!(buf.name_of(t3), "mutptr.ptr.i32");

        // Re-interning the same structure yields t3 again.
        let again = {
            let a = buf.builtin(BuiltinID::I32);
            let b = buf.ptr(a);
            buf.mut_ptr(b)
        };
        assert_eq!(again, t3);
    }

    #[test]
    fn test_names_are_cached_and_stable() {
        let mut buf = TypeBuffer::new();
        let t = buf.opaque_ptr();
        let first = buf.name_of(t);
        let second = buf.name_of(t);
        assert_eq!(first, "opaque_ptr");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_error_and_void_names() {
        let mut buf = TypeBuffer::new();
        let err = buf.error_type();
        let void = buf.void_type();
        let mop = buf.mut_opaque_ptr();
        assert_eq!(buf.name_of(err), "<ERROR>");
        assert_eq!(buf.name_of(void), "void");
        assert_eq!(buf.name_of(mop), "mut_opaque_ptr");
    }

    #[test]
    fn test_fn_type_payload_dedup() {
        let mut buf = TypeBuffer::new();
        let i32_ty = buf.builtin(BuiltinID::I32);
        let void = buf.void_type();
        let args = vec![FnTypeArg::new(i32_ty, ArgSpecifier::In)];

        let f1 = buf.fn_type(void, args.clone(), false);
        let f2 = buf.fn_type(void, args.clone(), false);
        assert_eq!(f1, f2);

        // Distinct variadic flag makes a distinct type.
        let f3 = buf.fn_type(void, args.clone(), true);
        assert_ne!(f1, f3);

        // Distinct specifier makes a distinct type.
        let f4 = buf.fn_type(void, vec![FnTypeArg::new(i32_ty, ArgSpecifier::Out)], false);
        assert_ne!(f1, f4);
    }

    #[test]
    fn test_fn_type_name() {
        let mut buf = TypeBuffer::new();
        let i32_ty = buf.builtin(BuiltinID::I32);
        let u8_ty = buf.builtin(BuiltinID::U8);
        let void = buf.void_type();
        let f = buf.fn_type(
            void,
            vec![
                FnTypeArg::new(i32_ty, ArgSpecifier::In),
                FnTypeArg::new(u8_ty, ArgSpecifier::Out),
            ],
            true,
        );
        assert_eq!(buf.name_of(f), "fn(in i32, out u8, ...)->void");

        let nullary = buf.fn_type(i32_ty, Vec::new(), false);
        assert_eq!(buf.name_of(nullary), "fn()->i32");
    }

    #[test]
    fn test_is_same_as_through_buffer() {
        let mut buf = TypeBuffer::new();
        let err = buf.error_type();
        let i32_ty = buf.builtin(BuiltinID::I32);
        let u8_ty = buf.builtin(BuiltinID::U8);
        assert!(buf.is_same_as(err, i32_ty));
        assert!(buf.is_same_as(i32_ty, err));
        assert!(buf.is_same_as(i32_ty, i32_ty));
        assert!(!buf.is_same_as(i32_ty, u8_ty));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "did not mint it")]
    fn test_cross_buffer_token_is_detected() {
        let mut a = TypeBuffer::new();
        let b = TypeBuffer::new();
        let token = a.builtin(BuiltinID::Bool);
        let _ = b.get(token);
    }

    #[test]
    fn test_ptr_to_mutability() {
        let mut buf = TypeBuffer::new();
        let inner = buf.builtin(BuiltinID::I32);
        let p = buf.ptr_to(inner, false);
        let mp = buf.ptr_to(inner, true);
        assert_eq!(*buf.get(p), TypeVariant::Ptr(inner));
        assert_eq!(*buf.get(mp), TypeVariant::MutPtr(inner));
    }
}
