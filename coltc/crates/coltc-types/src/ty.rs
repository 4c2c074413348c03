//! Type variants and the handles that name them.

use coltc_util::define_handle;

use crate::BuiltinID;

define_handle! {
    /// Handle to an interned type in a [`crate::TypeBuffer`].
    ///
    /// Because the buffer interns structurally, two tokens minted for equal
    /// variants are equal, and token equality is type equality.
    TypeToken,
    /// Optional [`TypeToken`], absence encoded as the `u32::MAX` sentinel.
    OptTypeToken
}

coltc_util::define_idx!(
    /// Index into the function-type payload table of a [`crate::TypeBuffer`].
    FnPayloadIdx
);

/// How a function argument is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArgSpecifier {
    In,
    Out,
    Inout,
    Move,
}

impl ArgSpecifier {
    /// The keyword spelling of the specifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            ArgSpecifier::In => "in",
            ArgSpecifier::Out => "out",
            ArgSpecifier::Inout => "inout",
            ArgSpecifier::Move => "move",
        }
    }
}

/// One argument of a function type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FnTypeArg {
    pub ty: TypeToken,
    pub specifier: ArgSpecifier,
}

impl FnTypeArg {
    pub fn new(ty: TypeToken, specifier: ArgSpecifier) -> Self {
        Self { ty, specifier }
    }
}

/// The payload of a function type, stored out of line so the variant stays
/// one word.
///
/// Payloads are deduplicated structurally by the buffer, so a payload index
/// identifies its content and `Fn` variant equality stays structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FnTypePayload {
    /// True if the function takes C-style trailing variadics.
    pub is_variadic: bool,
    /// The return type (possibly `void`).
    pub return_type: TypeToken,
    /// The declared arguments, in order.
    pub args: Box<[FnTypeArg]>,
}

/// Discriminant of a [`TypeVariant`].
///
/// The integer value indexes the dispatch tables of the support engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeKind {
    Error,
    Void,
    Builtin,
    Ptr,
    MutPtr,
    OpaquePtr,
    MutOpaquePtr,
    Fn,
}

/// Number of type kinds; the support engine's tables have this many rows.
pub const TYPE_KIND_COUNT: usize = 8;

/// A type, as represented by the compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeVariant {
    /// Produced in place of an invalid type so parsing can continue
    /// without cascading diagnostics.
    Error,
    /// The absence of a value.
    Void,
    /// A builtin type (integer, floating point, byte family, bool, char).
    Builtin(BuiltinID),
    /// Pointer to constant memory of the target type.
    Ptr(TypeToken),
    /// Pointer to mutable memory of the target type.
    MutPtr(TypeToken),
    /// Pointer to constant memory of unknown type.
    OpaquePtr,
    /// Pointer to mutable memory of unknown type.
    MutOpaquePtr,
    /// A function type; the payload lives in the buffer's side table.
    Fn(FnPayloadIdx),
}

impl TypeVariant {
    /// The discriminant of this variant.
    pub const fn kind(&self) -> TypeKind {
        match self {
            TypeVariant::Error => TypeKind::Error,
            TypeVariant::Void => TypeKind::Void,
            TypeVariant::Builtin(_) => TypeKind::Builtin,
            TypeVariant::Ptr(_) => TypeKind::Ptr,
            TypeVariant::MutPtr(_) => TypeKind::MutPtr,
            TypeVariant::OpaquePtr => TypeKind::OpaquePtr,
            TypeVariant::MutOpaquePtr => TypeKind::MutOpaquePtr,
            TypeVariant::Fn(_) => TypeKind::Fn,
        }
    }

    /// Check if the type is the error type.
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, TypeVariant::Error)
    }

    /// Check if the type is `void`.
    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, TypeVariant::Void)
    }

    /// Check if the type is builtin.
    #[inline]
    pub const fn is_builtin(&self) -> bool {
        matches!(self, TypeVariant::Builtin(_))
    }

    /// Check if the type is a pointer to constant memory (typed or opaque).
    #[inline]
    pub const fn is_const_ptr(&self) -> bool {
        matches!(self, TypeVariant::Ptr(_) | TypeVariant::OpaquePtr)
    }

    /// Check if the type is a pointer to mutable memory (typed or opaque).
    #[inline]
    pub const fn is_mut_ptr(&self) -> bool {
        matches!(self, TypeVariant::MutPtr(_) | TypeVariant::MutOpaquePtr)
    }

    /// Check if the type is any pointer.
    #[inline]
    pub const fn is_any_ptr(&self) -> bool {
        self.is_const_ptr() || self.is_mut_ptr()
    }

    /// Check if the type is an opaque (possibly mutable) pointer.
    #[inline]
    pub const fn is_any_opaque_ptr(&self) -> bool {
        matches!(self, TypeVariant::OpaquePtr | TypeVariant::MutOpaquePtr)
    }

    /// Check if the type is a function type.
    #[inline]
    pub const fn is_fn(&self) -> bool {
        matches!(self, TypeVariant::Fn(_))
    }

    /// The builtin id, if the type is builtin.
    #[inline]
    pub const fn builtin_id(&self) -> Option<BuiltinID> {
        match self {
            TypeVariant::Builtin(id) => Some(*id),
            _ => None,
        }
    }

    /// Check that the type is builtin and that `check` accepts its id.
    #[inline]
    pub fn is_builtin_and(&self, check: impl FnOnce(BuiltinID) -> bool) -> bool {
        match self {
            TypeVariant::Builtin(id) => check(*id),
            _ => false,
        }
    }

    /// The pointee of a typed (non-opaque) pointer.
    #[inline]
    pub const fn pointee(&self) -> Option<TypeToken> {
        match self {
            TypeVariant::Ptr(to) | TypeVariant::MutPtr(to) => Some(*to),
            _ => None,
        }
    }

    /// Error-tolerant equality: true when the types are equal or when
    /// either side is the error type.
    ///
    /// Strict `==` still distinguishes `Error` from everything else; this
    /// is the comparison diagnostics use so one bad type does not produce a
    /// second report.
    #[inline]
    pub fn is_same_as(&self, other: &TypeVariant) -> bool {
        if self.is_error() || other.is_error() {
            return true;
        }
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltc_util::BufferId;

    fn token(index: u32) -> TypeToken {
        TypeToken::new(index, BufferId::fresh())
    }

    #[test]
    fn test_kind_discriminants_are_dense() {
        let variants = [
            TypeVariant::Error,
            TypeVariant::Void,
            TypeVariant::Builtin(BuiltinID::Bool),
            TypeVariant::Ptr(token(0)),
            TypeVariant::MutPtr(token(0)),
            TypeVariant::OpaquePtr,
            TypeVariant::MutOpaquePtr,
            TypeVariant::Fn(FnPayloadIdx(0)),
        ];
        for (i, variant) in variants.iter().enumerate() {
            assert_eq!(variant.kind() as usize, i);
        }
        assert_eq!(variants.len(), TYPE_KIND_COUNT);
    }

    #[test]
    fn test_pointer_predicates() {
        let ptr = TypeVariant::Ptr(token(1));
        let mut_ptr = TypeVariant::MutPtr(token(1));
        assert!(ptr.is_any_ptr() && !ptr.is_mut_ptr() && !ptr.is_any_opaque_ptr());
        assert!(mut_ptr.is_mut_ptr() && mut_ptr.is_any_ptr());
        assert!(TypeVariant::OpaquePtr.is_any_opaque_ptr());
        assert!(TypeVariant::MutOpaquePtr.is_mut_ptr());
        assert_eq!(ptr.pointee(), Some(token(1)));
        assert_eq!(TypeVariant::OpaquePtr.pointee(), None);
    }

    #[test]
    fn test_is_same_as_absorbs_error() {
        let a = TypeVariant::Builtin(BuiltinID::I32);
        let b = TypeVariant::Builtin(BuiltinID::U8);
        assert!(a.is_same_as(&a));
        assert!(!a.is_same_as(&b));
        assert!(TypeVariant::Error.is_same_as(&a));
        assert!(a.is_same_as(&TypeVariant::Error));
        // Strict equality still tells them apart.
        assert_ne!(TypeVariant::Error, a);
    }

    #[test]
    fn test_is_builtin_and() {
        let fp = TypeVariant::Builtin(BuiltinID::F32);
        assert!(fp.is_builtin_and(BuiltinID::is_fp));
        assert!(!fp.is_builtin_and(BuiltinID::is_integral));
        assert!(!TypeVariant::Void.is_builtin_and(|_| true));
    }
}
