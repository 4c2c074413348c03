//! The operator/conversion support engine.
//!
//! For every type variant, three questions: does it support unary operator
//! `op`? binary operator `op` against right-hand type `rhs`? conversion to
//! `rhs`? Answers are enumerations, not booleans, so the caller can tell
//! "operator not defined for this type" from "operand type mismatch".
//!
//! Dispatch is a `const` table per question, indexed by the discriminant of
//! the left-hand type; each entry is the rule function for that variant.
//! The error type accepts everything, which is what keeps one bad
//! subexpression from producing a report per enclosing operator.

use coltc_lex::{BinaryOp, UnaryOp};

use crate::ty::{TypeVariant, TYPE_KIND_COUNT};
use crate::{BuiltinID, TypeBuffer, TypeToken};

/// Whether a type supports a unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnarySupport {
    /// Supported natively.
    Builtin,
    /// The operator does not exist for this type.
    Invalid,
}

/// Whether a type supports a binary operator against a right-hand type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinarySupport {
    /// Supported natively.
    Builtin,
    /// The operator does not exist for the left-hand type.
    InvalidOp,
    /// The operator exists, but not with this right-hand type.
    InvalidType,
}

/// Whether a type converts to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionSupport {
    /// Convertible natively.
    Builtin,
    /// Not convertible.
    Invalid,
}

// ---------------------------------------------------------------------------
// Unary rules
// ---------------------------------------------------------------------------

type UnaryRule = fn(&TypeBuffer, &TypeVariant, UnaryOp) -> UnarySupport;

fn unary_error(_: &TypeBuffer, _: &TypeVariant, _: UnaryOp) -> UnarySupport {
    UnarySupport::Builtin
}

fn unary_none(_: &TypeBuffer, _: &TypeVariant, _: UnaryOp) -> UnarySupport {
    UnarySupport::Invalid
}

fn unary_builtin(_: &TypeBuffer, lhs: &TypeVariant, op: UnaryOp) -> UnarySupport {
    let Some(id) = lhs.builtin_id() else {
        return UnarySupport::Invalid;
    };
    builtin_unary(id, op)
}

/// Unary support for a builtin id.
fn builtin_unary(id: BuiltinID, op: UnaryOp) -> UnarySupport {
    use UnaryOp::*;
    let supported = if id.is_bool() {
        matches!(op, BoolNot)
    } else if id.is_char() {
        false
    } else if id.is_sint() {
        matches!(op, BitNot | Negate | Inc | Dec)
    } else if id.is_uint() {
        matches!(op, BitNot | Inc | Dec)
    } else if id.is_fp() {
        matches!(op, Negate | Inc | Dec)
    } else {
        // Byte family.
        matches!(op, BitNot)
    };
    if supported {
        UnarySupport::Builtin
    } else {
        UnarySupport::Invalid
    }
}

/// Rule per [`crate::TypeKind`] discriminant.
const UNARY_RULES: [UnaryRule; TYPE_KIND_COUNT] = [
    unary_error,   // Error
    unary_none,    // Void
    unary_builtin, // Builtin
    unary_none,    // Ptr
    unary_none,    // MutPtr
    unary_none,    // OpaquePtr
    unary_none,    // MutOpaquePtr
    unary_none,    // Fn
];

/// Does the type named by `lhs` support unary operator `op`?
pub fn unary_support(buf: &TypeBuffer, lhs: TypeToken, op: UnaryOp) -> UnarySupport {
    let variant = buf.get(lhs);
    UNARY_RULES[variant.kind() as usize](buf, variant, op)
}

// ---------------------------------------------------------------------------
// Binary rules
// ---------------------------------------------------------------------------

type BinaryRule = fn(&TypeBuffer, &TypeVariant, BinaryOp, &TypeVariant) -> BinarySupport;

fn binary_error(_: &TypeBuffer, _: &TypeVariant, _: BinaryOp, _: &TypeVariant) -> BinarySupport {
    BinarySupport::Builtin
}

fn binary_none(_: &TypeBuffer, _: &TypeVariant, _: BinaryOp, _: &TypeVariant) -> BinarySupport {
    BinarySupport::InvalidOp
}

fn is_comparison_op(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Great
            | BinaryOp::GreatEqual
            | BinaryOp::NotEqual
            | BinaryOp::Equal
    )
}

/// Typed pointers: `+`/`-` with an integral right-hand side, ordering and
/// equality against a pointer to the same pointee.
fn binary_ptr(
    _: &TypeBuffer,
    lhs: &TypeVariant,
    op: BinaryOp,
    rhs: &TypeVariant,
) -> BinarySupport {
    match op {
        BinaryOp::Sum | BinaryOp::Sub => {
            if rhs.is_builtin_and(BuiltinID::is_integral) {
                BinarySupport::Builtin
            } else {
                BinarySupport::InvalidType
            }
        }
        op if is_comparison_op(op) => match (lhs.pointee(), rhs.pointee()) {
            (Some(a), Some(b)) if a == b => BinarySupport::Builtin,
            _ => BinarySupport::InvalidType,
        },
        _ => BinarySupport::InvalidOp,
    }
}

/// Opaque pointers: only equality/ordering, against any opaque pointer.
fn binary_opaque(
    _: &TypeBuffer,
    _: &TypeVariant,
    op: BinaryOp,
    rhs: &TypeVariant,
) -> BinarySupport {
    if is_comparison_op(op) {
        if rhs.is_any_opaque_ptr() {
            BinarySupport::Builtin
        } else {
            BinarySupport::InvalidType
        }
    } else {
        BinarySupport::InvalidOp
    }
}

fn binary_builtin(
    _: &TypeBuffer,
    lhs: &TypeVariant,
    op: BinaryOp,
    rhs: &TypeVariant,
) -> BinarySupport {
    let Some(id) = lhs.builtin_id() else {
        return BinarySupport::InvalidOp;
    };
    use BinaryOp::*;
    let op_exists = if id.is_bool() {
        matches!(op, BitAnd | BitOr | BitXor | BoolAnd | BoolOr | NotEqual | Equal)
    } else if id.is_char() {
        false
    } else if id.is_integral() || id.is_bytes() {
        matches!(
            op,
            Sum | Sub | Mul | Div | Mod | BitAnd | BitOr | BitXor | BitLshift | BitRshift
        ) || is_comparison_op(op)
    } else if id.is_fp() {
        matches!(op, Sum | Sub | Mul | Div) || is_comparison_op(op)
    } else {
        false
    };
    if !op_exists {
        return BinarySupport::InvalidOp;
    }
    // Operand types must match exactly (same id, hence same width).
    if rhs.builtin_id() == Some(id) {
        BinarySupport::Builtin
    } else {
        BinarySupport::InvalidType
    }
}

/// Rule per [`crate::TypeKind`] discriminant.
const BINARY_RULES: [BinaryRule; TYPE_KIND_COUNT] = [
    binary_error,   // Error
    binary_none,    // Void
    binary_builtin, // Builtin
    binary_ptr,     // Ptr
    binary_ptr,     // MutPtr
    binary_opaque,  // OpaquePtr
    binary_opaque,  // MutOpaquePtr
    binary_none,    // Fn
];

/// Does the type named by `lhs` support binary operator `op` against `rhs`?
pub fn binary_support(
    buf: &TypeBuffer,
    lhs: TypeToken,
    op: BinaryOp,
    rhs: TypeToken,
) -> BinarySupport {
    let lhs_variant = buf.get(lhs);
    let rhs_variant = buf.get(rhs);
    // Error on either side suppresses the query.
    if rhs_variant.is_error() {
        return BinarySupport::Builtin;
    }
    BINARY_RULES[lhs_variant.kind() as usize](buf, lhs_variant, op, rhs_variant)
}

// ---------------------------------------------------------------------------
// Conversion rules
// ---------------------------------------------------------------------------

type ConversionRule = fn(&TypeBuffer, &TypeVariant, &TypeVariant) -> ConversionSupport;

fn convert_error(_: &TypeBuffer, _: &TypeVariant, _: &TypeVariant) -> ConversionSupport {
    ConversionSupport::Builtin
}

fn convert_none(_: &TypeBuffer, _: &TypeVariant, _: &TypeVariant) -> ConversionSupport {
    ConversionSupport::Invalid
}

fn convert_builtin(_: &TypeBuffer, _: &TypeVariant, rhs: &TypeVariant) -> ConversionSupport {
    if rhs.is_builtin() || rhs.is_error() {
        ConversionSupport::Builtin
    } else {
        ConversionSupport::Invalid
    }
}

/// Rule per [`crate::TypeKind`] discriminant.
const CONVERSION_RULES: [ConversionRule; TYPE_KIND_COUNT] = [
    convert_error,   // Error
    convert_none,    // Void
    convert_builtin, // Builtin
    convert_none,    // Ptr
    convert_none,    // MutPtr
    convert_none,    // OpaquePtr
    convert_none,    // MutOpaquePtr
    convert_none,    // Fn
];

/// Is the type named by `from` convertible to `to`?
pub fn conversion_support(buf: &TypeBuffer, from: TypeToken, to: TypeToken) -> ConversionSupport {
    let from_variant = buf.get(from);
    let to_variant = buf.get(to);
    CONVERSION_RULES[from_variant.kind() as usize](buf, from_variant, to_variant)
}
