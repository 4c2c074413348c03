//! coltc-fold - Typed-QWORD Constant Folding
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! Every scalar the compiler folds travels as an eight-byte [`QWord`]
//! payload plus a runtime [`OperandType`] tag telling this crate how to
//! interpret it. Each operation returns the result payload together with an
//! [`OpError`] diagnostic code; nothing here reports, the caller decides
//! which codes become warnings.
//!
//! ```text
//! add(QWord{200}, QWord{100}, OperandType::U8)
//!     == (QWord{44}, OpError::UnsignedOverflow)
//!
//! lt(QWord{NaN}, QWord{1.0}, OperandType::F64)
//!     == (QWord{false}, OpError::WasNan)
//! ```
//!
//! DISPATCH
//! --------
//! Every primitive operation is a generic function instantiated once per
//! operand tag; a ten-entry `const` table indexed by the tag dispatches at
//! run time (conversions use a 10×10 matrix). The table layout follows the
//! tag declaration order: `i8 i16 i32 i64 u8 u16 u32 u64 f32 f64`.
//!
//! SEMANTICS
//! ---------
//! - Integer arithmetic wraps; overflow direction is detected by range
//!   checks before the wrap and reported via the error code.
//! - Division/modulo by zero returns the left operand unchanged with
//!   `DivByZero`; signed `MIN / -1` reports overflow.
//! - Modulo on floats is `InvalidOp`.
//! - Floating inputs that are NaN come back with `WasNan`; results that
//!   become NaN come back with `RetNan`. Comparisons on NaN inputs yield
//!   the raw comparison result plus `WasNan`.
//! - Bitwise operations mask to the operand width; shifts by a count at
//!   least the width produce the clamped value plus `ShiftByGreSizeof`.
//! - Float→int conversions clamp at the destination range and report the
//!   boundary crossed; int→int conversions are modular and silent.

pub mod convert;
pub mod operand;
pub mod ops;

pub use convert::cnv;
pub use operand::{FoldResult, OpError, OperandType};
pub use ops::{
    add, asr, bit_and, bit_not, bit_or, bit_xor, div, eq, ge, gt, le, lsl, lsr, lt, mul, neg,
    neq, rem, sub,
};

// The operand payload itself lives in coltc-util.
pub use coltc_util::QWord;
