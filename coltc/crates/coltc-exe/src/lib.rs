//! coltc-exe - The Colti Executable Container
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! On-disk format emitted by the back-end and consumed by the interpreter
//! and the disassembler. Everything multi-byte is little-endian on disk and
//! host-endian in memory; conversion happens exactly at the I/O boundary.
//!
//! ```text
//! ┌───────────────────────────────┐ 0
//! │ header (16 bytes)             │   count, version, timestamp, "COLT"
//! ├───────────────────────────────┤ 16
//! │ u64 offset per section        │   from the start of the file
//! ├───────────────────────────────┤ 8-aligned
//! │ section: name\0 pad │ u64 size│
//! │          content...           │
//! ├───────────────────────────────┤
//! │ ...                           │
//! └───────────────────────────────┘
//! ```
//!
//! The header packs the language version as `[5b major][5b minor][6b patch]`
//! and the compilation timestamp into three small fields where a zero
//! sub-field means "no date". Section names are NUL-terminated, at most 31
//! bytes, padded so the size field and content stay 8-byte aligned.
//!
//! Instructions are 64-bit words with a 4-bit opcode; see [`opcode`] for
//! the field layouts, which are the format's source of truth. The 4-bit
//! type field of typed binary instructions is the same operand-type
//! enumeration the constant folder dispatches on.
//!
//! [`ColtiExecutable::load`] validates everything it touches and reports
//! malformed input through [`ExeFormatError`]; the caller turns that into a
//! user-facing message.

pub mod disasm;
pub mod error;
pub mod exe;
pub mod header;
pub mod opcode;

pub use disasm::{DisasmLine, Disassembler};
pub use error::ExeFormatError;
pub use exe::{ColtiExecutable, ExecutableBuilder, ExecutableSection};
pub use header::{ColtVersion, ColtiHeader, Timestamp, HEADER_SIZE, MAGIC_NUMBER};
pub use opcode::{BinaryBitsInst, BinaryBitsOp, BinaryTypeInst, BinaryTypeOp, BranchInst, BranchOp, Inst};

// The operand tag the typed instructions are parameterised by.
pub use coltc_fold::OperandType;
