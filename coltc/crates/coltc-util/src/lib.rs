//! coltc-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate provides the foundation every other coltc crate builds on. The
//! whole front-end shares one design idea: heavy entities (types, tokens,
//! expressions) live in append-only arenas and are passed around as compact
//! 32-bit typed handles. The utilities here make that idea safe and cheap.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. ZERO-COST ABSTRACTIONS
//!    Typed indices, handle sentinels and bit packing compile down to plain
//!    integer arithmetic.
//!
//! 2. TYPE SAFETY
//!    A `TypeToken` cannot be used where a `ProdExprToken` is expected, and
//!    in debug builds a handle remembers which buffer minted it.
//!
//! 3. SINGLE-THREADED CORE, SHARED INTERNER
//!    One compilation session owns its buffers and never crosses threads.
//!    The only process-wide structure is the string interner, which is
//!    lock-free and safe to share.
//!
//! MODULE MAP:
//! -----------
//! - `index_vec`  - `IndexVec<I, T>`: vectors indexed by typed indices
//! - `handle`     - `define_handle!`: arena handles with optional sentinel
//!                  and debug-only buffer identity tags
//! - `span`       - source locations, `SourceMap`, line/column lookup
//! - `symbol`     - global string interner (`Symbol`)
//! - `qword`      - `QWord`: the 64-bit payload all literals fold through
//! - `bits`       - `BitSet`, masks, sign extension, alignment helpers
//! - `bytesize`   - binary-unit byte quantities for buffer sizing
//! - `diagnostic` - the composable reporter stack (sink, console, filter,
//!                  limiter)
//! - `error`      - error types shared by the utilities

pub mod bits;
pub mod bytesize;
pub mod diagnostic;
pub mod error;
pub mod handle;
pub mod index_vec;
pub mod qword;
pub mod span;
pub mod symbol;

pub use bits::{align_next, mask_low, sign_extend, BitSet};
pub use bytesize::ByteSize;
pub use diagnostic::{
    ConsoleReporter, FilterReporter, Level, LimiterReporter, RecordingReporter, ReportNumber,
    Reporter, SinkReporter, SourceInfo,
};
pub use handle::BufferId;
pub use index_vec::{Idx, IndexVec};
pub use qword::QWord;
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;
