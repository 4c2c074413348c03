//! String interner implementation using DashMap for concurrent access.
//!
//! The table is process-global and lock-free: the compiler core is
//! single-threaded, but test harnesses and future drivers may intern from
//! several threads, and a `DashMap` costs nothing in the single-threaded
//! case. Interned strings are leaked to obtain `'static` references; the
//! table lives for the whole process and entries are never removed, so the
//! leak is bounded by the set of distinct strings.
//!
//! All Colt keywords are pre-interned at initialization so they occupy
//! stable, predictable indices.

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::LazyLock;

use super::Symbol;

/// Global string table instance.
///
/// Initialized on first use via `LazyLock`; all Colt keywords are interned
/// during initialization.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    table.initialize_keywords();
    table
});

/// The Colt keywords, in lexeme declaration order.
///
/// Pre-interning keeps their symbol indices dense and stable from process
/// start, independent of lexing order.
pub(crate) const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "break", "continue",
    "var", "let", "mut", "global",
    "void", "bool", "char", "u8", "u16", "u32", "u64", "i8", "i16", "i32",
    "i64", "f32", "f64", "BYTE", "WORD", "DWORD", "QWORD",
    "ptr", "mutptr", "opaque", "mutopaque",
    "fn", "return", "extern", "const", "in", "out", "inout", "move", "copy",
    "typeof", "sizeof", "alignof", "alignas",
    "as", "bit_as", "using", "public", "private", "module",
    "switch", "case", "default", "goto", "undefined",
];

/// Thread-safe string table.
///
/// Two maps are kept: string → index for interning, index → string for
/// retrieval. Both store the same leaked `&'static str`, so `get` is O(1)
/// and hands out views that never move.
pub struct StringTable {
    /// Maps interned string to its symbol index.
    map: DashMap<&'static str, u32, RandomState>,

    /// Maps symbol index back to the interned string.
    rev: DashMap<u32, &'static str, RandomState>,

    /// Counter for the next symbol index.
    next_index: AtomicU32,

    /// Number of intern calls that found the string already present.
    hits: AtomicUsize,

    /// Number of intern calls that allocated a new entry.
    misses: AtomicUsize,
}

impl StringTable {
    /// Create a new empty string table.
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            rev: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            next_index: AtomicU32::new(0),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Intern every Colt keyword. Called exactly once at initialization.
    fn initialize_keywords(&self) {
        for kw in KEYWORDS {
            self.intern(kw);
        }
    }

    /// Intern a string, returning its symbol.
    ///
    /// If the string is already interned, returns the existing symbol;
    /// otherwise leaks a copy with `'static` lifetime and allocates a fresh
    /// index.
    ///
    /// # Thread Safety
    ///
    /// Multiple threads may intern concurrently. When two threads race on
    /// the same new string, one insertion wins and the other's leaked copy
    /// is abandoned (a few bytes, once).
    pub fn intern(&self, string: &str) -> Symbol {
        // Fast path: already interned.
        if let Some(entry) = self.map.get(string) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Symbol { index: *entry };
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());

        match self.map.entry(leaked) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Symbol {
                index: *entry.get(),
            },
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                entry.insert(index);
                self.rev.insert(index, leaked);
                Symbol { index }
            }
        }
    }

    /// Get the string for a symbol, or `None` for a forged index.
    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.rev.get(&symbol.index).map(|entry| *entry)
    }

    /// Statistics about the table, for profiling.
    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.rev.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of interner statistics.
#[derive(Clone, Copy, Debug)]
pub struct InternerStats {
    /// Number of distinct interned strings.
    pub count: usize,
    /// Intern calls that found an existing entry.
    pub hits: usize,
    /// Intern calls that created a new entry.
    pub misses: usize,
}
