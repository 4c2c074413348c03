//! Section disassembler.
//!
//! Walks a code section eight bytes at a time, decoding each word with the
//! opcode tables; undecodable words (and a ragged tail) are printed as raw
//! data so the dump never loses bytes.

use std::fmt;

use crate::opcode::Inst;

/// One disassembled line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisasmLine {
    /// A decoded instruction at a byte offset.
    Inst { offset: usize, inst: Inst },
    /// An undecodable word, kept as raw data.
    Raw { offset: usize, word: u64 },
    /// Trailing bytes that do not fill a word.
    Tail { offset: usize, len: usize },
}

impl fmt::Display for DisasmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisasmLine::Inst { offset, inst } => write!(f, "{offset:08X}:  {inst}"),
            DisasmLine::Raw { offset, word } => {
                write!(f, "{offset:08X}:  .quad 0x{word:016X}")
            }
            DisasmLine::Tail { offset, len } => {
                write!(f, "{offset:08X}:  <{len} trailing bytes>")
            }
        }
    }
}

/// Iterator over the disassembly of a byte region.
pub struct Disassembler<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Disassembler<'a> {
    /// Disassemble `data` from its start.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }
}

impl Iterator for Disassembler<'_> {
    type Item = DisasmLine;

    fn next(&mut self) -> Option<DisasmLine> {
        let rest = &self.data[self.offset..];
        if rest.is_empty() {
            return None;
        }
        let offset = self.offset;
        if rest.len() < 8 {
            self.offset = self.data.len();
            return Some(DisasmLine::Tail {
                offset,
                len: rest.len(),
            });
        }
        let word = u64::from_le_bytes(rest[..8].try_into().expect("8-byte slice"));
        self.offset += 8;
        match Inst::decode(word) {
            Some(inst) => Some(DisasmLine::Inst { offset, inst }),
            None => Some(DisasmLine::Raw { offset, word }),
        }
    }
}
