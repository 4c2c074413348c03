//! coltc-lex - Lexical Analyzer
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! This crate turns a UTF-8 source buffer into a [`TokenBuffer`]: a vector of
//! `(lexeme, span)` tokens plus the literal side-tables, ready for parsing.
//!
//! ```text
//! Source text ──▶ Cursor ──▶ Lexer ──▶ TokenBuffer
//!                                         │
//!                                         ├── tokens:   Vec<(Lexeme, Span)>
//!                                         ├── literals: token index → QWord
//!                                         ├── idents:   token index → Symbol
//!                                         └── strings:  string literal table
//! ```
//!
//! THE LEXEME ORDER IS LOAD-BEARING
//! --------------------------------
//! [`Lexeme`] is a single closed `u8` enumeration whose declaration order
//! fixes several dense ranges. Every category check in the compiler is a
//! range comparison over that order, and a compound-assignment operator is
//! mapped to its plain counterpart by subtracting a fixed constant:
//!
//! ```text
//! Plus ..= GreatGreat          binary arithmetic / bitwise / shift
//! AmpAmp ..= EqualEqual        boolean producers
//! Less ..= EqualEqual          strict comparisons
//! Equal ..= GreatGreatEqual    assignment family
//! PlusEqual ..= GreatGreatEqual direct (compound) assignments; -19 ⇒ plain
//! BoolLit ..= StringLit        literals
//! KwBool ..= KwQword           builtin type keywords
//! ```
//!
//! Do not reorder variants without updating every range above; the test
//! suite pins each boundary.
//!
//! ERROR RECOVERY
//! --------------
//! The lexer never aborts: a bad character produces one diagnostic and one
//! `Lexeme::Error` token, then the scanner skips to the next byte that can
//! start a lexeme and continues. Unterminated strings and block comments are
//! reported at their opening position.

pub mod cursor;
pub mod lexeme;
pub mod lexer;
pub mod operators;
pub mod token;

pub use cursor::Cursor;
pub use lexeme::{keyword_lexeme, Lexeme};
pub use lexer::Lexer;
pub use operators::{BinaryOp, OpAssoc, OpFamily, UnaryOp};
pub use token::{Token, TokenBuffer, TokenRange};
