//! Token storage: the `TokenBuffer` and its side tables.
//!
//! The buffer owns everything the later stages need from the lexical pass:
//! the token vector, the literal-value table keyed by token index, the
//! string-literal table, the identifier table and a copy of the source
//! text with its line-start index. Parsers refer to tokens by plain `u32`
//! indices and to runs of tokens by half-open [`TokenRange`]s.

use coltc_util::{ByteSize, FileId, QWord, SourceFile, SourceInfo, Span, Symbol};
use rustc_hash::FxHashMap;
use std::fmt;

/// A single token: its lexeme and where it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub lexeme: crate::Lexeme,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(lexeme: crate::Lexeme, span: Span) -> Self {
        Token { lexeme, span }
    }
}

/// A half-open range `[begin, end)` of token indices.
///
/// # Examples
///
/// ```
/// use coltc_lex::TokenRange;
///
/// let range = TokenRange::new(2, 5);
/// assert_eq!(range.len(), 3);
/// assert!(!range.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenRange {
    pub begin: u32,
    pub end: u32,
}

impl TokenRange {
    /// An empty range at the origin, for synthesized expressions.
    pub const EMPTY: TokenRange = TokenRange { begin: 0, end: 0 };

    /// Create a range; `begin` must not exceed `end`.
    #[inline]
    pub fn new(begin: u32, end: u32) -> Self {
        debug_assert!(begin <= end, "inverted token range {begin}..{end}");
        TokenRange { begin, end }
    }

    /// A range covering the single token `index`.
    #[inline]
    pub fn single(index: u32) -> Self {
        TokenRange {
            begin: index,
            end: index + 1,
        }
    }

    /// Number of tokens covered.
    #[inline]
    pub fn len(self) -> usize {
        (self.end - self.begin) as usize
    }

    /// True if no token is covered.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.begin == self.end
    }

    /// The smallest range covering both `self` and `other`.
    #[inline]
    pub fn merge(self, other: TokenRange) -> TokenRange {
        TokenRange {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
        }
    }
}

/// Owner of the lexical pass results for one source buffer.
///
/// Reusable: [`TokenBuffer::reset`] clears all storage while keeping
/// capacity, invalidating any outstanding token indices.
pub struct TokenBuffer {
    /// The source file: name, text and line-start table.
    file: SourceFile,
    /// Identity of the file within the session's source map.
    file_id: FileId,
    /// All tokens, in source order; ends with `Lexeme::Eof`.
    tokens: Vec<Token>,
    /// Literal payloads, keyed by token index.
    literals: FxHashMap<u32, QWord>,
    /// Interned identifier spellings, keyed by token index.
    idents: FxHashMap<u32, Symbol>,
    /// String literal contents; a string literal's payload is an index here.
    strings: Vec<String>,
    /// Number of lexical errors hit while producing this buffer.
    errors: u32,
}

impl TokenBuffer {
    /// An empty buffer for `source`, named `name`.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        // Rough heuristic: one token per four bytes of source.
        let estimated = source.len() / 4;
        TokenBuffer {
            file: SourceFile::new(name.into(), source),
            file_id: FileId::DUMMY,
            tokens: Vec::with_capacity(estimated),
            literals: FxHashMap::default(),
            idents: FxHashMap::default(),
            strings: Vec::new(),
            errors: 0,
        }
    }

    /// Associate the buffer with a session file id.
    pub fn with_file_id(mut self, file_id: FileId) -> Self {
        self.file_id = file_id;
        self
    }

    /// The name of the source.
    pub fn name(&self) -> &str {
        &self.file.name
    }

    /// The full source text.
    pub fn source(&self) -> &str {
        &self.file.src
    }

    /// The session file id.
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// Append a token, returning its index.
    pub fn push(&mut self, lexeme: crate::Lexeme, span: Span) -> u32 {
        assert!(
            self.tokens.len() < u32::MAX as usize,
            "token buffer overflow"
        );
        let index = self.tokens.len() as u32;
        self.tokens.push(Token::new(lexeme, span));
        index
    }

    /// Record the literal payload of the token at `index`.
    pub fn set_literal(&mut self, index: u32, value: QWord) {
        debug_assert!((index as usize) < self.tokens.len());
        self.literals.insert(index, value);
    }

    /// Record the interned spelling of the identifier at `index`.
    pub fn set_ident(&mut self, index: u32, symbol: Symbol) {
        debug_assert!((index as usize) < self.tokens.len());
        self.idents.insert(index, symbol);
    }

    /// Store a string literal's contents, returning its table index.
    pub fn push_string(&mut self, contents: String) -> u32 {
        let index = self.strings.len() as u32;
        self.strings.push(contents);
        index
    }

    /// The token at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn token(&self, index: u32) -> Token {
        self.tokens[index as usize]
    }

    /// All tokens, in source order.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no token was pushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The literal payload of the token at `index`, if it is a literal.
    #[inline]
    pub fn literal(&self, index: u32) -> Option<QWord> {
        self.literals.get(&index).copied()
    }

    /// The interned spelling of the identifier at `index`.
    #[inline]
    pub fn ident(&self, index: u32) -> Option<Symbol> {
        self.idents.get(&index).copied()
    }

    /// The contents of string literal `table_index` (as stored by
    /// [`Self::push_string`]).
    #[inline]
    pub fn string(&self, table_index: u32) -> Option<&str> {
        self.strings.get(table_index as usize).map(String::as_str)
    }

    /// The source span covering a token range.
    pub fn span_of(&self, range: TokenRange) -> Span {
        if range.is_empty() || range.begin as usize >= self.tokens.len() {
            return Span::DUMMY;
        }
        let last = (range.end - 1).min(self.tokens.len() as u32 - 1);
        self.token(range.begin).span.merge(self.token(last).span)
    }

    /// Resolve a span to a reporter-ready source position.
    pub fn source_info(&self, span: Span) -> SourceInfo {
        let (line, column) = self.file.line_col(span.start);
        SourceInfo::new(self.file.name.clone(), line, column)
    }

    /// The source text under a span.
    pub fn snippet(&self, span: Span) -> &str {
        let end = span.end.min(self.file.src.len());
        let start = span.start.min(end);
        &self.file.src[start..end]
    }

    /// Note one lexical error against this buffer.
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Number of lexical errors hit while producing this buffer.
    #[inline]
    pub fn error_count(&self) -> u32 {
        self.errors
    }

    /// Approximate memory footprint of the token storage.
    pub fn footprint(&self) -> ByteSize {
        ByteSize::of_slice::<Token>(self.tokens.len())
            + ByteSize::of_slice::<(u32, QWord)>(self.literals.len())
            + ByteSize::new(self.strings.iter().map(|s| s.len() as u64).sum())
    }

    /// Clear all storage while keeping capacity.
    ///
    /// Outstanding token indices and ranges become meaningless; this is
    /// intended for test harnesses that reuse one buffer across inputs.
    pub fn reset(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.file = SourceFile::new(name.into(), source.into());
        self.tokens.clear();
        self.literals.clear();
        self.idents.clear();
        self.strings.clear();
        self.errors = 0;
    }
}

impl fmt::Debug for TokenBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenBuffer {{ {:?}, {} tokens, {} literals, {} strings, {} }}",
            self.file.name,
            self.tokens.len(),
            self.literals.len(),
            self.strings.len(),
            self.footprint()
        )
    }
}
