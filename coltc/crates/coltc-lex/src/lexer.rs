//! The lexer: source text in, [`TokenBuffer`] out.
//!
//! Direct-coded scanner in the usual shape: skip whitespace, dispatch on the
//! first character, hand off to a `lex_*` helper per token family. Errors
//! are reported through the [`Reporter`] stack and never abort the scan; the
//! offending region becomes a `Lexeme::Error` token and the scanner skips to
//! the next byte that can start a lexeme.

use std::sync::LazyLock;

use coltc_util::{BitSet, QWord, Reporter, SourceInfo, Symbol};

use crate::{keyword_lexeme, Cursor, Lexeme, TokenBuffer};

/// Bytes that can start a lexeme. Error recovery skips forward until it
/// lands on one of these.
static TOKEN_START: LazyLock<BitSet> = LazyLock::new(|| {
    let mut set = BitSet::new(256);
    for b in b'a'..=b'z' {
        set.insert(b as usize);
    }
    for b in b'A'..=b'Z' {
        set.insert(b as usize);
    }
    for b in b'0'..=b'9' {
        set.insert(b as usize);
    }
    for b in b"_+-*/%&|^<>=!~(){}[].,:;'\" \t\r\n" {
        set.insert(*b as usize);
    }
    set
});

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The lexer for one source buffer.
///
/// # Example
///
/// ```
/// use coltc_lex::{Lexer, Lexeme};
/// use coltc_util::SinkReporter;
///
/// let buf = Lexer::new("demo.ct", "let x = 42u8;", &SinkReporter).lex();
/// let lexemes: Vec<_> = buf.tokens().iter().map(|t| t.lexeme).collect();
/// assert_eq!(
///     lexemes,
///     vec![
///         Lexeme::KwLet,
///         Lexeme::Identifier,
///         Lexeme::Equal,
///         Lexeme::U8Lit,
///         Lexeme::Semicolon,
///         Lexeme::Eof
///     ]
/// );
/// ```
pub struct Lexer<'a, R: Reporter> {
    cursor: Cursor<'a>,
    buf: TokenBuffer,
    reporter: &'a R,
    /// Emit `Lexeme::Comment` tokens instead of skipping comments.
    keep_comments: bool,
    /// Start of the token being scanned.
    token_start: usize,
    token_start_line: u32,
    token_start_column: u32,
}

impl<'a, R: Reporter> Lexer<'a, R> {
    /// Create a lexer over `source`.
    pub fn new(name: impl Into<String>, source: &'a str, reporter: &'a R) -> Self {
        Self {
            cursor: Cursor::new(source),
            buf: TokenBuffer::new(name, source),
            reporter,
            keep_comments: false,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Keep comment tokens in the output (for transpilation).
    #[must_use]
    pub fn with_comments(mut self) -> Self {
        self.keep_comments = true;
        self
    }

    /// Associate the produced buffer (and its spans) with a session file.
    #[must_use]
    pub fn with_file_id(mut self, file_id: coltc_util::FileId) -> Self {
        self.buf = self.buf.with_file_id(file_id);
        self
    }

    /// Lex a raw byte buffer, rejecting invalid UTF-8.
    ///
    /// Each invalid sequence produces one error diagnostic and is dropped;
    /// scanning resumes at the next valid boundary.
    pub fn lex_bytes(name: &str, bytes: &[u8], reporter: &R) -> TokenBuffer {
        let mut clean = String::with_capacity(bytes.len());
        let mut rest = bytes;
        let mut offset = 0usize;
        loop {
            match std::str::from_utf8(rest) {
                Ok(tail) => {
                    clean.push_str(tail);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    // Safe slice: from_utf8 vouched for the prefix.
                    clean.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or(""));
                    reporter.error(
                        &format!(
                            "invalid UTF-8 in '{name}' at byte offset {}",
                            offset + valid
                        ),
                        None,
                        None,
                    );
                    let skip = err.error_len().unwrap_or(rest.len() - valid);
                    rest = &rest[valid + skip..];
                    offset += valid + skip;
                }
            }
        }
        let mut buf = Lexer::new(name, clean.as_str(), reporter).lex();
        if clean.len() != bytes.len() {
            buf.record_error();
        }
        buf
    }

    /// Run the lexer to completion and hand back the token buffer.
    ///
    /// The buffer always ends with a `Lexeme::Eof` token.
    pub fn lex(mut self) -> TokenBuffer {
        while self.scan_token() {}
        self.buf
    }

    /// The span of the token currently being scanned.
    fn span(&self) -> coltc_util::Span {
        coltc_util::Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
        .with_file_id(self.buf.file_id())
    }

    /// Push a token covering everything scanned since `token_start`.
    fn push(&mut self, lexeme: Lexeme) -> u32 {
        let span = self.span();
        self.buf.push(lexeme, span)
    }

    /// Report an error at the start of the current token.
    fn error(&mut self, text: &str) {
        let info = SourceInfo::new(
            self.buf.name(),
            self.token_start_line,
            self.token_start_column,
        );
        self.reporter.error(text, Some(&info), None);
        self.buf.record_error();
    }

    /// Report an error at an explicit position.
    fn error_at(&mut self, text: &str, line: u32, column: u32) {
        let info = SourceInfo::new(self.buf.name(), line, column);
        self.reporter.error(text, Some(&info), None);
        self.buf.record_error();
    }

    /// Skip forward to the next byte that can start a lexeme.
    fn skip_to_boundary(&mut self) {
        loop {
            let c = self.cursor.current();
            if c == '\0' {
                return;
            }
            if (c as u32) < 256 && TOKEN_START.contains(c as usize) {
                return;
            }
            self.cursor.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.current().is_whitespace() {
            self.cursor.advance();
        }
    }

    /// Scan one token; false once `Eof` has been pushed.
    ///
    /// Iterations that swallow a comment push nothing and return true.
    fn scan_token(&mut self) -> bool {
        self.skip_whitespace();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            self.push(Lexeme::Eof);
            return false;
        }

        match self.cursor.current() {
            '(' => self.single(Lexeme::LeftParen),
            ')' => self.single(Lexeme::RightParen),
            '{' => self.single(Lexeme::LeftCurly),
            '}' => self.single(Lexeme::RightCurly),
            '[' => self.single(Lexeme::LeftSquare),
            ']' => self.single(Lexeme::RightSquare),
            ',' => self.single(Lexeme::Comma),
            ';' => self.single(Lexeme::Semicolon),
            '.' => self.single(Lexeme::Dot),
            '~' => self.single(Lexeme::Tilde),

            '+' => self.lex_plus(),
            '-' => self.lex_minus(),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            '%' => self.lex_percent(),
            '&' => self.lex_amp(),
            '|' => self.lex_pipe(),
            '^' => self.lex_caret(),
            '<' => self.lex_less(),
            '>' => self.lex_great(),
            '=' => self.lex_equal(),
            '!' => self.lex_bang(),
            ':' => self.lex_colon(),

            '"' => self.lex_string(),
            '\'' => self.lex_char(),

            c if is_ident_start(c) => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_number(),

            c => {
                self.cursor.advance();
                self.error(&format!("unexpected character {c:?}"));
                self.push(Lexeme::Error);
                self.skip_to_boundary();
            }
        }
        true
    }

    fn single(&mut self, lexeme: Lexeme) {
        self.cursor.advance();
        self.push(lexeme);
    }

    fn lex_plus(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::PlusEqual
        } else if self.cursor.eat('+') {
            Lexeme::PlusPlus
        } else {
            Lexeme::Plus
        };
        self.push(lexeme);
    }

    fn lex_minus(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::MinusEqual
        } else if self.cursor.eat('-') {
            Lexeme::MinusMinus
        } else if self.cursor.eat('>') {
            Lexeme::Arrow
        } else {
            Lexeme::Minus
        };
        self.push(lexeme);
    }

    fn lex_star(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::StarEqual
        } else {
            Lexeme::Star
        };
        self.push(lexeme);
    }

    fn lex_percent(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::PercentEqual
        } else {
            Lexeme::Percent
        };
        self.push(lexeme);
    }

    fn lex_amp(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::AmpEqual
        } else if self.cursor.eat('&') {
            Lexeme::AmpAmp
        } else {
            Lexeme::Amp
        };
        self.push(lexeme);
    }

    fn lex_pipe(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::PipeEqual
        } else if self.cursor.eat('|') {
            Lexeme::PipePipe
        } else {
            Lexeme::Pipe
        };
        self.push(lexeme);
    }

    fn lex_caret(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::CaretEqual
        } else {
            Lexeme::Caret
        };
        self.push(lexeme);
    }

    fn lex_less(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::LessEqual
        } else if self.cursor.eat('<') {
            if self.cursor.eat('=') {
                Lexeme::LessLessEqual
            } else {
                Lexeme::LessLess
            }
        } else {
            Lexeme::Less
        };
        self.push(lexeme);
    }

    fn lex_great(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::GreatEqual
        } else if self.cursor.eat('>') {
            if self.cursor.eat('=') {
                Lexeme::GreatGreatEqual
            } else {
                Lexeme::GreatGreat
            }
        } else {
            Lexeme::Great
        };
        self.push(lexeme);
    }

    fn lex_equal(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::EqualEqual
        } else if self.cursor.eat('>') {
            Lexeme::FatArrow
        } else {
            Lexeme::Equal
        };
        self.push(lexeme);
    }

    fn lex_bang(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::BangEqual
        } else {
            Lexeme::Bang
        };
        self.push(lexeme);
    }

    fn lex_colon(&mut self) {
        self.cursor.advance();
        let lexeme = if self.cursor.eat(':') {
            Lexeme::ColonColon
        } else {
            Lexeme::Colon
        };
        self.push(lexeme);
    }

    fn lex_slash(&mut self) {
        if self.cursor.char_at(1) == '/' {
            while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                self.cursor.advance();
            }
            if self.keep_comments {
                self.push(Lexeme::Comment);
            }
            return;
        }
        if self.cursor.char_at(1) == '*' {
            self.lex_block_comment();
            return;
        }
        self.cursor.advance();
        let lexeme = if self.cursor.eat('=') {
            Lexeme::SlashEqual
        } else {
            Lexeme::Slash
        };
        self.push(lexeme);
    }

    /// Multi-line comments nest and must balance.
    fn lex_block_comment(&mut self) {
        let open_line = self.cursor.line();
        let open_column = self.cursor.column();
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        let mut depth = 1u32;
        while depth > 0 {
            if self.cursor.is_at_end() {
                self.error_at("unterminated multi-line comment", open_line, open_column);
                self.push(Lexeme::Error);
                return;
            }
            if self.cursor.current() == '/' && self.cursor.char_at(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.current() == '*' && self.cursor.char_at(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }
        if self.keep_comments {
            self.push(Lexeme::Comment);
        }
    }

    fn lex_identifier(&mut self) {
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(self.token_start);

        // true/false are literals, not keywords.
        if text == "true" || text == "false" {
            let index = self.push(Lexeme::BoolLit);
            self.buf
                .set_literal(index, QWord::from_bool(text == "true"));
            return;
        }

        match keyword_lexeme(text) {
            Some(keyword) => {
                self.push(keyword);
            }
            None => {
                let symbol = Symbol::intern(text);
                let index = self.push(Lexeme::Identifier);
                self.buf.set_ident(index, symbol);
            }
        }
    }

    fn consume_digits(&mut self, base: u32) {
        while self.cursor.current().is_digit(base) || self.cursor.current() == '_' {
            self.cursor.advance();
        }
    }

    /// Numeric literals: decimal by default, `0x`/`0o`/`0b` prefixes,
    /// optional width suffix, narrowest-unsigned-fit when unsuffixed.
    fn lex_number(&mut self) {
        let mut base = 10u32;
        if self.cursor.current() == '0' {
            match self.cursor.char_at(1) {
                'x' | 'X' => base = 16,
                'o' | 'O' => base = 8,
                'b' | 'B' => base = 2,
                _ => {}
            }
            if base != 10 {
                self.cursor.advance();
                self.cursor.advance();
            }
        }

        let digits_start = self.cursor.position();
        self.consume_digits(base);

        let mut is_real = false;
        if base == 10 {
            if self.cursor.current() == '.' && self.cursor.char_at(1).is_ascii_digit() {
                is_real = true;
                self.cursor.advance();
                self.consume_digits(10);
            }
            let exp = self.cursor.current();
            if exp == 'e' || exp == 'E' {
                let next = self.cursor.char_at(1);
                let after_sign = self.cursor.char_at(2);
                if next.is_ascii_digit()
                    || ((next == '+' || next == '-') && after_sign.is_ascii_digit())
                {
                    is_real = true;
                    self.cursor.advance();
                    if self.cursor.current() == '+' || self.cursor.current() == '-' {
                        self.cursor.advance();
                    }
                    self.consume_digits(10);
                }
            }
        }
        let digits_end = self.cursor.position();

        // Trailing width suffix, if any.
        let suffix_start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let suffix = self.cursor.slice_from(suffix_start).to_owned();
        let digits: String = self.cursor.slice_from(digits_start)
            [..digits_end - digits_start]
            .chars()
            .filter(|c| *c != '_')
            .collect();

        if digits.is_empty() {
            self.error("numeric literal has no digits");
            self.push(Lexeme::Error);
            return;
        }

        if is_real {
            self.lex_real(&digits, &suffix);
        } else {
            self.lex_integer(&digits, base, &suffix);
        }
    }

    fn lex_integer(&mut self, digits: &str, base: u32, suffix: &str) {
        let value = match u128::from_str_radix(digits, base) {
            Ok(v) if v <= u128::from(u64::MAX) => v as u64,
            _ => {
                self.error("integer literal out of range");
                self.push(Lexeme::Error);
                return;
            }
        };

        let (lexeme, max): (Lexeme, u64) = match suffix {
            "" => {
                // Narrowest unsigned width that fits.
                let lexeme = if value <= u64::from(u8::MAX) {
                    Lexeme::U8Lit
                } else if value <= u64::from(u16::MAX) {
                    Lexeme::U16Lit
                } else if value <= u64::from(u32::MAX) {
                    Lexeme::U32Lit
                } else {
                    Lexeme::U64Lit
                };
                (lexeme, u64::MAX)
            }
            "u8" => (Lexeme::U8Lit, u64::from(u8::MAX)),
            "u16" => (Lexeme::U16Lit, u64::from(u16::MAX)),
            "u32" => (Lexeme::U32Lit, u64::from(u32::MAX)),
            "u64" => (Lexeme::U64Lit, u64::MAX),
            "i8" => (Lexeme::I8Lit, i8::MAX as u64),
            "i16" => (Lexeme::I16Lit, i16::MAX as u64),
            "i32" => (Lexeme::I32Lit, i32::MAX as u64),
            "i64" => (Lexeme::I64Lit, i64::MAX as u64),
            "f32" => {
                let index = self.push(Lexeme::F32Lit);
                self.buf.set_literal(index, QWord::from_f32(value as f32));
                return;
            }
            "f64" => {
                let index = self.push(Lexeme::F64Lit);
                self.buf.set_literal(index, QWord::from_f64(value as f64));
                return;
            }
            other => {
                self.error(&format!("invalid literal suffix '{other}'"));
                self.push(Lexeme::Error);
                return;
            }
        };

        if value > max {
            self.error(&format!("literal out of range for {suffix}"));
            self.push(Lexeme::Error);
            return;
        }
        let index = self.push(lexeme);
        self.buf.set_literal(index, QWord::from_u64(value));
    }

    fn lex_real(&mut self, digits: &str, suffix: &str) {
        match suffix {
            "" | "f64" => match digits.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    let index = self.push(Lexeme::F64Lit);
                    self.buf.set_literal(index, QWord::from_f64(v));
                }
                _ => {
                    self.error("real literal out of range");
                    self.push(Lexeme::Error);
                }
            },
            "f32" => match digits.parse::<f32>() {
                Ok(v) if v.is_finite() => {
                    let index = self.push(Lexeme::F32Lit);
                    self.buf.set_literal(index, QWord::from_f32(v));
                }
                _ => {
                    self.error("real literal out of range");
                    self.push(Lexeme::Error);
                }
            },
            other => {
                self.error(&format!("invalid suffix '{other}' for real literal"));
                self.push(Lexeme::Error);
            }
        }
    }

    /// Decode one escape sequence; the cursor sits on the backslash.
    fn lex_escape(&mut self) -> Option<char> {
        let line = self.cursor.line();
        let column = self.cursor.column();
        self.cursor.advance(); // backslash
        let c = self.cursor.current();
        self.cursor.advance();
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'x' => self.lex_hex_escape(2, line, column),
            'u' => self.lex_hex_escape(4, line, column),
            other => {
                self.error_at(&format!("invalid escape sequence '\\{other}'"), line, column);
                None
            }
        }
    }

    fn lex_hex_escape(&mut self, count: u32, line: u32, column: u32) -> Option<char> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self.cursor.current().to_digit(16);
            match digit {
                Some(d) => {
                    value = value * 16 + d;
                    self.cursor.advance();
                }
                None => {
                    self.error_at("invalid hexadecimal escape sequence", line, column);
                    return None;
                }
            }
        }
        match char::from_u32(value) {
            Some(c) => Some(c),
            None => {
                self.error_at("escape is not a valid Unicode scalar", line, column);
                None
            }
        }
    }

    fn lex_char(&mut self) {
        self.cursor.advance(); // opening quote
        if self.cursor.is_at_end() || self.cursor.current() == '\n' {
            self.error("unterminated char literal");
            self.push(Lexeme::Error);
            return;
        }
        let value = if self.cursor.current() == '\\' {
            self.lex_escape()
        } else {
            let c = self.cursor.current();
            self.cursor.advance();
            Some(c)
        };
        if !self.cursor.eat('\'') {
            self.error("char literal must contain exactly one character");
            while !self.cursor.is_at_end()
                && self.cursor.current() != '\''
                && self.cursor.current() != '\n'
            {
                self.cursor.advance();
            }
            self.cursor.eat('\'');
            self.push(Lexeme::Error);
            return;
        }
        match value {
            Some(c) => {
                let index = self.push(Lexeme::CharLit);
                self.buf.set_literal(index, QWord::from_char(c));
            }
            None => {
                // The escape error was already reported.
                self.push(Lexeme::Error);
            }
        }
    }

    fn lex_string(&mut self) {
        let open_line = self.cursor.line();
        let open_column = self.cursor.column();
        self.cursor.advance(); // opening quote
        let mut contents = String::new();
        let mut bad_escape = false;
        loop {
            let c = self.cursor.current();
            if self.cursor.is_at_end() || c == '\n' {
                self.error_at("unterminated string literal", open_line, open_column);
                self.push(Lexeme::Error);
                return;
            }
            if c == '"' {
                self.cursor.advance();
                break;
            }
            if c == '\\' {
                match self.lex_escape() {
                    Some(decoded) => contents.push(decoded),
                    None => bad_escape = true,
                }
            } else {
                contents.push(c);
                self.cursor.advance();
            }
        }
        if bad_escape {
            self.push(Lexeme::Error);
            return;
        }
        let table_index = self.buf.push_string(contents);
        let index = self.push(Lexeme::StringLit);
        self.buf
            .set_literal(index, QWord::from_u64(u64::from(table_index)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenRange;
    use coltc_util::{RecordingReporter, SinkReporter};

    fn lex(source: &str) -> TokenBuffer {
        Lexer::new("test.ct", source, &SinkReporter).lex()
    }

    fn lexemes(buf: &TokenBuffer) -> Vec<Lexeme> {
        buf.tokens().iter().map(|t| t.lexeme).collect()
    }

    #[test]
    fn test_empty_input() {
        let buf = lex("");
        assert_eq!(lexemes(&buf), vec![Lexeme::Eof]);
        assert_eq!(buf.error_count(), 0);
    }

    #[test]
    fn test_let_x_equals_42u8() {
        let buf = lex("let x = 42u8;");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::KwLet,
                Lexeme::Identifier,
                Lexeme::Equal,
                Lexeme::U8Lit,
                Lexeme::Semicolon,
                Lexeme::Eof
            ]
        );
        assert_eq!(buf.ident(1).unwrap().as_str(), "x");
        assert_eq!(buf.literal(3).unwrap().as_u8(), 42);
    }

    #[test]
    fn test_maximal_munch_operators() {
        let buf = lex("<<= << <= < -> => :: ++ >>=");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::LessLessEqual,
                Lexeme::LessLess,
                Lexeme::LessEqual,
                Lexeme::Less,
                Lexeme::Arrow,
                Lexeme::FatArrow,
                Lexeme::ColonColon,
                Lexeme::PlusPlus,
                Lexeme::GreatGreatEqual,
                Lexeme::Eof
            ]
        );
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let buf = lex("a\n  b");
        let a = buf.token(0).span;
        let b = buf.token(1).span;
        assert_eq!((a.line, a.column), (1, 1));
        assert_eq!((b.line, b.column), (2, 3));
    }

    #[test]
    fn test_narrowest_unsigned_fit() {
        let buf = lex("5 300 70000 5000000000");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::U8Lit,
                Lexeme::U16Lit,
                Lexeme::U32Lit,
                Lexeme::U64Lit,
                Lexeme::Eof
            ]
        );
        assert_eq!(buf.literal(1).unwrap().as_u16(), 300);
        assert_eq!(buf.literal(3).unwrap().as_u64(), 5_000_000_000);
    }

    #[test]
    fn test_explicit_suffixes() {
        let buf = lex("1u16 2i8 3i64 4u64");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::U16Lit,
                Lexeme::I8Lit,
                Lexeme::I64Lit,
                Lexeme::U64Lit,
                Lexeme::Eof
            ]
        );
    }

    #[test]
    fn test_bases_and_separators() {
        let buf = lex("0xFF 0b1010_1010 0o77");
        assert_eq!(buf.literal(0).unwrap().as_u8(), 0xFF);
        assert_eq!(buf.literal(1).unwrap().as_u8(), 0b1010_1010);
        assert_eq!(buf.literal(2).unwrap().as_u8(), 0o77);
    }

    #[test]
    fn test_hex_with_suffix() {
        let buf = lex("0xFFu16");
        assert_eq!(lexemes(&buf), vec![Lexeme::U16Lit, Lexeme::Eof]);
        assert_eq!(buf.literal(0).unwrap().as_u16(), 0xFF);
    }

    #[test]
    fn test_real_literals() {
        let buf = lex("3.25 1e3 2.5e-1 1.5f32 7f64");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::F64Lit,
                Lexeme::F64Lit,
                Lexeme::F64Lit,
                Lexeme::F32Lit,
                Lexeme::F64Lit,
                Lexeme::Eof
            ]
        );
        assert_eq!(buf.literal(0).unwrap().as_f64(), 3.25);
        assert_eq!(buf.literal(1).unwrap().as_f64(), 1000.0);
        assert_eq!(buf.literal(2).unwrap().as_f64(), 0.25);
        assert_eq!(buf.literal(3).unwrap().as_f32(), 1.5);
    }

    #[test]
    fn test_integer_overflow_is_lexical_error() {
        let rec = RecordingReporter::new();
        let buf = Lexer::new("t.ct", "256u8 40000i16", &rec).lex();
        assert_eq!(lexemes(&buf), vec![Lexeme::Error, Lexeme::Error, Lexeme::Eof]);
        assert_eq!(buf.error_count(), 2);
        assert_eq!(rec.count(coltc_util::Level::Error), 2);
    }

    #[test]
    fn test_u64_overflow() {
        let buf = lex("99999999999999999999999999");
        assert_eq!(lexemes(&buf), vec![Lexeme::Error, Lexeme::Eof]);
    }

    #[test]
    fn test_invalid_suffix() {
        let buf = lex("1u12");
        assert_eq!(lexemes(&buf), vec![Lexeme::Error, Lexeme::Eof]);
        assert_eq!(buf.error_count(), 1);
    }

    #[test]
    fn test_bool_literals() {
        let buf = lex("true false");
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::BoolLit, Lexeme::BoolLit, Lexeme::Eof]
        );
        assert!(buf.literal(0).unwrap().as_bool());
        assert!(!buf.literal(1).unwrap().as_bool());
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let buf = lex("var mutable mut BYTE bytes");
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::KwVar,
                Lexeme::Identifier,
                Lexeme::KwMut,
                Lexeme::KwByte,
                Lexeme::Identifier,
                Lexeme::Eof
            ]
        );
        assert_eq!(buf.ident(1).unwrap().as_str(), "mutable");
    }

    #[test]
    fn test_char_literals_and_escapes() {
        let buf = lex(r"'a' '\n' '\\' '\x41' 'α'");
        assert_eq!(buf.literal(0).unwrap().as_char(), 'a');
        assert_eq!(buf.literal(1).unwrap().as_char(), '\n');
        assert_eq!(buf.literal(2).unwrap().as_char(), '\\');
        assert_eq!(buf.literal(3).unwrap().as_char(), 'A');
        assert_eq!(buf.literal(4).unwrap().as_char(), 'α');
    }

    #[test]
    fn test_char_literal_errors() {
        let rec = RecordingReporter::new();
        let buf = Lexer::new("t.ct", "'ab' '\\q'", &rec).lex();
        assert_eq!(lexemes(&buf), vec![Lexeme::Error, Lexeme::Error, Lexeme::Eof]);
        assert_eq!(buf.error_count(), 2);
    }

    #[test]
    fn test_string_literals() {
        let buf = lex(r#""hello" "a\tb\"c""#);
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::StringLit, Lexeme::StringLit, Lexeme::Eof]
        );
        let first = buf.literal(0).unwrap().as_u64() as u32;
        let second = buf.literal(1).unwrap().as_u64() as u32;
        assert_eq!(buf.string(first), Some("hello"));
        assert_eq!(buf.string(second), Some("a\tb\"c"));
    }

    #[test]
    fn test_unterminated_string() {
        let rec = RecordingReporter::new();
        let buf = Lexer::new("t.ct", "\"oops\nnext", &rec).lex();
        assert_eq!(buf.token(0).lexeme, Lexeme::Error);
        assert!(rec.reports()[0].1.contains("unterminated string"));
    }

    #[test]
    fn test_line_comments_are_skipped() {
        let buf = lex("a // comment\nb");
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::Identifier, Lexeme::Identifier, Lexeme::Eof]
        );
    }

    #[test]
    fn test_block_comments_nest() {
        let buf = lex("a /* outer /* inner */ still */ b");
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::Identifier, Lexeme::Identifier, Lexeme::Eof]
        );
    }

    #[test]
    fn test_unterminated_block_comment_reports_opening() {
        let rec = RecordingReporter::new();
        let buf = Lexer::new("t.ct", "a /* never closed", &rec).lex();
        assert_eq!(buf.error_count(), 1);
        assert!(rec.reports()[0].1.contains("unterminated multi-line comment"));
    }

    #[test]
    fn test_keep_comments_mode() {
        let buf = Lexer::new("t.ct", "a // c\n/* d */ b", &SinkReporter)
            .with_comments()
            .lex();
        assert_eq!(
            lexemes(&buf),
            vec![
                Lexeme::Identifier,
                Lexeme::Comment,
                Lexeme::Comment,
                Lexeme::Identifier,
                Lexeme::Eof
            ]
        );
    }

    #[test]
    fn test_error_recovery_continues() {
        let rec = RecordingReporter::new();
        let buf = Lexer::new("t.ct", "let @ x", &rec).lex();
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::KwLet, Lexeme::Error, Lexeme::Identifier, Lexeme::Eof]
        );
        assert!(rec.reports()[0].1.contains("unexpected character"));
    }

    #[test]
    fn test_lex_bytes_rejects_invalid_utf8() {
        let rec = RecordingReporter::new();
        let bytes = b"let \xFF x";
        let buf = Lexer::lex_bytes("t.ct", bytes, &rec);
        // The invalid byte is dropped; scanning continues.
        assert_eq!(
            lexemes(&buf),
            vec![Lexeme::KwLet, Lexeme::Identifier, Lexeme::Eof]
        );
        assert!(rec.reports()[0].1.contains("invalid UTF-8"));
        assert!(buf.error_count() >= 1);
    }

    #[test]
    fn test_span_of_range_covers_statement() {
        let buf = lex("let x = 1;");
        let range = TokenRange::new(0, 5);
        let span = buf.span_of(range);
        assert_eq!(buf.snippet(span), "let x = 1;");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn lexer_never_panics(source in ".{0,200}") {
                let _ = Lexer::new("fuzz.ct", &source, &SinkReporter).lex();
            }

            #[test]
            fn buffer_always_ends_with_eof(source in ".{0,200}") {
                let buf = Lexer::new("fuzz.ct", &source, &SinkReporter).lex();
                prop_assert_eq!(buf.tokens().last().unwrap().lexeme, Lexeme::Eof);
            }

            #[test]
            fn unsuffixed_integers_fit_their_width(value in 0u64..=u64::MAX) {
                let buf = Lexer::new("fuzz.ct", &value.to_string(), &SinkReporter).lex();
                let token = buf.token(0);
                let stored = buf.literal(0).unwrap().as_u64();
                prop_assert_eq!(stored, value);
                let expected = if value <= u64::from(u8::MAX) {
                    Lexeme::U8Lit
                } else if value <= u64::from(u16::MAX) {
                    Lexeme::U16Lit
                } else if value <= u64::from(u32::MAX) {
                    Lexeme::U32Lit
                } else {
                    Lexeme::U64Lit
                };
                prop_assert_eq!(token.lexeme, expected);
            }
        }
    }
}
