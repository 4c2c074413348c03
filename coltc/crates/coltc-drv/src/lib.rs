//! coltc-drv - Compiler Driver
//!
//! ============================================================================
//! OVERVIEW
//! ============================================================================
//!
//! The driver owns one compilation session: the source map, the type
//! buffer, the reporter stack and the options parsed from the command line.
//! The pipeline at this stage of the language is
//!
//! ```text
//! read file ──▶ lex ──▶ report diagnostics ──▶ write container (-o)
//! ```
//!
//! with the expression buffer and the constant folder exposed for the
//! parser that sits on top of this crate.
//!
//! REPORTER STACK
//! --------------
//! Diagnostics flow through `Limiter<Filter<Console>>`: the per-severity
//! caps come from `--max-error`/`--max-warn`/`--max-msg` (`None` means
//! unlimited; `0` is invalid and falls back to the defaults 32/64/128),
//! and colouring follows `--nocolor`.
//!
//! FOLDING GLUE
//! ------------
//! The constant folder works on operand tags; this crate maps builtin ids
//! onto tags, dispatches a binary/unary operator to the right fold
//! routine, and turns the returned [`OpError`] into a diagnostic gated by
//! the session's [`WarnFor`] mask.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

use coltc_ast::WarnFor;
use coltc_exe::{ColtVersion, ExecutableBuilder, Timestamp};
use coltc_fold::{FoldResult, OpError, OperandType};
use coltc_lex::{BinaryOp, Lexer, TokenBuffer, UnaryOp};
use coltc_types::{BuiltinID, TypeBuffer};
use coltc_util::{
    ConsoleReporter, FilterReporter, LimiterReporter, QWord, Reporter, SourceInfo, SourceMap,
};

/// The language version embedded in executables and printed by `-v`.
pub const LANG_VERSION: ColtVersion = ColtVersion::new(0, 1, 0);

/// Default per-severity report caps.
pub const DEFAULT_MAX_ERRORS: u16 = 32;
pub const DEFAULT_MAX_WARNINGS: u16 = 64;
pub const DEFAULT_MAX_MESSAGES: u16 = 128;

/// Options consumed by a session.
#[derive(Clone, Debug)]
pub struct Options {
    /// Disable ANSI colouring.
    pub nocolor: bool,
    /// Do not pause before exit.
    pub nowait: bool,
    /// Indentation width used when transpiling.
    pub space: u8,
    /// Cap on reported errors; `None` is unlimited.
    pub max_errors: Option<u16>,
    /// Cap on reported warnings; `None` is unlimited.
    pub max_warnings: Option<u16>,
    /// Cap on reported messages; `None` is unlimited.
    pub max_messages: Option<u16>,
    /// Output file for the container image.
    pub output: Option<PathBuf>,
    /// Warning mask.
    pub warn: WarnFor,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            nocolor: false,
            nowait: false,
            space: 2,
            max_errors: Some(DEFAULT_MAX_ERRORS),
            max_warnings: Some(DEFAULT_MAX_WARNINGS),
            max_messages: Some(DEFAULT_MAX_MESSAGES),
            output: None,
            warn: WarnFor::warn_all(),
        }
    }
}

/// A requested report cap, as parsed from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapRequest {
    /// `None`: no cap.
    Unlimited,
    /// A numeric cap (zero is invalid input).
    Limit(u16),
}

impl CapRequest {
    /// Parse `None` or a number.
    pub fn parse(text: &str) -> Result<CapRequest, String> {
        if text.eq_ignore_ascii_case("none") {
            return Ok(CapRequest::Unlimited);
        }
        text.parse::<u16>()
            .map(CapRequest::Limit)
            .map_err(|_| format!("'{text}' is not 'None' or a number up to 65535"))
    }

    /// Resolve to an option value, replacing the invalid `0` with
    /// `default_cap` (and telling the user).
    pub fn sanitize(self, flag: &str, default_cap: u16) -> Option<u16> {
        match self {
            CapRequest::Unlimited => None,
            CapRequest::Limit(0) => {
                eprintln!("warning: '0' is not a valid value for '{flag}', using {default_cap}");
                Some(default_cap)
            }
            CapRequest::Limit(n) => Some(n),
        }
    }
}

/// The driver's standard reporter stack.
pub type DriverReporter = LimiterReporter<FilterReporter<ConsoleReporter>>;

/// Build the `Limiter<Filter<Console>>` stack for `options`.
pub fn build_reporter(options: &Options) -> DriverReporter {
    LimiterReporter::new(
        options.max_errors,
        options.max_warnings,
        options.max_messages,
        FilterReporter::new(ConsoleReporter::new(!options.nocolor)),
    )
}

/// One compiler invocation: sources, types and the reporter stack.
pub struct Session<R: Reporter> {
    pub options: Options,
    pub sources: SourceMap,
    pub types: TypeBuffer,
    reporter: R,
}

impl<R: Reporter> Session<R> {
    /// A fresh session reporting through `reporter`.
    pub fn new(options: Options, reporter: R) -> Self {
        Self {
            options,
            sources: SourceMap::new(),
            types: TypeBuffer::new(),
            reporter,
        }
    }

    /// The reporter stack.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Lex a source string under `name`.
    pub fn lex_source(&mut self, name: &str, source: &str) -> TokenBuffer {
        let file_id = self.sources.add_file(name, source);
        Lexer::new(name, source, &self.reporter)
            .with_file_id(file_id)
            .lex()
    }

    /// Read and lex a file, rejecting invalid UTF-8 byte by byte.
    pub fn lex_file(&mut self, path: &Path) -> anyhow::Result<TokenBuffer> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("cannot read input file '{}'", path.display()))?;
        let name = path.display().to_string();
        let buf = Lexer::lex_bytes(&name, &bytes, &self.reporter);
        self.sources.add_file(&name, buf.source());
        Ok(buf)
    }

    /// Write the (front-end) container image for a compiled buffer.
    ///
    /// The image carries the language version, the compilation timestamp,
    /// an empty code section for the back-end to fill, and the source text
    /// for the transpiler.
    pub fn write_executable(&self, tokens: &TokenBuffer, path: &Path) -> anyhow::Result<()> {
        let mut builder = ExecutableBuilder::new(LANG_VERSION, timestamp_now());
        builder
            .push_section("code", Vec::new())
            .expect("static section name");
        builder
            .push_section("source", tokens.source().as_bytes().to_vec())
            .expect("static section name");
        std::fs::write(path, builder.build())
            .with_context(|| format!("cannot write output file '{}'", path.display()))?;
        Ok(())
    }

    /// Fold a binary operator over two literal payloads, reporting the
    /// outcome through the warning mask. Returns the folded payload (the
    /// left operand when the operation is not foldable).
    pub fn fold_binary(
        &self,
        tokens: &TokenBuffer,
        span: coltc_util::Span,
        op: BinaryOp,
        a: QWord,
        b: QWord,
        id: BuiltinID,
    ) -> QWord {
        let (value, err) = fold_binary_op(op, a, b, id);
        self.report_fold(tokens, span, err);
        value
    }

    /// Fold a unary operator over a literal payload, reporting the outcome
    /// through the warning mask.
    pub fn fold_unary(
        &self,
        tokens: &TokenBuffer,
        span: coltc_util::Span,
        op: UnaryOp,
        a: QWord,
        id: BuiltinID,
    ) -> QWord {
        let (value, err) = fold_unary_op(op, a, id);
        self.report_fold(tokens, span, err);
        value
    }

    /// Route one fold outcome to the reporter, honouring the mask.
    fn report_fold(&self, tokens: &TokenBuffer, span: coltc_util::Span, err: OpError) {
        let info = tokens.source_info(span);
        report_fold_outcome(&self.reporter, &self.options.warn, err, Some(&info));
    }
}

/// The operand tag a builtin id folds under; `None` when the id has no
/// arithmetic domain (`bool`, `char`).
pub fn operand_type_of(id: BuiltinID) -> Option<OperandType> {
    match id {
        BuiltinID::Bool | BuiltinID::Char => None,
        BuiltinID::U8 | BuiltinID::Byte => Some(OperandType::U8),
        BuiltinID::U16 | BuiltinID::Word => Some(OperandType::U16),
        BuiltinID::U32 | BuiltinID::Dword => Some(OperandType::U32),
        BuiltinID::U64 | BuiltinID::Qword => Some(OperandType::U64),
        BuiltinID::I8 => Some(OperandType::I8),
        BuiltinID::I16 => Some(OperandType::I16),
        BuiltinID::I32 => Some(OperandType::I32),
        BuiltinID::I64 => Some(OperandType::I64),
        BuiltinID::F32 => Some(OperandType::F32),
        BuiltinID::F64 => Some(OperandType::F64),
    }
}

/// Dispatch a binary operator to the fold engine under a builtin id.
///
/// Operators outside the foldable set (assignments, short-circuit bools on
/// non-bool ids, anything on `char`) come back as `InvalidOp`.
pub fn fold_binary_op(op: BinaryOp, a: QWord, b: QWord, id: BuiltinID) -> FoldResult {
    use coltc_fold as fold;

    // Bool only folds its bitwise/logical connectives and equality.
    if id.is_bool() {
        let (x, y) = (a.as_bool(), b.as_bool());
        let value = match op {
            BinaryOp::BitAnd | BinaryOp::BoolAnd => x && y,
            BinaryOp::BitOr | BinaryOp::BoolOr => x || y,
            BinaryOp::BitXor | BinaryOp::NotEqual => x != y,
            BinaryOp::Equal => x == y,
            _ => return (a, OpError::InvalidOp),
        };
        return (QWord::from_bool(value), OpError::NoError);
    }

    let Some(tag) = operand_type_of(id) else {
        return (a, OpError::InvalidOp);
    };
    let width = id.bit_width();
    match op {
        BinaryOp::Sum => fold::add(a, b, tag),
        BinaryOp::Sub => fold::sub(a, b, tag),
        BinaryOp::Mul => fold::mul(a, b, tag),
        BinaryOp::Div => fold::div(a, b, tag),
        BinaryOp::Mod => fold::rem(a, b, tag),
        BinaryOp::BitAnd if !tag.is_fp() => fold::bit_and(a, b, width),
        BinaryOp::BitOr if !tag.is_fp() => fold::bit_or(a, b, width),
        BinaryOp::BitXor if !tag.is_fp() => fold::bit_xor(a, b, width),
        BinaryOp::BitLshift if !tag.is_fp() => fold::lsl(a, b, width),
        BinaryOp::BitRshift if !tag.is_fp() => {
            if tag.is_sint() {
                fold::asr(a, b, width)
            } else {
                fold::lsr(a, b, width)
            }
        }
        BinaryOp::Less => fold::lt(a, b, tag),
        BinaryOp::LessEqual => fold::le(a, b, tag),
        BinaryOp::Great => fold::gt(a, b, tag),
        BinaryOp::GreatEqual => fold::ge(a, b, tag),
        BinaryOp::NotEqual => fold::neq(a, b, tag),
        BinaryOp::Equal => fold::eq(a, b, tag),
        _ => (a, OpError::InvalidOp),
    }
}

/// Dispatch a unary operator to the fold engine under a builtin id.
pub fn fold_unary_op(op: UnaryOp, a: QWord, id: BuiltinID) -> FoldResult {
    use coltc_fold as fold;

    if id.is_bool() {
        return match op {
            UnaryOp::BoolNot => (QWord::from_bool(!a.as_bool()), OpError::NoError),
            _ => (a, OpError::InvalidOp),
        };
    }
    let Some(tag) = operand_type_of(id) else {
        return (a, OpError::InvalidOp);
    };
    match op {
        UnaryOp::Negate => fold::neg(a, tag),
        UnaryOp::BitNot if !tag.is_fp() => fold::bit_not(a, id.bit_width()),
        UnaryOp::Inc => fold::add(a, one_of(tag), tag),
        UnaryOp::Dec => fold::sub(a, one_of(tag), tag),
        _ => (a, OpError::InvalidOp),
    }
}

/// The payload `1` under a tag.
fn one_of(tag: OperandType) -> QWord {
    if tag.is_fp() {
        match tag {
            OperandType::F32 => QWord::from_f32(1.0),
            _ => QWord::from_f64(1.0),
        }
    } else {
        QWord::from_u64(1)
    }
}

/// Map a fold outcome to a diagnostic, honouring the warning mask.
///
/// Division by zero is always an error; over/underflow, NaN and invalid
/// shifts are warnings controlled by [`WarnFor`]; `InvalidOp` is the
/// caller's contract violation and is reported as an error.
pub fn report_fold_outcome(
    reporter: &impl Reporter,
    warn: &WarnFor,
    err: OpError,
    info: Option<&SourceInfo>,
) {
    let warn_enabled = match err {
        OpError::NoError => return,
        OpError::DivByZero | OpError::InvalidOp => {
            reporter.error(err.explanation(), info, None);
            return;
        }
        OpError::WasNan | OpError::RetNan => warn.fold_nan,
        OpError::SignedOverflow | OpError::SignedUnderflow => warn.fold_signed_ou,
        OpError::UnsignedOverflow | OpError::UnsignedUnderflow => warn.fold_unsigned_ou,
        OpError::ShiftByGreSizeof => warn.fold_invalid_shift,
    };
    if warn_enabled {
        reporter.warn(err.explanation(), info, None);
    }
}

/// The current wall-clock time as a container timestamp, when the clock is
/// sane (2024 onward).
pub fn timestamp_now() -> Option<Timestamp> {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    if !(2024..2024 + 2047).contains(&year) {
        return None;
    }
    Some(Timestamp::new(
        year as u16,
        month,
        day,
        (rem / 3600) as u8,
        ((rem % 3600) / 60) as u8,
    ))
}

/// Days since 1970-01-01 to a (year, month, day) civil date.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    (if month <= 2 { year + 1 } else { year }, month, day)
}
