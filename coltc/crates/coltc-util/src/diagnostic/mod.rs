//! Diagnostic module - the composable reporter stack.
//!
//! Every stage of the pipeline reports through the same three-method
//! interface: `message`, `warn`, `error`. The implementation behind that
//! interface is composed by stacking decorators over a leaf:
//!
//! - [`SinkReporter`] - drops everything (tests, quiet runs)
//! - [`ConsoleReporter`] - formats to stdout, with colour and an `[E####]`
//!   tag when a report number is present
//! - [`FilterReporter`] - forwards each severity only when its predicate
//!   accepts the report
//! - [`LimiterReporter`] - per-severity caps; the first report past a cap is
//!   replaced by a single "no more ... will be reported" notice
//!
//! Composition order matters: the outermost decorator sees a report first.
//! `Limiter<Filter<Console>>` caps first, so reports the filter would drop
//! still consume budget and the suppression notice itself passes through
//! the filter; `Filter<Limiter<Console>>` filters first, so dropped reports
//! never touch the caps.
//!
//! # Examples
//!
//! ```
//! use coltc_util::diagnostic::{LimiterReporter, Reporter, SinkReporter};
//!
//! let reporter = LimiterReporter::new(Some(2), None, None, SinkReporter);
//! reporter.error("first", None, None);
//! reporter.error("second", None, None);
//! reporter.error("silenced", None, None);
//! ```

mod filter;
mod limiter;

pub use filter::{FilterFn, FilterReporter};
pub use limiter::LimiterReporter;

use std::fmt;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    /// Informational message.
    Message,
    /// A warning that does not prevent compilation.
    Warning,
    /// An error that prevents compilation.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Message => write!(f, "message"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// A report number, rendered as `[E0042]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReportNumber(pub u32);

impl fmt::Display for ReportNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[E{:04}]", self.0)
    }
}

/// Resolved source position attached to a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    /// The file name as given to the compiler.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl SourceInfo {
    /// Create a source position.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The uniform reporting interface.
///
/// Decorators take `&self`; stateful decorators use interior mutability so a
/// fully-composed stack can be shared by every stage of a session.
pub trait Reporter {
    /// Report an informational message.
    fn message(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>);

    /// Report a warning.
    fn warn(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>);

    /// Report an error.
    fn error(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>);
}

/// Consumes all reports.
#[derive(Clone, Copy, Debug, Default)]
pub struct SinkReporter;

impl Reporter for SinkReporter {
    fn message(&self, _: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {}

    fn warn(&self, _: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {}

    fn error(&self, _: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {}
}

/// ANSI escape prefixes per severity.
const COLOR_MESSAGE: &str = "\x1b[36m";
const COLOR_WARNING: &str = "\x1b[33m";
const COLOR_ERROR: &str = "\x1b[1;31m";
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_DIM: &str = "\x1b[2m";

/// Prints reports to stdout.
///
/// Output format:
///
/// ```text
/// error: expected ';' [E0012]
///   --> main.ct:3:14
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ConsoleReporter {
    colored: bool,
}

impl ConsoleReporter {
    /// A console reporter with ANSI colouring on or off.
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn emit(&self, level: Level, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        let (color, reset, dim) = if self.colored {
            let color = match level {
                Level::Message => COLOR_MESSAGE,
                Level::Warning => COLOR_WARNING,
                Level::Error => COLOR_ERROR,
            };
            (color, COLOR_RESET, COLOR_DIM)
        } else {
            ("", "", "")
        };
        match num {
            Some(num) => println!("{color}{level}{reset}: {text} {dim}{num}{reset}"),
            None => println!("{color}{level}{reset}: {text}"),
        }
        if let Some(src) = src {
            println!("  {dim}--> {src}{reset}");
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn message(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        self.emit(Level::Message, text, src, num);
    }

    fn warn(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        self.emit(Level::Warning, text, src, num);
    }

    fn error(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        self.emit(Level::Error, text, src, num);
    }
}

/// A recording leaf used by tests: collects every report it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: std::cell::RefCell<Vec<(Level, String)>>,
}

impl RecordingReporter {
    /// A fresh, empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn reports(&self) -> Vec<(Level, String)> {
        self.reports.borrow().clone()
    }

    /// Number of recorded reports of `level`.
    pub fn count(&self, level: Level) -> usize {
        self.reports
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl Reporter for RecordingReporter {
    fn message(&self, text: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {
        self.reports
            .borrow_mut()
            .push((Level::Message, text.to_owned()));
    }

    fn warn(&self, text: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {
        self.reports
            .borrow_mut()
            .push((Level::Warning, text.to_owned()));
    }

    fn error(&self, text: &str, _: Option<&SourceInfo>, _: Option<ReportNumber>) {
        self.reports
            .borrow_mut()
            .push((Level::Error, text.to_owned()));
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn message(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        (**self).message(text, src, num);
    }

    fn warn(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        (**self).warn(text, src, num);
    }

    fn error(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        (**self).error(text, src, num);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Message.to_string(), "message");
        assert_eq!(Level::Warning.to_string(), "warning");
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn test_report_number_display() {
        assert_eq!(ReportNumber(42).to_string(), "[E0042]");
        assert_eq!(ReportNumber(1234).to_string(), "[E1234]");
    }

    #[test]
    fn test_source_info_display() {
        let info = SourceInfo::new("main.ct", 3, 14);
        assert_eq!(info.to_string(), "main.ct:3:14");
    }

    #[test]
    fn test_sink_drops_everything() {
        // Nothing observable; just exercise the paths.
        SinkReporter.message("m", None, None);
        SinkReporter.warn("w", None, None);
        SinkReporter.error("e", None, Some(ReportNumber(1)));
    }

    #[test]
    fn test_recording_reporter() {
        let rec = RecordingReporter::new();
        rec.error("boom", None, None);
        rec.warn("careful", None, None);
        assert_eq!(rec.count(Level::Error), 1);
        assert_eq!(rec.count(Level::Warning), 1);
        assert_eq!(rec.reports()[0], (Level::Error, "boom".to_owned()));
    }

    #[test]
    fn test_reporter_by_reference() {
        let rec = RecordingReporter::new();
        let by_ref: &dyn Reporter = &rec;
        by_ref.error("via ref", None, None);
        assert_eq!(rec.count(Level::Error), 1);
    }
}
