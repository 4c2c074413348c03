//! LimiterReporter - per-severity report caps.

use std::cell::Cell;

use super::{ReportNumber, Reporter, SourceInfo};

/// Sentinel meaning "no cap on this severity".
const NO_LIMIT: u16 = u16::MAX;

/// Caps the number of reports forwarded per severity.
///
/// While a severity has budget, reports pass through unchanged. The first
/// report past the cap is replaced by a single "no more ... will be
/// reported." notice sent through the inner reporter; everything after that
/// is silently dropped.
///
/// # Examples
///
/// ```
/// use coltc_util::diagnostic::{LimiterReporter, Reporter, SinkReporter};
///
/// let reporter = LimiterReporter::new(Some(32), Some(64), Some(128), SinkReporter);
/// reporter.error("reported", None, None);
/// ```
pub struct LimiterReporter<R> {
    inner: R,
    /// Remaining message budget.
    message_rem: Cell<u16>,
    /// Remaining warning budget.
    warn_rem: Cell<u16>,
    /// Remaining error budget.
    error_rem: Cell<u16>,
    /// True once the exhaustion notice for messages went out.
    exhausted_message: Cell<bool>,
    /// True once the exhaustion notice for warnings went out.
    exhausted_warn: Cell<bool>,
    /// True once the exhaustion notice for errors went out.
    exhausted_error: Cell<bool>,
}

impl<R: Reporter> LimiterReporter<R> {
    /// Build a limiter with the given caps; `None` leaves a severity
    /// unlimited.
    ///
    /// # Panics
    ///
    /// Panics if any cap is zero: a zero cap would silence the severity
    /// without ever telling the user, which the CLI treats as invalid input.
    pub fn new(error: Option<u16>, warn: Option<u16>, message: Option<u16>, inner: R) -> Self {
        let error = error.unwrap_or(NO_LIMIT);
        let warn = warn.unwrap_or(NO_LIMIT);
        let message = message.unwrap_or(NO_LIMIT);
        assert!(
            error != 0 && warn != 0 && message != 0,
            "report caps must be nonzero"
        );
        Self {
            inner,
            message_rem: Cell::new(message),
            warn_rem: Cell::new(warn),
            error_rem: Cell::new(error),
            exhausted_message: Cell::new(false),
            exhausted_warn: Cell::new(false),
            exhausted_error: Cell::new(false),
        }
    }

    /// The wrapped reporter.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns true while the report should be forwarded; on the first call
    /// past the cap, flips `exhausted` and returns false exactly once with
    /// `exhausted` newly set (the caller sends the notice then).
    fn consume(rem: &Cell<u16>, exhausted: &Cell<bool>) -> Budget {
        if exhausted.get() {
            return Budget::Silenced;
        }
        let left = rem.get();
        if left == NO_LIMIT {
            return Budget::Available;
        }
        if left > 0 {
            rem.set(left - 1);
            return Budget::Available;
        }
        exhausted.set(true);
        Budget::JustExhausted
    }
}

enum Budget {
    Available,
    JustExhausted,
    Silenced,
}

impl<R: Reporter> Reporter for LimiterReporter<R> {
    fn message(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        match Self::consume(&self.message_rem, &self.exhausted_message) {
            Budget::Available => self.inner.message(text, src, num),
            Budget::JustExhausted => {
                self.inner
                    .message("No more messages will be reported.", None, None)
            }
            Budget::Silenced => {}
        }
    }

    fn warn(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        match Self::consume(&self.warn_rem, &self.exhausted_warn) {
            Budget::Available => self.inner.warn(text, src, num),
            Budget::JustExhausted => {
                self.inner
                    .warn("No more warnings will be reported.", None, None)
            }
            Budget::Silenced => {}
        }
    }

    fn error(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        match Self::consume(&self.error_rem, &self.exhausted_error) {
            Budget::Available => self.inner.error(text, src, num),
            Budget::JustExhausted => {
                self.inner
                    .error("No more errors will be reported.", None, None)
            }
            Budget::Silenced => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{FilterReporter, Level, RecordingReporter};
    use super::*;

    #[test]
    fn test_under_cap_forwards_verbatim() {
        let limiter = LimiterReporter::new(Some(3), None, None, RecordingReporter::new());
        limiter.error("one", None, None);
        limiter.error("two", None, None);
        let reports = limiter.inner().reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].1, "one");
    }

    #[test]
    fn test_cap_replaces_next_report_with_notice() {
        let limiter = LimiterReporter::new(Some(2), None, None, RecordingReporter::new());
        limiter.error("first", None, None);
        limiter.error("second", None, None);
        limiter.error("third", None, None);
        limiter.error("fourth", None, None);

        let reports = limiter.inner().reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].1, "first");
        assert_eq!(reports[1].1, "second");
        assert_eq!(reports[2].1, "No more errors will be reported.");
    }

    #[test]
    fn test_caps_are_per_severity() {
        let limiter = LimiterReporter::new(Some(1), Some(1), None, RecordingReporter::new());
        limiter.error("e1", None, None);
        limiter.error("e2", None, None);
        limiter.warn("w1", None, None);
        limiter.warn("w2", None, None);
        limiter.message("m1", None, None);
        limiter.message("m2", None, None);

        assert_eq!(limiter.inner().count(Level::Error), 2); // e1 + notice
        assert_eq!(limiter.inner().count(Level::Warning), 2); // w1 + notice
        assert_eq!(limiter.inner().count(Level::Message), 2); // both, unlimited
    }

    #[test]
    fn test_unlimited_never_exhausts() {
        let limiter = LimiterReporter::new(None, None, None, RecordingReporter::new());
        for i in 0..100 {
            limiter.error(&format!("e{i}"), None, None);
        }
        assert_eq!(limiter.inner().count(Level::Error), 100);
    }

    #[test]
    #[should_panic(expected = "nonzero")]
    fn test_zero_cap_is_rejected() {
        let _ = LimiterReporter::new(Some(0), None, None, RecordingReporter::new());
    }

    #[test]
    fn test_limiter_over_filter_composition() {
        // Limiter<Filter<..>>: the cap runs first, so a report the filter
        // later drops still consumes budget.
        let stack = LimiterReporter::new(
            Some(1),
            None,
            None,
            FilterReporter::new(RecordingReporter::new())
                .with_error_filter(|text, _, _| !text.contains("noise")),
        );
        stack.error("noise 1", None, None); // consumes the budget, then dropped
        stack.error("real", None, None); // over cap: becomes the notice

        let reports = stack.inner().inner().reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].1, "No more errors will be reported.");
    }

    #[test]
    fn test_filter_over_limiter_composition() {
        // Filter<Limiter<..>>: the filter runs first, so dropped reports do
        // not consume limiter budget.
        let stack = FilterReporter::new(LimiterReporter::new(
            Some(1),
            None,
            None,
            RecordingReporter::new(),
        ))
        .with_error_filter(|text, _, _| !text.contains("noise"));
        stack.error("noise 1", None, None);
        stack.error("real", None, None);
        stack.error("late", None, None);

        let reports = stack.inner().inner().reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].1, "real");
        assert_eq!(reports[1].1, "No more errors will be reported.");
    }
}
