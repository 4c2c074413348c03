//! FilterReporter - predicate-gated forwarding.

use super::{ReportNumber, Reporter, SourceInfo};

/// Filter predicate: true keeps the report, false drops it.
pub type FilterFn = fn(&str, Option<&SourceInfo>, Option<ReportNumber>) -> bool;

/// Forwards reports to the inner reporter when the matching predicate
/// accepts them. An absent predicate is identity-true.
///
/// # Examples
///
/// ```
/// use coltc_util::diagnostic::{FilterReporter, Reporter, SinkReporter};
///
/// // Drop every warning that mentions shadowing; keep the rest.
/// let reporter = FilterReporter::new(SinkReporter)
///     .with_warn_filter(|text, _, _| !text.contains("shadow"));
/// reporter.warn("variable 'x' shadows an earlier declaration", None, None);
/// ```
pub struct FilterReporter<R> {
    inner: R,
    message_filter: Option<FilterFn>,
    warn_filter: Option<FilterFn>,
    error_filter: Option<FilterFn>,
}

impl<R: Reporter> FilterReporter<R> {
    /// A filter with no predicates: forwards everything.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            message_filter: None,
            warn_filter: None,
            error_filter: None,
        }
    }

    /// Gate messages behind `filter`.
    #[must_use]
    pub fn with_message_filter(mut self, filter: FilterFn) -> Self {
        self.message_filter = Some(filter);
        self
    }

    /// Gate warnings behind `filter`.
    #[must_use]
    pub fn with_warn_filter(mut self, filter: FilterFn) -> Self {
        self.warn_filter = Some(filter);
        self
    }

    /// Gate errors behind `filter`.
    #[must_use]
    pub fn with_error_filter(mut self, filter: FilterFn) -> Self {
        self.error_filter = Some(filter);
        self
    }

    /// The wrapped reporter.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

fn accepts(
    filter: Option<FilterFn>,
    text: &str,
    src: Option<&SourceInfo>,
    num: Option<ReportNumber>,
) -> bool {
    match filter {
        None => true,
        Some(f) => f(text, src, num),
    }
}

impl<R: Reporter> Reporter for FilterReporter<R> {
    fn message(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        if accepts(self.message_filter, text, src, num) {
            self.inner.message(text, src, num);
        }
    }

    fn warn(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        if accepts(self.warn_filter, text, src, num) {
            self.inner.warn(text, src, num);
        }
    }

    fn error(&self, text: &str, src: Option<&SourceInfo>, num: Option<ReportNumber>) {
        if accepts(self.error_filter, text, src, num) {
            self.inner.error(text, src, num);
        }
    }
}
