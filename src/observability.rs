//! Uniform diagnostic reporting for store, series and ingestion operations.
//!
//! Errors are always returned to the caller as [`ChartDataError`]; in addition, every error and
//! every [`DataQualityWarning`] is reported to the configured [`ChartDataObserver`] so a rendering
//! pipeline can record or surface them without handling each call site.

use std::fmt;
use std::sync::Arc;

use crate::error::{ChartDataError, DataQualityWarning};

/// Severity classification for observer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Non-fatal data-quality condition.
    Warning,
    /// The operation failed.
    Error,
    /// Infrastructure failure (I/O) while ingesting.
    Critical,
}

impl DiagnosticSeverity {
    /// Severity used when an error is reported.
    pub fn for_error(error: &ChartDataError) -> Self {
        match error {
            ChartDataError::Io(_) => DiagnosticSeverity::Critical,
            ChartDataError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => DiagnosticSeverity::Critical,
                _ => DiagnosticSeverity::Error,
            },
            _ => DiagnosticSeverity::Error,
        }
    }
}

/// Context about the operation that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticContext {
    /// Public operation name, e.g. `"frame_at_index_interpolated"`.
    pub operation: &'static str,
}

impl DiagnosticContext {
    pub fn new(operation: &'static str) -> Self {
        Self { operation }
    }
}

/// Observer interface for diagnostics.
///
/// Implementors can record metrics, logs, or surface warnings in a UI.
pub trait ChartDataObserver: Send + Sync {
    /// Called for every non-fatal data-quality warning.
    fn on_warning(&self, _ctx: &DiagnosticContext, _warning: &DataQualityWarning) {}

    /// Called when an operation fails, before the error is returned.
    fn on_error(&self, _ctx: &DiagnosticContext, _severity: DiagnosticSeverity, _error: &ChartDataError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ChartDataObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ChartDataObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ChartDataObserver for CompositeObserver {
    fn on_warning(&self, ctx: &DiagnosticContext, warning: &DataQualityWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_error(&self, ctx: &DiagnosticContext, severity: DiagnosticSeverity, error: &ChartDataError) {
        for o in &self.observers {
            o.on_error(ctx, severity, error);
        }
    }
}

/// Forwards diagnostics to `tracing` at `warn`/`error` level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ChartDataObserver for TracingObserver {
    fn on_warning(&self, ctx: &DiagnosticContext, warning: &DataQualityWarning) {
        tracing::warn!(operation = ctx.operation, %warning, "data quality warning");
    }

    fn on_error(&self, ctx: &DiagnosticContext, severity: DiagnosticSeverity, error: &ChartDataError) {
        tracing::error!(operation = ctx.operation, ?severity, %error, "chart data operation failed");
    }
}

/// Shared reporting entry points used by the store, the series layer and ingestion.
#[derive(Clone, Default)]
pub(crate) struct Reporter {
    observer: Option<Arc<dyn ChartDataObserver>>,
}

impl Reporter {
    pub(crate) fn new(observer: Option<Arc<dyn ChartDataObserver>>) -> Self {
        Self { observer }
    }

    pub(crate) fn observer(&self) -> Option<&Arc<dyn ChartDataObserver>> {
        self.observer.as_ref()
    }

    pub(crate) fn warn(&self, operation: &'static str, warning: DataQualityWarning) {
        tracing::warn!(operation, %warning, "data quality warning");
        if let Some(obs) = self.observer.as_ref() {
            obs.on_warning(&DiagnosticContext::new(operation), &warning);
        }
    }

    /// Pass `result` through, reporting it to the observer if it is an error.
    pub(crate) fn check<T>(&self, operation: &'static str, result: Result<T, ChartDataError>) -> Result<T, ChartDataError> {
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, "chart data operation rejected");
            if let Some(obs) = self.observer.as_ref() {
                obs.on_error(&DiagnosticContext::new(operation), DiagnosticSeverity::for_error(e), e);
            }
        }
        result
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}
