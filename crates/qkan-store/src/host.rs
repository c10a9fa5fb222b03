//! Interfaces to the host application's user interface.
//!
//! The store never builds UI state. It is handed a [`HostUi`] (messages and
//! reload prompts) and a [`ProgressSink`] (percentages during long
//! migrations) and calls them synchronously.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Receiver of coarse progress percentages (0–100).
///
/// Implementations must return promptly; the migration does not wait on the
/// UI.
pub trait ProgressSink {
    fn report(&self, percent: u8);
}

impl<F: Fn(u8)> ProgressSink for F {
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Discards progress reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

pub trait HostUi {
    /// Show a blocking message to the user.
    fn message(&self, severity: Severity, title: &str, text: &str);

    /// Update a progress indicator.
    fn progress(&self, _percent: u8) {}

    /// Tell the user the project has to be reloaded.
    fn prompt_reload(&self, text: &str);
}

/// Host implementation that only writes to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHost;

impl HostUi for LogHost {
    fn message(&self, severity: Severity, title: &str, text: &str) {
        match severity {
            Severity::Info => tracing::info!(title, "{text}"),
            Severity::Warning => tracing::warn!(title, "{text}"),
            Severity::Critical => tracing::error!(title, "{text}"),
        }
    }

    fn progress(&self, percent: u8) {
        tracing::debug!(percent, "migration progress");
    }

    fn prompt_reload(&self, text: &str) {
        tracing::warn!("{text}");
    }
}

/// Routes migration progress to a [`HostUi`].
pub(crate) struct HostProgress<'a>(pub &'a dyn HostUi);

impl ProgressSink for HostProgress<'_> {
    fn report(&self, percent: u8) {
        self.0.progress(percent.min(100));
    }
}
