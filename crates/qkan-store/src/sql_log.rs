//! De-duplicated SQL debug logging.
//!
//! Migrations issue long runs of statements under one label. Logging each of
//! them floods the debug log, so repeated labels inside a short window are
//! counted instead and the count is attached to the next line that does get
//! written. This only affects log volume, never execution.

use std::time::{Duration, Instant};

/// What [`SqlLog::record`] did with a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDecision {
    /// A line was written. `repeats` statements were swallowed before it.
    Emitted { repeats: u32 },
    Suppressed,
}

#[derive(Debug)]
pub struct SqlLog {
    window: Duration,
    last_label: Option<String>,
    last_emit: Option<Instant>,
    suppressed: u32,
}

impl SqlLog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_label: None,
            last_emit: None,
            suppressed: 0,
        }
    }

    /// Log a successfully executed statement.
    ///
    /// `allow_repeat` forces a line even when the label was just logged.
    pub fn record(&mut self, label: &str, sql: &str, allow_repeat: bool) -> LogDecision {
        self.record_at(Instant::now(), label, sql, allow_repeat)
    }

    fn record_at(&mut self, now: Instant, label: &str, sql: &str, allow_repeat: bool) -> LogDecision {
        if !allow_repeat && self.last_label.as_deref() == Some(label) {
            if let Some(at) = self.last_emit {
                if now.saturating_duration_since(at) < self.window {
                    self.suppressed += 1;
                    return LogDecision::Suppressed;
                }
            }
        }

        let repeats = std::mem::take(&mut self.suppressed);
        self.last_label = Some(label.to_string());
        self.last_emit = Some(now);

        if repeats == 0 {
            tracing::debug!(label, sql, "executed SQL");
        } else {
            tracing::debug!(label, repeats, sql, "executed SQL");
        }
        LogDecision::Emitted { repeats }
    }
}
