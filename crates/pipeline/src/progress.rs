use serde::{Deserialize, Serialize};

/// Severity of a progress log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One structured, result-facing log line.
///
/// These travel with the run report rather than through a global logger;
/// the `log` facade is reserved for ambient diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Originating stage or file identity
    pub context: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Pipeline-owned progress record.
///
/// Mutated only by the pipeline's own task; concurrent file tasks report
/// results back instead of touching this directly. Lives for exactly one
/// run and is handed back inside the final report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub processed_count: usize,
    pub total_count: usize,
    pub logs: Vec<LogEntry>,
}

impl ProgressState {
    #[must_use]
    pub fn new(total_count: usize) -> Self {
        Self {
            processed_count: 0,
            total_count,
            logs: Vec::new(),
        }
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>, context: impl Into<String>) {
        self.logs.push(LogEntry::new(level, message, context));
    }

    /// Completion percentage, monotonically non-decreasing over a run
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_count == 0 {
            return 100;
        }
        ((self.processed_count * 100) / self.total_count) as u8
    }

    /// Lightweight snapshot for the progress stream
    #[must_use]
    pub fn snapshot(&self) -> Progress {
        Progress {
            processed_count: self.processed_count,
            total_count: self.total_count,
        }
    }
}

/// Copyable progress snapshot published on the watch channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub processed_count: usize,
    pub total_count: usize,
}

impl Progress {
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_count == 0 {
            return 100;
        }
        ((self.processed_count * 100) / self.total_count) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_math() {
        let mut state = ProgressState::new(12);
        assert_eq!(state.percent(), 0);

        state.processed_count = 5;
        assert_eq!(state.percent(), 41);

        state.processed_count = 12;
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn test_zero_total_is_complete() {
        assert_eq!(ProgressState::new(0).percent(), 100);
    }

    #[test]
    fn test_snapshot_mirrors_counts() {
        let mut state = ProgressState::new(4);
        state.processed_count = 2;
        let snap = state.snapshot();
        assert_eq!(snap.processed_count, 2);
        assert_eq!(snap.total_count, 4);
        assert_eq!(snap.percent(), 50);
    }
}
