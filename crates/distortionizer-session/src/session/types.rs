//! Session infrastructure types.

use std::time::SystemTime;

/// Lightweight operation log entry.
///
/// One entry per applied command. Intended for debugging and as an audit
/// trail of a calibration run, not for replay/undo.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Unix timestamp of the operation (seconds since epoch).
    pub timestamp: u64,

    /// Operation name (e.g., "adjust-coefficient", "load").
    pub operation: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Optional notes or error message.
    pub notes: Option<String>,
}

impl LogEntry {
    /// Create a success log entry.
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: None,
        }
    }

    /// Create a success log entry with notes.
    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: Some(notes.into()),
        }
    }

    /// Create a failure log entry.
    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: false,
            notes: Some(error.into()),
        }
    }
}

/// Get the current Unix timestamp in seconds.
///
/// Clocks set before the epoch report `0`.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_flags() {
        let ok = LogEntry::success("save");
        assert!(ok.success);
        assert!(ok.notes.is_none());

        let noted = LogEntry::success_with_notes("load", "HMD_Config.json");
        assert_eq!(noted.notes.as_deref(), Some("HMD_Config.json"));

        let failed = LogEntry::failure("adjust-coefficient", "ordering");
        assert!(!failed.success);
        assert!(failed.timestamp > 0);
    }
}
