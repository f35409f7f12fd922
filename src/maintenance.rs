use heapless::Vec;
use serde::{Deserialize, Serialize};

pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u32,
    pub timestamp_ms: u64,
    pub severity: LogSeverity,
    pub message: String,
}

/// Bounded advisory record, newest-first. Entries are only ever removed by
/// truncation at the tail once the log is at capacity.
#[derive(Debug)]
pub struct MaintenanceLog {
    entries: Vec<LogEntry, LOG_CAPACITY>,
    next_id: u32,
}

impl MaintenanceLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Prepend a new entry, evicting the oldest once at capacity. Returns
    /// the assigned entry id.
    pub fn append(&mut self, severity: LogSeverity, message: &str, timestamp_ms: u64) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        if self.entries.is_full() {
            self.entries.pop();
        }
        let _ = self.entries.insert(
            0,
            LogEntry {
                id,
                timestamp_ms,
                severity,
                message: message.to_string(),
            },
        );

        id
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy for broadcast payloads.
    pub fn to_vec(&self) -> std::vec::Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for MaintenanceLog {
    fn default() -> Self {
        Self::new()
    }
}
