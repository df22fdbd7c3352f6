//! In-memory log of recent mock traffic, newest first.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Serialize)]
pub struct LoggedRequest {
    pub url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub req: LoggedRequest,
    pub res: LoggedResponse,
}

pub struct AccessLogStore {
    capacity: usize,
    entries: RwLock<VecDeque<AccessLogEntry>>,
}

impl AccessLogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(VecDeque::new()),
        }
    }

    /// Record an exchange, dropping the oldest entries beyond capacity.
    pub fn push(&self, entry: AccessLogEntry) {
        let mut entries = self.entries.write();
        entries.push_front(entry);
        while entries.len() > self.capacity {
            entries.pop_back();
        }
    }

    /// Snapshot of the log, newest first.
    pub fn entries(&self) -> Vec<AccessLogEntry> {
        self.entries.read().iter().cloned().collect()
    }
}
