use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use super::config::exe_dir;
use crate::error::AppError;

const LOG_FILENAME: &str = "print_log.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub summary: String,
    pub status: LogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

/// Bounded history of receipt print attempts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintLog {
    entries: VecDeque<LogEntry>,
    #[serde(skip)]
    max_entries: usize,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl PrintLog {
    /// Log kept only in memory.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            path: None,
        }
    }

    pub fn default_path() -> PathBuf {
        exe_dir().join(LOG_FILENAME)
    }

    /// Loads the persisted log, starting empty when missing or unreadable.
    pub fn load(path: PathBuf, max_entries: usize) -> Self {
        let mut log = if path.exists() {
            match fs::read_to_string(&path)
                .map_err(AppError::from)
                .and_then(|contents| Ok(serde_json::from_str::<PrintLog>(&contents)?))
            {
                Ok(log) => log,
                Err(e) => {
                    log::warn!("Failed to load print log {:?}: {}", path, e);
                    Self::new(max_entries)
                }
            }
        } else {
            Self::new(max_entries)
        };
        log.max_entries = max_entries;
        log.path = Some(path);
        log.trim();
        log
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(path) = &self.path {
            let contents = serde_json::to_string_pretty(self)?;
            fs::write(path, contents)?;
        }
        Ok(())
    }

    pub fn add_entry(&mut self, summary: String, status: LogStatus, error: Option<String>) {
        self.entries.push_front(LogEntry {
            timestamp: Local::now(),
            summary,
            status,
            error,
        });
        self.trim();
        if let Err(e) = self.save() {
            log::warn!("Failed to persist print log: {}", e);
        }
    }

    pub fn add_success(&mut self, summary: String) {
        self.add_entry(summary, LogStatus::Success, None);
    }

    pub fn add_error(&mut self, summary: String, error: String) {
        self.add_entry(summary, LogStatus::Error, Some(error));
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
