//! Per-message activity records.
//!
//! Every inbound message produces exactly one record, written before the bot
//! does anything else with it.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{messaging::types::InboundMessage, Result};

const MAX_COMMAND_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ActivityRecord {
    pub timestamp: String,
    pub user_id: i64,
    pub username: String,
    pub command: String,
}

impl ActivityRecord {
    pub fn from_message(msg: &InboundMessage) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            user_id: msg.user_id.0,
            username: msg.username_or_placeholder().to_string(),
            command: msg.text.clone(),
        }
    }
}

pub trait ActivityLog: Send + Sync {
    fn record(&self, record: &ActivityRecord);
}

/// Logs activity through `tracing`, optionally mirroring it to a file.
#[derive(Clone, Debug, Default)]
pub struct TracingActivityLog {
    file: Option<ActivityFile>,
}

impl TracingActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(file: ActivityFile) -> Self {
        Self { file: Some(file) }
    }
}

impl ActivityLog for TracingActivityLog {
    fn record(&self, record: &ActivityRecord) {
        tracing::info!(
            user_id = record.user_id,
            username = %record.username,
            command = %record.command,
            "user activity"
        );

        if let Some(file) = &self.file {
            if let Err(e) = file.append(record) {
                tracing::warn!(path = %file.path().display(), "failed to write activity log: {e}");
            }
        }
    }
}

/// Append-only activity file, JSON lines or a plain readable block per record.
#[derive(Clone, Debug)]
pub struct ActivityFile {
    path: PathBuf,
    json: bool,
}

impl ActivityFile {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ActivityRecord) -> Result<()> {
        let mut record = record.clone();
        record.command = truncate_text(&record.command, MAX_COMMAND_TEXT);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&record)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        let out = format!(
            "[{}] user_id={} username={} command={}\n",
            record.timestamp, record.user_id, record.username, record.command
        );
        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out = s.chars().take(max_chars).collect::<String>();
    out.push_str("...");
    out
}
