//! Append-only request access log.
//!
//! Every completed request produces one [`AccessLogRecord`], which is
//! formatted into a single line and appended to the file held by an
//! [`AccessLogSink`]:
//!
//! ```text
//! 2024/05/01 14:03:27 http: 1714568607123456789 GET /health 127.0.0.1:51234 curl/8.5.0
//! ```
//!
//! Many requests write concurrently. Each line is written with one
//! `write_all` call while holding the sink's lock, so lines never interleave,
//! and [`AccessLogSink::contents`] takes the same lock so a reader never sees a
//! partially written line.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use wicket_core::RequestId;

/// Default access log file name.
pub const DEFAULT_LOG_FILE: &str = "server_log.log";

/// Default prefix written after the timestamp on every line.
pub const DEFAULT_LOG_PREFIX: &str = "http:";

/// Timestamp layout, e.g. `2024/05/01 14:03:27`.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One completed request.
#[derive(Debug, Clone)]
pub struct AccessLogRecord {
    /// Correlation id, or `UNKNOWN`.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: String,
    /// Request path, without the query string.
    pub path: String,
    /// Peer address as `ip:port`.
    pub remote_addr: String,
    /// `User-Agent` header, if the client sent one.
    pub user_agent: Option<String>,
    /// Completion time.
    pub timestamp: DateTime<Local>,
}

impl AccessLogRecord {
    /// Formats the record as a newline-terminated log line.
    pub fn to_line(&self, prefix: &str) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT);
        let user_agent = self.user_agent.as_deref().unwrap_or("-");
        let mut line = format!("{timestamp} ");
        if !prefix.is_empty() {
            line.push_str(prefix);
            line.push(' ');
        }
        line.push_str(&format!(
            "{} {} {} {} {}\n",
            self.request_id, self.method, self.path, self.remote_addr, user_agent
        ));
        line
    }
}

/// Shared, append-only access log file.
#[derive(Debug)]
pub struct AccessLogSink {
    path: PathBuf,
    prefix: String,
    file: Mutex<File>,
}

impl AccessLogSink {
    /// Opens (or creates) the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::AccessLogOpen` if the file cannot be opened.
    /// The server treats this as a startup failure.
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> TelemetryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TelemetryError::AccessLogOpen {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            prefix: prefix.into(),
            file: Mutex::new(file),
        })
    }

    /// Appends one record as a single line.
    pub fn append(&self, record: &AccessLogRecord) -> TelemetryResult<()> {
        let line = record.to_line(&self.prefix);
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())
            .map_err(TelemetryError::AccessLogWrite)
    }

    /// Reads back the full current contents of the log file.
    pub fn contents(&self) -> TelemetryResult<Vec<u8>> {
        let _guard = self.file.lock();
        std::fs::read(&self.path).map_err(TelemetryError::AccessLogRead)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prefix written on every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
