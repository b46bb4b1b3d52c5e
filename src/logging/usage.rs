//! Usage logging
//!
//! Appends one JSON line per handled function call so product analytics can
//! count actions and synthesized audio without touching the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Usage event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Row inserted by the action function
    ActionDispatched,
    /// Action call refused (bad action, bad input, store error)
    ActionRejected,
    /// Audio returned by the speech function
    SpeechSynthesized,
    /// Speech call refused
    SpeechRejected,
    /// Bearer credential missing or not resolvable
    AuthRejected,
}

/// Usage event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Event type
    pub event_type: EventType,
    /// User identifier (if authenticated)
    pub user_id: Option<String>,
    /// Action name or voice label
    pub operation: Option<String>,
    /// HTTP status returned to the client
    pub status: u16,
    /// Audio size in bytes (speech only)
    pub bytes: Option<u64>,
    /// Handling time in milliseconds
    pub duration_ms: Option<u64>,
    /// Error kind for rejected calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UsageEvent {
    /// Create a new usage event
    pub fn new(event_type: EventType, status: u16) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            operation: None,
            status,
            bytes: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Set the user ID
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the operation name
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the byte count
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = Some(bytes);
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set the error kind
    pub fn with_error(mut self, kind: impl Into<String>) -> Self {
        self.error = Some(kind.into());
        self
    }

    /// Convert to JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Usage logger that writes events to a JSONL file
///
/// Without a file it drops events, so callers never need to check.
#[derive(Clone, Default)]
pub struct UsageLogger {
    inner: Arc<Mutex<UsageLoggerInner>>,
}

#[derive(Default)]
struct UsageLoggerInner {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl UsageLogger {
    /// Create a logger that discards events
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create a logger appending to `path`
    pub async fn to_file(path: PathBuf) -> std::io::Result<Self> {
        let logger = Self::default();
        logger.init_file(path).await?;
        Ok(logger)
    }

    /// Initialize file logging to the specified path
    pub async fn init_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let writer = BufWriter::new(file);

        let mut inner = self.inner.lock().await;
        inner.writer = Some(writer);
        inner.path = Some(path.clone());

        info!("Usage logging initialized to {}", path.display());
        Ok(())
    }

    /// Whether events are being written anywhere
    pub async fn is_enabled(&self) -> bool {
        self.inner.lock().await.writer.is_some()
    }

    /// Log a usage event
    pub async fn log(&self, event: UsageEvent) {
        let jsonl = match event.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize usage event: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;

        if let Some(ref mut writer) = inner.writer {
            if let Err(e) = writeln!(writer, "{}", jsonl) {
                error!("Failed to write usage event: {}", e);
            }
            if let Err(e) = writer.flush() {
                error!("Failed to flush usage log: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = UsageEvent::new(EventType::ActionDispatched, 200)
            .with_user("user-123")
            .with_operation("create_habit")
            .with_duration(12);

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("action_dispatched"));
        assert!(jsonl.contains("user-123"));
        assert!(jsonl.contains("create_habit"));
        assert!(!jsonl.contains("\"error\""));
    }

    #[test]
    fn test_rejected_event_carries_kind() {
        let event = UsageEvent::new(EventType::ActionRejected, 400).with_error("invalid_action");

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("action_rejected"));
        assert!(jsonl.contains("invalid_action"));
    }

    #[tokio::test]
    async fn test_file_logging_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");

        let logger = UsageLogger::to_file(path.clone()).await.unwrap();
        assert!(logger.is_enabled().await);

        logger
            .log(UsageEvent::new(EventType::SpeechSynthesized, 200).with_bytes(4096))
            .await;
        logger
            .log(UsageEvent::new(EventType::AuthRejected, 401))
            .await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("speech_synthesized"));
        assert!(lines[1].contains("auth_rejected"));
    }

    #[tokio::test]
    async fn test_disabled_logger_is_noop() {
        let logger = UsageLogger::disabled();
        assert!(!logger.is_enabled().await);
        logger.log(UsageEvent::new(EventType::ActionDispatched, 200)).await;
    }
}
