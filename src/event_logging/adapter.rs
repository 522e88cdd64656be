use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::errors::ErrorKind::*;
use crate::errors::EvaluatorError;
use crate::event_logging::event::Event;
use crate::http::{PostResponse, Transport};

/// Destination of gate exposures and custom events, used to make custom event pipelines.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use sigstat::{EvaluatorError, Event, EventLoggingAdapter};
///
/// struct StdoutAdapter;
///
/// #[async_trait]
/// impl EventLoggingAdapter for StdoutAdapter {
///     async fn log_events(&self, events: &[Event]) -> Result<(), EvaluatorError> {
///         for event in events {
///             println!("{} {:?}", event.event_name, event.metadata);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait EventLoggingAdapter: Send + Sync {
    /// Delivers a batch of events.
    async fn log_events(&self, events: &[Event]) -> Result<(), EvaluatorError>;
}

#[derive(Serialize)]
struct LogEventRequest<'a> {
    events: &'a [Event],
}

/// Adapter that posts events to the `log_event` endpoint of the evaluation service.
pub struct HttpEventLoggingAdapter {
    transport: Transport,
    log_event_url: String,
    offline: AtomicBool,
}

impl HttpEventLoggingAdapter {
    /// Creates a new [`HttpEventLoggingAdapter`] that posts events to `log_event_url`.
    ///
    /// # Errors
    ///
    /// This method fails when the SDK key can't be sent as an HTTP header or when the
    /// HTTP client can't be initialized.
    pub fn new(log_event_url: &str, sdk_key: &str, timeout: Duration) -> Result<Self, EvaluatorError> {
        Ok(Self {
            transport: Transport::new(sdk_key, timeout)?,
            log_event_url: log_event_url.to_owned(),
            offline: AtomicBool::new(false),
        })
    }

    /// Switches the adapter in or out of offline mode.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventLoggingAdapter for HttpEventLoggingAdapter {
    async fn log_events(&self, events: &[Event]) -> Result<(), EvaluatorError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EvaluatorError::new(
                OfflineClient,
                format!("Client is in offline mode, dropping {} event(s).", events.len()),
            ));
        }
        let request = LogEventRequest { events };
        match self.transport.post(&self.log_event_url, &request, "log events").await {
            PostResponse::Success(_) => {
                debug!("Delivered {} event(s)", events.len());
                Ok(())
            }
            PostResponse::Failed(err, _) => Err(err),
        }
    }
}

/// Adapter that appends events to a file, one JSON document per line.
pub struct LocalFileEventLoggingAdapter {
    file_path: PathBuf,
}

impl LocalFileEventLoggingAdapter {
    /// Creates a new [`LocalFileEventLoggingAdapter`]. The file is created on first write.
    pub fn new<P: Into<PathBuf>>(file_path: P) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

#[async_trait]
impl EventLoggingAdapter for LocalFileEventLoggingAdapter {
    async fn log_events(&self, events: &[Event]) -> Result<(), EvaluatorError> {
        let mut lines = String::new();
        for event in events {
            let line = serde_json::to_string(event).map_err(|err| {
                EvaluatorError::new(
                    EventLoggingFailure,
                    format!("Failed to serialize event. {err}"),
                )
            })?;
            lines.push_str(line.as_str());
            lines.push('\n');
        }

        let write_err = |err: std::io::Error| {
            EvaluatorError::new(
                EventLoggingFailure,
                format!("Failed to write events to '{}'. {err}", self.file_path.display()),
            )
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(write_err)?;
        file.write_all(lines.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)
    }
}
