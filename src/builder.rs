use crate::constants::{DEFAULT_API_URL, LOG_EVENT_PATH};
use crate::errors::{ErrorKind, EvaluatorError};
use crate::event_logging::adapter::{EventLoggingAdapter, HttpEventLoggingAdapter};
use crate::event_logging::logger::EventLogger;
use crate::http::endpoint;
use crate::http::evaluator::HttpEvaluator;
use crate::local::evaluator::LocalEvaluator;
use crate::local::source::GateSource;
use crate::{Client, GateEvaluator};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct Options {
    offline: bool,
    disable_all_logging: bool,
    environment: Option<String>,
}

impl Options {
    pub(crate) fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub(crate) fn offline(&self) -> bool {
        self.offline
    }

    pub(crate) fn disable_all_logging(&self) -> bool {
        self.disable_all_logging
    }
}

/// Builder to create a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use sigstat::Client;
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = Client::builder("secret-key")
///     .http_timeout(Duration::from_secs(10))
///     .event_logging_flush_interval(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// # }
/// ```
pub struct ClientBuilder {
    sdk_key: String,
    base_url: Option<String>,
    log_event_url: Option<String>,
    environment: Option<String>,
    http_timeout: Option<Duration>,
    offline: bool,
    disable_all_logging: bool,
    flush_interval: Option<Duration>,
    max_queue_size: Option<usize>,
    dedupe_interval: Option<Duration>,
    adapter: Option<Box<dyn EventLoggingAdapter>>,
    local_source: Option<Box<dyn GateSource>>,
    evaluator: Option<Arc<dyn GateEvaluator>>,
}

impl ClientBuilder {
    pub(crate) fn new(sdk_key: &str) -> Self {
        Self {
            sdk_key: sdk_key.to_owned(),
            base_url: None,
            log_event_url: None,
            environment: None,
            http_timeout: None,
            offline: false,
            disable_all_logging: false,
            flush_interval: None,
            max_queue_size: None,
            dedupe_interval: None,
            adapter: None,
            local_source: None,
            evaluator: None,
        }
    }

    /// Sets a custom base URL of the evaluation service.
    /// Default value is `https://api.statsig.com/v1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::Client;
    ///
    /// let builder = Client::builder("secret-key")
    ///     .base_url("https://gates.example.com/v1");
    /// ```
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_owned());
        self
    }

    /// Sets the URL events are posted to by the default event logging adapter.
    /// Default value is the `log_event` endpoint under the base URL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::Client;
    ///
    /// let builder = Client::builder("secret-key")
    ///     .log_event_url("https://events.example.com/v1/rgstr");
    /// ```
    pub fn log_event_url(mut self, url: &str) -> Self {
        self.log_event_url = Some(url.to_owned());
        self
    }

    /// Sets the environment tier (e.g. `production`, `staging`) attached to every user
    /// that doesn't carry one, so it's sent to the evaluator and included in events.
    pub fn environment(mut self, tier: &str) -> Self {
        self.environment = Some(tier.to_owned());
        self
    }

    /// Sets the HTTP request timeout.
    /// Default value is `30` seconds.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Indicates whether the SDK should be initialized in offline mode or not.
    /// Default value is `false`.
    ///
    /// In offline mode gate checks that need the network fail and exposure events
    /// bound to the network are dropped.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Suppresses exposure logging for every gate check, as if each check was made with
    /// [`crate::CheckGateOptions::disable_exposure_logging`] set. Manual exposures and custom
    /// events are dropped too.
    /// Default value is `false`.
    pub fn disable_all_logging(mut self, disable: bool) -> Self {
        self.disable_all_logging = disable;
        self
    }

    /// Sets how often queued events are delivered.
    /// Default value is `60` seconds.
    pub fn event_logging_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Sets how many events may wait in the queue before a delivery is triggered.
    /// Default value is `1000`, the value is clamped between `10` and `10000`.
    pub fn event_logging_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = Some(size);
        self
    }

    /// Sets the interval within which identical exposures are logged only once.
    /// Default value is `60` seconds, `Duration::ZERO` disables the deduplication.
    pub fn exposure_dedupe_interval(mut self, interval: Duration) -> Self {
        self.dedupe_interval = Some(interval);
        self
    }

    /// Sets the [`EventLoggingAdapter`] exposures and custom events are delivered to.
    /// By default they are posted to the evaluation service.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::{Client, LocalFileEventLoggingAdapter};
    ///
    /// let builder = Client::builder("secret-key")
    ///     .event_logging_adapter(Box::new(LocalFileEventLoggingAdapter::new("exposures.jsonl")));
    /// ```
    pub fn event_logging_adapter(mut self, adapter: Box<dyn EventLoggingAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Evaluates gates in-process from `source` instead of asking the evaluation service.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::{Client, MapGateSource};
    ///
    /// let builder = Client::builder("secret-key")
    ///     .local_gates(Box::new(MapGateSource::from([("new_checkout", true)])));
    /// ```
    pub fn local_gates(mut self, source: Box<dyn GateSource>) -> Self {
        self.local_source = Some(source);
        self
    }

    /// Plugs a custom [`GateEvaluator`]. Takes precedence over [`ClientBuilder::local_gates`].
    pub fn evaluator(mut self, evaluator: Arc<dyn GateEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Creates a [`Client`] from the configuration made on the builder.
    ///
    /// Must be called inside a Tokio runtime, the client spawns its background tasks here.
    ///
    /// # Errors
    ///
    /// This method fails in the following cases:
    /// - The SDK key is empty while the client needs the evaluation service.
    /// - The SDK key can't be sent as an HTTP header.
    /// - The HTTP client can't be initialized.
    pub fn build(self) -> Result<Client, EvaluatorError> {
        let needs_service =
            (self.evaluator.is_none() && self.local_source.is_none()) || self.adapter.is_none();
        if self.sdk_key.is_empty() && needs_service {
            return Err(EvaluatorError::new(
                ErrorKind::InvalidSdkKey,
                "SDK key cannot be empty".to_owned(),
            ));
        }

        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let http_timeout = self.http_timeout.unwrap_or(Duration::from_secs(30));

        let adapter: Box<dyn EventLoggingAdapter> = match self.adapter {
            Some(adapter) => adapter,
            None => {
                let log_event_url = match self.log_event_url {
                    Some(url) => url,
                    None => endpoint(base_url, LOG_EVENT_PATH),
                };
                let adapter = HttpEventLoggingAdapter::new(&log_event_url, &self.sdk_key, http_timeout)?;
                adapter.set_offline(self.offline);
                Box::new(adapter)
            }
        };
        let logger = Arc::new(EventLogger::new(
            adapter,
            self.max_queue_size.unwrap_or(1000),
            self.flush_interval.unwrap_or(Duration::from_secs(60)),
            self.dedupe_interval.unwrap_or(Duration::from_secs(60)),
        ));

        let evaluator: Arc<dyn GateEvaluator> = match (self.evaluator, self.local_source) {
            (Some(evaluator), _) => evaluator,
            (None, Some(source)) => Arc::new(LocalEvaluator::with_logger(source, Arc::clone(&logger))),
            (None, None) => {
                let evaluator = HttpEvaluator::new(base_url, &self.sdk_key, http_timeout)?;
                evaluator.set_offline(self.offline);
                Arc::new(evaluator)
            }
        };

        Ok(Client::with_parts(
            Options {
                offline: self.offline,
                disable_all_logging: self.disable_all_logging,
                environment: self.environment,
            },
            evaluator,
            logger,
        ))
    }
}

#[cfg(test)]
mod builder_tests {
    use crate::errors::ErrorKind;
    use crate::{Client, LocalFileEventLoggingAdapter, MapGateSource};

    #[tokio::test]
    async fn empty_key_needs_local_setup() {
        let err = Client::builder("").build().err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidSdkKey);

        let err = Client::builder("")
            .local_gates(Box::new(MapGateSource::from([("a", true)])))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidSdkKey);

        let client = Client::builder("")
            .local_gates(Box::new(MapGateSource::from([("a", true)])))
            .event_logging_adapter(Box::new(LocalFileEventLoggingAdapter::new("unused.jsonl")))
            .build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn defaults() {
        let client = Client::builder("secret-key").build().unwrap();
        assert!(!client.is_offline());

        let client = Client::builder("secret-key").offline(true).build().unwrap();
        assert!(client.is_offline());
    }
}
