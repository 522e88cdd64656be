use crate::builder::{ClientBuilder, Options};
use crate::constants::{OVERRIDE_RULE_ID, USER_ID_TYPE};
use crate::errors::{ErrorKind, EvaluatorError};
use crate::event_logging::event::{Event, EventValue};
use crate::event_logging::logger::EventLogger;
use crate::{CheckGateOptions, EvaluationReason, FeatureGate, GateEvaluator, User};
use arc_swap::ArcSwap;
use log::{debug, error, warn};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The main component for checking feature gates.
///
/// # Examples
///
/// ```no_run
/// use sigstat::{Client, User};
///
/// #[tokio::main]
/// async fn main() {
///     let client = Client::new("secret-key").unwrap();
///
///     let user = User::new("user-id");
///     let is_enabled = client.check_gate("new_checkout", &user).await;
///
///     client.shutdown().await;
/// }
/// ```
pub struct Client {
    options: Options,
    evaluator: Arc<dyn GateEvaluator>,
    logger: Arc<EventLogger>,
    overrides: ArcSwap<HashMap<String, bool>>,
    shut_down: AtomicBool,
}

impl Client {
    pub(crate) fn with_parts(
        options: Options,
        evaluator: Arc<dyn GateEvaluator>,
        logger: Arc<EventLogger>,
    ) -> Self {
        Self {
            options,
            evaluator,
            logger,
            overrides: ArcSwap::from_pointee(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Creates a new [`ClientBuilder`] used to build a [`Client`].
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
    ///     .build()
    ///     .unwrap();
    /// # }
    /// ```
    pub fn builder(sdk_key: &str) -> ClientBuilder {
        ClientBuilder::new(sdk_key)
    }

    /// Creates a new [`Client`] with default options that checks gates over HTTP.
    ///
    /// # Errors
    ///
    /// This method fails if the given SDK key is empty or can't be used as an HTTP header.
    pub fn new(sdk_key: &str) -> Result<Self, EvaluatorError> {
        ClientBuilder::new(sdk_key).build()
    }

    /// Checks the gate identified by `name` for `user`, logging an exposure.
    ///
    /// Returns `false` if the gate doesn't exist, or there was an error during the check.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sigstat::{Client, User};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::new("secret-key").unwrap();
    ///
    ///     let enabled = client.check_gate("new_checkout", &User::new("user-id")).await;
    /// }
    /// ```
    pub async fn check_gate(&self, name: &str, user: &User) -> bool {
        self.check_gate_with_options(name, user, CheckGateOptions::default())
            .await
    }

    /// The same as [`Client::check_gate`] but with per-call [`CheckGateOptions`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sigstat::{CheckGateOptions, Client, User};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::new("secret-key").unwrap();
    ///
    ///     // internal check, the user is not exposed
    ///     let options = CheckGateOptions::new(true);
    ///     let enabled = client
    ///         .check_gate_with_options("new_checkout", &User::new("user-id"), options)
    ///         .await;
    /// }
    /// ```
    pub async fn check_gate_with_options(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> bool {
        self.get_feature_gate(name, user, options).await.value
    }

    /// Evaluates the gate identified by `name` and returns a [`FeatureGate`] that
    /// contains additional information about the result of the evaluation.
    ///
    /// On failure the returned gate is `false` and carries the error in its details.
    pub async fn get_feature_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> FeatureGate {
        match self.try_get_feature_gate(name, user, options).await {
            Ok(gate) => gate,
            Err(err) => {
                error!(event_id = err.kind.as_u16(); "Failed to check gate '{name}'. {err}");
                FeatureGate::from_err(name, err)
            }
        }
    }

    /// The same as [`Client::check_gate_with_options`] but reports failures.
    ///
    /// # Errors
    ///
    /// This method fails in the following cases:
    /// - The client was shut down.
    /// - The user has neither a user ID nor a custom ID.
    /// - The evaluator failed (e.g. the evaluation service is unreachable or the client is offline).
    pub async fn try_check_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<bool, EvaluatorError> {
        Ok(self.try_get_feature_gate(name, user, options).await?.value)
    }

    /// Checks the gate identified by `name` without exposing the user through the evaluator,
    /// then enqueues the exposure explicitly.
    ///
    /// Useful when the decision to expose the user is made later than the gate check.
    /// Does nothing when the client was built with [`ClientBuilder::disable_all_logging`].
    pub async fn manually_log_gate_exposure(&self, name: &str, user: &User) {
        if self.options.disable_all_logging() {
            debug!("Logging is disabled, skipping the exposure of gate '{name}'.");
            return;
        }
        let user = self.with_environment(user);
        match self
            .try_get_feature_gate(name, &user, CheckGateOptions::new(true))
            .await
        {
            Ok(gate) => self.logger.log_gate_exposure(&user, &gate),
            Err(err) => {
                error!(event_id = err.kind.as_u16(); "Failed to log exposure of gate '{name}'. {err}")
            }
        }
    }

    /// Enqueues a custom event named `event_name` for `user`, with an optional value and metadata.
    ///
    /// Events with an empty name are dropped with a warning. Does nothing when the client
    /// was built with [`ClientBuilder::disable_all_logging`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::collections::HashMap;
    /// use sigstat::{Client, User};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::new("secret-key").unwrap();
    ///     let user = User::new("user-id");
    ///
    ///     client.log_event(&user, "add_to_cart", Some("SKU_12345".into()), None);
    ///     client.log_event(
    ///         &user,
    ///         "purchase",
    ///         Some(29.99.into()),
    ///         Some(HashMap::from([("item_name".to_owned(), "gumball".to_owned())])),
    ///     );
    /// }
    /// ```
    pub fn log_event(
        &self,
        user: &User,
        event_name: &str,
        value: Option<EventValue>,
        metadata: Option<HashMap<String, String>>,
    ) {
        if self.options.disable_all_logging() {
            debug!("Logging is disabled, skipping event '{event_name}'.");
            return;
        }
        if event_name.is_empty() {
            warn!(event_id = ErrorKind::InvalidEvent.as_u16(); "Event name must not be empty, the event is dropped.");
            return;
        }
        let mut event = Event::new(&self.with_environment(user), event_name);
        if let Some(value) = value {
            event = event.with_value(value);
        }
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.logger.log_event(event);
    }

    /// Overrides the gate identified by `name` with `value` for every user.
    ///
    /// Overridden gates are served by the client without asking the evaluator and
    /// without logging exposures.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sigstat::{Client, User};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::new("secret-key").unwrap();
    ///     client.override_gate("new_checkout", true);
    ///
    ///     assert!(client.check_gate("new_checkout", &User::new("user-id")).await);
    /// }
    /// ```
    pub fn override_gate(&self, name: &str, value: bool) {
        self.overrides.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(name.to_owned(), value);
            next
        });
    }

    /// Removes the override of the gate identified by `name`, if any.
    pub fn remove_gate_override(&self, name: &str) {
        self.overrides.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.remove(name);
            next
        });
    }

    /// Delivers every queued event.
    pub async fn flush(&self) {
        self.evaluator.flush().await;
        self.logger.flush().await;
    }

    /// Delivers the remaining events and stops the background tasks.
    ///
    /// Gate checks made afterwards fail with [`ErrorKind::ClientShutDown`].
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            warn!(event_id = ErrorKind::ClientShutDown.as_u16(); "Client was already shut down.");
            return;
        }
        self.evaluator.shutdown().await;
        self.logger.shutdown().await;
    }

    /// Returns `true` when the client is configured not to initiate HTTP requests.
    pub fn is_offline(&self) -> bool {
        self.options.offline()
    }

    async fn try_get_feature_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<FeatureGate, EvaluatorError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(EvaluatorError::new(
                ErrorKind::ClientShutDown,
                format!("Client was shut down, it cannot check gate '{name}'."),
            ));
        }
        user.validate()?;
        if let Some(value) = self.overrides.load().get(name) {
            return Ok(FeatureGate::new(
                name,
                *value,
                OVERRIDE_RULE_ID,
                USER_ID_TYPE,
                EvaluationReason::LocalOverride,
            ));
        }
        let options = options.or_disabled(self.options.disable_all_logging());
        let user = self.with_environment(user);
        self.evaluator.get_feature_gate(name, &user, options).await
    }

    fn with_environment<'a>(&self, user: &'a User) -> Cow<'a, User> {
        match self.options.environment() {
            Some(tier) if user.environment_tier().is_none() => {
                Cow::Owned(user.clone().environment(tier))
            }
            _ => Cow::Borrowed(user),
        }
    }
}

#[cfg(test)]
mod client_tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::errors::{ErrorKind, EvaluatorError};
    use crate::event_logging::logger::logger_tests::RecordingAdapter;
    use crate::{CheckGateOptions, Client, FeatureGate, GateEvaluator, User};

    struct Unavailable;

    #[async_trait]
    impl GateEvaluator for Unavailable {
        async fn get_feature_gate(
            &self,
            _: &str,
            _: &User,
            _: CheckGateOptions,
        ) -> Result<FeatureGate, EvaluatorError> {
            Err(EvaluatorError::new(ErrorKind::EvaluatorUnavailable, "engine is gone".to_owned()))
        }
    }

    fn client() -> Client {
        Client::builder("")
            .evaluator(Arc::new(Unavailable))
            .event_logging_adapter(Box::new(RecordingAdapter::default()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn empty_event_name_is_dropped() {
        let adapter = RecordingAdapter::default();
        let client = Client::builder("")
            .evaluator(Arc::new(Unavailable))
            .event_logging_adapter(Box::new(adapter.clone()))
            .build()
            .unwrap();

        client.log_event(&User::new("u1"), "", Some("x".into()), None);
        client.log_event(&User::new("u1"), "signup", None, None);
        client.flush().await;

        let events = adapter.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "signup");
    }

    #[tokio::test]
    async fn environment_is_kept_when_user_has_one() {
        let client = Client::builder("")
            .evaluator(Arc::new(Unavailable))
            .event_logging_adapter(Box::new(RecordingAdapter::default()))
            .environment("staging")
            .build()
            .unwrap();

        let user = User::new("u1");
        assert_eq!(client.with_environment(&user).environment_tier(), Some("staging"));

        let user = User::new("u1").environment("production");
        assert_eq!(client.with_environment(&user).environment_tier(), Some("production"));
    }

    #[tokio::test]
    async fn evaluator_failure_defaults_to_false() {
        let client = client();
        let user = User::new("u1");

        assert!(!client.check_gate("g", &user).await);

        let gate = client.get_feature_gate("g", &user, CheckGateOptions::default()).await;
        assert!(!gate.value);
        assert_eq!(gate.details.error.unwrap().kind, ErrorKind::EvaluatorUnavailable);

        let err = client
            .try_check_gate("g", &user, CheckGateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::EvaluatorUnavailable);
    }

    #[tokio::test]
    async fn override_skips_evaluator() {
        let client = client();
        let user = User::new("u1");

        client.override_gate("g", true);
        assert!(client.try_check_gate("g", &user, CheckGateOptions::default()).await.unwrap());

        client.remove_gate_override("g");
        assert!(client.try_check_gate("g", &user, CheckGateOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn override_still_validates_user() {
        let client = client();
        client.override_gate("g", true);

        let err = client
            .try_check_gate("g", &User::default(), CheckGateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidContext);
    }

    #[tokio::test]
    async fn shut_down_client_refuses_checks() {
        let client = client();
        client.override_gate("g", true);
        client.shutdown().await;

        let err = client
            .try_check_gate("g", &User::new("u1"), CheckGateOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ClientShutDown);
        assert!(!client.check_gate("g", &User::new("u1")).await);

        client.shutdown().await;
    }
}
