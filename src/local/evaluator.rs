use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::EvaluatorError;
use crate::event_logging::logger::EventLogger;
use crate::local::source::GateSource;
use crate::{CheckGateOptions, EvaluationReason, FeatureGate, GateEvaluator, User};

/// Evaluator that serves gates in-process from a [`GateSource`].
///
/// Gate values don't depend on the user: every valid user gets the value from the source.
/// Exposures are enqueued in the attached [`EventLogger`] unless the check disables them.
pub struct LocalEvaluator {
    source: Box<dyn GateSource>,
    logger: Option<Arc<EventLogger>>,
}

impl LocalEvaluator {
    /// Creates a [`LocalEvaluator`] that doesn't log exposures.
    pub fn new(source: Box<dyn GateSource>) -> Self {
        Self {
            source,
            logger: None,
        }
    }

    /// Creates a [`LocalEvaluator`] that logs exposures through `logger`.
    pub fn with_logger(source: Box<dyn GateSource>, logger: Arc<EventLogger>) -> Self {
        Self {
            source,
            logger: Some(logger),
        }
    }
}

#[async_trait]
impl GateEvaluator for LocalEvaluator {
    async fn get_feature_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<FeatureGate, EvaluatorError> {
        user.validate()?;
        let gate = match self.source.gates().get(name) {
            Some(local) => FeatureGate::new(
                name,
                local.value,
                local.rule_id.as_str(),
                local.id_type.as_str(),
                EvaluationReason::Local,
            ),
            None => {
                debug!("Gate '{name}' is not present in the local gate source");
                FeatureGate::unrecognized(name)
            }
        };
        if let Some(logger) = &self.logger {
            if !options.disable_exposure_logging() {
                logger.log_gate_exposure(user, &gate);
            }
        }
        Ok(gate)
    }

    async fn flush(&self) {
        if let Some(logger) = &self.logger {
            logger.flush().await;
        }
    }

    async fn shutdown(&self) {
        if let Some(logger) = &self.logger {
            logger.shutdown().await;
        }
    }
}

#[cfg(test)]
mod local_evaluator_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::errors::ErrorKind;
    use crate::event_logging::logger::logger_tests::RecordingAdapter;
    use crate::event_logging::logger::EventLogger;
    use crate::local::evaluator::LocalEvaluator;
    use crate::local::map::MapGateSource;
    use crate::{CheckGateOptions, EvaluationReason, GateEvaluator, User};

    fn evaluator(adapter: &RecordingAdapter) -> LocalEvaluator {
        let logger = EventLogger::new(
            Box::new(adapter.clone()),
            100,
            Duration::ZERO,
            Duration::from_secs(60),
        );
        LocalEvaluator::with_logger(
            Box::new(MapGateSource::from([("on", true), ("off", false)])),
            Arc::new(logger),
        )
    }

    #[tokio::test]
    async fn check_gate() {
        let adapter = RecordingAdapter::default();
        let evaluator = evaluator(&adapter);
        let user = User::new("u1");

        assert!(evaluator.check_gate("on", &user, CheckGateOptions::default()).await.unwrap());
        assert!(!evaluator.check_gate("off", &user, CheckGateOptions::default()).await.unwrap());

        let gate = evaluator
            .get_feature_gate("on", &user, CheckGateOptions::default())
            .await
            .unwrap();
        assert_eq!(gate.rule_id, "local");
        assert_eq!(gate.details.reason, EvaluationReason::Local);
    }

    #[tokio::test]
    async fn unknown_gate() {
        let adapter = RecordingAdapter::default();
        let evaluator = evaluator(&adapter);

        let gate = evaluator
            .get_feature_gate("missing", &User::new("u1"), CheckGateOptions::default())
            .await
            .unwrap();

        assert!(!gate.value);
        assert_eq!(gate.rule_id, "default");
        assert_eq!(gate.details.reason, EvaluationReason::Unrecognized);
    }

    #[tokio::test]
    async fn logs_exposures() {
        let adapter = RecordingAdapter::default();
        let evaluator = evaluator(&adapter);

        evaluator.check_gate("on", &User::new("u1"), CheckGateOptions::default()).await.unwrap();
        evaluator.flush().await;

        let events = adapter.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata["gate"], "on");
        assert_eq!(events[0].metadata["gateValue"], "true");
        assert_eq!(events[0].metadata["ruleID"], "local");
    }

    #[tokio::test]
    async fn disabled_exposure_logging() {
        let adapter = RecordingAdapter::default();
        let evaluator = evaluator(&adapter);

        evaluator.check_gate("on", &User::new("u1"), CheckGateOptions::new(true)).await.unwrap();
        evaluator.flush().await;

        assert!(adapter.events().is_empty());
    }

    #[tokio::test]
    async fn invalid_user() {
        let adapter = RecordingAdapter::default();
        let evaluator = evaluator(&adapter);

        let err = evaluator
            .check_gate("on", &User::default(), CheckGateOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidContext);
        evaluator.flush().await;
        assert!(adapter.events().is_empty());
    }

    #[tokio::test]
    async fn without_logger() {
        let evaluator = LocalEvaluator::new(Box::new(MapGateSource::from([("on", true)])));

        assert!(evaluator.check_gate("on", &User::new("u1"), CheckGateOptions::default()).await.unwrap());
        evaluator.flush().await;
        evaluator.shutdown().await;
    }
}
