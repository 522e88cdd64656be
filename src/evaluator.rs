use crate::errors::EvaluatorError;
use crate::{CheckGateOptions, FeatureGate, User};
use async_trait::async_trait;

/// The boundary to an engine that resolves gate values.
///
/// Implementations must honor [`CheckGateOptions::disable_exposure_logging`]: when it's set,
/// no exposure event may be emitted for the check, neither locally nor by a remote service.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use sigstat::{CheckGateOptions, EvaluatorError, FeatureGate, GateEvaluator, User};
///
/// struct AlwaysOn;
///
/// #[async_trait]
/// impl GateEvaluator for AlwaysOn {
///     async fn get_feature_gate(
///         &self,
///         name: &str,
///         user: &User,
///         _options: CheckGateOptions,
///     ) -> Result<FeatureGate, EvaluatorError> {
///         user.validate()?;
///         Ok(FeatureGate {
///             name: name.to_owned(),
///             value: true,
///             rule_id: "always".to_owned(),
///             id_type: "userID".to_owned(),
///             details: sigstat::EvaluationDetails {
///                 reason: sigstat::EvaluationReason::Local,
///                 received_at: chrono::Utc::now(),
///                 error: None,
///             },
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait GateEvaluator: Send + Sync {
    /// Evaluates the gate identified by `name` for `user`, returning the value and its metadata.
    ///
    /// An unknown gate is not an error: it evaluates to `false` with the
    /// [`crate::EvaluationReason::Unrecognized`] reason.
    async fn get_feature_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<FeatureGate, EvaluatorError>;

    /// Evaluates the gate identified by `name` for `user`.
    async fn check_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<bool, EvaluatorError> {
        Ok(self.get_feature_gate(name, user, options).await?.value)
    }

    /// Delivers buffered exposures, if the evaluator buffers any.
    async fn flush(&self) {}

    /// Releases background resources; the evaluator is not used afterwards.
    async fn shutdown(&self) {}
}
