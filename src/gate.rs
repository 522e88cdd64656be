use crate::constants::DEFAULT_RULE_ID;
use crate::errors::EvaluatorError;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// Describes where the value of a [`FeatureGate`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationReason {
    /// Evaluated in-process from a local gate source.
    Local,
    /// Evaluated by a remote evaluator.
    Network,
    /// Set by [`crate::Client::override_gate`].
    LocalOverride,
    /// The evaluator doesn't know the gate; the value is the default `false`.
    Unrecognized,
    /// The evaluation failed; the value is the default `false`.
    Error,
}

impl Display for EvaluationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationReason::Local => f.write_str("Local"),
            EvaluationReason::Network => f.write_str("Network"),
            EvaluationReason::LocalOverride => f.write_str("LocalOverride"),
            EvaluationReason::Unrecognized => f.write_str("Unrecognized"),
            EvaluationReason::Error => f.write_str("Error"),
        }
    }
}

/// Details of the gate evaluation's result.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails {
    /// Where the value came from.
    pub reason: EvaluationReason,
    /// Time the result was produced.
    pub received_at: DateTime<Utc>,
    /// Error in case evaluation failed.
    pub error: Option<EvaluatorError>,
}

impl EvaluationDetails {
    pub(crate) fn new(reason: EvaluationReason) -> Self {
        Self {
            reason,
            received_at: Utc::now(),
            error: None,
        }
    }
}

/// The result of a gate check.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGate {
    /// Name of the gate.
    pub name: String,
    /// The evaluated value.
    pub value: bool,
    /// ID of the rule that produced the value; `default` when no rule matched.
    pub rule_id: String,
    /// The ID type the gate was evaluated on (e.g. `userID`).
    pub id_type: String,
    /// Additional information about the evaluation.
    pub details: EvaluationDetails,
}

impl FeatureGate {
    pub(crate) fn new(
        name: &str,
        value: bool,
        rule_id: &str,
        id_type: &str,
        reason: EvaluationReason,
    ) -> Self {
        Self {
            name: name.to_owned(),
            value,
            rule_id: rule_id.to_owned(),
            id_type: id_type.to_owned(),
            details: EvaluationDetails::new(reason),
        }
    }

    pub(crate) fn unrecognized(name: &str) -> Self {
        Self::new(name, false, DEFAULT_RULE_ID, "", EvaluationReason::Unrecognized)
    }

    pub(crate) fn from_err(name: &str, err: EvaluatorError) -> Self {
        let mut gate = Self::new(name, false, DEFAULT_RULE_ID, "", EvaluationReason::Error);
        gate.details.error = Some(err);
        gate
    }
}

#[cfg(test)]
mod gate_tests {
    use crate::errors::{ErrorKind, EvaluatorError};
    use crate::{EvaluationReason, FeatureGate};

    #[test]
    fn unrecognized_defaults() {
        let gate = FeatureGate::unrecognized("missing");
        assert_eq!(gate.name, "missing");
        assert!(!gate.value);
        assert_eq!(gate.rule_id, "default");
        assert_eq!(gate.id_type, "");
        assert_eq!(gate.details.reason, EvaluationReason::Unrecognized);
        assert!(gate.details.error.is_none());
    }

    #[test]
    fn from_err_keeps_error() {
        let err = EvaluatorError::new(ErrorKind::EvaluatorUnavailable, "gone".to_owned());
        let gate = FeatureGate::from_err("g", err.clone());
        assert!(!gate.value);
        assert_eq!(gate.details.reason, EvaluationReason::Error);
        assert_eq!(gate.details.error, Some(err));
    }
}
