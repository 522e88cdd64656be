use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use serde::{Deserialize, Serialize};

use crate::constants::CHECK_GATE_PATH;
use crate::errors::ErrorKind::*;
use crate::errors::EvaluatorError;
use crate::http::{endpoint, PostResponse, Transport};
use crate::{CheckGateOptions, EvaluationReason, FeatureGate, GateEvaluator, User};

#[derive(Serialize)]
struct CheckGateRequest<'a> {
    #[serde(rename = "gateName")]
    gate_name: &'a str,
    user: &'a User,
    #[serde(flatten)]
    options: CheckGateOptions,
}

#[derive(Deserialize)]
struct CheckGateResponse {
    name: Option<String>,
    value: bool,
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    id_type: String,
}

/// Evaluator that delegates gate checks to a remote evaluation service.
///
/// The service is responsible for exposure logging, so the per-call options are forwarded
/// with the request.
pub struct HttpEvaluator {
    transport: Transport,
    check_gate_url: String,
    offline: AtomicBool,
}

impl HttpEvaluator {
    /// Creates a new [`HttpEvaluator`] that talks to the service at `base_url`.
    ///
    /// # Errors
    ///
    /// This method fails when the SDK key can't be sent as an HTTP header or when the
    /// HTTP client can't be initialized.
    pub fn new(base_url: &str, sdk_key: &str, timeout: Duration) -> Result<Self, EvaluatorError> {
        Ok(Self {
            transport: Transport::new(sdk_key, timeout)?,
            check_gate_url: endpoint(base_url, CHECK_GATE_PATH),
            offline: AtomicBool::new(false),
        })
    }

    /// Switches the evaluator in or out of offline mode.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// True when the evaluator is not allowed to initiate HTTP requests.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GateEvaluator for HttpEvaluator {
    async fn get_feature_gate(
        &self,
        name: &str,
        user: &User,
        options: CheckGateOptions,
    ) -> Result<FeatureGate, EvaluatorError> {
        user.validate()?;
        if self.is_offline() {
            return Err(EvaluatorError::new(
                OfflineClient,
                format!("Evaluator is in offline mode, it cannot check gate '{name}' over HTTP."),
            ));
        }

        let request = CheckGateRequest {
            gate_name: name,
            user,
            options,
        };
        match self
            .transport
            .post(&self.check_gate_url, &request, "check gate")
            .await
        {
            PostResponse::Success(body) => {
                match serde_json::from_str::<CheckGateResponse>(body.as_str()) {
                    Ok(response) => Ok(FeatureGate::new(
                        response.name.as_deref().unwrap_or(name),
                        response.value,
                        response.rule_id.as_str(),
                        response.id_type.as_str(),
                        EvaluationReason::Network,
                    )),
                    Err(parse_error) => {
                        let msg = format!("Checking gate '{name}' was successful but the HTTP response content was invalid. {parse_error}");
                        error!(event_id = InvalidHttpResponseContent.as_u16(); "{}", msg);
                        Err(EvaluatorError::new(InvalidHttpResponseContent, msg))
                    }
                }
            }
            PostResponse::Failed(err, _) => Err(err),
        }
    }
}
