use std::time::Duration;

use chrono::Utc;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::constants::{PKG_VERSION, SDK_TYPE};
use crate::errors::ErrorKind::*;
use crate::errors::EvaluatorError;

pub mod evaluator;

pub(crate) const API_KEY_HEADER: &str = "STATSIG-API-KEY";
pub(crate) const SDK_TYPE_HEADER: &str = "STATSIG-SDK-TYPE";
pub(crate) const SDK_VERSION_HEADER: &str = "STATSIG-SDK-VERSION";
pub(crate) const CLIENT_TIME_HEADER: &str = "STATSIG-CLIENT-TIME";

pub(crate) const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, PartialEq)]
pub(crate) enum PostResponse {
    Success(String),
    /// The error and whether it's worth retrying the request.
    Failed(EvaluatorError, bool),
}

/// Joins `base_url` and `path`, ignoring a trailing `/` on the base.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

/// Authenticated JSON-over-HTTP channel to the evaluation service.
pub(crate) struct Transport {
    http_client: reqwest::Client,
}

impl Transport {
    pub fn new(sdk_key: &str, timeout: Duration) -> Result<Self, EvaluatorError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(sdk_key).map_err(|_| {
            EvaluatorError::new(
                InvalidSdkKey,
                "SDK key contains characters that are not allowed in an HTTP header.".to_owned(),
            )
        })?;
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(SDK_TYPE_HEADER, HeaderValue::from_static(SDK_TYPE));
        headers.insert(SDK_VERSION_HEADER, HeaderValue::from_static(PKG_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                EvaluatorError::new(
                    HttpClientInitFailure,
                    format!("Failed to initialize the HTTP client. {err}"),
                )
            })?;
        Ok(Self { http_client })
    }

    /// Posts `body` to `url`, retrying transient failures.
    ///
    /// Failed attempts that are retried are logged as warnings, only the final failure is
    /// logged as an error.
    pub async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        body: &B,
        action: &str,
    ) -> PostResponse {
        let mut attempt = 1;
        loop {
            let response = self.post_once(url, body, action).await;
            match &response {
                PostResponse::Failed(err, true) if attempt < MAX_ATTEMPTS => {
                    warn!(event_id = err.kind.as_u16(); "{err} Retrying ({attempt}/{MAX_ATTEMPTS}).");
                    attempt += 1;
                }
                PostResponse::Failed(err, _) => {
                    error!(event_id = err.kind.as_u16(); "{err}");
                    return response;
                }
                PostResponse::Success(_) => return response,
            }
        }
    }

    async fn post_once<B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        body: &B,
        action: &str,
    ) -> PostResponse {
        let result = self
            .http_client
            .post(url)
            .header(CLIENT_TIME_HEADER, Utc::now().timestamp_millis().to_string())
            .json(body)
            .send()
            .await;

        match result {
            Ok(response) => match response.status().as_u16() {
                code @ 200..=299 => {
                    debug!("Request to '{url}' was successful. Status code: {code}");
                    match response.text().await {
                        Ok(body_str) => PostResponse::Success(body_str),
                        Err(body_error) if body_error.is_timeout() => timed_out(action),
                        Err(body_error) => {
                            let msg = format!("Request to {action} was successful but the HTTP response content was invalid. {body_error}");
                            PostResponse::Failed(EvaluatorError::new(InvalidHttpResponseContent, msg), true)
                        }
                    }
                }
                code @ 401 | code @ 403 => {
                    let msg = format!("Your SDK key seems to be wrong, the request to {action} was rejected. Status code: {code}");
                    PostResponse::Failed(EvaluatorError::new(InvalidSdkKey, msg), false)
                }
                code => {
                    let msg = format!("Unexpected HTTP response was received while trying to {action}. Status code: {code}");
                    PostResponse::Failed(EvaluatorError::new(UnexpectedHttpResponse, msg), code >= 500)
                }
            },
            Err(error) if error.is_timeout() => timed_out(action),
            Err(error) => {
                let msg = format!("Unexpected error occurred while trying to {action}. It is most likely due to a local network issue. {error}");
                PostResponse::Failed(EvaluatorError::new(HttpRequestFailure, msg), true)
            }
        }
    }
}

fn timed_out(action: &str) -> PostResponse {
    let msg = format!("Request timed out while trying to {action}.");
    PostResponse::Failed(EvaluatorError::new(HttpRequestTimeout, msg), true)
}
