//! Traffic estimator service client.
//!
//! [`TrafficEstimator`] is the seam between the report engine and the network; the engine only ever
//! sees a selector going out and a [`TrafficEstimatorResult`] coming back. [`ReqwestTrafficEstimator`]
//! is the production implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;
use crate::errors::{ApiErrorEntry, ApiFault, Error, Result};
use crate::estimate::{TrafficEstimatorResult, TrafficEstimatorSelector};

/// A trait for requesting keyword traffic estimates.
///
/// One call is one blocking request/response exchange. Implementations must return keyword estimates in
/// the order the selector listed the keywords.
#[async_trait]
pub trait TrafficEstimator {
    async fn estimate(&self, selector: &TrafficEstimatorSelector) -> Result<TrafficEstimatorResult>;
}

/// The concrete implementation of `TrafficEstimator`, posting JSON selectors with `reqwest`.
pub struct ReqwestTrafficEstimator {
    client: Client,
    url: Url,
    access_token: String,
    developer_token: Option<String>,
    client_customer_id: Option<String>,
}

impl ReqwestTrafficEstimator {
    /// Build a client for the configured endpoint and API version.
    ///
    /// Fails with [`Error::Authorization`] when no access token is configured, so a run without
    /// credentials stops before any request is attempted.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let access_token = config.access_token.clone().ok_or_else(|| Error::Authorization {
            message: "no OAuth2 access token configured".to_string(),
        })?;

        let client = Client::builder().timeout(config.request_timeout).build()?;
        let url = service_url(&config.endpoint, &config.version)?;

        Ok(Self {
            client,
            url,
            access_token,
            developer_token: config.developer_token.clone(),
            client_customer_id: config.client_customer_id.clone(),
        })
    }
}

/// Makes sure a url has a trailing slash, so `join` appends instead of replacing the last segment.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

/// `{endpoint}/api/adwords/o/{version}/TrafficEstimatorService`
fn service_url(endpoint: &Url, version: &str) -> Result<Url> {
    ensure_slash(endpoint)
        .join(&format!("api/adwords/o/{}/TrafficEstimatorService", version.trim()))
        .map_err(|e| Error::Config {
            message: format!("cannot build service URL from {endpoint}: {e}"),
        })
}

/// Parse an application-level fault body.
///
/// Returns `None` when the body is not JSON or carries neither a message nor an error list.
fn parse_api_fault(body: &str) -> Option<ApiFault> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    let message = object.get("message").and_then(Value::as_str).map(str::to_string);
    let errors = object.get("errors").and_then(Value::as_array);
    if message.is_none() && errors.is_none() {
        return None;
    }

    let errors = errors
        .map(|entries| {
            entries
                .iter()
                .map(|entry| ApiErrorEntry {
                    fields: match entry {
                        Value::Object(fields) => fields
                            .iter()
                            .map(|(field, value)| (field.clone(), render_value(value)))
                            .collect(),
                        other => vec![("error".to_string(), render_value(other))],
                    },
                })
                .collect()
        })
        .unwrap_or_default();

    Some(ApiFault {
        message: message.unwrap_or_default(),
        errors,
    })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl TrafficEstimator for ReqwestTrafficEstimator {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn estimate(&self, selector: &TrafficEstimatorSelector) -> Result<TrafficEstimatorResult> {
        let mut request = self.client.post(self.url.clone()).bearer_auth(&self.access_token).json(selector);

        if let Some(developer_token) = &self.developer_token {
            request = request.header("developerToken", developer_token);
        }
        if let Some(client_customer_id) = &self.client_customer_id {
            request = request.header("clientCustomerId", client_customer_id);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Traffic estimator request failed");
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), response_len = body.len(), "Traffic estimator responded");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authorization {
                message: format!("{status} {body}").trim().to_string(),
            });
        }

        if !status.is_success() {
            return Err(match parse_api_fault(&body) {
                Some(fault) => Error::Api(fault),
                None => Error::HttpStatus {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        match serde_json::from_str::<TrafficEstimatorResult>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!("Failed to parse traffic estimator response as JSON. Error: {}", e);
                tracing::debug!("Response body was: {}", body);
                Err(Error::Other(anyhow::anyhow!("error decoding response body: {}", e)))
            }
        }
    }
}
