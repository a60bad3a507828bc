//! Client layer: orchestrates the ThingSpeak write and the BulkSMS relay.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::DispatchConfig;
use crate::domain::{
    DialingRule, DispatchRequest, DispatchResponse, RawPhoneNumber, SmsApiKey, SmsBody, SmsResult,
    TelemetryResult, ValidationError, WriteKey, pin_message,
};

type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    /// `None` when the body could not be read.
    pub(crate) body: Option<String>,
}

pub(crate) trait HttpTransport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(without_url)?;
            let status = response.status().as_u16();
            let body = response.text().await.ok();
            Ok(HttpResponse { status, body })
        })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: Value,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .bearer_auth(bearer)
                .header(reqwest::header::ACCEPT, "*/*")
                .json(&body)
                .send()
                .await
                .map_err(without_url)?;
            let status = response.status().as_u16();
            let body = response.text().await.ok();
            Ok(HttpResponse { status, body })
        })
    }
}

/// Request URLs carry credentials, so they are stripped from transport errors.
fn without_url(err: reqwest::Error) -> BoxError {
    Box::new(err.without_url())
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`PinDispatcher`].
///
/// Each variant maps to one HTTP status via [`DispatchError::status`]. SMS failures are not
/// errors; they are reported inside [`SmsResult::Failed`].
pub enum DispatchError {
    /// Verb other than `POST` (or an `OPTIONS` pre-flight).
    #[error("Method Not Allowed")]
    MethodNotAllowed { method: String },

    /// Body is not JSON, or not a JSON object.
    #[error("malformed request body: {reason}")]
    MalformedRequest { reason: String },

    /// `orderId` and/or `pin` missing or empty.
    #[error("orderId and pin are required")]
    MissingField { missing: Vec<&'static str> },

    /// A required credential is absent from [`DispatchConfig`].
    #[error("{credential} not configured")]
    Misconfigured { credential: &'static str },

    /// ThingSpeak answered with a non-2xx status or the `0` sentinel.
    #[error("ThingSpeak update failed")]
    TelemetryRejected { telemetry: TelemetryResult },

    /// Anything else (transport failure on the telemetry leg, bad endpoint URL, ...).
    #[error("{0}")]
    Unexpected(#[source] BoxError),
}

impl DispatchError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> u16 {
        match self {
            Self::MethodNotAllowed { .. } => 405,
            Self::MalformedRequest { .. } | Self::MissingField { .. } => 400,
            Self::Misconfigured { .. } | Self::Unexpected(_) => 500,
            Self::TelemetryRejected { .. } => 502,
        }
    }
}

impl From<ValidationError> for DispatchError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::MalformedPayload { reason } => Self::MalformedRequest { reason },
            ValidationError::MissingRequired { missing } => Self::MissingField { missing },
            ValidationError::Empty { field } => Self::MissingField {
                missing: vec![field],
            },
            other @ ValidationError::InvalidDialingRule { .. } => Self::Unexpected(Box::new(other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Builder for [`PinDispatcher`].
///
/// Use this when you need to customize the outbound timeout or user-agent.
pub struct PinDispatcherBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl PinDispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an HTTP client timeout applied to each outbound request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`PinDispatcher`].
    pub fn build(self) -> Result<PinDispatcher, DispatchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| DispatchError::Unexpected(Box::new(err)))?;

        Ok(PinDispatcher {
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Delivery PIN dispatch service.
///
/// Writes the PIN to ThingSpeak and, once that write is confirmed, relays it to the
/// customer through BulkSMS. The dispatcher holds no per-request state; credentials and
/// endpoints come from the [`DispatchConfig`] passed to each call.
pub struct PinDispatcher {
    http: Arc<dyn HttpTransport>,
}

impl PinDispatcher {
    /// Create a dispatcher with a default HTTP client (no timeout).
    pub fn new() -> Self {
        Self {
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a dispatcher with custom settings.
    pub fn builder() -> PinDispatcherBuilder {
        PinDispatcherBuilder::new()
    }

    /// Build a dispatcher using the outbound timeout from `config`.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, DispatchError> {
        let mut builder = Self::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    #[cfg(test)]
    pub(crate) fn with_transport(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }

    /// Record the PIN on ThingSpeak, then best-effort send it by SMS.
    ///
    /// The SMS leg runs only when the request carries a phone number and `config` has an
    /// SMS token. Its outcome never affects [`DispatchResponse::success`].
    ///
    /// Errors:
    /// - [`DispatchError::Misconfigured`] if no ThingSpeak key is configured (no network access),
    /// - [`DispatchError::TelemetryRejected`] for a non-2xx status or the `0` sentinel,
    /// - [`DispatchError::Unexpected`] if the ThingSpeak call itself fails.
    #[instrument(skip_all, fields(order_id = %request.order_id()))]
    pub async fn dispatch(
        &self,
        request: DispatchRequest,
        config: &DispatchConfig,
    ) -> Result<DispatchResponse, DispatchError> {
        let key = config
            .telemetry_key
            .as_ref()
            .ok_or(DispatchError::Misconfigured {
                credential: "ThingSpeak key",
            })?;

        let telemetry = self.write_telemetry(&request, key, config).await?;
        if !telemetry.succeeded {
            warn!(
                status = telemetry.http_status,
                entry = %telemetry.normalized_entry,
                "ThingSpeak rejected the PIN write"
            );
            return Err(DispatchError::TelemetryRejected { telemetry });
        }
        info!(entry = %telemetry.normalized_entry, "PIN recorded on ThingSpeak");

        let sms = match (request.phone(), config.sms_key.as_ref()) {
            (Some(phone), Some(sms_key)) => {
                Some(self.relay_sms(&request, phone, sms_key, config).await)
            }
            (Some(_), None) => {
                debug!("phone supplied but no SMS token configured, skipping SMS");
                None
            }
            (None, _) => None,
        };

        Ok(DispatchResponse::new(telemetry, sms))
    }

    async fn write_telemetry(
        &self,
        request: &DispatchRequest,
        key: &WriteKey,
        config: &DispatchConfig,
    ) -> Result<TelemetryResult, DispatchError> {
        let url =
            crate::transport::encode_update_url(&config.telemetry_endpoint, key, request.pin())
                .map_err(|err| DispatchError::Unexpected(Box::new(err)))?;
        debug!(url = %crate::transport::redact_update_url(&url), "writing PIN to ThingSpeak");

        let response = self
            .http
            .get(url.as_str())
            .await
            .map_err(|err| {
                let message = crate::transport::redact_key(&err.to_string(), key);
                DispatchError::Unexpected(message.into())
            })?;
        debug!(status = response.status, body = ?response.body, "ThingSpeak response");

        Ok(crate::transport::decode_update_response(
            response.status,
            response.body,
            &url,
        ))
    }

    async fn relay_sms(
        &self,
        request: &DispatchRequest,
        phone: &RawPhoneNumber,
        key: &SmsApiKey,
        config: &DispatchConfig,
    ) -> SmsResult {
        let number = DialingRule::normalize(&config.dialing_rules, phone);
        let message = pin_message(request.pin());
        debug!(number = %number, "relaying PIN by SMS");

        let body = crate::transport::encode_send_sms_json(&number, &message);
        let result = match self
            .http
            .post_json(&config.sms_endpoint, key.as_str(), body)
            .await
        {
            Ok(response) => SmsResult::Replied {
                status: response.status,
                body: match response.body {
                    Some(text) => crate::transport::decode_send_sms_body(&text),
                    None => SmsBody::Text(crate::transport::NO_BODY.to_owned()),
                },
            },
            Err(err) => SmsResult::Failed {
                error: err.to_string(),
            },
        };

        if result.succeeded() {
            info!(status = ?result.http_status(), "SMS relay accepted the PIN");
        } else {
            warn!(
                status = ?result.http_status(),
                error = ?result.error(),
                "SMS relay failed; dispatch still succeeds"
            );
        }
        result
    }
}

impl Default for PinDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
