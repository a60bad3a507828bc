//! HTTP-style entry point: verb checks, CORS headers and response shapes.
//!
//! [`PinDispatcher::handle`] never fails. Every outcome, including validation and
//! configuration errors, becomes a [`HandlerResponse`] with a JSON `message`.

use serde_json::{Value, json};
use tracing::{error, warn};

use crate::client::{DispatchError, PinDispatcher};
use crate::config::DispatchConfig;
use crate::domain::{DispatchRequest, DispatchResponse};

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const CONTENT_TYPE: &str = "Content-Type";

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl HandlerResponse {
    fn preflight(config: &DispatchConfig) -> Self {
        Self {
            status: 200,
            headers: vec![
                (ALLOW_ORIGIN, config.allowed_origin.clone()),
                (ALLOW_METHODS, ALLOWED_METHODS.to_owned()),
                (ALLOW_HEADERS, ALLOWED_HEADERS.to_owned()),
            ],
            body: String::new(),
        }
    }

    fn json(status: u16, body: &Value, config: &DispatchConfig) -> Self {
        Self {
            status,
            headers: vec![
                (ALLOW_ORIGIN, config.allowed_origin.clone()),
                (CONTENT_TYPE, "application/json".to_owned()),
            ],
            body: body.to_string(),
        }
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl PinDispatcher {
    /// Handle one inbound call: `OPTIONS` pre-flight or `POST` with a JSON body.
    pub async fn handle(
        &self,
        method: &str,
        body: Option<&[u8]>,
        config: &DispatchConfig,
    ) -> HandlerResponse {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return HandlerResponse::preflight(config);
        }

        match self.handle_post(method, body, config).await {
            Ok(response) => HandlerResponse::json(200, &success_body(&response), config),
            Err(err) => HandlerResponse::json(err.status(), &error_body(&err), config),
        }
    }

    async fn handle_post(
        &self,
        method: &str,
        body: Option<&[u8]>,
        config: &DispatchConfig,
    ) -> Result<DispatchResponse, DispatchError> {
        if !method.eq_ignore_ascii_case("POST") {
            return Err(DispatchError::MethodNotAllowed {
                method: method.to_owned(),
            });
        }

        let request = DispatchRequest::from_json(body).inspect_err(|err| {
            warn!(error = %err, "rejected PIN dispatch request");
        })?;

        self.dispatch(request, config).await.inspect_err(|err| {
            if err.status() >= 500 && !matches!(err, DispatchError::TelemetryRejected { .. }) {
                error!(error = %err, "PIN dispatch failed");
            }
        })
    }
}

fn success_body(response: &DispatchResponse) -> Value {
    json!({
        "success": response.success,
        "ts": response.telemetry,
        "thingspeakEntry": response.telemetry.normalized_entry,
        "sms": response.sms,
    })
}

fn error_body(err: &DispatchError) -> Value {
    match err {
        DispatchError::TelemetryRejected { telemetry } => json!({
            "message": err.to_string(),
            "details": telemetry.raw_body,
            "ts": telemetry,
        }),
        _ => json!({ "message": err.to_string() }),
    }
}
