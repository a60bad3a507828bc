//! axum hosting for [`PinDispatcher::handle`].

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::json;
use tracing::warn;

use crate::client::PinDispatcher;
use crate::config::DispatchConfig;
use crate::handler::HandlerResponse;

pub const SEND_PIN_PATH: &str = "/api/send-pin";
/// Path the admin panel used when the handler ran as a Netlify function.
pub const LEGACY_SEND_PIN_PATH: &str = "/.netlify/functions/sendPin";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: PinDispatcher,
    pub config: Arc<DispatchConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SEND_PIN_PATH, any(send_pin))
        .route(LEGACY_SEND_PIN_PATH, any(send_pin))
        .route(HEALTH_PATH, get(|| async { Json(json!({"status": "UP"})) }))
        .with_state(state)
}

async fn send_pin(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    state
        .dispatcher
        .handle(method.as_str(), Some(&body[..]), &state.config)
        .await
        .into_response()
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = name, value = %value, "dropping invalid response header"),
            }
        }
        response
    }
}
