//! Delivery PIN dispatch for the smart delivery box admin panel.
//!
//! A dispatch writes the PIN to a ThingSpeak channel (which the locker reads) and, once
//! that write is confirmed, relays it to the customer through BulkSMS. The crate is laid
//! out as a domain layer of strong types, a transport layer for wire-format quirks, and a
//! small client layer orchestrating the two calls. [`PinDispatcher::handle`] wraps it in
//! the HTTP contract the panel expects, and [`server`] hosts that on axum.
//!
//! ```rust,no_run
//! use pin_dispatch::{DispatchConfig, DispatchRequest, OrderId, Pin, PinDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DispatchConfig::from_env()?;
//!     let dispatcher = PinDispatcher::from_config(&config)?;
//!     let request = DispatchRequest::new(OrderId::new("ORD-7")?, Pin::new("4821")?, None);
//!     let response = dispatcher.dispatch(request, &config).await?;
//!     println!("ThingSpeak entry: {}", response.telemetry.normalized_entry);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod handler;
pub mod logging;
pub mod server;
mod transport;

pub use client::{DispatchError, PinDispatcher, PinDispatcherBuilder};
pub use config::{ConfigError, DispatchConfig};
pub use domain::{
    DialingRule, DispatchRequest, DispatchResponse, OrderId, Pin, RawPhoneNumber, SmsApiKey,
    SmsBody, SmsResult, TelemetryResult, ValidationError, WriteKey,
};
pub use handler::HandlerResponse;
pub use transport::REJECTED_ENTRY;
