//! Deployment configuration for the dispatch service.
//!
//! Everything the operation needs at call time (credentials, CORS origin, dialing rules,
//! endpoints) lives in [`DispatchConfig`] and is passed in explicitly. Only
//! [`DispatchConfig::from_env`] touches the process environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{DialingRule, SmsApiKey, ValidationError, WriteKey};

pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "https://api.thingspeak.com/update";
pub const DEFAULT_SMS_ENDPOINT: &str = "https://app.bulksmsug.com/api/v1/send-sms";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8888";

pub const TELEMETRY_KEY_VAR: &str = "THINGSPEAK_WRITE_KEY";
pub const SMS_KEY_VAR: &str = "BULKSMS_API_KEY";
pub const ALLOWED_ORIGIN_VAR: &str = "ALLOWED_ORIGIN";
pub const DEBUG_VAR: &str = "PIN_DISPATCH_DEBUG";
pub const DIALING_RULES_VAR: &str = "PIN_DISPATCH_DIALING_RULES";
pub const TELEMETRY_ENDPOINT_VAR: &str = "THINGSPEAK_UPDATE_URL";
pub const SMS_ENDPOINT_VAR: &str = "BULKSMS_SEND_URL";
pub const TIMEOUT_VAR: &str = "PIN_DISPATCH_TIMEOUT_SECS";
pub const BIND_ADDR_VAR: &str = "PIN_DISPATCH_ADDR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("{var}: expected {expected}, got {value:?}")]
    Unparsable {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// ThingSpeak write key; dispatch refuses to run without it.
    pub telemetry_key: Option<WriteKey>,
    /// BulkSMS token; without it the SMS leg is skipped.
    pub sms_key: Option<SmsApiKey>,
    pub allowed_origin: String,
    pub debug: bool,
    pub dialing_rules: Vec<DialingRule>,
    pub telemetry_endpoint: String,
    pub sms_endpoint: String,
    /// Per-request timeout applied to both outbound calls.
    pub timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            telemetry_key: None,
            sms_key: None,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
            debug: false,
            dialing_rules: Vec::new(),
            telemetry_endpoint: DEFAULT_TELEMETRY_ENDPOINT.to_owned(),
            sms_endpoint: DEFAULT_SMS_ENDPOINT.to_owned(),
            timeout: None,
        }
    }
}

impl DispatchConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let telemetry_key = var(TELEMETRY_KEY_VAR).and_then(|it| WriteKey::new(it).ok());
        let sms_key = var(SMS_KEY_VAR).and_then(|it| SmsApiKey::new(it).ok());

        let dialing_rules = match var(DIALING_RULES_VAR) {
            Some(value) => DialingRule::parse_list(&value).map_err(|source| ConfigError::Invalid {
                var: DIALING_RULES_VAR,
                source,
            })?,
            None => Vec::new(),
        };

        let timeout = match var(TIMEOUT_VAR) {
            Some(value) => Some(parse_timeout(&value)?),
            None => None,
        };

        Ok(Self {
            telemetry_key,
            sms_key,
            allowed_origin: var(ALLOWED_ORIGIN_VAR)
                .map(|it| it.trim().to_owned())
                .unwrap_or(defaults.allowed_origin),
            debug: var(DEBUG_VAR).is_some_and(|it| parse_flag(&it)),
            dialing_rules,
            telemetry_endpoint: var(TELEMETRY_ENDPOINT_VAR).unwrap_or(defaults.telemetry_endpoint),
            sms_endpoint: var(SMS_ENDPOINT_VAR).unwrap_or(defaults.sms_endpoint),
            timeout,
        })
    }
}

/// Address the server binds to (`PIN_DISPATCH_ADDR`).
pub fn bind_addr_from_env() -> Result<SocketAddr, ConfigError> {
    let value = env::var(BIND_ADDR_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
    value.trim().parse().map_err(|_| ConfigError::Unparsable {
        var: BIND_ADDR_VAR,
        expected: "socket address",
        value,
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Unparsable {
            var: TIMEOUT_VAR,
            expected: "positive number of seconds",
            value: value.to_owned(),
        })
}
