use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::Value;

/// Outcome of the ThingSpeak write.
///
/// Serialized as `{ ok, status, entry, url }`; `raw_body` is reported separately as
/// `details` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryResult {
    #[serde(rename = "ok")]
    pub succeeded: bool,
    #[serde(rename = "status")]
    pub http_status: u16,
    #[serde(skip)]
    pub raw_body: String,
    #[serde(rename = "entry")]
    pub normalized_entry: String,
    #[serde(rename = "url")]
    pub request_url: String,
}

/// SMS relay acknowledgement: parsed JSON when possible, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SmsBody {
    Json(Value),
    Text(String),
}

/// Outcome of the SMS relay leg.
#[derive(Debug, Clone, PartialEq)]
pub enum SmsResult {
    /// The relay answered; success depends on the HTTP status.
    Replied { status: u16, body: SmsBody },
    /// The call never produced a response (connect failure, timeout, ...).
    Failed { error: String },
}

impl SmsResult {
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Replied { status, .. } => (200..=299).contains(status),
            Self::Failed { .. } => false,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Replied { status, .. } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Replied { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl Serialize for SmsResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Replied { status, body } => {
                let mut state = serializer.serialize_struct("SmsResult", 3)?;
                state.serialize_field("ok", &self.succeeded())?;
                state.serialize_field("status", status)?;
                state.serialize_field("body", body)?;
                state.end()
            }
            Self::Failed { error } => {
                let mut state = serializer.serialize_struct("SmsResult", 2)?;
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    pub success: bool,
    pub telemetry: TelemetryResult,
    pub sms: Option<SmsResult>,
}

impl DispatchResponse {
    /// Overall success always mirrors the telemetry leg.
    pub fn new(telemetry: TelemetryResult, sms: Option<SmsResult>) -> Self {
        Self {
            success: telemetry.succeeded,
            telemetry,
            sms,
        }
    }
}
