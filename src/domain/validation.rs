use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    MissingRequired { missing: Vec<&'static str> },
    MalformedPayload { reason: String },
    InvalidDialingRule { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            // Always names both fields, whichever one is missing.
            Self::MissingRequired { .. } => write!(f, "orderId and pin are required"),
            Self::MalformedPayload { reason } => write!(f, "malformed request body: {reason}"),
            Self::InvalidDialingRule { input } => {
                write!(
                    f,
                    "invalid dialing rule: {input} (expected <local prefix>=<country code>)"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
