use std::fmt;
use std::str::FromStr;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Order reference the PIN is minted for (`orderId`).
///
/// Invariant: non-empty after trimming.
pub struct OrderId(String);

impl OrderId {
    /// JSON field name used by the admin panel (`orderId`).
    pub const FIELD: &'static str = "orderId";

    /// Create a validated [`OrderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated order reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Delivery PIN chosen by the caller (`pin`).
///
/// Invariant: non-empty after trimming. The value itself is stored as given, surrounding
/// whitespace included; the service does not generate or check PIN formats.
pub struct Pin(String);

impl Pin {
    /// JSON field name used by the admin panel (`pin`).
    pub const FIELD: &'static str = "pin";

    /// Create a validated [`Pin`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the PIN exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unnormalized customer phone number (`phone`).
///
/// Invariant: non-empty after trimming. Use [`DialingRule::normalize`] to rewrite local
/// numbers into international form before sending.
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// JSON field name used by the admin panel (`phone`).
    pub const FIELD: &'static str = "phone";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as supplied by the caller.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq)]
/// ThingSpeak channel write key (`api_key`).
///
/// Invariant: non-empty after trimming. `Debug` never prints the key.
pub struct WriteKey(String);

impl WriteKey {
    /// Query parameter name used by ThingSpeak (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`WriteKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WriteKey(***)")
    }
}

#[derive(Clone, PartialEq, Eq)]
/// BulkSMS bearer token.
///
/// Invariant: non-empty after trimming. `Debug` never prints the token.
pub struct SmsApiKey(String);

impl SmsApiKey {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "bulksms_api_key";

    /// Create a validated [`SmsApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SmsApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SmsApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Rewrites a local dialing prefix into a country calling code.
///
/// Written as `<local prefix>=<country code>`, e.g. `0=256` turns `0774331899` into
/// `256774331899`. Both parts must be ASCII digits.
pub struct DialingRule {
    local_prefix: String,
    country_code: String,
}

impl DialingRule {
    /// Create a validated rule.
    pub fn new(
        local_prefix: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let local_prefix: String = local_prefix.into();
        let country_code: String = country_code.into();
        let local_prefix = local_prefix.trim().to_owned();
        let country_code = country_code.trim().to_owned();
        if !is_digits(&local_prefix) || !is_digits(&country_code) {
            return Err(ValidationError::InvalidDialingRule {
                input: format!("{local_prefix}={country_code}"),
            });
        }
        Ok(Self {
            local_prefix,
            country_code,
        })
    }

    /// Local prefix this rule matches.
    pub fn local_prefix(&self) -> &str {
        &self.local_prefix
    }

    /// Country calling code substituted for the local prefix (no leading `+`).
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Rewrite `phone` if it starts with this rule's local prefix.
    pub fn apply(&self, phone: &str) -> Option<String> {
        phone
            .strip_prefix(self.local_prefix.as_str())
            .map(|rest| format!("{}{rest}", self.country_code))
    }

    /// Normalize `phone` with the first matching rule; unmatched numbers pass through.
    pub fn normalize(rules: &[DialingRule], phone: &RawPhoneNumber) -> String {
        rules
            .iter()
            .find_map(|rule| rule.apply(phone.raw()))
            .unwrap_or_else(|| phone.raw().to_owned())
    }

    /// Parse a comma-separated rule list such as `0=256,07=2567`. Blank input yields no rules.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ValidationError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for DialingRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (local_prefix, country_code) =
            s.split_once('=')
                .ok_or_else(|| ValidationError::InvalidDialingRule {
                    input: s.to_owned(),
                })?;
        Self::new(local_prefix, country_code)
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
