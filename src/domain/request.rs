use serde_json::{Map, Value};

use crate::domain::validation::ValidationError;
use crate::domain::value::{OrderId, Pin, RawPhoneNumber};

/// Message template sent to the customer.
pub fn pin_message(pin: &Pin) -> String {
    format!("Your delivery PIN is {}", pin.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    order_id: OrderId,
    pin: Pin,
    phone: Option<RawPhoneNumber>,
}

impl DispatchRequest {
    pub fn new(order_id: OrderId, pin: Pin, phone: Option<RawPhoneNumber>) -> Self {
        Self {
            order_id,
            pin,
            phone,
        }
    }

    /// Parse the admin panel's JSON payload `{ orderId, pin, phone? }` from raw body bytes.
    ///
    /// An absent or blank body is read as `{}`, so it fails on the required fields rather
    /// than on parsing. Bytes that are not valid UTF-8 are a malformed payload.
    pub fn from_json(body: Option<&[u8]>) -> Result<Self, ValidationError> {
        let body = body
            .map(<[u8]>::trim_ascii)
            .filter(|it| !it.is_empty())
            .unwrap_or(b"{}");

        let value: Value =
            serde_json::from_slice(body).map_err(|err| ValidationError::MalformedPayload {
                reason: err.to_string(),
            })?;
        let Value::Object(fields) = value else {
            return Err(ValidationError::MalformedPayload {
                reason: "expected a JSON object".to_owned(),
            });
        };

        let order_id = text_field(&fields, OrderId::FIELD).and_then(|it| OrderId::new(it).ok());
        let pin = text_field(&fields, Pin::FIELD).and_then(|it| Pin::new(it).ok());
        let phone =
            text_field(&fields, RawPhoneNumber::FIELD).and_then(|it| RawPhoneNumber::new(it).ok());

        match (order_id, pin) {
            (Some(order_id), Some(pin)) => Ok(Self::new(order_id, pin, phone)),
            (order_id, pin) => {
                let mut missing = Vec::new();
                if order_id.is_none() {
                    missing.push(OrderId::FIELD);
                }
                if pin.is_none() {
                    missing.push(Pin::FIELD);
                }
                Err(ValidationError::MissingRequired { missing })
            }
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    pub fn phone(&self) -> Option<&RawPhoneNumber> {
        self.phone.as_ref()
    }
}

// Numbers are accepted because the panel may post numeric order ids and PINs.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}
