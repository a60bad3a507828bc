use serde_json::{Value, json};

use crate::domain::SmsBody;

pub fn encode_send_sms_json(number: &str, message: &str) -> Value {
    json!({
        "number": number,
        "message": message,
    })
}

/// The relay acknowledges with JSON or plain text depending on the outcome; keep either.
pub fn decode_send_sms_body(body: &str) -> SmsBody {
    match serde_json::from_str(body) {
        Ok(value) => SmsBody::Json(value),
        Err(_) => SmsBody::Text(body.to_owned()),
    }
}
