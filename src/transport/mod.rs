//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod bulksms;
mod thingspeak;

pub use bulksms::{decode_send_sms_body, encode_send_sms_json};
pub use thingspeak::{
    NO_BODY, REJECTED_ENTRY, decode_update_response, encode_update_url, redact_key,
    redact_update_url,
};
