use url::Url;

use crate::domain::{Pin, TelemetryResult, WriteKey};

/// ThingSpeak answers `/update` with the new entry id, or with the literal text `0` when
/// it refuses the write (bad key, rate limit). The HTTP status is 200 in both cases, so
/// the body has to be checked.
pub const REJECTED_ENTRY: &str = "0";

/// Channel field the PIN is written to.
pub const PIN_FIELD: &str = "field1";

/// Substituted when the response body cannot be read.
pub const NO_BODY: &str = "<no body>";

/// Build `<endpoint>?api_key=<key>&field1=<pin>`; both values are percent-encoded.
pub fn encode_update_url(
    endpoint: &str,
    key: &WriteKey,
    pin: &Pin,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair(WriteKey::FIELD, key.as_str())
        .append_pair(PIN_FIELD, pin.as_str());
    Ok(url)
}

/// Same URL with the write key masked, for logs.
pub fn redact_update_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs = url
        .query_pairs()
        .map(|(key, value)| {
            if key == WriteKey::FIELD {
                (key.into_owned(), "***".to_owned())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect::<Vec<_>>();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

/// Mask every occurrence of the write key in `message`, raw or percent-encoded.
pub fn redact_key(message: &str, key: &WriteKey) -> String {
    let encoded = url::form_urlencoded::byte_serialize(key.as_str().as_bytes())
        .collect::<String>();
    message.replace(&encoded, "***").replace(key.as_str(), "***")
}

pub fn decode_update_response(status: u16, body: Option<String>, url: &Url) -> TelemetryResult {
    let raw_body = body.unwrap_or_else(|| NO_BODY.to_owned());
    let normalized_entry = raw_body.trim().to_owned();
    let succeeded = (200..=299).contains(&status) && normalized_entry != REJECTED_ENTRY;

    TelemetryResult {
        succeeded,
        http_status: status,
        raw_body,
        normalized_entry,
        request_url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_url() -> Url {
        encode_update_url(
            "https://example.invalid/update",
            &WriteKey::new("K&Y=1").unwrap(),
            &Pin::new("12 34").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn encode_percent_encodes_key_and_pin() {
        let url = update_url();
        assert_eq!(url.path(), "/update");

        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_owned(), "K&Y=1".to_owned()),
                ("field1".to_owned(), "12 34".to_owned()),
            ]
        );
        assert!(!url.as_str().contains("K&Y=1"));
    }

    #[test]
    fn encode_rejects_invalid_endpoint() {
        let err = encode_update_url(
            "not a url",
            &WriteKey::new("key").unwrap(),
            &Pin::new("1234").unwrap(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn redaction_masks_only_the_key() {
        let redacted = redact_update_url(&update_url());
        assert!(redacted.contains("api_key=***") || redacted.contains("api_key=%2A%2A%2A"));
        assert!(redacted.contains("field1=12"));
        assert!(!redacted.contains("K%26Y"));
    }

    #[test]
    fn redact_key_masks_raw_and_encoded_forms() {
        let key = WriteKey::new("K&Y=1").unwrap();
        let message = format!("error sending request for url ({})", update_url());
        let redacted = redact_key(&message, &key);
        assert!(!redacted.contains("K%26Y%3D1"));
        assert!(redacted.contains("api_key=***&field1="));

        assert_eq!(redact_key("bad key K&Y=1", &key), "bad key ***");
        assert_eq!(redact_key("connection refused", &key), "connection refused");
    }

    #[test]
    fn encode_keeps_pin_whitespace() {
        let url = encode_update_url(
            "https://example.invalid/update",
            &WriteKey::new("key").unwrap(),
            &Pin::new(" 4821 ").unwrap(),
        )
        .unwrap();
        assert_eq!(url.query(), Some("api_key=key&field1=+4821+"));
    }

    #[test]
    fn decode_accepts_entry_id() {
        let result = decode_update_response(200, Some("  1532\n".to_owned()), &update_url());
        assert!(result.succeeded);
        assert_eq!(result.http_status, 200);
        assert_eq!(result.raw_body, "  1532\n");
        assert_eq!(result.normalized_entry, "1532");
        assert_eq!(result.request_url, update_url().to_string());
    }

    #[test]
    fn decode_treats_zero_sentinel_as_rejection() {
        assert!(!decode_update_response(200, Some("0".to_owned()), &update_url()).succeeded);
        assert!(!decode_update_response(200, Some(" 0\n".to_owned()), &update_url()).succeeded);
        assert!(decode_update_response(200, Some("10".to_owned()), &update_url()).succeeded);
    }

    #[test]
    fn decode_rejects_non_success_status() {
        let result = decode_update_response(500, Some("oops".to_owned()), &update_url());
        assert!(!result.succeeded);
        assert_eq!(result.http_status, 500);
    }

    #[test]
    fn decode_substitutes_placeholder_for_unreadable_body() {
        let result = decode_update_response(200, None, &update_url());
        assert_eq!(result.raw_body, NO_BODY);
        assert_eq!(result.normalized_entry, NO_BODY);
    }
}
