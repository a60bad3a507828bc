//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{DispatchRequest, pin_message};
pub use response::{DispatchResponse, SmsBody, SmsResult, TelemetryResult};
pub use validation::ValidationError;
pub use value::{DialingRule, OrderId, Pin, RawPhoneNumber, SmsApiKey, WriteKey};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn telemetry(succeeded: bool) -> TelemetryResult {
        TelemetryResult {
            succeeded,
            http_status: 200,
            raw_body: "42\n".to_owned(),
            normalized_entry: "42".to_owned(),
            request_url: "https://example.invalid/update".to_owned(),
        }
    }

    #[test]
    fn order_id_and_pin_reject_empty() {
        assert!(matches!(
            OrderId::new("   "),
            Err(ValidationError::Empty {
                field: OrderId::FIELD
            })
        ));
        assert!(matches!(
            Pin::new(""),
            Err(ValidationError::Empty { field: Pin::FIELD })
        ));
        assert!(matches!(
            Pin::new(" \t "),
            Err(ValidationError::Empty { field: Pin::FIELD })
        ));
        assert_eq!(Pin::new(" 4821 ").unwrap().as_str(), " 4821 ");
    }

    #[test]
    fn credentials_do_not_leak_through_debug() {
        let key = WriteKey::new("secret-write-key").unwrap();
        assert_eq!(format!("{key:?}"), "WriteKey(***)");
        let token = SmsApiKey::new("secret-token").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[test]
    fn request_parses_full_payload() {
        let body = r#"{"orderId":"ORD-7","pin":"4821","phone":"0774331899"}"#;
        let request = DispatchRequest::from_json(Some(body.as_bytes())).unwrap();
        assert_eq!(request.order_id().as_str(), "ORD-7");
        assert_eq!(request.pin().as_str(), "4821");
        assert_eq!(request.phone().map(RawPhoneNumber::raw), Some("0774331899"));
    }

    #[test]
    fn request_accepts_numeric_fields_and_blank_phone() {
        let body = r#"{"orderId":17,"pin":4821,"phone":"  "}"#;
        let request = DispatchRequest::from_json(Some(body.as_bytes())).unwrap();
        assert_eq!(request.order_id().as_str(), "17");
        assert_eq!(request.pin().as_str(), "4821");
        assert!(request.phone().is_none());
    }

    #[test]
    fn request_keeps_pin_as_given() {
        let body = r#"{"orderId":" ORD-7 ","pin":" 4821 "}"#;
        let request = DispatchRequest::from_json(Some(body.as_bytes())).unwrap();
        assert_eq!(request.order_id().as_str(), "ORD-7");
        assert_eq!(request.pin().as_str(), " 4821 ");
    }

    #[test]
    fn request_reports_missing_fields() {
        let body = r#"{"orderId":"ORD-7","pin":""}"#;
        let err = DispatchRequest::from_json(Some(body.as_bytes())).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                missing: vec![Pin::FIELD]
            }
        );

        let err = DispatchRequest::from_json(None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                missing: vec![OrderId::FIELD, Pin::FIELD]
            }
        );
    }

    #[test]
    fn request_rejects_unparsable_and_non_object_bodies() {
        assert!(matches!(
            DispatchRequest::from_json(Some(b"{ not json".as_slice())),
            Err(ValidationError::MalformedPayload { .. })
        ));
        assert!(matches!(
            DispatchRequest::from_json(Some(br#"["ORD-7","4821"]"#.as_slice())),
            Err(ValidationError::MalformedPayload { .. })
        ));
        let invalid_utf8 = b"{\"orderId\":\"O1\",\"pin\":\"48\xff21\"}";
        assert!(matches!(
            DispatchRequest::from_json(Some(invalid_utf8.as_slice())),
            Err(ValidationError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn pin_message_embeds_pin() {
        assert_eq!(
            pin_message(&Pin::new("4821").unwrap()),
            "Your delivery PIN is 4821"
        );
    }

    #[test]
    fn dialing_rule_rewrites_local_numbers() {
        let rules = DialingRule::parse_list("0=256").unwrap();
        let local = RawPhoneNumber::new("0774331899").unwrap();
        assert_eq!(DialingRule::normalize(&rules, &local), "256774331899");

        let international = RawPhoneNumber::new("256774331899").unwrap();
        assert_eq!(DialingRule::normalize(&rules, &international), "256774331899");

        let plus = RawPhoneNumber::new("+256774331899").unwrap();
        assert_eq!(DialingRule::normalize(&rules, &plus), "+256774331899");
        assert_eq!(DialingRule::normalize(&[], &local), "0774331899");
    }

    #[test]
    fn dialing_rule_first_match_wins() {
        let rules = DialingRule::parse_list("07=2567, 0=256").unwrap();
        let phone = RawPhoneNumber::new("0774331899").unwrap();
        assert_eq!(DialingRule::normalize(&rules, &phone), "256774331899");
        assert_eq!(rules[0].local_prefix(), "07");
        assert_eq!(rules[0].country_code(), "2567");
    }

    #[test]
    fn dialing_rule_list_rejects_malformed_entries() {
        assert!(DialingRule::parse_list("").unwrap().is_empty());
        assert!(matches!(
            DialingRule::parse_list("0-256"),
            Err(ValidationError::InvalidDialingRule { .. })
        ));
        assert!(DialingRule::parse_list("0=+256").is_err());
        assert!(DialingRule::parse_list("=256").is_err());
    }

    #[test]
    fn dispatch_response_success_mirrors_telemetry() {
        let failed_sms = SmsResult::Failed {
            error: "timed out".to_owned(),
        };
        let response = DispatchResponse::new(telemetry(true), Some(failed_sms));
        assert!(response.success);

        let response = DispatchResponse::new(telemetry(false), None);
        assert!(!response.success);
    }

    #[test]
    fn sms_result_serializes_both_shapes() {
        let replied = SmsResult::Replied {
            status: 200,
            body: SmsBody::Json(json!({"status": "queued"})),
        };
        assert_eq!(
            serde_json::to_value(&replied).unwrap(),
            json!({"ok": true, "status": 200, "body": {"status": "queued"}})
        );

        let rejected = SmsResult::Replied {
            status: 401,
            body: SmsBody::Text("unauthorized".to_owned()),
        };
        assert!(!rejected.succeeded());
        assert_eq!(rejected.http_status(), Some(401));

        let failed = SmsResult::Failed {
            error: "connection refused".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"ok": false, "error": "connection refused"})
        );
        assert_eq!(failed.error(), Some("connection refused"));
    }

    #[test]
    fn telemetry_result_serializes_wire_names() {
        assert_eq!(
            serde_json::to_value(telemetry(true)).unwrap(),
            json!({
                "ok": true,
                "status": 200,
                "entry": "42",
                "url": "https://example.invalid/update"
            })
        );
    }
}
