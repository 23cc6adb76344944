//! Response normalization.
//!
//! The two backends evolved three different response envelopes: a numeric
//! `{code, data, msg|message}` wrapper, a boolean `{success, data, message}`
//! wrapper, and bare payloads with no envelope at all. This module is the
//! single seam where that inconsistency is absorbed; callers only ever see
//! a payload or an [`ApiError`], never an envelope.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::request::RawOutcome;

/// Business codes the numeric envelope uses as its success sentinel.
const SUCCESS_CODES: [i64; 2] = [0, 200];

/// Map a raw outcome to the normalized payload.
///
/// Classification order:
/// 1. HTTP 401 is an expired credential, before any body inspection;
///    a malformed or empty body must not change that.
/// 2. HTTP 200 bodies are probed for an envelope discriminator (numeric
///    `code`, then boolean `success`); without one, the whole body is the
///    payload.
/// 3. Every other status becomes a business error carrying the HTTP
///    status as its code. A response was obtained, so it is data; the
///    transport variant stays reserved for no-response faults.
pub fn normalize(outcome: RawOutcome) -> Result<Value> {
    if outcome.status == 401 {
        warn!("Credential rejected (401)");
        return Err(ApiError::AuthExpired);
    }

    if outcome.status != 200 {
        warn!(status = outcome.status, "Request failed");
        return Err(ApiError::Business {
            code: i64::from(outcome.status),
            message: format!("request failed ({})", outcome.status),
        });
    }

    if outcome.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let body: Value = serde_json::from_str(&outcome.body)
        .map_err(|e| ApiError::Parse(format!("invalid response body: {}", e)))?;

    match envelope_of(&body) {
        Envelope::NumericCode(code) => {
            if SUCCESS_CODES.contains(&code) {
                debug!("Normalized numeric-code envelope");
                Ok(body.get("data").cloned().unwrap_or(Value::Null))
            } else {
                let message = first_message(&body).unwrap_or_else(|| "request failed".to_string());
                warn!(code, %message, "Business error");
                Err(ApiError::Business { code, message })
            }
        }
        Envelope::SuccessFlag(true) => {
            debug!("Normalized success-flag envelope");
            Ok(body.get("data").cloned().unwrap_or(Value::Null))
        }
        Envelope::SuccessFlag(false) => {
            let message = first_message(&body).unwrap_or_else(|| "request failed".to_string());
            warn!(%message, "Business error");
            // The boolean envelope carries no numeric code; -1 marks that.
            Err(ApiError::Business { code: -1, message })
        }
        Envelope::Bare => {
            debug!("Bare payload, no envelope");
            Ok(body)
        }
    }
}

/// Normalize and project the payload into a typed value.
pub fn normalize_as<T: DeserializeOwned>(outcome: RawOutcome) -> Result<T> {
    let payload = normalize(outcome)?;
    serde_json::from_value(payload)
        .map_err(|e| ApiError::Parse(format!("unexpected payload shape: {}", e)))
}

enum Envelope {
    NumericCode(i64),
    SuccessFlag(bool),
    Bare,
}

/// Detect which envelope shape a body uses.
fn envelope_of(body: &Value) -> Envelope {
    let Some(object) = body.as_object() else {
        return Envelope::Bare;
    };
    if let Some(code) = object.get("code").and_then(Value::as_i64) {
        return Envelope::NumericCode(code);
    }
    if let Some(flag) = object.get("success").and_then(Value::as_bool) {
        return Envelope::SuccessFlag(flag);
    }
    Envelope::Bare
}

/// The backends disagree on the message field name as well.
fn first_message(body: &Value) -> Option<String> {
    for key in ["msg", "message"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(status: u16, body: &str) -> RawOutcome {
        RawOutcome {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_all_three_envelopes_yield_same_payload() {
        let expected = json!({"id": 1, "title": "umbrella"});

        let numeric = normalize(outcome(
            200,
            r#"{"code": 200, "data": {"id": 1, "title": "umbrella"}, "msg": "ok"}"#,
        ))
        .unwrap();
        let flagged = normalize(outcome(
            200,
            r#"{"success": true, "data": {"id": 1, "title": "umbrella"}, "message": "ok"}"#,
        ))
        .unwrap();
        let bare = normalize(outcome(200, r#"{"id": 1, "title": "umbrella"}"#)).unwrap();

        assert_eq!(numeric, expected);
        assert_eq!(flagged, expected);
        assert_eq!(bare, expected);
    }

    #[test]
    fn test_code_zero_is_success() {
        let payload = normalize(outcome(200, r#"{"code": 0, "data": [1, 2]}"#)).unwrap();
        assert_eq!(payload, json!([1, 2]));
    }

    #[test]
    fn test_business_error_prefers_msg_over_message() {
        let err = normalize(outcome(
            200,
            r#"{"code": 4001, "msg": "task already taken", "message": "ignored"}"#,
        ))
        .unwrap_err();
        match err {
            ApiError::Business { code, message } => {
                assert_eq!(code, 4001);
                assert_eq!(message, "task already taken");
            }
            other => panic!("expected business error, got {:?}", other),
        }
    }

    #[test]
    fn test_success_false_is_business_error() {
        let err = normalize(outcome(
            200,
            r#"{"success": false, "message": "item not found", "data": null}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ApiError::Business { message, .. } if message == "item not found"));
    }

    #[test]
    fn test_401_short_circuits_before_body_inspection() {
        // Well-formed, malformed, and empty bodies all classify the same.
        for body in [r#"{"code": 200, "data": {}}"#, "not json at all", ""] {
            let err = normalize(outcome(401, body)).unwrap_err();
            assert!(matches!(err, ApiError::AuthExpired), "body: {:?}", body);
        }
    }

    #[test]
    fn test_other_statuses_become_business_errors() {
        for status in [400, 403, 404, 500, 503] {
            let err = normalize(outcome(status, "irrelevant")).unwrap_err();
            match err {
                ApiError::Business { code, .. } => assert_eq!(code, i64::from(status)),
                other => panic!("expected business error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_bare_array_payload() {
        let payload = normalize(outcome(200, r#"[{"id": 1}]"#)).unwrap();
        assert_eq!(payload, json!([{"id": 1}]));
    }

    #[test]
    fn test_empty_body_is_null_payload() {
        assert_eq!(normalize(outcome(200, "")).unwrap(), Value::Null);
    }

    #[test]
    fn test_unparseable_200_body_is_parse_error() {
        let err = normalize(outcome(200, "<html>gateway error</html>")).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_missing_data_field_defaults_to_null() {
        assert_eq!(
            normalize(outcome(200, r#"{"code": 200, "msg": "ok"}"#)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_typed_projection() {
        #[derive(serde::Deserialize)]
        struct Task {
            id: i64,
        }
        let task: Task =
            normalize_as(outcome(200, r#"{"code": 200, "data": {"id": 42}}"#)).unwrap();
        assert_eq!(task.id, 42);
    }
}
