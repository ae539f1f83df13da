//! Response decoding and status-to-error mapping shared by all adapters.

use crate::{Error, Result};
use serde_json::Value;

/// Successfully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON; returned unchanged.
    Text(String),
    /// The body was empty.
    NoContent,
}

impl Decoded {
    /// Flatten into a JSON value: text becomes a string, no content becomes null.
    pub fn into_value(self) -> Value {
        match self {
            Decoded::Json(value) => value,
            Decoded::Text(text) => Value::String(text),
            Decoded::NoContent => Value::Null,
        }
    }

    /// The body as text: a JSON string is unwrapped, other JSON is re-serialized.
    pub fn into_text(self) -> String {
        match self {
            Decoded::Json(Value::String(text)) | Decoded::Text(text) => text,
            Decoded::Json(value) => value.to_string(),
            Decoded::NoContent => String::new(),
        }
    }
}

/// Decode a raw status/body pair.
///
/// Status >= 400 becomes [`Error::Request`] carrying the body's error message,
/// the raw body, or `HTTP {status}` when the body is empty.
pub fn decode(status: u16, body: &str) -> Result<Decoded> {
    if status >= 400 {
        return Err(Error::request(Some(status), error_message(status, body)));
    }

    if body.is_empty() {
        return Ok(Decoded::NoContent);
    }

    match serde_json::from_str(body) {
        Ok(value) => Ok(Decoded::Json(value)),
        Err(_) => Ok(Decoded::Text(body.to_string())),
    }
}

fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        let field = parsed
            .get("error")
            .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(Value::as_str)))
            .or_else(|| parsed.get("message").and_then(Value::as_str));
        if let Some(message) = field.filter(|m| !m.is_empty()) {
            return message.to_string();
        }
    }

    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_becomes_message() {
        let err = decode(404, r#"{"error":"mailbox not found"}"#).unwrap_err();
        assert_eq!(err.request_message(), Some("mailbox not found"));
        assert!(matches!(err, Error::Request { status: Some(404), .. }));
    }

    #[test]
    fn nested_error_message_is_recognized() {
        let err = decode(401, r#"{"error":{"message":"token expired"}}"#).unwrap_err();
        assert_eq!(err.request_message(), Some("token expired"));
    }

    #[test]
    fn unrecognized_error_body_is_used_verbatim() {
        let err = decode(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.request_message(), Some("Bad Gateway"));

        let err = decode(400, r#"{"code":7}"#).unwrap_err();
        assert_eq!(err.request_message(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn empty_error_body_reports_status() {
        let err = decode(500, "").unwrap_err();
        assert_eq!(err.request_message(), Some("HTTP 500"));
    }

    #[test]
    fn success_bodies_decode_as_json_or_text() {
        assert_eq!(
            decode(200, r#"{"email":"a@b.c"}"#).unwrap(),
            Decoded::Json(json!({"email": "a@b.c"}))
        );
        assert_eq!(
            decode(200, "<html></html>").unwrap(),
            Decoded::Text("<html></html>".to_string())
        );
    }

    #[test]
    fn quoted_token_decodes_to_json_string() {
        let decoded = decode(200, "\"abc.def\"").unwrap();
        assert_eq!(decoded.clone().into_text(), "abc.def");
        assert_eq!(decoded, Decoded::Json(json!("abc.def")));
    }

    #[test]
    fn empty_body_is_no_content_not_empty_text() {
        let decoded = decode(204, "").unwrap();
        assert_eq!(decoded, Decoded::NoContent);
        assert_eq!(decoded.into_value(), Value::Null);
    }
}
