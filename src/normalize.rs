//! Pure helpers shared by the provider normalizers.
//!
//! Nothing here fails: unparsable input degrades to an empty value or to the
//! current time.

use crate::{Address, Sender};
use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Subject used when a provider omits one.
pub const NO_SUBJECT: &str = "(no subject)";

/// Numeric timestamps above this are milliseconds, otherwise seconds.
pub const MILLIS_THRESHOLD: f64 = 1_000_000_000_000.0;

static DISPLAY_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)<([^<>]+)>$").unwrap());

/// Parse `"Name <addr>"`, `"<addr>"` or a bare address.
///
/// The display name is everything before the last angle-bracket pair.
pub fn parse_address(value: &str) -> Address {
    let trimmed = value.trim();
    match DISPLAY_ADDRESS.captures(trimmed) {
        Some(caps) => Address::with_name(caps[1].trim(), caps[2].trim()),
        None => Address::new(trimmed),
    }
}

/// Current time in epoch seconds.
pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a datetime string that carries no zone suffix as UTC.
///
/// Only the first 19 characters (`YYYY-MM-DDTHH:MM:SS`) are considered.
pub fn parse_zoneless_utc(value: &str) -> Option<i64> {
    let head = value.get(..19).unwrap_or(value);
    DateTime::parse_from_rfc3339(&format!("{head}Z"))
        .ok()
        .map(|dt| dt.timestamp())
}

/// Convert a numeric timestamp in seconds or milliseconds to epoch seconds.
pub fn epoch_seconds_from_number(value: f64) -> i64 {
    let millis = if value > MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    (millis / 1000.0).floor() as i64
}

/// Parse an ISO-like timestamp, tolerating a space separator and a missing zone.
///
/// Tries, in order: the string with its first space replaced by `T`, the same
/// with a `Z` suffix, then the unmodified string as RFC 3339 or RFC 2822.
pub fn parse_flexible_timestamp(value: &str) -> Option<i64> {
    let normalized = value.trim().replacen(' ', "T", 1);

    DateTime::parse_from_rfc3339(&normalized)
        .or_else(|_| DateTime::parse_from_rfc3339(&format!("{normalized}Z")))
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|dt| dt.timestamp())
}

/// [`parse_flexible_timestamp`], falling back to now.
pub fn flexible_timestamp_or_now(value: &str) -> i64 {
    parse_flexible_timestamp(value).unwrap_or_else(now_seconds)
}

/// A numeric (seconds or milliseconds) or string timestamp, if parsable.
pub(crate) fn timestamp_value(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_f64().map(epoch_seconds_from_number),
        Value::String(s) => parse_flexible_timestamp(s),
        _ => None,
    }
}

/// The first of `keys` holding a non-empty string.
pub(crate) fn text_field<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| raw.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// The first of `keys` holding a non-empty string or a number, as a string.
pub(crate) fn id_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Whether any of `keys` holds `true` or a non-zero number.
pub(crate) fn flag_field(raw: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|key| match raw.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

/// An address from a string or an `{address|email, name}` object.
pub(crate) fn address_from_value(value: &Value) -> Option<Address> {
    let address = match value {
        Value::String(s) => parse_address(s),
        Value::Object(_) => {
            let inner = text_field(value, &["address", "email"]).unwrap_or_default();
            let name = text_field(value, &["name"]).unwrap_or_default();
            if inner.is_empty() {
                parse_address(name)
            } else {
                Address::with_name(name.trim(), inner.trim())
            }
        }
        _ => return None,
    };
    (!address.address.is_empty()).then_some(address)
}

/// Flatten a single address or a list of addresses, dropping empty entries.
pub(crate) fn address_list(value: Option<&Value>) -> Vec<Address> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(address_from_value).collect(),
        Some(single) => address_from_value(single).into_iter().collect(),
        None => Vec::new(),
    }
}

/// A sender from a string, an object, or a list of either.
pub(crate) fn sender(value: Option<&Value>) -> Sender {
    match value {
        Some(Value::Array(_)) => Sender::List(address_list(value)),
        Some(single) => Sender::Single(address_from_value(single).unwrap_or_default()),
        None => Sender::default(),
    }
}

/// Recipients from `value`, or the receiving mailbox when none are listed.
pub(crate) fn recipients_or_mailbox(value: Option<&Value>, mailbox: &str) -> Vec<Address> {
    let listed = address_list(value);
    if !listed.is_empty() {
        return listed;
    }
    let own = parse_address(mailbox);
    if own.address.is_empty() {
        Vec::new()
    } else {
        vec![own]
    }
}

/// Random id suffix for messages that carry no id at all.
pub fn random_token<R: Rng>(rng: &mut R) -> String {
    crate::domains::random_local_part(rng, 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_display_name_form() {
        assert_eq!(
            parse_address("Jane Doe <jane@example.com>"),
            Address::with_name("Jane Doe", "jane@example.com")
        );
    }

    #[test]
    fn parses_angle_only_and_bare_forms() {
        assert_eq!(
            parse_address("<jane@example.com>"),
            Address::new("jane@example.com")
        );
        assert_eq!(
            parse_address("jane@example.com"),
            Address::new("jane@example.com")
        );
        assert_eq!(parse_address("  jane@example.com \n"), Address::new("jane@example.com"));
        assert_eq!(parse_address(""), Address::default());
    }

    #[test]
    fn display_name_runs_to_last_bracket_pair() {
        assert_eq!(
            parse_address("  Support <team> < help@example.com >  "),
            Address::with_name("Support <team>", "help@example.com")
        );
    }

    #[test]
    fn space_separated_timestamp_is_utc() {
        let expected = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .timestamp();
        assert_eq!(parse_flexible_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_flexible_timestamp("2024-01-15T10:30:00Z"), Some(expected));
        assert_eq!(
            parse_flexible_timestamp("2024-01-15 12:30:00+02:00"),
            Some(expected)
        );
    }

    #[test]
    fn flexible_parser_accepts_rfc2822() {
        assert_eq!(
            parse_flexible_timestamp("Mon, 15 Jan 2024 10:30:00 +0000"),
            Some(1_705_314_600)
        );
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_now() {
        let before = now_seconds();
        let parsed = flexible_timestamp_or_now("yesterday-ish");
        assert!((parsed - before).abs() <= 2);
        assert_eq!(parse_flexible_timestamp(""), None);
    }

    #[test]
    fn zoneless_timestamp_ignores_fraction_and_suffix() {
        assert_eq!(parse_zoneless_utc("2024-01-15T10:30:00"), Some(1_705_314_600));
        assert_eq!(
            parse_zoneless_utc("2024-01-15T10:30:00.123456+08:00"),
            Some(1_705_314_600)
        );
        assert_eq!(parse_zoneless_utc("garbage"), None);
    }

    #[test]
    fn numeric_timestamps_disambiguate_by_magnitude() {
        assert_eq!(epoch_seconds_from_number(1_705_314_600.0), 1_705_314_600);
        assert_eq!(epoch_seconds_from_number(1_705_314_600_123.0), 1_705_314_600);
        assert_eq!(timestamp_value(Some(&json!(1_705_314_600_000_i64))), Some(1_705_314_600));
        assert_eq!(timestamp_value(Some(&json!(true))), None);
    }

    #[test]
    fn address_lists_accept_every_shape() {
        assert_eq!(
            address_list(Some(&json!("a@x.io"))),
            vec![Address::new("a@x.io")]
        );
        assert_eq!(
            address_list(Some(&json!({"name": "B", "email": "b@x.io"}))),
            vec![Address::with_name("B", "b@x.io")]
        );
        assert_eq!(
            address_list(Some(&json!(["C <c@x.io>", "", null, {"address": "d@x.io"}]))),
            vec![Address::with_name("C", "c@x.io"), Address::new("d@x.io")]
        );
        assert!(address_list(None).is_empty());
    }

    #[test]
    fn sender_keeps_list_shape() {
        assert_eq!(
            sender(Some(&json!(["a@x.io", "B <b@x.io>"]))),
            Sender::List(vec![Address::new("a@x.io"), Address::with_name("B", "b@x.io")])
        );
        assert_eq!(sender(Some(&json!(42))), Sender::default());
        assert_eq!(sender(None), Sender::default());
    }

    #[test]
    fn recipients_fall_back_to_mailbox() {
        assert_eq!(
            recipients_or_mailbox(Some(&json!([])), "me@x.io"),
            vec![Address::new("me@x.io")]
        );
        assert!(recipients_or_mailbox(None, "").is_empty());
    }

    #[test]
    fn field_helpers_skip_empty_values() {
        let raw = json!({"a": "", "b": "x", "n": 42, "seen": 1, "read": false});
        assert_eq!(text_field(&raw, &["a", "b"]), Some("x"));
        assert_eq!(id_field(&raw, &["a", "n"]).as_deref(), Some("42"));
        assert!(flag_field(&raw, &["read", "seen"]));
        assert!(!flag_field(&raw, &["read"]));
    }
}
