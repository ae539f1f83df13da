//! kyfudao adapter.
//!
//! All calls are form-encoded POSTs to a single endpoint, dispatched by the
//! `ajax` field. Every response carries a `success` flag that is checked
//! independently of the HTTP status.

use crate::decode::{Decoded, decode};
use crate::normalize::{
    NO_SUBJECT, flag_field, id_field, now_seconds, recipients_or_mailbox, sender, text_field,
    timestamp_value,
};
use crate::providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, array_at, require,
};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::{Email, Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde_json::Value;
use std::sync::Arc;

const API_URL: &str = "https://apis.kyfudao.com/apis.php";

/// A kyfudao inbox.
///
/// The service may store mail under an alias that differs from the display
/// address; deleting the mailbox needs that alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbox {
    pub address: String,
    pub storage_address: Option<String>,
    /// Expiry as reported by the service, untouched.
    pub expires: Option<Value>,
}

impl Inbox {
    /// An inbox known only by its display address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            storage_address: None,
            expires: None,
        }
    }

    /// The storage alias, or the display address when none was recorded.
    pub fn storage_address(&self) -> &str {
        self.storage_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.address)
    }
}

impl InboxIdentity for Inbox {
    fn address(&self) -> &str {
        &self.address
    }
}

/// Async client for the kyfudao temporary email endpoint.
#[derive(Debug)]
pub struct Client {
    transport: Arc<dyn Transport>,
    api_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::kyfudao;
    /// # fn main() -> Result<(), tempmail_client::Error> {
    /// let client = kyfudao::Client::builder()
    ///     .api_url("https://apis.kyfudao.com/apis.php")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a kyfudao client with default settings.
    ///
    /// Builds a fresh cookie-keeping transport. No request is made here.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, kyfudao};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = kyfudao::Client::new()?;
    /// let inbox = client.issue_address(&AddressOptions::new()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Fetch the domains the service currently offers.
    pub async fn domains(&self) -> Result<Vec<String>> {
        let data = self
            .call(&[("ajax", "get_domains")], "failed to fetch domains")
            .await?;
        Ok(array_at(&data, "domains")
            .into_iter()
            .filter_map(|d| d.as_str().map(str::to_string))
            .collect())
    }

    /// POST `fields` and return the body once its `success` flag is set.
    async fn call(&self, fields: &[(&str, &str)], failure: &str) -> Result<Value> {
        let request = HttpRequest::post(&self.api_url)
            .headers(default_headers())
            .body(form_body(fields));
        let response = self.transport.send(request).await?;

        let data = match decode(response.status, &response.body)? {
            Decoded::Json(value) if value.is_object() => value,
            _ => return Err(Error::ResponseParse("invalid server response".to_string())),
        };
        ensure_success(data, response.status, failure)
    }
}

#[async_trait]
impl Provider for Client {
    type Inbox = Inbox;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Kyfudao
    }

    /// Create an address. Empty options let the service choose.
    async fn issue_address(&self, options: &AddressOptions) -> Result<Inbox> {
        let prefix = options.trimmed_local_part().unwrap_or_default();
        let domain = options.trimmed_domain().unwrap_or_default();
        let failure = "failed to create address";

        let data = self
            .call(
                &[("ajax", "create_email"), ("prefix", prefix), ("domain", domain)],
                failure,
            )
            .await?;

        let address = text_field(&data, &["email"])
            .ok_or_else(|| Error::request(None, message_or(&data, failure)))?;

        Ok(Inbox {
            address: address.to_string(),
            storage_address: Some(
                text_field(&data, &["storage_email"])
                    .unwrap_or(address)
                    .to_string(),
            ),
            expires: data.get("expires").filter(|v| !v.is_null()).cloned(),
        })
    }

    async fn list_messages(&self, inbox: &Inbox) -> Result<Vec<RawMessage>> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        let data = self
            .call(&[("ajax", "check_mail"), ("email", address)], "failed to fetch mail")
            .await?;
        Ok(array_at(&data, "mails")
            .into_iter()
            .map(RawMessage::Kyfudao)
            .collect())
    }

    async fn get_message(&self, inbox: &Inbox, message_id: &str) -> Result<RawMessage> {
        let id = require(message_id, "message id is empty")?;
        let address = require(&inbox.address, "mailbox address is empty")?;
        let data = self
            .call(
                &[("ajax", "get_email"), ("id", id), ("email", address)],
                "failed to fetch message",
            )
            .await?;
        Ok(RawMessage::Kyfudao(data))
    }

    /// Delete the whole mailbox, addressed by its storage alias.
    async fn clear_inbox(&self, inbox: &Inbox) -> Result<()> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        self.call(
            &[
                ("ajax", "delete_email"),
                ("email", address),
                ("storage_email", inbox.storage_address()),
            ],
            "failed to delete mailbox",
        )
        .await?;
        Ok(())
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
    );
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://01022.hk/zh/tempemail.html"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static("https://01022.hk"));
    headers
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn message_or(data: &Value, fallback: &str) -> String {
    text_field(data, &["message"]).unwrap_or(fallback).to_string()
}

/// A falsy `success` is a request error even on HTTP 200.
fn ensure_success(data: Value, status: u16, failure: &str) -> Result<Value> {
    if is_truthy(data.get("success")) {
        Ok(data)
    } else {
        Err(Error::request(Some(status), message_or(&data, failure)))
    }
}

/// The endpoint answers `true`, `1` or `"1"` interchangeably.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Normalize a kyfudao listing entry or message detail.
pub fn normalize(raw: &Value, mailbox: &str) -> Option<Email> {
    if !raw.is_object() {
        return None;
    }

    let created_at = timestamp_value(raw.get("date").or_else(|| raw.get("time")))
        .unwrap_or_else(now_seconds);
    let subject = text_field(raw, &["subject"]).unwrap_or(NO_SUBJECT).to_string();
    let id = id_field(raw, &["id", "mail_id"]).unwrap_or_else(|| format!("{created_at}-{subject}"));

    Some(Email {
        id,
        from: sender(raw.get("from").or_else(|| raw.get("sender"))),
        to: recipients_or_mailbox(raw.get("to"), mailbox),
        subject,
        text: text_field(raw, &["text", "content", "body"]).unwrap_or_default().to_string(),
        html: text_field(raw, &["html", "html_content"]).unwrap_or_default().to_string(),
        created_at,
        seen: flag_field(raw, &["seen", "read"]),
        raw: raw.clone(),
    })
}

/// Builder for configuring a kyfudao [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder targeting the public endpoint.
    pub fn new() -> Self {
        Self {
            api_url: API_URL.to_string(),
            transport: None,
        }
    }

    /// Override the endpoint URL.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Use a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Client {
            transport,
            api_url: self.api_url,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, Sender};
    use serde_json::json;

    #[test]
    fn success_false_is_an_error_even_on_200() {
        let err = ensure_success(
            json!({"success": false, "message": "quota exceeded"}),
            200,
            "failed to fetch mail",
        )
        .unwrap_err();
        assert_eq!(err.request_message(), Some("quota exceeded"));
        assert!(matches!(err, Error::Request { status: Some(200), .. }));
    }

    #[test]
    fn missing_success_uses_fallback_message() {
        let err = ensure_success(json!({}), 200, "failed to fetch mail").unwrap_err();
        assert_eq!(err.request_message(), Some("failed to fetch mail"));
    }

    #[test]
    fn numeric_and_string_success_flags_are_accepted() {
        for flag in [json!(1), json!("1"), json!(true)] {
            let data = json!({"success": flag, "mails": []});
            assert!(ensure_success(data, 200, "failed").is_ok());
        }
        for flag in [json!(0), json!(""), json!(false), Value::Null] {
            let data = json!({"success": flag});
            assert!(ensure_success(data, 200, "failed").is_err());
        }
    }

    #[test]
    fn form_body_is_percent_encoded() {
        assert_eq!(
            form_body(&[("ajax", "check_mail"), ("email", "a b@x.io")]),
            "ajax=check_mail&email=a%20b%40x.io"
        );
    }

    #[test]
    fn storage_address_defaults_to_display_address() {
        let mut inbox = Inbox::new("me@x.io");
        assert_eq!(inbox.storage_address(), "me@x.io");
        inbox.storage_address = Some(String::new());
        assert_eq!(inbox.storage_address(), "me@x.io");
        inbox.storage_address = Some("s123@store.x.io".into());
        assert_eq!(inbox.storage_address(), "s123@store.x.io");
    }

    #[test]
    fn normalizes_mail_entry() {
        let raw = json!({
            "id": 42,
            "from": "Bank <alerts@bank.example>",
            "subject": "Login code",
            "date": "2024-01-15 10:30:00",
            "content": "Your code is 9981"
        });

        let email = normalize(&raw, "me@x.io").unwrap();
        assert_eq!(email.id, "42");
        assert_eq!(
            email.from,
            Sender::Single(Address::with_name("Bank", "alerts@bank.example"))
        );
        assert_eq!(email.to, vec![Address::new("me@x.io")]);
        assert_eq!(email.created_at, 1_705_314_600);
        assert_eq!(email.text, "Your code is 9981");
        assert!(email.html.is_empty());
    }

    #[test]
    fn non_objects_are_absent() {
        assert!(normalize(&Value::Bool(true), "me@x.io").is_none());
    }
}
