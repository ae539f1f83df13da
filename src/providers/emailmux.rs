//! emailmux adapter.
//!
//! The API only answers once the client has loaded the landing page like a
//! browser would, so every call first goes through a [`BootstrapSession`].

use crate::decode::{Decoded, decode};
use crate::domains::EMAILMUX_DOMAINS;
use crate::normalize::{
    NO_SUBJECT, epoch_seconds_from_number, id_field, now_millis, now_seconds, parse_address,
    parse_zoneless_utc, recipients_or_mailbox, text_field,
};
use crate::providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, into_array, require,
};
use crate::session::{BootstrapSession, SessionStatus};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::{Email, Error, Result, SessionError, Sender};
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use serde_json::{Value, json};
use std::sync::Arc;

const BASE_URL: &str = "https://emailmux.com";
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const SEC_CH_UA: &str = r#""Chromium";v="122", "Not A(Brand";v="24", "Google Chrome";v="122""#;
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// An emailmux inbox: the generated address alone identifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    pub address: String,
}

impl Inbox {
    /// An inbox for an address issued earlier.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl InboxIdentity for Inbox {
    fn address(&self) -> &str {
        &self.address
    }
}

/// Async client for emailmux.
///
/// The session is bootstrapped lazily on the first call and kept for the
/// lifetime of the client. Clients do not share sessions.
#[derive(Debug)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    session: BootstrapSession,
}

impl Client {
    /// Create a builder for configuring the client.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::emailmux;
    /// # fn main() -> Result<(), tempmail_client::Error> {
    /// let client = emailmux::Client::builder()
    ///     .base_url("https://emailmux.com")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create an emailmux client with default settings.
    ///
    /// Builds a fresh cookie-keeping transport. No request is made here.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, emailmux};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = emailmux::Client::new()?;
    /// let inbox = client.issue_address(&AddressOptions::new()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Establish the browser session if it is not already established.
    ///
    /// Concurrent callers share one warm-up request.
    pub async fn ensure_session(&self) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        let url = format!("{}/", self.base_url);
        self.session.ensure(move || warm_up(transport, url)).await?;
        Ok(())
    }

    /// Mark an address as the active one so mail is routed to it.
    ///
    /// [`Provider::issue_address`] already does this for new addresses.
    pub async fn activate(&self, inbox: &Inbox) -> Result<()> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        let path = format!("/use-email?email={}", urlencoding::encode(address));
        self.request(Method::Get, &path, None).await?;
        Ok(())
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Decoded> {
        self.ensure_session().await?;

        let mut headers = api_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut request = HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = self.transport.send(request).await?;
        decode(response.status, &response.body)
    }

    async fn fetch_page(&self, path: &str) -> Result<Decoded> {
        self.ensure_session().await?;

        let mut headers = api_headers();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));

        let request = HttpRequest::get(format!("{}{}", self.base_url, path)).headers(headers);
        let response = self.transport.send(request).await?;
        decode(response.status, &response.body)
    }
}

async fn warm_up(transport: Arc<dyn Transport>, url: String) -> std::result::Result<(), SessionError> {
    let response = transport
        .send(HttpRequest::get(url).headers(navigation_headers()))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "emailmux warm-up failed");
            SessionError::new(e.to_string())
        })?;

    if response.status >= 400 {
        tracing::warn!(status = response.status, "emailmux warm-up rejected");
        return Err(SessionError::new(format!("HTTP {}", response.status)));
    }

    tracing::info!(provider = %ProviderKind::Emailmux, "session established");
    Ok(())
}

#[async_trait]
impl Provider for Client {
    type Inbox = Inbox;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Emailmux
    }

    /// Generate and activate an address. `options.domain` narrows the
    /// address kinds; the local part cannot be chosen.
    async fn issue_address(&self, options: &AddressOptions) -> Result<Inbox> {
        let domains: Vec<&str> = match options.trimmed_domain() {
            Some(domain) => vec![domain],
            None => EMAILMUX_DOMAINS.to_vec(),
        };

        let data = self
            .request(Method::Post, "/generate-email", Some(json!({ "domains": domains })))
            .await?
            .into_value();
        let address = text_field(&data, &["email"])
            .ok_or_else(|| Error::ResponseParse("generate-email returned no address".to_string()))?;

        let inbox = Inbox::new(address);
        self.activate(&inbox).await?;
        Ok(inbox)
    }

    async fn list_messages(&self, inbox: &Inbox) -> Result<Vec<RawMessage>> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        let path = format!("/emails?email={}", urlencoding::encode(address));
        let data = self.request(Method::Get, &path, None).await?.into_value();
        Ok(into_array(data).into_iter().map(RawMessage::Emailmux).collect())
    }

    /// Fetch the rendered message page.
    async fn get_message(&self, _inbox: &Inbox, message_id: &str) -> Result<RawMessage> {
        let id = require(message_id, "message id is empty")?;
        let path = format!("/email/{}", urlencoding::encode(id));
        let html = self.fetch_page(&path).await?.into_text();
        Ok(RawMessage::EmailmuxContent {
            id: id.to_string(),
            html,
        })
    }
}

fn api_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(REFERER, HeaderValue::from_static("https://emailmux.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://emailmux.com"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert("Sec-Ch-Ua", HeaderValue::from_static(SEC_CH_UA));
    headers.insert("Sec-Ch-Ua-Mobile", HeaderValue::from_static("?0"));
    headers.insert("Sec-Ch-Ua-Platform", HeaderValue::from_static("\"macOS\""));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("same-origin"));
    headers
}

/// Headers of a top-level page load.
fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(REFERER, HeaderValue::from_static("https://emailmux.com/"));
    headers.insert("Sec-Ch-Ua", HeaderValue::from_static(SEC_CH_UA));
    headers.insert("Sec-Ch-Ua-Mobile", HeaderValue::from_static("?0"));
    headers.insert("Sec-Ch-Ua-Platform", HeaderValue::from_static("\"macOS\""));
    headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
    headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
    headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
    headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));
    headers
}

/// Normalize an emailmux listing entry.
///
/// Listings carry no body; `text` and `html` are empty. Timestamps come
/// without a zone and are read as UTC.
pub fn normalize(raw: &Value, mailbox: &str) -> Option<Email> {
    normalize_at(raw, mailbox, now_millis())
}

/// [`normalize`] against a fixed clock, in epoch milliseconds.
///
/// The clock stands in for a missing timestamp and, when the entry has no
/// id either, becomes the id.
pub fn normalize_at(raw: &Value, mailbox: &str, now_ms: i64) -> Option<Email> {
    if !raw.is_object() {
        return None;
    }

    let created_at = match raw.get("timestamp") {
        Some(Value::String(s)) => parse_zoneless_utc(s),
        Some(Value::Number(n)) => n.as_f64().map(epoch_seconds_from_number),
        _ => None,
    }
    .unwrap_or(now_ms.div_euclid(1000));

    let id = id_field(raw, &["uuid", "id", "timestamp"]).unwrap_or_else(|| now_ms.to_string());

    Some(Email {
        id,
        from: Sender::Single(parse_address(text_field(raw, &["sender"]).unwrap_or_default())),
        to: recipients_or_mailbox(None, mailbox),
        subject: text_field(raw, &["subject"]).unwrap_or(NO_SUBJECT).to_string(),
        text: String::new(),
        html: String::new(),
        created_at,
        seen: false,
        raw: raw.clone(),
    })
}

/// Wrap a rendered message page as an email. Only the body is known.
pub fn normalize_content(id: &str, html: &str, mailbox: &str) -> Email {
    Email {
        id: id.to_string(),
        from: Sender::default(),
        to: recipients_or_mailbox(None, mailbox),
        subject: NO_SUBJECT.to_string(),
        text: String::new(),
        html: html.to_string(),
        created_at: now_seconds(),
        seen: false,
        raw: Value::String(html.to_string()),
    }
}

/// Builder for configuring an emailmux [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder targeting the public site with a fresh
    /// cookie-keeping [`ReqwestTransport`].
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            transport: None,
        }
    }

    /// Override the site URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom transport. It must keep cookies between requests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client. No request is made until the first call.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Client {
            transport,
            base_url: self.base_url,
            session: BootstrapSession::new(),
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
    use crate::Address;

    #[test]
    fn normalizes_listing_entry() {
        let raw = json!({
            "uuid": "9f1c",
            "sender": "Acme Support <support@acme.io>",
            "subject": "Welcome",
            "timestamp": "2024-01-15T10:30:00.000000"
        });

        let email = normalize(&raw, "x1y2@outlook.com").unwrap();
        assert_eq!(email.id, "9f1c");
        assert_eq!(
            email.from,
            Sender::Single(Address::with_name("Acme Support", "support@acme.io"))
        );
        assert_eq!(email.to, vec![Address::new("x1y2@outlook.com")]);
        assert_eq!(email.created_at, 1_705_314_600);
        assert!(email.text.is_empty() && email.html.is_empty());
        assert!(!email.seen);
    }

    #[test]
    fn id_falls_back_to_timestamp_text() {
        let raw = json!({"timestamp": "2024-01-15T10:30:00"});
        let email = normalize(&raw, "").unwrap();
        assert_eq!(email.id, "2024-01-15T10:30:00");
        assert_eq!(email.subject, NO_SUBJECT);
        assert!(email.to.is_empty());
    }

    #[test]
    fn garbage_timestamp_is_now() {
        let before = now_seconds();
        let email = normalize(&json!({"uuid": "a", "timestamp": "soon"}), "a@b.c").unwrap();
        assert!((email.created_at - before).abs() <= 2);
    }

    #[test]
    fn entry_without_id_or_timestamp_takes_the_clock() {
        let raw = json!({"sender": "a@b.io", "subject": "Bare"});
        let email = normalize_at(&raw, "x@outlook.com", 1_705_314_600_123).unwrap();
        assert_eq!(email.id, "1705314600123");
        assert_eq!(email.created_at, 1_705_314_600);
        assert_eq!(normalize_at(&raw, "x@outlook.com", 1_705_314_600_123), Some(email));
    }

    #[test]
    fn content_page_becomes_html_body() {
        let email = normalize_content("9f1c", "<p>hi</p>", "x@outlook.com");
        assert_eq!(email.id, "9f1c");
        assert_eq!(email.html, "<p>hi</p>");
        assert_eq!(email.raw, Value::String("<p>hi</p>".into()));
    }

    #[test]
    fn non_objects_are_absent() {
        assert!(normalize(&json!("nope"), "a@b.c").is_none());
    }
}
