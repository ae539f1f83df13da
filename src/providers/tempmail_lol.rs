//! tempmail.lol adapter.
//!
//! Inboxes are addressed by the opaque token issued at creation, passed as a
//! query parameter. The API has no single-message endpoint; messages are
//! looked up in the listing.

use crate::decode::decode;
use crate::normalize::{
    NO_SUBJECT, epoch_seconds_from_number, id_field, now_seconds, random_token,
    recipients_or_mailbox, sender, text_field,
};
use crate::providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, array_at, find_by_id,
    require,
};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::{Email, Error, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::{Map, Value};
use std::sync::Arc;

const BASE_URL: &str = "https://api.tempmail.lol/v2";
const ID_KEYS: &[&str] = &["id", "message_id", "mail_id"];

/// A tempmail.lol inbox: the address plus the token that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    pub address: String,
    pub token: String,
    /// Expiry as reported at creation, in the provider's units.
    pub expires_at: Option<i64>,
}

impl InboxIdentity for Inbox {
    fn address(&self) -> &str {
        &self.address
    }
}

/// One poll of an inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxSnapshot {
    /// The inbox has expired; no further mail will arrive.
    pub expired: bool,
    pub emails: Vec<Value>,
}

/// Async client for the tempmail.lol v2 API.
#[derive(Debug)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::tempmail_lol;
    /// # fn main() -> Result<(), tempmail_client::Error> {
    /// let client = tempmail_lol::Client::builder()
    ///     .base_url("https://api.tempmail.lol/v2")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a tempmail.lol client with default settings.
    ///
    /// Builds a fresh cookie-keeping transport. No request is made here.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, tempmail_lol};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = tempmail_lol::Client::new()?;
    /// let inbox = client.issue_address(&AddressOptions::new()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Poll the inbox, including its expiry flag.
    pub async fn fetch_inbox(&self, inbox: &Inbox) -> Result<InboxSnapshot> {
        let token = require(&inbox.token, "inbox token is empty")?;
        let url = format!("{}/inbox?token={}", self.base_url, urlencoding::encode(token));
        let response = self.transport.send(HttpRequest::get(url)).await?;
        let data = decode(response.status, &response.body)?.into_value();

        if let Some(message) = text_field(&data, &["error"]) {
            return Err(Error::request(Some(response.status), message));
        }

        Ok(InboxSnapshot {
            expired: data.get("expired").and_then(Value::as_bool).unwrap_or(false),
            emails: array_at(&data, "emails"),
        })
    }
}

#[async_trait]
impl Provider for Client {
    type Inbox = Inbox;

    fn kind(&self) -> ProviderKind {
        ProviderKind::TempMailLol
    }

    async fn issue_address(&self, options: &AddressOptions) -> Result<Inbox> {
        let mut body = Map::new();
        if let Some(prefix) = options.trimmed_local_part() {
            body.insert("prefix".into(), prefix.into());
        }
        if let Some(domain) = options.trimmed_domain() {
            body.insert("domain".into(), domain.into());
        }
        if let Some(captcha) = options.captcha_token.as_deref().filter(|c| !c.is_empty()) {
            body.insert("captcha".into(), captcha.into());
        }

        let request = HttpRequest::new(Method::Post, format!("{}/inbox/create", self.base_url))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Value::Object(body).to_string());
        let response = self.transport.send(request).await?;
        let data = decode(response.status, &response.body)?.into_value();

        if data.get("captcha_required").and_then(Value::as_bool) == Some(true) {
            return Err(Error::CaptchaRequired);
        }

        match (text_field(&data, &["address"]), text_field(&data, &["token"])) {
            (Some(address), Some(token)) => Ok(Inbox {
                address: address.to_string(),
                token: token.to_string(),
                expires_at: data.get("expires_at").and_then(Value::as_i64),
            }),
            _ => Err(Error::ResponseParse(
                "inbox creation returned incomplete data".to_string(),
            )),
        }
    }

    async fn list_messages(&self, inbox: &Inbox) -> Result<Vec<RawMessage>> {
        let snapshot = self.fetch_inbox(inbox).await?;
        Ok(snapshot
            .emails
            .into_iter()
            .map(RawMessage::TempMailLol)
            .collect())
    }

    /// Find a message in the current listing.
    async fn get_message(&self, inbox: &Inbox, message_id: &str) -> Result<RawMessage> {
        let id = require(message_id, "message id is empty")?;
        let snapshot = self.fetch_inbox(inbox).await?;
        find_by_id(snapshot.emails, ID_KEYS, id)
            .map(RawMessage::TempMailLol)
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))
    }
}

/// Normalize a tempmail.lol message.
pub fn normalize(raw: &Value, mailbox: &str) -> Option<Email> {
    normalize_with_rng(raw, mailbox, &mut rand::rng())
}

/// [`normalize`] with an explicit source for the random id fallback.
pub fn normalize_with_rng<R: Rng>(raw: &Value, mailbox: &str, rng: &mut R) -> Option<Email> {
    if !raw.is_object() {
        return None;
    }

    let timestamp = match raw.get("date") {
        Some(date) if date.is_number() => Some(date),
        _ => raw.get("timestamp"),
    };
    let created_at = timestamp
        .and_then(Value::as_f64)
        .map(epoch_seconds_from_number)
        .unwrap_or_else(now_seconds);

    let subject = text_field(raw, &["subject"]);
    let id = id_field(raw, ID_KEYS)
        .or_else(|| {
            id_field(raw, &["date"])
                .map(|date| format!("{}-{}", subject.unwrap_or("mail"), date))
        })
        .unwrap_or_else(|| random_token(rng));

    Some(Email {
        id,
        from: sender(raw.get("from")),
        to: recipients_or_mailbox(raw.get("to"), mailbox),
        subject: subject.unwrap_or(NO_SUBJECT).to_string(),
        text: text_field(raw, &["body", "text"]).unwrap_or_default().to_string(),
        html: text_field(raw, &["html"]).unwrap_or_default().to_string(),
        created_at,
        seen: false,
        raw: raw.clone(),
    })
}

/// Builder for configuring a tempmail.lol [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder targeting the public v2 API.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            transport: None,
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
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
            base_url: self.base_url,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
