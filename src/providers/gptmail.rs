//! gptmail adapter.
//!
//! Plain JSON REST keyed by the address. Listings carry full bodies, so
//! single messages are resolved from the listing.

use crate::decode::{Decoded, decode};
use crate::domains::GPTMAIL_DOMAINS;
use crate::normalize::{
    NO_SUBJECT, flag_field, flexible_timestamp_or_now, id_field, parse_address, random_token,
    text_field,
};
use crate::providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, array_at, find_by_id,
    require,
};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::{Email, Error, Result, Sender};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde_json::{Map, Value};
use std::sync::Arc;

const BASE_URL: &str = "https://mail.chatgpt.org.uk/api";
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
const ID_KEYS: &[&str] = &["id", "uuid"];

/// A gptmail inbox: the address alone identifies it.
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

/// Async client for the gptmail API.
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
    /// # use tempmail_client::gptmail;
    /// # fn main() -> Result<(), tempmail_client::Error> {
    /// let client = gptmail::Client::builder()
    ///     .base_url("https://mail.chatgpt.org.uk/api")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a gptmail client with default settings.
    ///
    /// Builds a fresh cookie-keeping transport. No request is made here.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, gptmail};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = gptmail::Client::new()?;
    /// let inbox = client.issue_address(&AddressOptions::new()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Domains accepted when choosing an address.
    pub fn domains(&self) -> &'static [&'static str] {
        GPTMAIL_DOMAINS
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Decoded> {
        let mut request =
            HttpRequest::new(method, format!("{}{}", self.base_url, path)).headers(default_headers());
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.to_string());
        }

        let response = self.transport.send(request).await?;
        decode(response.status, &response.body)
    }

    async fn fetch_emails(&self, inbox: &Inbox) -> Result<Vec<Value>> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        let path = format!("/emails?email={}", urlencoding::encode(address));
        let data = self.request(Method::Get, &path, None).await?.into_value();
        Ok(array_at(&data, "emails"))
    }
}

#[async_trait]
impl Provider for Client {
    type Inbox = Inbox;

    fn kind(&self) -> ProviderKind {
        ProviderKind::GptMail
    }

    /// Generate an address.
    ///
    /// Supplying either option, even blank, switches to the customizing POST
    /// form; only non-blank values are sent.
    async fn issue_address(&self, options: &AddressOptions) -> Result<Inbox> {
        let customized = options.local_part.is_some() || options.domain.is_some();

        let decoded = if customized {
            let mut body = Map::new();
            if let Some(prefix) = options.trimmed_local_part() {
                body.insert("prefix".into(), prefix.into());
            }
            if let Some(domain) = options.trimmed_domain() {
                body.insert("domain".into(), domain.into());
            }
            self.request(Method::Post, "/generate-email", Some(Value::Object(body)))
                .await?
        } else {
            self.request(Method::Get, "/generate-email", None).await?
        };
        let data = decoded.into_value();

        match text_field(&data, &["email"]) {
            Some(address) => Ok(Inbox::new(address)),
            None => Err(Error::request(
                None,
                text_field(&data, &["error"]).unwrap_or("failed to generate address"),
            )),
        }
    }

    async fn list_messages(&self, inbox: &Inbox) -> Result<Vec<RawMessage>> {
        Ok(self
            .fetch_emails(inbox)
            .await?
            .into_iter()
            .map(RawMessage::GptMail)
            .collect())
    }

    /// Find a message in the current listing.
    async fn get_message(&self, inbox: &Inbox, message_id: &str) -> Result<RawMessage> {
        let id = require(message_id, "message id is empty")?;
        let emails = self.fetch_emails(inbox).await?;
        find_by_id(emails, ID_KEYS, id)
            .map(RawMessage::GptMail)
            .ok_or_else(|| Error::MessageNotFound(id.to_string()))
    }

    /// Delete one message. Ids are global, so the inbox is not consulted.
    async fn delete_message(&self, _inbox: &Inbox, message_id: &str) -> Result<()> {
        let id = require(message_id, "message id is empty")?;
        let path = format!("/email/{}", urlencoding::encode(id));
        self.request(Method::Delete, &path, None).await?;
        Ok(())
    }

    async fn clear_inbox(&self, inbox: &Inbox) -> Result<()> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        let path = format!("/emails/clear?email={}", urlencoding::encode(address));
        self.request(Method::Delete, &path, None).await?;
        Ok(())
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(REFERER, HeaderValue::from_static("https://mail.chatgpt.org.uk/"));
    headers
}

/// Normalize a gptmail message.
pub fn normalize(raw: &Value, mailbox: &str) -> Option<Email> {
    normalize_with_rng(raw, mailbox, &mut rand::rng())
}

/// [`normalize`] with an explicit source for the random id fallback.
pub fn normalize_with_rng<R: Rng>(raw: &Value, mailbox: &str, rng: &mut R) -> Option<Email> {
    if !raw.is_object() {
        return None;
    }

    let created_at = flexible_timestamp_or_now(text_field(raw, &["created_at"]).unwrap_or_default());
    let to = parse_address(text_field(raw, &["email_address"]).unwrap_or(mailbox));

    Some(Email {
        id: id_field(raw, ID_KEYS).unwrap_or_else(|| format!("{}-{}", created_at, random_token(rng))),
        from: Sender::Single(parse_address(
            text_field(raw, &["from_address", "from"]).unwrap_or_default(),
        )),
        to: if to.address.is_empty() { Vec::new() } else { vec![to] },
        subject: text_field(raw, &["subject"]).unwrap_or(NO_SUBJECT).to_string(),
        text: text_field(raw, &["content", "text_content"]).unwrap_or_default().to_string(),
        html: text_field(raw, &["html_content"]).unwrap_or_default().to_string(),
        created_at,
        seen: flag_field(raw, &["seen", "read"]),
        raw: raw.clone(),
    })
}

/// Builder for configuring a gptmail [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder targeting the public API.
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
