//! mail.td adapter.
//!
//! Every mailbox call carries a short-lived bearer token and addresses the
//! mailbox by its percent-encoded address as a path segment. Addresses are
//! generated locally from the domain registry; the service accepts mail for
//! any local part on its domains.

use crate::decode::{Decoded, decode};
use crate::domains::{MAIL_TD_DOMAINS, random_address};
use crate::normalize::{
    NO_SUBJECT, flag_field, id_field, now_millis, now_seconds, recipients_or_mailbox, sender,
    text_field, timestamp_value,
};
use crate::providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, into_array, require,
};
use crate::session::TokenCache;
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::{Email, Error, Result};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://mail.td/api/api/v1";
const TOKEN_LIFETIME: Duration = Duration::from_secs(5 * 60);
const TOKEN_REFRESH_LEAD: Duration = Duration::from_secs(30);

/// A mail.td inbox: the address alone identifies it.
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

/// Async client for the mail.td API.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] to override the
/// endpoint, transport, domains or token timings.
#[derive(Debug)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    domains: Vec<String>,
    tokens: TokenCache,
}

impl Client {
    /// Create a builder for configuring the client.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::time::Duration;
    /// # use tempmail_client::mailtd;
    /// # fn main() -> Result<(), tempmail_client::Error> {
    /// let client = mailtd::Client::builder()
    ///     .domains(["nqmo.com"])
    ///     .token_lifetime(Duration::from_secs(120))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a mail.td client with default settings.
    ///
    /// Builds a fresh cookie-keeping transport. No request is made here.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, mailtd};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = mailtd::Client::new()?;
    /// let inbox = client.issue_address(&AddressOptions::new()).await?;
    /// println!("{}", inbox.address);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Domains used when generating addresses.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Return a valid bearer token, acquiring a new one if the cached token
    /// is missing or within the refresh lead of expiry.
    ///
    /// Concurrent callers that all find the cache stale each acquire a token.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.tokens.current(now_millis()) {
            return Ok(token);
        }

        let token = self
            .acquire_token()
            .await
            .map_err(|e| Error::Auth(Box::new(e)))?;
        self.tokens.store(token.clone(), now_millis());
        tracing::info!(provider = %ProviderKind::MailTd, "acquired bearer token");
        Ok(token)
    }

    /// Mark a message as read.
    pub async fn mark_as_read(&self, inbox: &Inbox, message_id: &str) -> Result<()> {
        let url = self.message_url(inbox, message_id)?;
        self.authorized(Method::Patch, url).await?;
        Ok(())
    }

    /// Fetch the raw RFC 822 source of a message.
    pub async fn message_source(&self, inbox: &Inbox, message_id: &str) -> Result<String> {
        let url = format!("{}/source", self.message_url(inbox, message_id)?);
        Ok(self.authorized(Method::Get, url).await?.into_text())
    }

    async fn acquire_token(&self) -> Result<String> {
        let url = format!("{}/auth/authorize_token", self.base_url);
        let response = self.transport.send(HttpRequest::post(url)).await?;
        let decoded = decode(response.status, &response.body)?;
        token_from(decoded)
            .ok_or_else(|| Error::ResponseParse("token endpoint returned no token".to_string()))
    }

    async fn authorized(&self, method: Method, url: String) -> Result<Decoded> {
        let token = self.token().await?;
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::Auth(Box::new(Error::ResponseParse(
                "token is not a valid header value".to_string(),
            )))
        })?;

        let request = HttpRequest::new(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(AUTHORIZATION, bearer);
        let response = self.transport.send(request).await?;
        decode(response.status, &response.body)
    }

    fn mailbox_url(&self, inbox: &Inbox) -> Result<String> {
        let address = require(&inbox.address, "mailbox address is empty")?;
        Ok(format!(
            "{}/mailbox/{}",
            self.base_url,
            urlencoding::encode(address)
        ))
    }

    fn message_url(&self, inbox: &Inbox, message_id: &str) -> Result<String> {
        let message_id = require(message_id, "message id is empty")?;
        Ok(format!(
            "{}/{}",
            self.mailbox_url(inbox)?,
            urlencoding::encode(message_id)
        ))
    }

    fn generate_address(&self, options: &AddressOptions) -> Result<String> {
        let mut rng = rand::rng();
        let domain = match options.trimmed_domain() {
            Some(domain) => domain,
            None => self
                .domains
                .choose(&mut rng)
                .map(String::as_str)
                .ok_or(Error::Validation("no domains configured"))?,
        };

        match options.trimmed_local_part() {
            Some(local) => Ok(format!("{local}@{domain}")),
            None => random_address(&mut rng, &[domain])
                .ok_or(Error::Validation("no domains configured")),
        }
    }
}

#[async_trait]
impl Provider for Client {
    type Inbox = Inbox;

    fn kind(&self) -> ProviderKind {
        ProviderKind::MailTd
    }

    /// Generate an address locally. No request is made.
    async fn issue_address(&self, options: &AddressOptions) -> Result<Inbox> {
        Ok(Inbox::new(self.generate_address(options)?))
    }

    async fn list_messages(&self, inbox: &Inbox) -> Result<Vec<RawMessage>> {
        let url = self.mailbox_url(inbox)?;
        let decoded = self.authorized(Method::Get, url).await?;
        Ok(into_array(decoded.into_value())
            .into_iter()
            .map(RawMessage::MailTd)
            .collect())
    }

    async fn get_message(&self, inbox: &Inbox, message_id: &str) -> Result<RawMessage> {
        let url = self.message_url(inbox, message_id)?;
        let decoded = self.authorized(Method::Get, url).await?;
        Ok(RawMessage::MailTd(decoded.into_value()))
    }

    async fn delete_message(&self, inbox: &Inbox, message_id: &str) -> Result<()> {
        let url = self.message_url(inbox, message_id)?;
        self.authorized(Method::Delete, url).await?;
        Ok(())
    }

    async fn clear_inbox(&self, inbox: &Inbox) -> Result<()> {
        let url = self.mailbox_url(inbox)?;
        self.authorized(Method::Delete, url).await?;
        Ok(())
    }
}

/// Extract the token from the authorize response, which is usually a bare
/// (possibly quoted) string.
fn token_from(decoded: Decoded) -> Option<String> {
    let raw = match decoded {
        Decoded::Json(Value::String(s)) | Decoded::Text(s) => s,
        Decoded::Json(value) => value.get("token").and_then(Value::as_str)?.to_string(),
        Decoded::NoContent => return None,
    };
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// Normalize a mail.td message summary or detail.
pub fn normalize(raw: &Value, mailbox: &str) -> Option<Email> {
    if !raw.is_object() {
        return None;
    }

    let created_at = timestamp_value(raw.get("date").or_else(|| raw.get("created_at")))
        .unwrap_or_else(now_seconds);
    let subject = text_field(raw, &["subject"]).unwrap_or(NO_SUBJECT).to_string();
    let id = id_field(raw, &["id"]).unwrap_or_else(|| format!("{created_at}-{subject}"));

    Some(Email {
        id,
        from: sender(raw.get("from")),
        to: recipients_or_mailbox(raw.get("to"), mailbox),
        subject,
        text: text_field(raw, &["text", "body"]).unwrap_or_default().to_string(),
        html: text_field(raw, &["html"]).unwrap_or_default().to_string(),
        created_at,
        seen: flag_field(raw, &["seen", "read"]),
        raw: raw.clone(),
    })
}

/// Builder for configuring a mail.td [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    domains: Vec<String>,
    token_lifetime: Duration,
    refresh_lead: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - The public mail.td API endpoint
    /// - A fresh [`ReqwestTransport`]
    /// - [`MAIL_TD_DOMAINS`]
    /// - 300 s token lifetime, refreshed 30 s early
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            transport: None,
            domains: MAIL_TD_DOMAINS.iter().map(|d| d.to_string()).collect(),
            token_lifetime: TOKEN_LIFETIME,
            refresh_lead: TOKEN_REFRESH_LEAD,
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

    /// Replace the domains used for address generation.
    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Advertised token lifetime.
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// How long before expiry a cached token stops being reused.
    pub fn refresh_lead(mut self, lead: Duration) -> Self {
        self.refresh_lead = lead;
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
            domains: self.domains,
            tokens: TokenCache::new(self.token_lifetime, self.refresh_lead),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
