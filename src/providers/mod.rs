//! Provider adapters and the raw message types they produce.
//!
//! Each adapter implements [`Provider`] with its own inbox identity type.
//! Adapters return [`RawMessage`] values untouched; turning them into
//! [`Email`] records is a separate, pure step ([`RawMessage::normalize`]).

use crate::{Email, Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub mod emailmux;
pub mod gptmail;
pub mod kyfudao;
pub mod mailtd;
pub mod tempmail_lol;

/// The supported temporary email services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    MailTd,
    Emailmux,
    Kyfudao,
    TempMailLol,
    GptMail,
}

impl ProviderKind {
    /// Every supported service, in a stable order.
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::MailTd,
        ProviderKind::Emailmux,
        ProviderKind::Kyfudao,
        ProviderKind::TempMailLol,
        ProviderKind::GptMail,
    ];

    /// Short display name, e.g. `"tempmail.lol"`.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::MailTd => "mail.td",
            ProviderKind::Emailmux => "emailmux",
            ProviderKind::Kyfudao => "kyfudao",
            ProviderKind::TempMailLol => "tempmail.lol",
            ProviderKind::GptMail => "gptmail",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Customization for [`Provider::issue_address`].
///
/// Providers that cannot honor an option ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressOptions {
    /// Desired part before `@`.
    pub local_part: Option<String>,
    /// Desired domain.
    pub domain: Option<String>,
    /// Solved captcha, for providers that demand one.
    pub captcha_token: Option<String>,
}

impl AddressOptions {
    /// No preferences: the provider picks everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a specific part before `@`. Surrounding whitespace is ignored.
    pub fn local_part(mut self, local_part: impl Into<String>) -> Self {
        self.local_part = Some(local_part.into());
        self
    }

    /// Ask for a specific domain (or, on emailmux, address kind).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Attach a solved captcha for providers that demand one.
    pub fn captcha_token(mut self, token: impl Into<String>) -> Self {
        self.captcha_token = Some(token.into());
        self
    }

    /// `local_part` trimmed, if non-empty.
    pub(crate) fn trimmed_local_part(&self) -> Option<&str> {
        self.local_part.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// `domain` trimmed, if non-empty.
    pub(crate) fn trimmed_domain(&self) -> Option<&str> {
        self.domain.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Provider-specific credentials for an inbox. Every inbox has a display address.
pub trait InboxIdentity {
    fn address(&self) -> &str;
}

/// The canonical inbox operations, implemented once per provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Whatever the provider needs to address an inbox on later calls.
    type Inbox: InboxIdentity + Send + Sync;

    /// The service this client talks to.
    fn kind(&self) -> ProviderKind;

    /// Obtain a new address.
    ///
    /// # Arguments
    /// * `options` - Preferred local part, domain and captcha; providers
    ///   ignore what they cannot honor
    ///
    /// # Returns
    /// The provider's inbox identity. Keep it: every later call needs it.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{AddressOptions, Provider, tempmail_lol};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = tempmail_lol::Client::new()?;
    /// let inbox = client
    ///     .issue_address(&AddressOptions::new().local_part("signup"))
    ///     .await?;
    /// println!("{} (token {})", inbox.address, inbox.token);
    /// # Ok(())
    /// # }
    /// ```
    async fn issue_address(&self, options: &AddressOptions) -> Result<Self::Inbox>;

    /// List the inbox.
    ///
    /// # Returns
    /// The raw payloads, newest first as the provider orders them. An empty
    /// inbox yields an empty vector, never an error.
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{Provider, gptmail, normalize_all};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = gptmail::Client::new()?;
    /// let inbox = gptmail::Inbox::new("someone@gravityengine.cc");
    /// let messages = client.list_messages(&inbox).await?;
    /// for email in normalize_all(&messages, &inbox.address) {
    ///     println!("{}: {}", email.id, email.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn list_messages(&self, inbox: &Self::Inbox) -> Result<Vec<RawMessage>>;

    /// Fetch one message in full.
    ///
    /// # Arguments
    /// * `inbox` - Identity returned by [`Provider::issue_address`]
    /// * `message_id` - An id taken from a normalized listing entry
    ///
    /// # Examples
    /// ```no_run
    /// # use tempmail_client::{Provider, mailtd};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tempmail_client::Error> {
    /// let client = mailtd::Client::new()?;
    /// let inbox = mailtd::Inbox::new("someone@nqmo.com");
    /// let raw = client.get_message(&inbox, "abc123").await?;
    /// if let Some(email) = raw.normalize(&inbox.address) {
    ///     println!("{}", email.text);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn get_message(&self, inbox: &Self::Inbox, message_id: &str) -> Result<RawMessage>;

    /// Delete one message.
    ///
    /// Providers without a per-message delete return [`Error::Unsupported`]
    /// without making a request.
    async fn delete_message(&self, _inbox: &Self::Inbox, _message_id: &str) -> Result<()> {
        Err(Error::Unsupported {
            provider: self.kind(),
            operation: "delete_message",
        })
    }

    /// Delete every message in the inbox.
    ///
    /// Providers without a bulk delete return [`Error::Unsupported`]
    /// without making a request.
    async fn clear_inbox(&self, _inbox: &Self::Inbox) -> Result<()> {
        Err(Error::Unsupported {
            provider: self.kind(),
            operation: "clear_inbox",
        })
    }
}

/// An untouched provider payload, tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMessage {
    MailTd(Value),
    Emailmux(Value),
    /// Emailmux's rendered message page.
    EmailmuxContent { id: String, html: String },
    Kyfudao(Value),
    TempMailLol(Value),
    GptMail(Value),
}

impl RawMessage {
    pub fn provider(&self) -> ProviderKind {
        match self {
            RawMessage::MailTd(_) => ProviderKind::MailTd,
            RawMessage::Emailmux(_) | RawMessage::EmailmuxContent { .. } => ProviderKind::Emailmux,
            RawMessage::Kyfudao(_) => ProviderKind::Kyfudao,
            RawMessage::TempMailLol(_) => ProviderKind::TempMailLol,
            RawMessage::GptMail(_) => ProviderKind::GptMail,
        }
    }

    /// Normalize with the producing provider's normalizer.
    ///
    /// `mailbox` is the receiving address, used where the payload lacks
    /// recipients. Returns `None` when the payload is not an object.
    pub fn normalize(&self, mailbox: &str) -> Option<Email> {
        match self {
            RawMessage::MailTd(raw) => mailtd::normalize(raw, mailbox),
            RawMessage::Emailmux(raw) => emailmux::normalize(raw, mailbox),
            RawMessage::EmailmuxContent { id, html } => {
                Some(emailmux::normalize_content(id, html, mailbox))
            }
            RawMessage::Kyfudao(raw) => kyfudao::normalize(raw, mailbox),
            RawMessage::TempMailLol(raw) => tempmail_lol::normalize(raw, mailbox),
            RawMessage::GptMail(raw) => gptmail::normalize(raw, mailbox),
        }
    }
}

/// Normalize a listing, skipping payloads that are not messages.
pub fn normalize_all(messages: &[RawMessage], mailbox: &str) -> Vec<Email> {
    messages
        .iter()
        .filter_map(|message| message.normalize(mailbox))
        .collect()
}

/// Reject empty identity fields before any request is made.
pub(crate) fn require<'a>(value: &'a str, what: &'static str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::Validation(what))
    } else {
        Ok(value)
    }
}

/// The array at `key`, or nothing.
pub(crate) fn array_at(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// The top-level array, or nothing.
pub(crate) fn into_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// A message whose id field (any of `keys`) equals `message_id`.
pub(crate) fn find_by_id(items: Vec<Value>, keys: &[&str], message_id: &str) -> Option<Value> {
    items.into_iter().find(|item| {
        crate::normalize::id_field(item, keys).is_some_and(|id| id == message_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_dispatches_by_producing_provider() {
        let payload = json!({"id": "7", "subject": "Hello", "from": "a@x.io"});
        let from_gptmail = RawMessage::GptMail(payload.clone()).normalize("me@x.io").unwrap();
        let from_mailtd = RawMessage::MailTd(payload).normalize("me@x.io").unwrap();
        assert_eq!(from_gptmail.id, "7");
        assert_eq!(from_mailtd.id, "7");
        assert_eq!(RawMessage::Kyfudao(json!(1)).provider(), ProviderKind::Kyfudao);
    }

    #[test]
    fn every_kind_has_a_distinct_name() {
        let names: std::collections::HashSet<_> =
            ProviderKind::ALL.iter().map(ProviderKind::name).collect();
        assert_eq!(names.len(), ProviderKind::ALL.len());
        assert_eq!(ProviderKind::TempMailLol.to_string(), "tempmail.lol");
    }

    #[test]
    fn normalize_all_drops_non_objects() {
        let messages = vec![
            RawMessage::TempMailLol(json!({"id": "a", "date": 1_705_314_600})),
            RawMessage::TempMailLol(json!("junk")),
            RawMessage::TempMailLol(Value::Null),
        ];
        let emails = normalize_all(&messages, "me@x.io");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].created_at, 1_705_314_600);
    }

    #[test]
    fn require_rejects_blank_values() {
        assert!(matches!(
            require("  ", "mailbox address is empty"),
            Err(Error::Validation("mailbox address is empty"))
        ));
        assert_eq!(require("a@x.io", "unused").unwrap(), "a@x.io");
    }

    #[test]
    fn options_trim_values() {
        let options = AddressOptions::new().local_part("  bob ").domain("   ");
        assert_eq!(options.trimmed_local_part(), Some("bob"));
        assert_eq!(options.trimmed_domain(), None);
    }

    #[test]
    fn find_by_id_matches_numeric_ids() {
        let items = vec![json!({"id": 1}), json!({"id": 2, "subject": "two"})];
        let found = find_by_id(items, &["id"], "2").unwrap();
        assert_eq!(found["subject"], "two");
    }
}
