//! The canonical, provider-agnostic email record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A mailbox address with an optional display name (empty when unknown).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub address: String,
}

impl Address {
    /// A bare address with no display name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            address: address.into(),
        }
    }

    /// An address with a display name, as in `"Jane <jane@example.com>"`.
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// True when neither part is known.
    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.name.is_empty()
    }
}

/// Sender of a message: usually one address, occasionally a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    Single(Address),
    List(Vec<Address>),
}

impl Sender {
    /// The first sender address, if any.
    pub fn primary(&self) -> Option<&Address> {
        match self {
            Sender::Single(address) => Some(address),
            Sender::List(list) => list.first(),
        }
    }
}

impl Default for Sender {
    fn default() -> Self {
        Sender::Single(Address::default())
    }
}

/// A message normalized from any provider.
///
/// Every field is populated; see the provider normalizers for the fallbacks
/// each one applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Provider id, or a synthesized one when the provider omits it.
    pub id: String,
    pub from: Sender,
    pub to: Vec<Address>,
    pub subject: String,
    /// Plain-text body; empty when the provider only offers HTML.
    pub text: String,
    pub html: String,
    /// Epoch seconds.
    pub created_at: i64,
    pub seen: bool,
    /// The untouched provider payload.
    pub raw: Value,
}

impl Email {
    /// Received time as a UTC datetime.
    pub fn received_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.created_at, 0)
    }
}
