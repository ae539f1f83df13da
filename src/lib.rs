//! # Temporary Mail Client
//! Asynchronous adapters over several unrelated temporary email services (mail.td, emailmux, kyfudao, tempmail.lol and gptmail), each exposing the same inbox operations through the [`Provider`] trait and producing messages that normalize into one [`Email`] record.
//!
//! ## Audience and uses
//! For Rust developers who need throwaway addresses in integration tests, demos, or automation scripts and want to switch services without rewriting the polling code: pick a provider client, issue an address, poll [`Provider::list_messages`], normalize with [`RawMessage::normalize`], and clean up when done.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. The default [`ReqwestTransport`] uses `reqwest` with a cookie store; any other HTTP stack can be plugged in by implementing [`Transport`].
//!
//! ## Provider differences
//! Inbox identity is not unified. Each client has its own `Inbox` type carrying whatever the service needs on later calls: a bare address, an address plus an access token, or an address plus a storage alias. mail.td keeps a cached bearer token and emailmux keeps a bootstrapped browser session; both live inside the client instance, so separate instances never share state.
//!
//! ## Out of scope
//! Not a mail client or SMTP sender. No retries, caching of bodies, deduplication, or failover between providers: a failing provider surfaces its error.
//!
//! ## Errors
//! Transport faults surface as [`Error::Transport`]; HTTP statuses >= 400 and provider-level `success: false` bodies as [`Error::Request`]; failed credential acquisition and session warm-up as [`Error::Auth`] and [`Error::Session`]; empty addresses or ids as [`Error::Validation`] before any request is sent. Normalization never fails.
//!
//! ## Example
//! ```no_run
//! use tempmail_client::{AddressOptions, Provider, gptmail};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tempmail_client::Error> {
//!     let client = gptmail::Client::new()?;
//!     let inbox = client.issue_address(&AddressOptions::new()).await?;
//!     println!("Created: {}", inbox.address);
//!
//!     for raw in client.list_messages(&inbox).await? {
//!         if let Some(email) = raw.normalize(&inbox.address) {
//!             println!("{}: {}", email.created_at, email.subject);
//!         }
//!     }
//!
//!     client.clear_inbox(&inbox).await?;
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod domains;
mod email;
mod error;
pub mod normalize;
mod providers;
pub mod session;
pub mod transport;

pub use email::{Address, Email, Sender};
pub use error::{Error, SessionError, TransportError};
pub use providers::{
    AddressOptions, InboxIdentity, Provider, ProviderKind, RawMessage, emailmux, gptmail,
    kyfudao, mailtd, normalize_all, tempmail_lol,
};
pub use transport::{ReqwestTransport, ReqwestTransportBuilder, Transport};

/// Result type alias for provider operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
