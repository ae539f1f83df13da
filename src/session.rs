//! Per-adapter session state: a bearer-token cache and a single-flight
//! bootstrap session.

use crate::SessionError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A cached credential and the instant (epoch milliseconds) it stops being reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub expires_at_ms: i64,
}

impl SessionToken {
    /// Whether the token may still be handed out at `now_ms`.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// Bearer-token cache with a fixed refresh lead time.
///
/// Acquisition is not serialized: callers that find the cache empty at the
/// same time each acquire their own token, and the last store wins.
#[derive(Debug)]
pub struct TokenCache {
    lifetime: Duration,
    refresh_lead: Duration,
    slot: Mutex<Option<SessionToken>>,
}

impl TokenCache {
    /// Create an empty cache.
    ///
    /// # Arguments
    /// * `lifetime` - How long the issuer says a token lives
    /// * `refresh_lead` - How long before that a token stops being handed out
    pub fn new(lifetime: Duration, refresh_lead: Duration) -> Self {
        Self {
            lifetime,
            refresh_lead,
            slot: Mutex::new(None),
        }
    }

    /// The cached token, if one exists and is still valid at `now_ms`.
    pub fn current(&self, now_ms: i64) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|token| token.is_valid_at(now_ms))
            .map(|token| token.value.clone())
    }

    /// Cache `value`, acquired at `now_ms`.
    pub fn store(&self, value: impl Into<String>, now_ms: i64) -> SessionToken {
        let usable = self.lifetime.saturating_sub(self.refresh_lead);
        let token = SessionToken {
            value: value.into(),
            expires_at_ms: now_ms.saturating_add(usable.as_millis() as i64),
        };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        token
    }

    /// Forget the cached token so the next caller acquires a fresh one.
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Observable state of a [`BootstrapSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotEstablished,
    Establishing,
    Established,
}

type Bootstrap = Shared<BoxFuture<'static, Result<(), SessionError>>>;

#[derive(Default)]
enum SessionState {
    #[default]
    NotEstablished,
    Establishing(Bootstrap),
    Established,
}

/// A session that must be bootstrapped once before API calls succeed.
///
/// At most one bootstrap runs at a time; callers arriving while it is in
/// flight await the same outcome. Success is permanent, failure returns the
/// session to [`SessionStatus::NotEstablished`].
#[derive(Clone, Default)]
pub struct BootstrapSession {
    state: Arc<Mutex<SessionState>>,
}

impl BootstrapSession {
    /// Create a session in the [`SessionStatus::NotEstablished`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, without waiting for an in-flight bootstrap.
    pub fn status(&self) -> SessionStatus {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            SessionState::NotEstablished => SessionStatus::NotEstablished,
            SessionState::Establishing(_) => SessionStatus::Establishing,
            SessionState::Established => SessionStatus::Established,
        }
    }

    /// Make sure the session is established, running `bootstrap` only if no
    /// attempt is established or in flight.
    pub async fn ensure<F, Fut>(&self, bootstrap: F) -> Result<(), SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
    {
        match self.pending(bootstrap) {
            Some(pending) => pending.await,
            None => Ok(()),
        }
    }

    fn pending<F, Fut>(&self, bootstrap: F) -> Option<Bootstrap>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            SessionState::Established => None,
            SessionState::Establishing(pending) => Some(pending.clone()),
            SessionState::NotEstablished => {
                let attempt = bootstrap();
                let shared_state = Arc::clone(&self.state);
                let pending = async move {
                    let outcome = attempt.await;
                    let mut state = shared_state.lock().unwrap_or_else(PoisonError::into_inner);
                    *state = match outcome {
                        Ok(()) => SessionState::Established,
                        Err(_) => SessionState::NotEstablished,
                    };
                    outcome
                }
                .boxed()
                .shared();
                *state = SessionState::Establishing(pending.clone());
                Some(pending)
            }
        }
    }
}

impl std::fmt::Debug for BootstrapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSession")
            .field("status", &self.status())
            .finish()
    }
}
