//! Debounced lookups that only ever apply the newest result.
//!
//! Each `request` takes a token from a monotonically increasing counter, waits
//! out the quiescence window and dispatches only if no newer request arrived
//! meanwhile. A dispatched lookup runs to completion; when it resolves its
//! result is applied only if its token is still the latest one issued.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::error::Result;

/// Quiescence window before a lookup is dispatched.
pub const DEFAULT_QUIESCENCE_MS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    /// The latest request is waiting out the quiescence window.
    Debouncing,
    /// The latest request's lookup is in flight.
    Dispatched,
}

/// What became of one `request` call.
#[derive(Clone, Debug, PartialEq)]
pub enum Suggestion<T> {
    /// Newest result; it is now the coordinator's current value.
    Applied(T),
    /// A newer request arrived during the quiescence window; nothing was dispatched.
    Coalesced,
    /// Dispatched, but a newer request was issued before the result came back.
    Discarded,
}

impl<T> Suggestion<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Suggestion::Applied(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Tokens {
    latest_issued: u64,
    debouncing: Option<u64>,
    in_flight: Option<u64>,
}

/// Releases the slots a request holds when the request ends, including when
/// its future is dropped mid-way.
struct SlotRelease<'a> {
    tokens: &'a Mutex<Tokens>,
    token: u64,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        let mut tokens = self
            .tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if tokens.debouncing == Some(self.token) {
            tokens.debouncing = None;
        }
        if tokens.in_flight == Some(self.token) {
            tokens.in_flight = None;
        }
    }
}

/// Debounce-and-discard wrapper around one kind of remote lookup.
#[derive(Clone)]
pub struct SuggestionCoordinator<T> {
    quiescence: Duration,
    tokens: Arc<Mutex<Tokens>>,
    current: Arc<watch::Sender<Option<T>>>,
}

impl<T: Clone> Default for SuggestionCoordinator<T> {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_QUIESCENCE_MS))
    }
}

impl<T: Clone> SuggestionCoordinator<T> {
    pub fn new(quiescence: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            quiescence,
            tokens: Arc::new(Mutex::new(Tokens::default())),
            current: Arc::new(current),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tokens> {
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CoordinatorState {
        let tokens = self.lock();
        if tokens.debouncing.is_some() {
            CoordinatorState::Debouncing
        } else if tokens.in_flight.is_some() {
            CoordinatorState::Dispatched
        } else {
            CoordinatorState::Idle
        }
    }

    /// Last applied result.
    pub fn current(&self) -> Option<T> {
        self.current.borrow().clone()
    }

    /// Observes every applied result.
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.current.subscribe()
    }

    /// Debounces, dispatches `lookup` and applies its result if still current.
    ///
    /// A failed lookup that is still current surfaces its error; a failed
    /// lookup that was superseded is dropped like any stale result.
    pub async fn request<F, Fut>(&self, lookup: F) -> Result<Suggestion<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let token = {
            let mut tokens = self.lock();
            tokens.latest_issued += 1;
            tokens.debouncing = Some(tokens.latest_issued);
            tokens.latest_issued
        };
        let _release = SlotRelease {
            tokens: &self.tokens,
            token,
        };

        sleep(self.quiescence).await;

        {
            let mut tokens = self.lock();
            if tokens.latest_issued != token {
                debug!("Suggestion request #{} coalesced into #{}", token, tokens.latest_issued);
                return Ok(Suggestion::Coalesced);
            }
            tokens.debouncing = None;
            tokens.in_flight = Some(token);
        }

        debug!("Dispatching suggestion request #{}", token);
        let outcome = lookup().await;

        let mut tokens = self.lock();
        if tokens.latest_issued != token {
            debug!(
                "Discarding suggestion result #{} superseded by #{}",
                token, tokens.latest_issued
            );
            return Ok(Suggestion::Discarded);
        }
        drop(tokens);

        let value = outcome?;
        self.current.send_replace(Some(value.clone()));
        Ok(Suggestion::Applied(value))
    }
}
