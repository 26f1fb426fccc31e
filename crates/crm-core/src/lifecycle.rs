//! # Request Lifecycle
//!
//! The loading/error state machine every store runs around its data-source
//! calls.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       RequestLifecycle                                  │
//! │                                                                         │
//! │                     begin()                                             │
//! │   ┌──────────┐ ────────────────► ┌───────────┐                          │
//! │   │   Idle   │                   │  Pending  │  is_loading = true       │
//! │   └──────────┘ ◄─┐               └─────┬─────┘  error      = None       │
//! │        ▲         │                     │                                │
//! │        │         │        settle(Fulfilled)   settle(Rejected(msg))     │
//! │        │         │                     │              │                 │
//! │        │         │                     ▼              ▼                 │
//! │        │         │        ┌─────────────┐   ┌────────────────┐          │
//! │        │         │        │  Succeeded  │   │     Failed     │          │
//! │        │         │        │ error=None  │   │ error=Some(m)  │          │
//! │        │         │        └──────┬──────┘   └───────┬────────┘          │
//! │        │         │               │  begin()         │ clear_error()     │
//! │        │         └───────────────┼──────────────────┘                   │
//! │        │                         ▼                                      │
//! │        └──────────────────── Pending ...                                │
//! │                                                                         │
//! │  Succeeded and Failed are both "idle" to a consumer: is_loading=false. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overlapping Operations
//! One lifecycle is shared by every operation of a store. Nothing cancels an
//! in-flight call: a second `begin()` simply keeps the machine pending, and
//! each settlement overwrites the flags. The last settlement wins.
//!
//! ## Invariant
//! `is_loading()` and `error().is_some()` are never both true.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Where the machine is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    SettledOk,
    SettledError,
}

/// How a data-source call ended, from the store's point of view.
///
/// `Rejected` already holds the message to surface: either the envelope's
/// own message or the operation's fixed fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement<T> {
    Fulfilled(T),
    Rejected(String),
}

impl<T> Settlement<T> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Settlement<U> {
        match self {
            Settlement::Fulfilled(value) => Settlement::Fulfilled(f(value)),
            Settlement::Rejected(message) => Settlement::Rejected(message),
        }
    }
}

/// The shared loading/error flags of one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RequestLifecycle {
    status: RequestStatus,
    error: Option<String>,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// The message of the last failed settlement, until cleared.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Operation invoked: go pending and drop any previous error.
    pub fn begin(&mut self) {
        self.status = RequestStatus::Pending;
        self.error = None;
    }

    /// Applies a settlement to the flags and hands back the payload, if any.
    ///
    /// The caller applies the success effect to its collection only when
    /// this returns `Some`; a rejection leaves the collection alone.
    pub fn settle<T>(&mut self, settlement: Settlement<T>) -> Option<T> {
        match settlement {
            Settlement::Fulfilled(value) => {
                self.status = RequestStatus::SettledOk;
                self.error = None;
                Some(value)
            }
            Settlement::Rejected(message) => {
                self.status = RequestStatus::SettledError;
                self.error = Some(message);
                None
            }
        }
    }

    /// Drops the error without touching the loading flag.
    pub fn clear_error(&mut self) {
        self.error = None;
        if self.status == RequestStatus::SettledError {
            self.status = RequestStatus::Idle;
        }
    }
}
