use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex, PoisonError},
};

use futures::future::{FutureExt, Shared};

use crate::{ApiResponse, Fingerprint, Result};

#[cfg(not(target_arch = "wasm32"))]
pub(crate) type OutcomeFuture = futures::future::BoxFuture<'static, Result<ApiResponse>>;
// reqwest futures are !Send in the browser.
#[cfg(target_arch = "wasm32")]
pub(crate) type OutcomeFuture = futures::future::LocalBoxFuture<'static, Result<ApiResponse>>;

/// Awaitable outcome of one in-flight request, cloneable per caller.
pub(crate) type SharedOutcome = Shared<OutcomeFuture>;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn boxed<F>(future: F) -> OutcomeFuture
where
    F: Future<Output = Result<ApiResponse>> + Send + 'static,
{
    future.boxed()
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn boxed<F>(future: F) -> OutcomeFuture
where
    F: Future<Output = Result<ApiResponse>> + 'static,
{
    future.boxed_local()
}

/// Result of [`PendingRequests::acquire`].
pub(crate) enum Slot {
    /// Another caller already owns the network call; await its outcome.
    Joined(SharedOutcome),
    /// This caller registered the call.
    Leader(SharedOutcome),
}

impl Slot {
    pub(crate) fn into_outcome(self) -> SharedOutcome {
        match self {
            Self::Joined(outcome) | Self::Leader(outcome) => outcome,
        }
    }
}

/// Table of in-flight requests keyed by fingerprint.
///
/// Holds at most one entry per fingerprint. The registered future must call
/// [`PendingRequests::release`] before it resolves.
#[derive(Default)]
pub(crate) struct PendingRequests {
    inflight: Mutex<HashMap<Fingerprint, SharedOutcome>>,
}

impl PendingRequests {
    /// Joins the in-flight call for `key`, or registers the one built by `start`.
    pub(crate) fn acquire<F>(&self, key: &Fingerprint, start: F) -> Slot
    where
        F: FnOnce() -> OutcomeFuture,
    {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inflight.get(key) {
            return Slot::Joined(existing.clone());
        }
        let outcome = start().shared();
        inflight.insert(key.clone(), outcome.clone());
        Slot::Leader(outcome)
    }

    pub(crate) fn release(&self, key: &Fingerprint) {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
