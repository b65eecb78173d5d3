//! Resume link resolution
//!
//! `ResumeResolver` turns the cache and the files endpoint into a single view
//! for the UI: `{url, loading, error}` plus `refetch`. A fresh cached link is
//! served without touching the network. Otherwise the endpoint is asked for a
//! new presigned link, which is cached. When that fails the error is reported
//! as data and an expired cached link, if any, is still handed out.
//!
//! Overlapping calls share one in-flight resolution. Once cancelled, the
//! resolver stops publishing results.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::ResumeCache;
use crate::data::ResumeClient;

/// What the UI sees of the resume link
///
/// One of: idle (nothing yet), loading (`url` and `error` empty), resolved
/// (`url` set, no error), or failed (`error` set, `url` possibly a stale
/// fallback).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionState {
    #[serde(rename = "resumeUrl")]
    pub url: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Position in the resolution state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    Idle,
    Loading,
    Resolved,
    /// Failed, but a previously known link is still available
    FailedWithFallback,
    FailedEmpty,
}

impl ResolutionState {
    fn loading() -> Self {
        Self {
            url: None,
            loading: true,
            error: None,
        }
    }

    fn resolved(url: String) -> Self {
        Self {
            url: Some(url),
            loading: false,
            error: None,
        }
    }

    fn failed(url: Option<String>, error: String) -> Self {
        Self {
            url,
            loading: false,
            error: Some(error),
        }
    }

    pub fn phase(&self) -> ResolutionPhase {
        match (self.loading, &self.url, &self.error) {
            (true, _, _) => ResolutionPhase::Loading,
            (false, Some(_), None) => ResolutionPhase::Resolved,
            (false, Some(_), Some(_)) => ResolutionPhase::FailedWithFallback,
            (false, None, Some(_)) => ResolutionPhase::FailedEmpty,
            (false, None, None) => ResolutionPhase::Idle,
        }
    }
}

type PendingResolution = Shared<BoxFuture<'static, ResolutionState>>;

struct Inner {
    client: ResumeClient,
    cache: Arc<dyn ResumeCache>,
    state: watch::Sender<ResolutionState>,
    /// The resolution currently in flight, tagged so only its own callers clear it
    pending: Mutex<Option<(u64, PendingResolution)>>,
    next_id: AtomicU64,
    cancelled: AtomicBool,
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, Option<(u64, PendingResolution)>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn publish(&self, state: ResolutionState) {
        self.state.send_replace(state);
    }

    async fn run(&self) -> ResolutionState {
        let previous_url = self.state.borrow().url.clone();
        self.publish(ResolutionState::loading());

        // `get` purges an expired entry, so keep it aside for the failure path
        let stale = self.cache.peek_stale();
        if let Some(url) = self.cache.get() {
            debug!("Resume URL served from cache");
            let state = ResolutionState::resolved(url);
            self.publish(state.clone());
            return state;
        }

        let state = match self.client.fetch_presigned_url().await {
            Ok(url) => {
                info!("Fetched fresh resume URL");
                self.cache.put(&url);
                ResolutionState::resolved(url)
            }
            Err(e) => {
                warn!("Resume URL lookup failed: {}", e);
                let fallback = self.cache.peek_stale().or(stale);
                if fallback.is_some() {
                    debug!("Falling back to stale cached resume URL");
                }
                ResolutionState::failed(fallback.or(previous_url), e.to_string())
            }
        };

        if self.is_cancelled() {
            debug!("Resolver cancelled, not publishing late result");
            return state;
        }
        self.publish(state.clone());
        state
    }
}

/// Resolves the resume link for the UI
///
/// Clones share the same state, cache and in-flight resolution.
#[derive(Clone)]
pub struct ResumeResolver {
    inner: Arc<Inner>,
}

impl ResumeResolver {
    pub fn new(client: ResumeClient, cache: Arc<dyn ResumeCache>) -> Self {
        let (state, _) = watch::channel(ResolutionState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                cache,
                state,
                pending: Mutex::new(None),
                next_id: AtomicU64::new(0),
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ResolutionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.inner.state.subscribe()
    }

    /// Resolves the resume link, joining a resolution already in flight
    ///
    /// Never fails: errors end up in `ResolutionState::error`. After
    /// `cancel`, returns the current state without doing anything.
    pub async fn resolve(&self) -> ResolutionState {
        if self.inner.is_cancelled() {
            return self.state();
        }

        let (id, resolution) = {
            let mut slot = self.inner.lock_pending();
            match slot.as_ref() {
                Some((id, pending)) => {
                    debug!("Joining in-flight resume resolution");
                    (*id, pending.clone())
                }
                None => {
                    let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                    let inner = Arc::clone(&self.inner);
                    let pending = async move { inner.run().await }.boxed().shared();
                    *slot = Some((id, pending.clone()));
                    (id, pending)
                }
            }
        };

        let state = resolution.await;

        let mut slot = self.inner.lock_pending();
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
        }
        state
    }

    /// Same as `resolve`; a fresh cached link still short-circuits it
    pub async fn refetch(&self) -> ResolutionState {
        self.resolve().await
    }

    /// Marks the consumer as gone; later results are not published
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}
