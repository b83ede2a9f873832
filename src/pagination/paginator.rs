//! Single-flight paginator
//!
//! Drives "fetch next page" against a [`PageSource`], keeping at most one fetch
//! in flight. The state check and the claim of the loading state happen under
//! one lock, so concurrent `load_next` calls cannot both start a fetch.

use super::types::{PaginationState, PaginatorConfig};
use crate::error::{Error, Result};
use crate::source::PageSource;
use crate::types::PageKey;
use futures::FutureExt;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type SuccessCallback<T> = Box<dyn Fn(Vec<T>, PageKey) + Send + Sync>;
type Listener = Box<dyn Fn(&PaginationState) + Send + Sync>;

/// Generic pagination state machine
///
/// Callbacks (`on_success` and observers) run while the paginator's internal
/// lock is held and must not call back into the same paginator. A panicking
/// `on_success` fails the page like a panicking fetch does; a panicking
/// observer is logged and skipped.
pub struct Paginator<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: PaginatorConfig,
    source: Arc<dyn PageSource<T>>,
    on_success: SuccessCallback<T>,
    runtime: Handle,
    core: Mutex<Core>,
    state_tx: watch::Sender<PaginationState>,
}

struct Core {
    key: PageKey,
    /// Bumped on every fetch start and every reset; completions carrying an
    /// older generation are stale.
    generation: u64,
    task: Option<JoinHandle<()>>,
    listeners: Vec<(ObserverId, Listener)>,
    next_observer: u64,
}

/// Handle for removing a listener registered with [`Paginator::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl<T: Send + 'static> Paginator<T> {
    /// Start building a paginator over a page source
    pub fn builder(source: impl PageSource<T> + 'static) -> PaginatorBuilder<T> {
        PaginatorBuilder {
            source: Arc::new(source),
            config: PaginatorConfig::default(),
            on_success: None,
            runtime: None,
        }
    }

    /// Request the next page
    ///
    /// Returns `true` if a fetch was started. Does nothing unless the state
    /// is `Idle`.
    pub fn load_next(&self) -> bool {
        let mut core = self.inner.lock_core();
        self.inner.start_fetch(&mut core)
    }

    /// Re-issue the failed fetch for the same page key
    ///
    /// Returns `true` if a fetch was started. Does nothing unless the state
    /// is `Error`.
    pub fn retry(&self) -> bool {
        let mut core = self.inner.lock_core();
        if !self.inner.state_tx.borrow().is_error() {
            debug!("retry ignored, last fetch did not fail");
            return false;
        }
        self.inner.transition(&core, PaginationState::Idle);
        self.inner.start_fetch(&mut core)
    }

    /// Cancel any in-flight fetch and rewind to the initial page key
    ///
    /// Accumulated items are not touched.
    pub fn reset(&self) {
        let mut core = self.inner.lock_core();
        if let Some(task) = core.task.take() {
            debug!(page = core.key, "cancelling in-flight fetch");
            task.abort();
        }
        core.generation += 1;
        core.key = self.inner.config.initial_key;
        self.inner.transition(&core, PaginationState::Idle);
    }
}

impl<T> Paginator<T> {
    /// Current state
    pub fn state(&self) -> PaginationState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to the latest state
    pub fn subscribe(&self) -> watch::Receiver<PaginationState> {
        self.inner.state_tx.subscribe()
    }

    /// Register a listener that receives every transition, in order
    pub fn observe(
        &self,
        listener: impl Fn(&PaginationState) + Send + Sync + 'static,
    ) -> ObserverId {
        let mut core = self.inner.lock_core();
        let id = ObserverId(core.next_observer);
        core.next_observer += 1;
        core.listeners.push((id, Box::new(listener)));
        id
    }

    /// Stop delivering transitions to a listener
    ///
    /// Returns `false` if the listener was already removed.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut core = self.inner.lock_core();
        let before = core.listeners.len();
        core.listeners.retain(|(registered, _)| *registered != id);
        core.listeners.len() != before
    }

    /// Wait until no fetch is in flight, returning the settled state
    pub async fn settled(&self) -> PaginationState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|state| !state.is_loading()).await;
        match settled {
            Ok(state) => (*state).clone(),
            Err(_) => self.state(),
        }
    }

    /// Page key the next fetch will use
    pub fn current_key(&self) -> PageKey {
        self.inner.lock_core().key
    }

    /// First page key
    pub fn initial_key(&self) -> PageKey {
        self.inner.config.initial_key
    }

    /// Cursor settings
    pub fn config(&self) -> PaginatorConfig {
        self.inner.config
    }

    /// Check if a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.inner.state_tx.borrow().is_loading()
    }
}

impl<T> Drop for Paginator<T> {
    fn drop(&mut self) {
        let mut core = self.inner.lock_core();
        core.generation += 1;
        if let Some(task) = core.task.take() {
            task.abort();
        }
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl<T> Inner<T> {
    fn lock_core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand a page to `on_success`; a panic there fails the page
    fn deliver(&self, items: Vec<T>, next_key: PageKey) -> Result<()> {
        catch_unwind(AssertUnwindSafe(|| (self.on_success)(items, next_key))).map_err(|panic| {
            Error::FetchPanicked {
                message: panic_message(panic.as_ref()),
            }
        })
    }

    /// Publish a new state to the watch channel and every listener.
    fn transition(&self, core: &Core, next: PaginationState) {
        let previous = self.state_tx.send_replace(next.clone());
        if previous == next {
            return;
        }
        debug!(from = %previous, to = %next, "pagination transition");
        for (id, listener) in &core.listeners {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(&next))) {
                warn!(
                    observer = id.0,
                    panic = %panic_message(panic.as_ref()),
                    "pagination observer panicked"
                );
            }
        }
    }
}

impl<T: Send + 'static> Inner<T> {
    fn start_fetch(self: &Arc<Self>, core: &mut Core) -> bool {
        let idle = self.state_tx.borrow().is_idle();
        if !idle {
            debug!(page = core.key, "load_next dropped, paginator busy or finished");
            return false;
        }

        let key = core.key;
        let loading = if key == self.config.initial_key {
            PaginationState::InitialLoading
        } else {
            PaginationState::PageLoading
        };
        self.transition(core, loading);

        core.generation += 1;
        let generation = core.generation;
        let inner = Arc::clone(self);
        debug!(page = key, generation, "fetching page");
        core.task = Some(self.runtime.spawn(async move {
            let outcome = AssertUnwindSafe(inner.source.fetch_page(key))
                .catch_unwind()
                .await;
            let result = outcome.unwrap_or_else(|panic| {
                Err(Error::FetchPanicked {
                    message: panic_message(panic.as_ref()),
                })
            });
            inner.complete(generation, key, result);
        }));
        true
    }

    fn complete(&self, generation: u64, key: PageKey, result: Result<Vec<T>>) {
        let mut core = self.lock_core();
        if core.generation != generation {
            debug!(page = key, generation, "discarding stale fetch result");
            return;
        }
        core.task = None;

        match result {
            Ok(items) if items.is_empty() => {
                info!(page = key, "end of catalog reached");
                self.transition(&core, PaginationState::EndReached);
            }
            Ok(items) => {
                let count = items.len();
                let next_key = key.checked_add(self.config.increment);
                if let Err(e) = self.deliver(items, next_key.unwrap_or(key)) {
                    warn!(page = key, error = %e, "page delivery failed");
                    self.transition(&core, PaginationState::error(e, true));
                    return;
                }
                let Some(next_key) = next_key else {
                    warn!(page = key, "page key space exhausted, stopping");
                    self.transition(&core, PaginationState::EndReached);
                    return;
                };
                core.key = next_key;
                debug!(page = key, count, next_key, "page loaded");
                self.transition(&core, PaginationState::Idle);
            }
            Err(e) => {
                warn!(page = key, error = %e, "page fetch failed");
                self.transition(&core, PaginationState::error(e, true));
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builder for [`Paginator`]
pub struct PaginatorBuilder<T> {
    source: Arc<dyn PageSource<T>>,
    config: PaginatorConfig,
    on_success: Option<SuccessCallback<T>>,
    runtime: Option<Handle>,
}

impl<T: Send + 'static> PaginatorBuilder<T> {
    /// Set the first page key
    #[must_use]
    pub fn initial_key(mut self, key: PageKey) -> Self {
        self.config.initial_key = key;
        self
    }

    /// Set the key increment
    #[must_use]
    pub fn increment(mut self, increment: PageKey) -> Self {
        self.config.increment = increment;
        self
    }

    /// Set both cursor settings at once
    #[must_use]
    pub fn config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Callback receiving each non-empty page and the key that follows it
    #[must_use]
    pub fn on_success(mut self, f: impl Fn(Vec<T>, PageKey) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Runtime to spawn fetches on (defaults to the current one)
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the paginator
    pub fn build(self) -> Result<Paginator<T>> {
        self.config.validate()?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()
                .map_err(|e| Error::runtime(format!("paginator needs a tokio runtime: {e}")))?,
        };
        let on_success: SuccessCallback<T> = match self.on_success {
            Some(f) => f,
            None => Box::new(|_: Vec<T>, _: PageKey| {}),
        };
        let (state_tx, _) = watch::channel(PaginationState::Idle);

        Ok(Paginator {
            inner: Arc::new(Inner {
                config: self.config,
                source: self.source,
                on_success,
                runtime,
                core: Mutex::new(Core {
                    key: self.config.initial_key,
                    generation: 0,
                    task: None,
                    listeners: Vec::new(),
                    next_observer: 0,
                }),
                state_tx,
            }),
        })
    }
}
