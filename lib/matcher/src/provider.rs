//! Embedding provider lifecycle
//!
//! The provider is loaded lazily, at most once. [`ProviderHandle`] is a small
//! state machine:
//!
//! ```text
//! Unloaded ──load()──> Loading ──ok──> Loaded
//!                         │
//!                         └──err──> Failed   (permanent, never retried)
//! ```
//!
//! Calls to [`ProviderHandle::load`] made while a load is in flight await the
//! same shared future instead of starting a second one.

use crate::embedder::HashEmbedderLoader;
use async_trait::async_trait;
use formfill_core::{Result, Vector};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Turns text into embedding vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Each call may fail independently.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Dimensionality of produced vectors
    fn dimension(&self) -> usize;
}

/// Produces a provider instance; invoked at most once per handle
#[async_trait]
pub trait ProviderLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>>;
}

type LoadOutcome = std::result::Result<Arc<dyn EmbeddingProvider>, Arc<str>>;
type PendingLoad = Shared<BoxFuture<'static, LoadOutcome>>;

enum ProviderState {
    Unloaded,
    Loading(PendingLoad),
    Loaded(Arc<dyn EmbeddingProvider>),
    Failed(Arc<str>),
}

/// Observable lifecycle stage of a [`ProviderHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// Shared, lazily loaded embedding provider
pub struct ProviderHandle {
    loader: Arc<dyn ProviderLoader>,
    state: Mutex<ProviderState>,
    enabled: AtomicBool,
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("status", &self.status())
            .field("enabled", &self.enabled.load(Ordering::Relaxed))
            .finish()
    }
}

static GLOBAL_PROVIDER: OnceLock<Arc<ProviderHandle>> = OnceLock::new();

impl ProviderHandle {
    pub fn new(loader: Arc<dyn ProviderLoader>) -> Self {
        Self {
            loader,
            state: Mutex::new(ProviderState::Unloaded),
            enabled: AtomicBool::new(true),
        }
    }

    /// Process-wide handle backed by the bundled local hash embedder
    pub fn global() -> Arc<ProviderHandle> {
        GLOBAL_PROVIDER
            .get_or_init(|| Arc::new(ProviderHandle::new(Arc::new(HashEmbedderLoader::default()))))
            .clone()
    }

    pub fn status(&self) -> ProviderStatus {
        match &*self.state.lock() {
            ProviderState::Unloaded => ProviderStatus::Unloaded,
            ProviderState::Loading(_) => ProviderStatus::Loading,
            ProviderState::Loaded(_) => ProviderStatus::Loaded,
            ProviderState::Failed(_) => ProviderStatus::Failed,
        }
    }

    /// Load the provider if needed. Returns whether it is loaded.
    pub async fn load(&self) -> bool {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                ProviderState::Loaded(_) => return true,
                ProviderState::Failed(_) => return false,
                ProviderState::Loading(pending) => pending.clone(),
                ProviderState::Unloaded => {
                    let loader = self.loader.clone();
                    let pending = async move {
                        loader
                            .load()
                            .await
                            .map_err(|e| Arc::<str>::from(e.to_string()))
                    }
                    .boxed()
                    .shared();
                    *state = ProviderState::Loading(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.await;

        let mut state = self.state.lock();
        if matches!(*state, ProviderState::Loading(_)) {
            *state = match &outcome {
                Ok(provider) => {
                    tracing::info!(dimension = provider.dimension(), "embedding provider loaded");
                    ProviderState::Loaded(provider.clone())
                }
                Err(reason) => {
                    tracing::warn!(%reason, "embedding provider failed to load, using rules only");
                    ProviderState::Failed(reason.clone())
                }
            };
        }
        outcome.is_ok()
    }

    /// The failure reason, once the handle has failed
    pub fn failure(&self) -> Option<String> {
        match &*self.state.lock() {
            ProviderState::Failed(reason) => Some(reason.to_string()),
            _ => None,
        }
    }

    /// Enable or disable semantic matching without touching the load state
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The loaded provider, when loaded and enabled
    pub fn provider(&self) -> Option<Arc<dyn EmbeddingProvider>> {
        if !self.is_enabled() {
            return None;
        }
        match &*self.state.lock() {
            ProviderState::Loaded(provider) => Some(provider.clone()),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;
    use formfill_core::Error;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingLoader {
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingLoader {
        fn new(fail: bool, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
                delay,
            })
        }
    }

    #[async_trait]
    impl ProviderLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn EmbeddingProvider>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                Err(Error::ProviderLoad("model bundle missing".to_string()))
            } else {
                Ok(Arc::new(HashEmbedder::new(16)))
            }
        }
    }

    #[tokio::test]
    async fn test_load_succeeds_once() {
        let loader = CountingLoader::new(false, Duration::ZERO);
        let handle = ProviderHandle::new(loader.clone());
        assert_eq!(handle.status(), ProviderStatus::Unloaded);
        assert!(!handle.is_available());

        assert!(handle.load().await);
        assert!(handle.load().await);
        assert_eq!(handle.status(), ProviderStatus::Loaded);
        assert!(handle.is_available());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_permanent() {
        let loader = CountingLoader::new(true, Duration::ZERO);
        let handle = ProviderHandle::new(loader.clone());

        assert!(!handle.load().await);
        assert!(!handle.load().await);
        assert!(!handle.is_available());
        assert_eq!(handle.status(), ProviderStatus::Failed);
        assert!(handle.failure().unwrap().contains("model bundle missing"));
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce() {
        let loader = CountingLoader::new(false, Duration::from_millis(20));
        let handle = ProviderHandle::new(loader.clone());

        let (a, b, c) = tokio::join!(handle.load(), handle.load(), handle.load());
        assert!(a && b && c);
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disable_hides_provider() {
        let handle = ProviderHandle::new(CountingLoader::new(false, Duration::ZERO));
        handle.load().await;

        handle.set_enabled(false);
        assert!(!handle.is_available());
        assert_eq!(handle.status(), ProviderStatus::Loaded);

        handle.set_enabled(true);
        assert!(handle.is_available());
    }
}
