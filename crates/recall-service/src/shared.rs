//! Process-wide shared client handle.
//!
//! Instead of a bare global slot, the composition root creates one
//! [`SharedClient`] and clones it into every consumer (request handlers,
//! background workers). The inner value is created lazily, at most once, and
//! never torn down while the process runs, so background work can never
//! observe a closed connection.

use std::sync::Arc;

use tokio::sync::OnceCell;

use recall_core::Settings;

use crate::client::RecallClient;
use crate::error::ServiceError;

/// A once-initialized, clone-to-share slot for a lazily created value.
///
/// Concurrent initializers race safely: exactly one init future runs to
/// completion and every caller sees its result. A failed init leaves the
/// slot empty, so the next caller retries.
pub struct Shared<T> {
    cell: Arc<OnceCell<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Shared<T> {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Whether the slot has been initialized.
    pub fn initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T: Clone> Shared<T> {
    /// Return the shared value, running `init` first if the slot is empty.
    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let value = self.cell.get_or_try_init(init).await?;
        Ok(value.clone())
    }
}

/// The shared singleton graph client.
///
/// Held by the composition root and cloned into every consumer. The first
/// `get()` reads settings from the environment (exactly once) and connects;
/// every later `get()` returns a handle to the same instance.
#[derive(Clone, Default)]
pub struct SharedClient {
    slot: Shared<RecallClient>,
}

impl SharedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the long-lived client, creating it on first demand.
    pub async fn get(&self) -> Result<RecallClient, ServiceError> {
        self.slot
            .get_or_try_init(|| async {
                let settings =
                    Settings::load().map_err(|e| ServiceError::Config(e.to_string()))?;
                let client = RecallClient::connect(&settings).await?;
                tracing::info!(
                    model = settings.model_name.as_deref().unwrap_or("default"),
                    embedding = settings.embedding_model_name.as_deref().unwrap_or("default"),
                    "Created shared graph client"
                );
                Ok(client)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_init_runs_exactly_once() {
        let shared: Shared<u64> = Shared::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let value: Result<u64, Infallible> = shared
                .get_or_try_init(|| async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(value.unwrap(), 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(shared.initialized());
    }

    #[tokio::test]
    async fn test_clones_share_one_slot() {
        let shared: Shared<String> = Shared::new();
        let other = shared.clone();

        let first: Result<String, Infallible> = shared
            .get_or_try_init(|| async { Ok("first".to_string()) })
            .await;
        let second: Result<String, Infallible> = other
            .get_or_try_init(|| async { Ok("second".to_string()) })
            .await;

        assert_eq!(first.unwrap(), "first");
        // The second initializer never runs; the clone sees the first value.
        assert_eq!(second.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_concurrent_callers_initialize_once() {
        let shared: Shared<u64> = Shared::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let shared = shared.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                let value: Result<u64, Infallible> = shared
                    .get_or_try_init(|| async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(7)
                    })
                    .await;
                value.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_init_leaves_slot_empty() {
        let shared: Shared<u64> = Shared::new();

        let failed: Result<u64, &str> = shared
            .get_or_try_init(|| async { Err("connection refused") })
            .await;
        assert!(failed.is_err());
        assert!(!shared.initialized());

        let ok: Result<u64, &str> = shared.get_or_try_init(|| async { Ok(9) }).await;
        assert_eq!(ok.unwrap(), 9);
    }
}
