//! Process-wide retrieval client, created on first use

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{Document, DomainError, PassageRetriever};

type RetrieverFactory =
    Box<dyn Fn() -> Result<Arc<dyn PassageRetriever>, DomainError> + Send + Sync>;

enum Slot {
    Empty,
    Ready(Arc<dyn PassageRetriever>),
    Closed,
}

/// Retriever that builds its inner client lazily and exactly once.
///
/// Concurrent first calls wait on the same lock, so the factory runs once even under
/// contention. After [`shutdown`](Self::shutdown) every call fails.
pub struct LazyPassageRetriever {
    factory: RetrieverFactory,
    slot: Mutex<Slot>,
}

impl std::fmt::Debug for LazyPassageRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyPassageRetriever").finish_non_exhaustive()
    }
}

impl LazyPassageRetriever {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PassageRetriever>, DomainError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(Slot::Empty),
        }
    }

    async fn get(&self) -> Result<Arc<dyn PassageRetriever>, DomainError> {
        let mut slot = self.slot.lock().await;

        match &*slot {
            Slot::Ready(retriever) => Ok(retriever.clone()),
            Slot::Closed => Err(DomainError::dependency(
                "retrieval",
                "Retrieval client has been shut down",
            )),
            Slot::Empty => {
                let retriever = (self.factory)()?;
                info!("Initialized retrieval client");
                *slot = Slot::Ready(retriever.clone());
                Ok(retriever)
            }
        }
    }

    pub async fn is_initialized(&self) -> bool {
        matches!(*self.slot.lock().await, Slot::Ready(_))
    }

    pub async fn is_closed(&self) -> bool {
        matches!(*self.slot.lock().await, Slot::Closed)
    }

    /// Drop the inner client and refuse further calls
    pub async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        if matches!(*slot, Slot::Ready(_)) {
            info!("Retrieval client shut down");
        }
        *slot = Slot::Closed;
    }
}

#[async_trait]
impl PassageRetriever for LazyPassageRetriever {
    async fn retrieve(&self, question: &str) -> Result<Vec<Document>, DomainError> {
        // The lock is released before the call so retrievals run concurrently.
        let retriever = self.get().await?;
        retriever.retrieve(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::mock::MockPassageRetriever;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(
        builds: Arc<AtomicUsize>,
    ) -> impl Fn() -> Result<Arc<dyn PassageRetriever>, DomainError> + Send + Sync + 'static {
        move || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockPassageRetriever::new(vec![Document::new("passage")]))
                as Arc<dyn PassageRetriever>)
        }
    }

    #[tokio::test]
    async fn test_initializes_once_under_concurrent_first_use() {
        let builds = Arc::new(AtomicUsize::new(0));
        let lazy = Arc::new(LazyPassageRetriever::new(counting_factory(builds.clone())));
        assert!(!lazy.is_initialized().await);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                tokio::spawn(async move { lazy.retrieve("q").await })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 1);
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(lazy.is_initialized().await);
    }

    #[tokio::test]
    async fn test_failed_init_is_retried_on_next_call() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let lazy = LazyPassageRetriever::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DomainError::configuration("bad url"))
            } else {
                Ok(Arc::new(MockPassageRetriever::new(vec![])) as Arc<dyn PassageRetriever>)
            }
        });

        assert!(lazy.retrieve("q").await.is_err());
        assert!(lazy.retrieve("q").await.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_refuses_further_calls() {
        let builds = Arc::new(AtomicUsize::new(0));
        let lazy = LazyPassageRetriever::new(counting_factory(builds.clone()));

        lazy.retrieve("q").await.unwrap();
        lazy.shutdown().await;

        let err = lazy.retrieve("q").await.unwrap_err();
        assert!(err.is_dependency_failure());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
