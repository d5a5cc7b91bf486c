use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

use crate::auth::client::AuthorizedClient;

/// How a handle was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Cached,
    Acquired,
}

/// Impersonated user -> authorized handle.
///
/// Entries live as long as the owning manager and are never evicted.
/// Each user gets a cell that is initialised at most once, so concurrent
/// first calls share one authorization; a failed attempt leaves the cell
/// empty for the next caller.
#[derive(Debug, Default)]
pub struct DomainAuthorisations {
    inner: RwLock<HashMap<String, Arc<OnceCell<Arc<AuthorizedClient>>>>>,
}

impl DomainAuthorisations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorized handle for `user`, if one was already acquired
    pub async fn get(&self, user: &str) -> Option<Arc<AuthorizedClient>> {
        self.inner
            .read()
            .await
            .get(user)
            .and_then(|cell| cell.get().cloned())
    }

    /// Returns the cached handle or runs `authorize` to create it.
    /// `authorize` is not called at all on a cache hit.
    pub async fn get_or_try_authorize<F, Fut, E>(
        &self,
        user: &str,
        authorize: F,
    ) -> Result<(Arc<AuthorizedClient>, Lookup), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AuthorizedClient, E>>,
    {
        let cell = self.cell_for(user).await;
        if let Some(client) = cell.get() {
            debug!("domain authorisation cache hit for {}", user);
            return Ok((client.clone(), Lookup::Cached));
        }

        let mut acquired = false;
        let init = cell
            .get_or_try_init(|| {
                acquired = true;
                let pending = authorize();
                async move { pending.await.map(Arc::new) }
            })
            .await;

        match init {
            Ok(client) => {
                let lookup = if acquired { Lookup::Acquired } else { Lookup::Cached };
                Ok((client.clone(), lookup))
            }
            Err(err) => {
                self.discard_empty(user, &cell).await;
                Err(err)
            }
        }
    }

    /// Number of users holding an authorized handle
    pub async fn len(&self) -> usize {
        self.inner
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn cell_for(&self, user: &str) -> Arc<OnceCell<Arc<AuthorizedClient>>> {
        let existing = self.inner.read().await.get(user).cloned();
        match existing {
            Some(cell) => cell,
            None => self
                .inner
                .write()
                .await
                .entry(user.to_owned())
                .or_default()
                .clone(),
        }
    }

    /// Drops `user`'s cell after a failed attempt unless another caller
    /// still waits on it.
    async fn discard_empty(&self, user: &str, cell: &Arc<OnceCell<Arc<AuthorizedClient>>>) {
        let mut inner = self.inner.write().await;
        let unused = inner.get(user).is_some_and(|current| {
            Arc::ptr_eq(current, cell) && !current.initialized() && Arc::strong_count(cell) == 2
        });
        if unused {
            inner.remove(user);
        }
    }
}
