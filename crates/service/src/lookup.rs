use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::StoreError;
use crate::store::Store;

/// Owns one store for its whole lifetime and forwards lookups to it.
pub struct LookupService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> LookupService<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    /// Resolve `key` through the held store. Values and errors are returned
    /// exactly as the store produced them.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::{LookupService, store::mock::RecordingStore};
    /// let svc = LookupService::new(Arc::new(RecordingStore::returning("v")));
    /// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    /// assert_eq!(rt.block_on(svc.lookup("k")).unwrap(), "v");
    /// ```
    #[instrument(skip(self))]
    pub async fn lookup(&self, key: &str) -> Result<String, StoreError> {
        let res = self.store.get(key).await;
        if let Err(e) = &res {
            debug!(error = %e, code = e.code(), "store_get_failed");
        }
        res
    }

    pub fn store(&self) -> &Arc<S> { &self.store }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::RecordingStore;
    use crate::store::{Connection, MysqlStore};

    #[tokio::test]
    async fn lookup_passes_key_and_value_through() {
        let store = Arc::new(RecordingStore::returning("sentinel-42"));
        let svc = LookupService::new(Arc::clone(&store));

        assert_eq!(svc.lookup("alpha").await.unwrap(), "sentinel-42");
        assert_eq!(svc.lookup("beta").await.unwrap(), "sentinel-42");
        assert_eq!(store.seen(), vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn lookup_propagates_errors_unchanged() {
        for err in [
            StoreError::NotFound("gone".into()),
            StoreError::Unavailable("connection refused".into()),
            StoreError::Timeout,
        ] {
            let store = Arc::new(RecordingStore::failing(err.clone()));
            let svc = LookupService::new(Arc::clone(&store));
            assert_eq!(svc.lookup("k").await, Err(err));
            assert_eq!(store.seen(), vec!["k".to_string()]);
        }
    }

    #[tokio::test]
    async fn lookup_matches_store_for_mysql_backend() {
        let store = MysqlStore::connect(Connection::parse("mysql").unwrap()).await.unwrap();
        let svc = LookupService::new(Arc::new(store.clone()));
        for key in ["hello", "x", "42"] {
            assert_eq!(svc.lookup(key).await, store.get(key).await);
        }
        assert_eq!(svc.lookup("hello").await.unwrap(), "Mysql: hello");
    }

    #[tokio::test]
    async fn store_is_the_one_given_at_construction() {
        let store = Arc::new(RecordingStore::returning("v"));
        let svc = LookupService::new(Arc::clone(&store));
        assert!(Arc::ptr_eq(svc.store(), &store));
    }
}
