use async_trait::async_trait;
use tracing::info;

use super::{Connection, Store};
use crate::errors::StoreError;

/// Stand-in for a MySQL client: answers every key with a fixed prefix.
#[derive(Debug, Clone)]
pub struct MysqlStore {
    connection: Connection,
}

impl MysqlStore {
    pub const PREFIX: &'static str = "Mysql: ";

    /// Accepts any descriptor whose backend is `mysql`.
    pub async fn connect(connection: Connection) -> Result<Self, StoreError> {
        if !connection.backend().eq_ignore_ascii_case("mysql") {
            return Err(StoreError::UnsupportedBackend(connection.backend().to_string()));
        }
        info!(backend = %connection, event = "store_connected", "mysql store ready");
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection { &self.connection }
}

#[async_trait]
impl Store for MysqlStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        Ok(format!("{}{}", Self::PREFIX, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> MysqlStore {
        MysqlStore::connect(Connection::parse("mysql").unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn get_prefixes_key() {
        let s = store().await;
        for key in ["hello", "a", "with space", "ключ", "Mysql: nested"] {
            assert_eq!(s.get(key).await.unwrap(), format!("Mysql: {key}"));
        }
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        assert_eq!(store().await.get("").await, Err(StoreError::EmptyKey));
    }

    #[tokio::test]
    async fn url_descriptor_is_accepted() {
        let conn = Connection::parse("MySQL://root@localhost:3306/app").unwrap();
        let s = MysqlStore::connect(conn).await.unwrap();
        assert_eq!(s.connection().backend(), "MySQL");
    }

    #[tokio::test]
    async fn other_backends_are_rejected() {
        let conn = Connection::parse("postgres://localhost/app").unwrap();
        let err = MysqlStore::connect(conn).await.unwrap_err();
        assert_eq!(err, StoreError::UnsupportedBackend("postgres".into()));
    }
}
