//! In-memory test double for the store capability.

use std::sync::Mutex;

use async_trait::async_trait;

use super::Store;
use crate::errors::StoreError;

/// Records every key it is asked for and answers with a fixed reply.
pub struct RecordingStore {
    reply: Result<String, StoreError>,
    seen: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn returning(value: impl Into<String>) -> Self {
        Self { reply: Ok(value.into()), seen: Mutex::new(Vec::new()) }
    }

    pub fn failing(err: StoreError) -> Self {
        Self { reply: Err(err), seen: Mutex::new(Vec::new()) }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn get(&self, key: &str) -> Result<String, StoreError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(key.to_string());
        }
        self.reply.clone()
    }
}
