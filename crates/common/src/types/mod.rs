use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of `GET /ping`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pong {
    pub message: String,
}

impl Default for Pong {
    fn default() -> Self {
        Self { message: "pong".into() }
    }
}

/// Body of a successful `GET /lookup/{key}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub key: String,
    pub value: String,
}
