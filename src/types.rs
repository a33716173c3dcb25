use serde::{Deserialize, Serialize};

/// A USD-BRL quote as exchanged between service and client.
/// `bid` is required on decode; a body without it is not a rate.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Rate {
    pub bid: String,
}

impl Rate {
    pub fn new(bid: impl Into<String>) -> Self {
        Self { bid: bid.into() }
    }
}

// A persisted row; id and timestamp are assigned by SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRate {
    pub id: i64,
    pub bid: String,
    pub timestamp: chrono::NaiveDateTime,
}

impl StoredRate {
    pub fn rate(&self) -> Rate {
        Rate::new(self.bid.clone())
    }
}
