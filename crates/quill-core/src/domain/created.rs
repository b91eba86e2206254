use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned creation timestamp shared by posts, comments and follows.
///
/// Only constructed through [`Created::now`] (or loaded back from storage), so
/// the value is fixed at creation time and never touched by updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Created(DateTime<Utc>);

impl Created {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Rehydrate a timestamp read back from storage.
    pub fn from_stored(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }
}
