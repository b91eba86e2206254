use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Created;

/// Directed follower -> following relation between two authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created: Created,
}

impl Follow {
    pub fn new(follower_id: Uuid, following_id: Uuid) -> Self {
        Self {
            follower_id,
            following_id,
            created: Created::now(),
        }
    }
}
