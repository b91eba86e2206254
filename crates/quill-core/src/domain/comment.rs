use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorRef, Created, PostId};

/// Comment entity - attached to a post, owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: PostId,
    pub author: AuthorRef,
    pub text: String,
    pub created: Created,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: Uuid,
    pub text: String,
    pub created: Created,
}

impl NewComment {
    pub fn new(post_id: PostId, author_id: Uuid, text: String) -> Self {
        Self {
            post_id,
            author_id,
            text,
            created: Created::now(),
        }
    }
}
