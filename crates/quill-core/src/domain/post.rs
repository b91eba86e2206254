use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorRef, Created, GroupRef};

/// Post identifiers are assigned by the store in insertion order.
pub type PostId = i64;

/// Post entity - a text post owned by an author, optionally filed under a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub created: Created,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

/// A post about to be inserted. The author is fixed here so the insert is a
/// single write.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
    pub created: Created,
}

impl NewPost {
    pub fn new(author_id: Uuid, text: String) -> Self {
        Self {
            author_id,
            text,
            group_id: None,
            image: None,
            created: Created::now(),
        }
    }

    pub fn in_group(mut self, group_id: Option<Uuid>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// Editable fields of an existing post.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}
