use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Author, Comment, Follow, Group, NewComment, NewPost, Post, PostChanges, PostId,
};
use crate::error::RepoError;

/// Generic repository trait for entities with caller-assigned IDs.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-key clashes surface as `RepoError::Constraint`.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, applying the entity's cascade rules.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Author repository with domain-specific methods.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
///
/// Every `list_*` method returns posts newest-first: by creation time
/// descending, ties broken by descending id.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// Insert a post; the store assigns the id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite the editable fields. Never touches `created` or the author.
    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post, RepoError>;

    async fn delete(&self, id: PostId) -> Result<(), RepoError>;

    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Posts written by any author that `follower_id` follows.
    async fn list_followed_by(&self, follower_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment. Fails with `RepoError::NotFound` if the post is gone.
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError>;
}

/// Follow relation repository.
///
/// Both write operations are single conditional statements, so concurrent
/// requests from the same follower can neither duplicate nor double-remove a pair.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the pair unless it already exists. Returns `true` if a row was created.
    async fn insert_if_absent(&self, follow: Follow) -> Result<bool, RepoError>;

    /// Remove the pair if present. Returns `true` if a row was removed.
    async fn delete_if_present(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<bool, RepoError>;

    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool, RepoError>;
}
