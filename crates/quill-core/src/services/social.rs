//! Post ownership checks and the follow graph.

use std::sync::Arc;

use crate::domain::{Author, Follow, Post, Viewer};
use crate::error::DomainError;
use crate::ports::{AuthorRepository, FollowRepository};

/// Whether `viewer` may edit `post`: only its author can.
pub fn can_edit(viewer: &Viewer, post: &Post) -> bool {
    viewer
        .principal()
        .is_some_and(|principal| principal.handle == post.author.handle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Removed,
    NotFollowing,
}

/// Follow / unfollow operations between authors.
#[derive(Clone)]
pub struct FollowService {
    authors: Arc<dyn AuthorRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(authors: Arc<dyn AuthorRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { authors, follows }
    }

    /// Make `viewer` follow the author with `handle`. Following twice is not an error.
    pub async fn follow(&self, viewer: &Viewer, handle: &str) -> Result<FollowOutcome, DomainError> {
        let principal = viewer.require()?;
        let target = self.author(handle).await?;

        if target.id == principal.author_id {
            return Err(DomainError::SelfFollow);
        }

        let created = self
            .follows
            .insert_if_absent(Follow::new(principal.author_id, target.id))
            .await?;

        if created {
            tracing::info!(follower = %principal.handle, following = %target.handle, "Author followed");
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Remove the follow pair if present. Removing a missing pair is a no-op.
    pub async fn unfollow(
        &self,
        viewer: &Viewer,
        handle: &str,
    ) -> Result<UnfollowOutcome, DomainError> {
        let principal = viewer.require()?;
        let target = self.author(handle).await?;

        let removed = self
            .follows
            .delete_if_present(principal.author_id, target.id)
            .await?;

        if removed {
            tracing::info!(follower = %principal.handle, following = %target.handle, "Author unfollowed");
            Ok(UnfollowOutcome::Removed)
        } else {
            Ok(UnfollowOutcome::NotFollowing)
        }
    }

    /// Whether the profile of `author` should offer "unfollow" to `viewer`.
    ///
    /// Always false for anonymous viewers and for an author's own profile,
    /// whatever the store holds.
    pub async fn is_following(&self, viewer: &Viewer, author: &Author) -> Result<bool, DomainError> {
        let Some(principal) = viewer.principal() else {
            return Ok(false);
        };
        if principal.handle == author.handle {
            return Ok(false);
        }
        Ok(self.follows.exists(principal.author_id, author.id).await?)
    }

    async fn author(&self, handle: &str) -> Result<Author, DomainError> {
        self.authors
            .find_by_handle(handle)
            .await?
            .ok_or_else(|| DomainError::not_found("author", handle))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::{AuthorRef, Created};

    fn post_by(handle: &str) -> Post {
        Post {
            id: 1,
            text: "hello".to_string(),
            created: Created::now(),
            author: AuthorRef {
                id: Uuid::new_v4(),
                handle: handle.to_string(),
            },
            group: None,
            image: None,
        }
    }

    #[test]
    fn test_author_can_edit_own_post() {
        let post = post_by("alice");
        let viewer = Viewer::authenticated(post.author.id, "alice");
        assert!(can_edit(&viewer, &post));
    }

    #[test]
    fn test_other_author_cannot_edit() {
        let post = post_by("alice");
        let viewer = Viewer::authenticated(Uuid::new_v4(), "bob");
        assert!(!can_edit(&viewer, &post));
    }

    #[test]
    fn test_anonymous_cannot_edit() {
        assert!(!can_edit(&Viewer::Anonymous, &post_by("alice")));
    }
}
