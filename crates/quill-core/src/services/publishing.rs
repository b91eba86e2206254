//! Post authoring and comment submission.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, NewComment, NewPost, Post, PostChanges, PostId, Viewer};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, GroupRepository, PostRepository};

use super::social::can_edit;
use super::validation::validate_content;

/// Submitted post form.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    /// Slug of the group to file the post under. Empty means no group.
    pub group: Option<String>,
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct PublishingService {
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PublishingService {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            groups,
            posts,
            comments,
        }
    }

    pub async fn create_post(&self, viewer: &Viewer, draft: PostDraft) -> Result<Post, DomainError> {
        let principal = viewer.require()?;
        check_text(&draft.text)?;
        let group_id = self.resolve_group(draft.group.as_deref()).await?;

        let post = self
            .posts
            .create(
                NewPost::new(principal.author_id, draft.text)
                    .in_group(group_id)
                    .with_image(non_blank(draft.image)),
            )
            .await?;

        tracing::info!(post_id = post.id, author = %principal.handle, "Post created");
        Ok(post)
    }

    /// Load a post for editing. `Forbidden` unless the viewer wrote it.
    pub async fn editable_post(&self, viewer: &Viewer, post_id: PostId) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !can_edit(viewer, &post) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    /// Replace text, group and image of a post. The creation time and author
    /// are never changed.
    pub async fn edit_post(
        &self,
        viewer: &Viewer,
        post_id: PostId,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        viewer.require()?;
        self.editable_post(viewer, post_id).await?;
        check_text(&draft.text)?;
        let group_id = self.resolve_group(draft.group.as_deref()).await?;

        let post = self
            .posts
            .update(
                post_id,
                PostChanges {
                    text: draft.text,
                    group_id,
                    image: non_blank(draft.image),
                },
            )
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("post", post_id),
                other => other.into(),
            })?;

        tracing::info!(post_id, "Post edited");
        Ok(post)
    }

    pub async fn add_comment(
        &self,
        viewer: &Viewer,
        post_id: PostId,
        text: String,
    ) -> Result<Comment, DomainError> {
        let principal = viewer.require()?;
        check_text(&text)?;

        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        let comment = self
            .comments
            .create(NewComment::new(post_id, principal.author_id, text))
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("post", post_id),
                other => other.into(),
            })?;

        tracing::info!(post_id, comment_id = comment.id, author = %principal.handle, "Comment added");
        Ok(comment)
    }

    async fn resolve_group(&self, slug: Option<&str>) -> Result<Option<Uuid>, DomainError> {
        let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        match self.groups.find_by_slug(slug).await? {
            Some(group) => Ok(Some(group.id)),
            None => Err(DomainError::InvalidField {
                field: "group",
                message: format!("unknown group '{slug}'"),
            }),
        }
    }
}

fn check_text(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "text",
            message: "this field is required".to_string(),
        });
    }
    Ok(validate_content(text)?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
