//! Feed and listing views.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::{Author, Comment, Group, Post, PostId, Viewer};
use crate::error::DomainError;
use crate::ports::{
    AuthorRepository, Cache, CacheError, CommentRepository, GroupRepository, PostRepository,
};

use super::pagination::{PAGE_SIZE, Page, paginate};
use super::social::FollowService;

const GLOBAL_FEED_KEY_PREFIX: &str = "feed:global:";

/// Feed tuning.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// How long a cached global feed page stays valid. There is no explicit
    /// invalidation, new posts appear once the entry expires.
    pub cache_ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

/// Profile view: an author's posts plus the follow affordance for the viewer.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorProfile {
    pub author: Author,
    pub post_count: u64,
    pub following: bool,
    pub page: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub author_post_count: u64,
}

/// Assembles the listing views. Every listing is newest-first.
#[derive(Clone)]
pub struct FeedService {
    authors: Arc<dyn AuthorRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    follows: FollowService,
    cache: Arc<dyn Cache>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(
        authors: Arc<dyn AuthorRepository>,
        groups: Arc<dyn GroupRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        follows: FollowService,
        cache: Arc<dyn Cache>,
        config: FeedConfig,
    ) -> Self {
        Self {
            authors,
            groups,
            posts,
            comments,
            follows,
            cache,
            config,
        }
    }

    pub async fn list_global(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_all().await?)
    }

    pub async fn list_by_group(&self, slug: &str) -> Result<(Group, Vec<Post>), DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let posts = self.posts.list_by_group(group.id).await?;
        Ok((group, posts))
    }

    pub async fn list_by_author(&self, handle: &str) -> Result<(Author, Vec<Post>), DomainError> {
        let author = self
            .authors
            .find_by_handle(handle)
            .await?
            .ok_or_else(|| DomainError::not_found("author", handle))?;
        let posts = self.posts.list_by_author(author.id).await?;
        Ok((author, posts))
    }

    pub async fn list_followed(&self, viewer: &Viewer) -> Result<Vec<Post>, DomainError> {
        let principal = viewer.require()?;
        Ok(self.posts.list_followed_by(principal.author_id).await?)
    }

    /// Global feed page, cached under the full query string.
    ///
    /// Cache failures are logged and the page is built from the store.
    pub async fn global_page(
        &self,
        query: &str,
        requested: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        let key = format!("{GLOBAL_FEED_KEY_PREFIX}{query}");

        if let Some(raw) = self.cache.get(&key).await {
            match serde_json::from_str::<Page<Post>>(&raw) {
                Ok(page) => {
                    tracing::debug!(key = %key, "Global feed served from cache");
                    return Ok(page);
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let page = paginate(self.list_global().await?, PAGE_SIZE, requested);

        if let Err(e) = self.store_page(&key, &page).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache global feed");
        }

        Ok(page)
    }

    async fn store_page(&self, key: &str, page: &Page<Post>) -> Result<(), CacheError> {
        let raw =
            serde_json::to_string(page).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.cache
            .set(key, &raw, Some(self.config.cache_ttl))
            .await
    }

    pub async fn group_page(
        &self,
        slug: &str,
        requested: Option<&str>,
    ) -> Result<GroupFeed, DomainError> {
        let (group, posts) = self.list_by_group(slug).await?;
        Ok(GroupFeed {
            group,
            page: paginate(posts, PAGE_SIZE, requested),
        })
    }

    pub async fn author_page(
        &self,
        viewer: &Viewer,
        handle: &str,
        requested: Option<&str>,
    ) -> Result<AuthorProfile, DomainError> {
        let (author, posts) = self.list_by_author(handle).await?;
        let following = self.follows.is_following(viewer, &author).await?;
        let post_count = posts.len() as u64;

        Ok(AuthorProfile {
            author,
            post_count,
            following,
            page: paginate(posts, PAGE_SIZE, requested),
        })
    }

    pub async fn followed_page(
        &self,
        viewer: &Viewer,
        requested: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        let posts = self.list_followed(viewer).await?;
        Ok(paginate(posts, PAGE_SIZE, requested))
    }

    pub async fn post_detail(&self, post_id: PostId) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let comments = self.comments.list_for_post(post_id).await?;
        let author_post_count = self.posts.count_by_author(post.author.id).await?;

        Ok(PostDetail {
            post,
            comments,
            author_post_count,
        })
    }
}
