use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Author, Comment, Created, Follow, Group, NewComment, NewPost, Post, PostChanges, PostId,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, FollowRepository, GroupRepository,
    PostRepository,
};

struct PostRow {
    author_id: Uuid,
    group_id: Option<Uuid>,
    text: String,
    image: Option<String>,
    created: Created,
}

struct CommentRow {
    post_id: PostId,
    author_id: Uuid,
    text: String,
    created: Created,
}

#[derive(Default)]
struct Tables {
    authors: HashMap<Uuid, Author>,
    groups: HashMap<Uuid, Group>,
    posts: BTreeMap<PostId, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
    follows: BTreeMap<(Uuid, Uuid), Created>,
    last_post_id: PostId,
    last_comment_id: i64,
}

impl Tables {
    fn post(&self, id: PostId, row: &PostRow) -> Option<Post> {
        let author = self.authors.get(&row.author_id)?;
        Some(Post {
            id,
            text: row.text.clone(),
            created: row.created,
            author: author.to_ref(),
            group: row
                .group_id
                .and_then(|gid| self.groups.get(&gid))
                .map(Group::to_ref),
            image: row.image.clone(),
        })
    }

    /// Posts matching `filter`, newest first with ties broken by id.
    fn posts_where(&self, filter: impl Fn(&PostRow) -> bool) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|(_, row)| filter(row))
            .filter_map(|(&id, row)| self.post(id, row))
            .collect();
        posts.sort_by_key(|p| (Reverse(p.created), Reverse(p.id)));
        posts
    }

    fn comment(&self, id: i64, row: &CommentRow) -> Option<Comment> {
        let author = self.authors.get(&row.author_id)?;
        Some(Comment {
            id,
            post_id: row.post_id,
            author: author.to_ref(),
            text: row.text.clone(),
            created: row.created,
        })
    }

    fn delete_post_cascade(&mut self, id: PostId) -> bool {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != id);
        }
        removed
    }
}

/// A single-process store holding every table behind one async RwLock.
///
/// Each write runs under one write guard, so check-then-write sequences are
/// atomic and cascades never leave a half-deleted graph behind.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn create(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.authors.values().any(|a| a.handle == author.handle) {
            return Err(RepoError::Constraint(format!(
                "handle '{}' already exists",
                author.handle
            )));
        }
        if tables.authors.contains_key(&author.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    /// Removes the author with their posts, their comments, comments on their
    /// posts and every follow pair they take part in.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.authors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let owned: Vec<PostId> = tables
            .posts
            .iter()
            .filter(|(_, p)| p.author_id == id)
            .map(|(&pid, _)| pid)
            .collect();
        for pid in owned {
            tables.delete_post_cascade(pid);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        tables
            .follows
            .retain(|&(follower, following), _| follower != id && following != id);

        tracing::debug!(author_id = %id, "Author deleted with cascade");
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().find(|a| a.handle == handle).cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn create(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already exists",
                group.slug
            )));
        }
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    /// Removes the group; its posts stay, ungrouped.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|row| tables.post(id, row)))
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".to_string()));
        }
        if let Some(gid) = post.group_id {
            if !tables.groups.contains_key(&gid) {
                return Err(RepoError::Constraint("post group does not exist".to_string()));
            }
        }

        tables.last_post_id += 1;
        let id = tables.last_post_id;
        let row = PostRow {
            author_id: post.author_id,
            group_id: post.group_id,
            text: post.text,
            image: post.image,
            created: post.created,
        };
        let created = tables.post(id, &row);
        tables.posts.insert(id, row);
        created.ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(gid) = changes.group_id {
            if !tables.groups.contains_key(&gid) {
                return Err(RepoError::Constraint("post group does not exist".to_string()));
            }
        }

        let row = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.text = changes.text;
        row.group_id = changes.group_id;
        row.image = changes.image;

        let tables = &*tables;
        tables
            .posts
            .get(&id)
            .and_then(|row| tables.post(id, row))
            .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.delete_post_cascade(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.tables.read().await.posts_where(|_| true))
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .posts_where(|p| p.group_id == Some(group_id)))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .posts_where(|p| p.author_id == author_id))
    }

    async fn list_followed_by(&self, follower_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts_where(|p| tables.follows.contains_key(&(follower_id, p.author_id))))
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::NotFound);
        }
        if !tables.authors.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".to_string()));
        }

        tables.last_comment_id += 1;
        let id = tables.last_comment_id;
        let row = CommentRow {
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: comment.created,
        };
        let created = tables.comment(id, &row);
        tables.comments.insert(id, row);
        created.ok_or(RepoError::NotFound)
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|(_, c)| c.post_id == post_id)
            .filter_map(|(&id, row)| tables.comment(id, row))
            .collect();
        comments.sort_by_key(|c| (Reverse(c.created), Reverse(c.id)));
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert_if_absent(&self, follow: Follow) -> Result<bool, RepoError> {
        if follow.follower_id == follow.following_id {
            return Err(RepoError::Constraint("follower equals following".to_string()));
        }

        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&follow.follower_id)
            || !tables.authors.contains_key(&follow.following_id)
        {
            return Err(RepoError::Constraint("follow author does not exist".to_string()));
        }

        let key = (follow.follower_id, follow.following_id);
        if tables.follows.contains_key(&key) {
            return Ok(false);
        }
        tables.follows.insert(key, follow.created);
        Ok(true)
    }

    async fn delete_if_present(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        Ok(tables.follows.remove(&(follower_id, following_id)).is_some())
    }

    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains_key(&(follower_id, following_id)))
    }
}
