//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, Set, Unchanged,
};
use uuid::Uuid;

use quill_core::domain::{
    Author, Comment, Follow, Group, NewComment, NewPost, Post, PostChanges, PostId,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    AuthorRepository, CommentRepository, FollowRepository, GroupRepository, PostRepository,
};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(author = %handle, "Finding author by handle");

        let result = AuthorEntity::find()
            .filter(author::Column::Handle.eq(handle))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Run `select` newest-first, joined with authors, then attach groups with
    /// one extra query.
    async fn load(&self, select: Select<PostEntity>) -> Result<Vec<Post>, RepoError> {
        let rows = select
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .find_also_related(AuthorEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let mut group_ids: Vec<Uuid> = rows.iter().filter_map(|(p, _)| p.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let groups: HashMap<Uuid, group::Model> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        Ok(rows
            .into_iter()
            .filter_map(|(row, author)| {
                let author = author?;
                let group = row.group_id.and_then(|id| groups.get(&id));
                Some(row.into_domain(&author, group))
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.load(PostEntity::find_by_id(id)).await?.into_iter().next())
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            text: Set(new_post.text),
            pub_date: Set(new_post.created.at().into()),
            author_id: Set(new_post.author_id),
            group_id: Set(new_post.group_id),
            image: Set(new_post.image),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        self.find_by_id(model.id).await?.ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post, RepoError> {
        post::ActiveModel {
            id: Unchanged(id),
            text: Set(changes.text),
            group_id: Set(changes.group_id),
            image: Set(changes.image),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(map_db_err)?;

        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        self.load(PostEntity::find()).await
    }

    async fn list_by_group(&self, group_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.load(PostEntity::find().filter(post::Column::GroupId.eq(group_id)))
            .await
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.load(PostEntity::find().filter(post::Column::AuthorId.eq(author_id)))
            .await
    }

    async fn list_followed_by(&self, follower_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let followed = Query::select()
            .column(follow::Column::FollowingId)
            .from(FollowEntity)
            .and_where(follow::Column::FollowerId.eq(follower_id))
            .to_owned();

        self.load(PostEntity::find().filter(post::Column::AuthorId.in_subquery(followed)))
            .await
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let post_id = new_comment.post_id;
        let model = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            author_id: Set(new_comment.author_id),
            text: Set(new_comment.text),
            created_at: Set(new_comment.created.at().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| match map_db_err(e) {
            // The post vanished between the existence check and the insert
            RepoError::Constraint(msg) => {
                tracing::debug!(post_id, error = %msg, "Comment insert hit a missing reference");
                RepoError::NotFound
            }
            other => other,
        })?;

        let author = AuthorEntity::find_by_id(model.author_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        Ok(model.into_domain(&author))
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<Comment>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .find_also_related(AuthorEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, author)| author.map(|a| row.into_domain(&a)))
            .collect())
    }
}

/// PostgreSQL follow repository.
pub struct PostgresFollowRepository {
    db: DbConn,
}

impl PostgresFollowRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert_if_absent(&self, follow: Follow) -> Result<bool, RepoError> {
        let row = follow::ActiveModel {
            follower_id: Set(follow.follower_id),
            following_id: Set(follow.following_id),
            created_at: Set(follow.created.at().into()),
        };

        // INSERT .. ON CONFLICT DO NOTHING: the existence check and the write
        // are one statement.
        let inserted = FollowEntity::insert(row)
            .on_conflict(
                OnConflict::columns([follow::Column::FollowerId, follow::Column::FollowingId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(inserted > 0)
    }

    async fn delete_if_present(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool, RepoError> {
        let count = FollowEntity::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }
}
