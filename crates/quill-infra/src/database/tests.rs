use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use quill_core::domain::{Created, Follow};
use quill_core::error::RepoError;
use quill_core::ports::{AuthorRepository, FollowRepository, PostRepository};

use super::entity::{author, group, post};
use super::postgres_base::map_db_err;
use super::postgres_repo::{
    PostgresAuthorRepository, PostgresFollowRepository, PostgresPostRepository,
};

fn author_row(handle: &str) -> author::Model {
    author::Model {
        id: Uuid::new_v4(),
        handle: handle.to_owned(),
        email: format!("{handle}@example.com"),
        password_hash: "hash".to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        joined_at: Utc::now().into(),
    }
}

fn post_row(id: i64, author_id: Uuid, minute: u32) -> post::Model {
    post::Model {
        id,
        text: format!("post {id}"),
        pub_date: Utc
            .with_ymd_and_hms(2024, 5, 1, 12, minute, 0)
            .unwrap()
            .into(),
        author_id,
        group_id: None,
        image: None,
    }
}

#[tokio::test]
async fn test_find_author_by_handle() {
    let row = author_row("leo");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row.clone()]])
        .into_connection();

    let repo = PostgresAuthorRepository::new(db);
    let found = repo.find_by_handle("leo").await.unwrap().unwrap();

    assert_eq!(found.id, row.id);
    assert_eq!(found.handle, "leo");
    assert_eq!(found.password_hash, "hash");
}

#[tokio::test]
async fn test_find_author_by_handle_missing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<author::Model>::new()])
        .into_connection();

    let repo = PostgresAuthorRepository::new(db);

    assert!(repo.find_by_handle("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_follow_insert_reports_whether_row_was_added() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresFollowRepository::new(db.clone());
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(repo.insert_if_absent(Follow::new(a, b)).await.unwrap());
    assert!(!repo.insert_if_absent(Follow::new(a, b)).await.unwrap());

    let log = format!("{:?}", db.into_transaction_log());
    assert!(log.contains("ON CONFLICT"));
}

#[tokio::test]
async fn test_follow_delete_reports_whether_row_was_removed() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresFollowRepository::new(db);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    assert!(repo.delete_if_present(a, b).await.unwrap());
    assert!(!repo.delete_if_present(a, b).await.unwrap());
}

#[tokio::test]
async fn test_list_posts_joins_author() {
    let leo = author_row("leo");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            (post_row(2, leo.id, 30), leo.clone()),
            (post_row(1, leo.id, 10), leo.clone()),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo.list_all().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 2);
    assert_eq!(posts[0].author.handle, "leo");
    assert!(posts[0].group.is_none());
}

#[tokio::test]
async fn test_list_posts_attaches_groups() {
    let leo = author_row("leo");
    let cats = group::Model {
        id: Uuid::new_v4(),
        title: "Cats".to_owned(),
        slug: "cats".to_owned(),
        description: String::new(),
    };
    let mut grouped = post_row(1, leo.id, 0);
    grouped.group_id = Some(cats.id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![(grouped, leo)]])
        .append_query_results([vec![cats.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.find_by_id(1).await.unwrap().unwrap();

    let group = post.group.unwrap();
    assert_eq!(group.slug, "cats");
    assert_eq!(group.id, cats.id);
    assert_eq!(
        post.created,
        Created::from_stored(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn test_count_posts_by_author() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(3)),
        )])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert_eq!(repo.count_by_author(Uuid::new_v4()).await.unwrap(), 3);
}

#[test]
fn test_map_db_err() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotUpdated),
        RepoError::NotFound
    ));
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".to_owned())),
        RepoError::Query(_)
    ));
}
