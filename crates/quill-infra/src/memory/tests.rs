use std::sync::Arc;
use std::time::Duration;

use quill_core::{ContentError, DomainError};
use quill_core::domain::{Author, Group, Post, Viewer};
use quill_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, FollowRepository, GroupRepository,
    PostRepository,
};
use quill_core::services::{
    FeedConfig, FeedService, FollowOutcome, FollowService, PostDraft, PublishingService,
    UnfollowOutcome,
};

use super::InMemoryStore;
use crate::cache::InMemoryCache;

struct Fixture {
    store: Arc<InMemoryStore>,
    feed: FeedService,
    follows: FollowService,
    publishing: PublishingService,
}

fn fixture() -> Fixture {
    fixture_with_ttl(Duration::from_secs(20))
}

fn fixture_with_ttl(cache_ttl: Duration) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let follows = FollowService::new(store.clone(), store.clone());
    let feed = FeedService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        follows.clone(),
        Arc::new(InMemoryCache::new()),
        FeedConfig { cache_ttl },
    );
    let publishing = PublishingService::new(store.clone(), store.clone(), store.clone());

    Fixture {
        store,
        feed,
        follows,
        publishing,
    }
}

impl Fixture {
    fn authors(&self) -> &dyn AuthorRepository {
        self.store.as_ref()
    }

    fn groups(&self) -> &dyn GroupRepository {
        self.store.as_ref()
    }

    fn posts(&self) -> &dyn PostRepository {
        self.store.as_ref()
    }

    async fn author(&self, handle: &str) -> Viewer {
        let author = Author::new(
            handle.to_string(),
            format!("{handle}@example.com"),
            "hash".to_string(),
        );
        let author = self.authors().create(author).await.unwrap();
        Viewer::authenticated(author.id, author.handle)
    }

    async fn group(&self, slug: &str) -> Group {
        self.groups()
            .create(Group::new(slug.to_uppercase(), slug, "description"))
            .await
            .unwrap()
    }

    async fn post(&self, viewer: &Viewer, text: &str, group: Option<&str>) -> Post {
        self.publishing
            .create_post(
                viewer,
                PostDraft {
                    text: text.to_string(),
                    group: group.map(String::from),
                    image: None,
                },
            )
            .await
            .unwrap()
    }
}

fn texts(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.text.as_str()).collect()
}

fn draft(text: impl Into<String>) -> PostDraft {
    PostDraft {
        text: text.into(),
        ..Default::default()
    }
}

// Follow graph

#[tokio::test]
async fn test_follow_twice_keeps_one_record() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;

    assert_eq!(fx.follows.follow(&alice, "bob").await.unwrap(), FollowOutcome::Created);
    assert_eq!(
        fx.follows.follow(&alice, "bob").await.unwrap(),
        FollowOutcome::AlreadyFollowing
    );

    let alice_id = alice.principal().unwrap().author_id;
    let bob_id = bob.principal().unwrap().author_id;
    let follows: &dyn FollowRepository = fx.store.as_ref();
    assert!(follows.exists(alice_id, bob_id).await.unwrap());
    // Removing once clears it, so there was exactly one row.
    assert!(follows.delete_if_present(alice_id, bob_id).await.unwrap());
    assert!(!follows.exists(alice_id, bob_id).await.unwrap());
}

#[tokio::test]
async fn test_unfollow_is_idempotent() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.author("bob").await;

    fx.follows.follow(&alice, "bob").await.unwrap();
    assert_eq!(
        fx.follows.unfollow(&alice, "bob").await.unwrap(),
        UnfollowOutcome::Removed
    );
    assert_eq!(
        fx.follows.unfollow(&alice, "bob").await.unwrap(),
        UnfollowOutcome::NotFollowing
    );

    let bob_author = fx.authors().find_by_handle("bob").await.unwrap().unwrap();
    assert!(!fx.follows.is_following(&alice, &bob_author).await.unwrap());
}

#[tokio::test]
async fn test_self_follow_never_creates_record() {
    let fx = fixture();
    let alice = fx.author("alice").await;

    let result = fx.follows.follow(&alice, "alice").await;
    assert!(matches!(result, Err(DomainError::SelfFollow)));

    let id = alice.principal().unwrap().author_id;
    let follows: &dyn FollowRepository = fx.store.as_ref();
    assert!(!follows.exists(id, id).await.unwrap());
}

#[tokio::test]
async fn test_follow_requires_viewer_and_known_target() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.author("bob").await;

    assert!(matches!(
        fx.follows.follow(&Viewer::Anonymous, "bob").await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        fx.follows.follow(&alice, "nobody").await,
        Err(DomainError::NotFound { entity_type: "author", .. })
    ));
    assert!(matches!(
        fx.follows.unfollow(&alice, "nobody").await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_follows_create_single_pair() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.author("bob").await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let follows = fx.follows.clone();
            let alice = alice.clone();
            tokio::spawn(async move { follows.follow(&alice, "bob").await })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        if let FollowOutcome::Created = task.await.unwrap().unwrap() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_is_following_false_on_own_profile() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.author("bob").await;
    fx.follows.follow(&alice, "bob").await.unwrap();

    let own = fx.feed.author_page(&alice, "alice", None).await.unwrap();
    assert!(!own.following);

    let other = fx.feed.author_page(&alice, "bob", None).await.unwrap();
    assert!(other.following);

    let anonymous = fx.feed.author_page(&Viewer::Anonymous, "bob", None).await.unwrap();
    assert!(!anonymous.following);
}

// Listings

#[tokio::test]
async fn test_followed_feed_only_has_followed_authors() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;
    let carol = fx.author("carol").await;

    fx.post(&bob, "bob first", None).await;
    fx.post(&carol, "carol post", None).await;
    fx.post(&bob, "bob second", None).await;

    assert!(fx.feed.list_followed(&alice).await.unwrap().is_empty());

    fx.follows.follow(&alice, "bob").await.unwrap();
    let feed = fx.feed.list_followed(&alice).await.unwrap();
    assert_eq!(texts(&feed), vec!["bob second", "bob first"]);

    // Carol follows nobody, so her own posts do not show up for her.
    assert!(fx.feed.list_followed(&carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_followed_feed_requires_viewer() {
    let fx = fixture();
    assert!(matches!(
        fx.feed.list_followed(&Viewer::Anonymous).await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_group_page_two_of_fifteen() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.group("tech").await;
    fx.group("cooking").await;

    for i in 1..=15 {
        fx.post(&alice, &format!("tech {i}"), Some("tech")).await;
    }
    fx.post(&alice, "soup", Some("cooking")).await;

    let feed = fx.feed.group_page("tech", Some("2")).await.unwrap();
    assert_eq!(feed.group.slug, "tech");
    assert_eq!(feed.page.total, 15);
    assert_eq!(
        texts(&feed.page.items),
        vec!["tech 5", "tech 4", "tech 3", "tech 2", "tech 1"]
    );
    assert!(feed.page.has_previous());
    assert!(!feed.page.has_next());
}

#[tokio::test]
async fn test_unknown_group_and_author_are_not_found() {
    let fx = fixture();
    assert!(matches!(
        fx.feed.list_by_group("missing").await,
        Err(DomainError::NotFound { entity_type: "group", .. })
    ));
    assert!(matches!(
        fx.feed.list_by_author("missing").await,
        Err(DomainError::NotFound { entity_type: "author", .. })
    ));
    assert!(matches!(
        fx.feed.post_detail(42).await,
        Err(DomainError::NotFound { entity_type: "post", .. })
    ));
}

#[tokio::test]
async fn test_author_listing_is_newest_first() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;
    fx.post(&alice, "one", None).await;
    fx.post(&bob, "elsewhere", None).await;
    fx.post(&alice, "two", None).await;

    let (author, posts) = fx.feed.list_by_author("alice").await.unwrap();
    assert_eq!(author.handle, "alice");
    assert_eq!(texts(&posts), vec!["two", "one"]);

    let global = fx.feed.list_global().await.unwrap();
    assert_eq!(texts(&global), vec!["two", "elsewhere", "one"]);
}

#[tokio::test]
async fn test_global_page_is_cached_per_query() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.post(&alice, "before", None).await;

    let first = fx.feed.global_page("", None).await.unwrap();
    assert_eq!(texts(&first.items), vec!["before"]);

    fx.post(&alice, "after", None).await;

    // Same query string within the expiry window: stale page served.
    let cached = fx.feed.global_page("", None).await.unwrap();
    assert_eq!(texts(&cached.items), vec!["before"]);

    // A different query string is a different cache entry.
    let fresh = fx.feed.global_page("page=1", Some("1")).await.unwrap();
    assert_eq!(texts(&fresh.items), vec!["after", "before"]);
}

#[tokio::test]
async fn test_global_page_refreshes_after_expiry() {
    let fx = fixture_with_ttl(Duration::from_millis(20));
    let alice = fx.author("alice").await;
    fx.post(&alice, "before", None).await;
    fx.feed.global_page("", None).await.unwrap();

    fx.post(&alice, "after", None).await;
    tokio::time::sleep(Duration::from_millis(40)).await;

    let page = fx.feed.global_page("", None).await.unwrap();
    assert_eq!(texts(&page.items), vec!["after", "before"]);
}

// Publishing

#[tokio::test]
async fn test_too_long_post_is_rejected_and_not_stored() {
    let fx = fixture();
    let alice = fx.author("alice").await;

    let result = fx
        .publishing
        .create_post(&alice, draft("a".repeat(2049)))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Content(ContentError::TooLong { .. }))
    ));
    assert!(fx.posts().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_long_word_post_is_rejected() {
    let fx = fixture();
    let alice = fx.author("alice").await;

    let result = fx
        .publishing
        .create_post(&alice, draft(format!("fine words {}", "w".repeat(65))))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Content(ContentError::WordTooLong { .. }))
    ));
}

#[tokio::test]
async fn test_create_post_requires_viewer_and_known_group() {
    let fx = fixture();
    let alice = fx.author("alice").await;

    assert!(matches!(
        fx.publishing.create_post(&Viewer::Anonymous, draft("hi")).await,
        Err(DomainError::Unauthorized)
    ));

    let result = fx
        .publishing
        .create_post(
            &alice,
            PostDraft {
                text: "hi".to_string(),
                group: Some("nope".to_string()),
                image: None,
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidField { field: "group", .. })
    ));
}

#[tokio::test]
async fn test_create_post_sets_author_group_and_image() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.group("tech").await;

    let post = fx
        .publishing
        .create_post(
            &alice,
            PostDraft {
                text: "with picture".to_string(),
                group: Some("tech".to_string()),
                image: Some("posts/cat.png".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(post.author.handle, "alice");
    assert_eq!(post.group.as_ref().map(|g| g.slug.as_str()), Some("tech"));
    assert_eq!(post.image.as_deref(), Some("posts/cat.png"));
}

#[tokio::test]
async fn test_non_author_edit_is_forbidden_and_changes_nothing() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;
    let post = fx.post(&alice, "original", None).await;

    let result = fx.publishing.edit_post(&bob, post.id, draft("hijacked")).await;
    assert!(matches!(result, Err(DomainError::Forbidden)));

    let anonymous = fx
        .publishing
        .edit_post(&Viewer::Anonymous, post.id, draft("hijacked"))
        .await;
    assert!(matches!(anonymous, Err(DomainError::Unauthorized)));

    let stored = fx.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn test_author_edit_keeps_creation_time() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    fx.group("tech").await;
    let post = fx.post(&alice, "original", Some("tech")).await;

    let edited = fx
        .publishing
        .edit_post(&alice, post.id, draft("edited"))
        .await
        .unwrap();

    assert_eq!(edited.text, "edited");
    assert_eq!(edited.created, post.created);
    assert!(edited.group.is_none());
    assert_eq!(edited.author, post.author);
}

#[tokio::test]
async fn test_edit_validates_text() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let post = fx.post(&alice, "original", None).await;

    let result = fx
        .publishing
        .edit_post(&alice, post.id, draft("b".repeat(3000)))
        .await;
    assert!(matches!(result, Err(DomainError::Content(_))));

    let stored = fx.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[tokio::test]
async fn test_comments_attach_to_post() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;
    let post = fx.post(&alice, "discuss", None).await;

    fx.publishing
        .add_comment(&bob, post.id, "first!".to_string())
        .await
        .unwrap();
    fx.publishing
        .add_comment(&alice, post.id, "thanks".to_string())
        .await
        .unwrap();

    let detail = fx.feed.post_detail(post.id).await.unwrap();
    assert_eq!(detail.post.id, post.id);
    assert_eq!(detail.author_post_count, 1);
    let comments: Vec<&str> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(comments, vec!["thanks", "first!"]);
}

#[tokio::test]
async fn test_invalid_comment_is_not_stored() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let post = fx.post(&alice, "discuss", None).await;

    let result = fx
        .publishing
        .add_comment(&alice, post.id, "c".repeat(100))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Content(ContentError::WordTooLong { .. }))
    ));

    let comments: &dyn CommentRepository = fx.store.as_ref();
    assert!(comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_on_missing_post_or_anonymous() {
    let fx = fixture();
    let alice = fx.author("alice").await;

    assert!(matches!(
        fx.publishing.add_comment(&alice, 999, "hi".to_string()).await,
        Err(DomainError::NotFound { entity_type: "post", .. })
    ));
    assert!(matches!(
        fx.publishing
            .add_comment(&Viewer::Anonymous, 1, "hi".to_string())
            .await,
        Err(DomainError::Unauthorized)
    ));
}

// Lifecycle rules

#[tokio::test]
async fn test_deleting_author_cascades() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let bob = fx.author("bob").await;
    let post = fx.post(&alice, "doomed", None).await;
    let kept = fx.post(&bob, "kept", None).await;
    fx.publishing
        .add_comment(&bob, post.id, "on doomed".to_string())
        .await
        .unwrap();
    fx.publishing
        .add_comment(&alice, kept.id, "by alice".to_string())
        .await
        .unwrap();
    fx.follows.follow(&bob, "alice").await.unwrap();

    let alice_id = alice.principal().unwrap().author_id;
    fx.authors().delete(alice_id).await.unwrap();

    assert_eq!(texts(&fx.posts().list_all().await.unwrap()), vec!["kept"]);
    let comments: &dyn CommentRepository = fx.store.as_ref();
    assert!(comments.list_for_post(kept.id).await.unwrap().is_empty());
    assert!(fx.feed.list_followed(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_group_ungroups_posts() {
    let fx = fixture();
    let alice = fx.author("alice").await;
    let group = fx.group("tech").await;
    let post = fx.post(&alice, "grouped", Some("tech")).await;

    fx.groups().delete(group.id).await.unwrap();

    let stored = fx.posts().find_by_id(post.id).await.unwrap().unwrap();
    assert!(stored.group.is_none());
    assert!(fx.feed.list_by_group("tech").await.is_err());
}

#[tokio::test]
async fn test_duplicate_handle_and_slug_rejected() {
    let fx = fixture();
    fx.author("alice").await;
    fx.group("tech").await;

    let dup = Author::new("alice".into(), "other@example.com".into(), String::new());
    assert!(fx.authors().create(dup).await.is_err());
    assert!(
        fx.groups()
            .create(Group::new("Tech 2", "tech", ""))
            .await
            .is_err()
    );
}

#[cfg(feature = "auth")]
mod accounts {
    use std::sync::Arc;

    use quill_core::DomainError;
    use quill_core::services::{AccountService, Registration};

    use crate::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use crate::mail::LogMailer;
    use crate::memory::InMemoryStore;
    use quill_core::ports::TokenService;

    fn service() -> AccountService {
        let store = Arc::new(InMemoryStore::new());
        AccountService::new(
            store,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
            Arc::new(LogMailer::default()),
        )
    }

    fn registration(handle: &str) -> Registration {
        Registration {
            handle: handle.to_string(),
            email: format!("{handle}@example.com"),
            password: "long enough password".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let accounts = service();
        let author = accounts.register(registration("alice")).await.unwrap();

        let (logged_in, token) = accounts
            .login("alice", "long enough password")
            .await
            .unwrap();
        assert_eq!(logged_in.id, author.id);

        let claims = accounts.tokens().validate_token(&token).unwrap();
        assert_eq!(claims.handle, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let accounts = service();
        accounts.register(registration("alice")).await.unwrap();

        assert!(matches!(
            accounts.login("alice", "wrong").await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            accounts.login("ghost", "whatever").await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_handle_and_short_password() {
        let accounts = service();
        accounts.register(registration("alice")).await.unwrap();

        assert!(matches!(
            accounts.register(registration("alice")).await,
            Err(DomainError::Duplicate(_))
        ));

        let mut short = registration("bob");
        short.password = "short".to_string();
        assert!(matches!(
            accounts.register(short).await,
            Err(DomainError::InvalidField { field: "password", .. })
        ));
    }
}
