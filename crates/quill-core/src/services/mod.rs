//! Application services - the feed, social-graph and publishing logic built
//! on top of the ports.

mod accounts;
mod feed;
mod pagination;
mod publishing;
mod social;
mod validation;

pub use accounts::{AccountService, MIN_PASSWORD_LEN, Registration};
pub use feed::{AuthorProfile, FeedConfig, FeedService, GroupFeed, PostDetail};
pub use pagination::{PAGE_SIZE, Page, paginate};
pub use publishing::{PostDraft, PublishingService};
pub use social::{FollowOutcome, FollowService, UnfollowOutcome, can_edit};
pub use validation::{MAX_TEXT_CHARS, MAX_WORD_CHARS, validate_content};
