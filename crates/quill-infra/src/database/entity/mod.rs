//! SeaORM entities mirroring the blog schema.

pub mod author;
pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
