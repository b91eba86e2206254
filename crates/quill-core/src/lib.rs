//! # Quill Core
//!
//! The domain layer of the Quill blogging platform.
//! Entities, ports and the feed/social-graph services live here, free of any
//! infrastructure dependency.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{ContentError, DomainError};
