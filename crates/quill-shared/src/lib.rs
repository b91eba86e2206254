//! # Quill Shared
//!
//! Request bodies, query strings and response envelopes exchanged over HTTP.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, FieldError};
