//! Doc comment parsing.
//!
//! This module provides:
//! - `DocRecord`: the structured result of parsing one comment block
//! - `TagRegistry`: the set of known `@tags` and the line classifier
//! - `DocParser`: strips comment delimiters, splits descriptions, dispatches tags

mod parser;
mod record;
pub mod tags;

pub use parser::{DocParser, COMMENT_LINE, COMMENT_START, COMMENT_STOP};
pub use record::{AccessLevel, DocParameter, DocRecord};
pub use tags::{FnTag, TagHandler, TagKind, TagRegistry};

use thiserror::Error;

/// Errors raised by the programmatic documentation API.
///
/// The comment parser itself never fails; these only surface when user
/// code assigns values directly or configures the tag registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocError {
    #[error("invalid access level {0:?}, try private, protected or public")]
    InvalidAccessLevel(String),
    #[error("invalid tag name {0:?}")]
    InvalidTagName(String),
    #[error("unknown tag kind {0:?}")]
    UnknownTagKind(String),
}
