//! Tag registry and line classifier.
//!
//! A comment line opens a new tag when it starts with `@` followed by the
//! name of a registered handler. Every other line continues the tag that is
//! currently open. Handlers are looked up by name only, so the order in
//! which they are registered never changes the outcome of a parse.
//!
//! The registry is built once (see [`TagRegistry::with_builtin_tags`] or
//! `Config::tag_registry`) and then only read; `add`/`remove` take
//! `&mut self` so they cannot race with parsing.

mod builtin;

pub use builtin::{BuiltinTag, FnTag, TagKind};

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use super::{DocError, DocRecord};

/// Character that marks the start of a tag.
pub const TAG_START: char = '@';

/// Character that ends a tag name.
pub const TAG_STOP: char = ' ';

lazy_static! {
    /// Names a handler can be registered under.
    static ref TAG_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap();
}

/// Handler for the lines of one tag occurrence.
pub trait TagHandler: Send + Sync {
    /// Tag name without the `@` marker (e.g. "param").
    fn name(&self) -> &str;

    /// Decode the lines of one occurrence into the record.
    ///
    /// The first line has already had its `@name ` prefix removed.
    fn apply(&self, record: &mut DocRecord, lines: &[&str]);
}

/// Registered tag handlers, keyed by tag name.
///
/// `TagRegistry::default()` has every built-in tag registered.
pub struct TagRegistry {
    handlers: HashMap<String, Box<dyn TagHandler>>,
}

impl TagRegistry {
    /// Create a registry without any tags.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with every built-in tag registered.
    pub fn with_builtin_tags() -> Self {
        let mut registry = Self::new();
        for (name, kind) in TagKind::BUILTIN_NAMES {
            registry.insert(Box::new(BuiltinTag::new(*name, *kind)));
        }
        registry
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn add(&mut self, handler: Box<dyn TagHandler>) -> Result<(), DocError> {
        if !TAG_NAME.is_match(handler.name()) {
            return Err(DocError::InvalidTagName(handler.name().to_string()));
        }
        self.insert(handler);
        Ok(())
    }

    /// Register `name` as an alias that behaves like the built-in `kind`.
    pub fn add_alias(&mut self, name: &str, kind: TagKind) -> Result<(), DocError> {
        self.add(Box::new(BuiltinTag::new(name, kind)))
    }

    /// Remove a handler. Removing an unregistered name is a no-op.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn TagHandler>> {
        self.handlers.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tag names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn insert(&mut self, handler: Box<dyn TagHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Return the tag a line opens, or `None` for a continuation line.
    ///
    /// The tag name runs from after the marker to the first space. When the
    /// line has a space it must sit beyond index 3, so `@x y` never opens a
    /// tag; without a space the whole remainder is the candidate name.
    pub fn classify<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(TAG_START)?;

        let tag = match line.find(TAG_STOP) {
            None => rest,
            Some(stop) if stop > 3 => &line[TAG_START.len_utf8()..stop],
            Some(_) => return None,
        };

        if tag.is_empty() || !self.handlers.contains_key(tag) {
            return None;
        }

        Some(tag)
    }

    /// Split `lines` into tag runs and hand each run to its handler.
    ///
    /// Lines before the first recognised tag are discarded.
    pub fn apply_tags<S: AsRef<str>>(&self, record: &mut DocRecord, lines: &[S]) {
        let mut current: Option<(&str, Vec<&str>)> = None;

        for line in lines {
            let line = line.as_ref();
            let Some(tag) = self.classify(line) else {
                match current.as_mut() {
                    Some((_, run)) => run.push(line),
                    None => tracing::trace!(line, "dropping text outside of a tag"),
                }
                continue;
            };

            if let Some((open, run)) = current.take() {
                self.dispatch(record, open, &run);
            }

            // "@" + name + " "
            let prefix_len = TAG_START.len_utf8() + tag.len() + TAG_STOP.len_utf8();
            let first = line.get(prefix_len..).unwrap_or("");
            current = Some((tag, vec![first]));
        }

        if let Some((open, run)) = current {
            self.dispatch(record, open, &run);
        }
    }

    fn dispatch(&self, record: &mut DocRecord, tag: &str, lines: &[&str]) {
        if let Some(handler) = self.handlers.get(tag) {
            handler.apply(record, lines);
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_builtin_tags()
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRegistry")
            .field("tags", &self.names())
            .finish()
    }
}
