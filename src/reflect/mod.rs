//! Class shape introspection and method ownership.
//!
//! The host language's reflection facility is consumed through the
//! [`Introspector`] trait. This module adds on top of it:
//! - `inheritance`: grouping a class's methods by declaring ancestor
//! - `view`: documented, memoizing wrappers around classes and members
//! - `source`: recovery of a method's literal body
//! - `manifest`: a YAML-backed introspector for offline use and tests

mod inheritance;
pub mod manifest;
mod source;
mod view;

pub use inheritance::{find_declaring_interface, resolve_ownership, Ownership, OwnershipBucket};
pub use manifest::Manifest;
pub use source::dedent;
pub use view::{ClassView, MethodView, PropertyFilter, PropertyView};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the introspection layer.
#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("unknown class: {0}")]
    UnknownClass(String),
    #[error("inheritance cycle through class {0}")]
    InheritanceCycle(String),
    #[error("reading source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What kind of type a class snapshot describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

/// Member visibility as reported by the host language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a method is written: its file and 1-based declaration/closing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

/// A method handle as reported by the introspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Class (or interface/trait) whose body declares the method.
    pub declaring_class: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

/// A property handle as reported by the introspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub declaring_class: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

/// Snapshot of a class's declared shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Interface names in the order the host reports them.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Flattened methods, inherited ones included, keyed by name.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodInfo>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyInfo>,
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

impl ClassInfo {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

/// Read-only access to the host language's reflection facility.
pub trait Introspector {
    /// Snapshot of a class, interface or trait.
    fn class(&self, name: &str) -> Result<ClassInfo, ReflectError>;

    /// Ancestor class names, nearest parent first. Empty without a parent.
    fn parent_chain(&self, name: &str) -> Result<Vec<String>, ReflectError>;

    /// Lines strictly between the 1-based `start` and `end` lines of `file`.
    fn source_slice(
        &self,
        file: &Path,
        start: usize,
        end: usize,
    ) -> Result<Vec<String>, ReflectError> {
        if end <= start + 1 {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(file).map_err(|source| ReflectError::Source {
            path: file.to_path_buf(),
            source,
        })?;

        Ok(content
            .split('\n')
            .skip(start)
            .take(end - start - 1)
            .map(str::to_string)
            .collect())
    }
}
