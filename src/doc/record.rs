//! Documentation record produced for a single comment block.

use serde::{Deserialize, Serialize};

use super::DocError;

/// Access level declared with `@access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Private,
    Protected,
    Public,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Private => "private",
            AccessLevel::Protected => "protected",
            AccessLevel::Public => "public",
        }
    }

    /// Exact, case-sensitive match against the three defined levels.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(AccessLevel::Private),
            "protected" => Some(AccessLevel::Protected),
            "public" => Some(AccessLevel::Public),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccessLevel::parse(s).ok_or_else(|| DocError::InvalidAccessLevel(s.to_string()))
    }
}

/// A typed, optionally named value described by `@param`, `@return` or `@throws`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocParameter {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocParameter {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Structured documentation for a class, method or property.
///
/// Every optional field tracks "unset" (`None`) separately from an empty
/// string. Single-valued tags overwrite earlier occurrences; `@param` keys
/// by name, while exceptions and todos are append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,

    pub is_abstract: bool,
    pub is_static: bool,
    pub is_deprecated: bool,
    pub is_ignored: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub see: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,

    /// Insertion-ordered; see [`DocRecord::add_parameter`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<DocParameter>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<DocParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<DocParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<String>,
}

impl DocRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access level from its textual form.
    ///
    /// Unlike the `@access` tag, which silently drops unknown values, this
    /// rejects anything other than `private`, `protected` or `public`.
    pub fn set_access(&mut self, access: &str) -> Result<(), DocError> {
        self.access = Some(access.parse()?);
        Ok(())
    }

    /// Add a parameter. A parameter with the same name replaces the earlier
    /// one in place, keeping its original position.
    pub fn add_parameter(&mut self, parameter: DocParameter) {
        match self
            .parameters
            .iter_mut()
            .find(|p| p.name == parameter.name)
        {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// All parameters in the order they were first documented.
    pub fn parameters(&self) -> &[DocParameter] {
        &self.parameters
    }

    /// Look up a parameter by its name (including the `$` sigil).
    pub fn parameter(&self, name: &str) -> Option<&DocParameter> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }

    pub fn add_exception(&mut self, exception: DocParameter) {
        self.exceptions.push(exception);
    }

    pub fn add_todo(&mut self, todo: impl Into<String>) {
        self.todos.push(todo.into());
    }

    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == DocRecord::default()
    }
}
