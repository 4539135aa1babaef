//! Built-in tag handlers.
//!
//! Every built-in tag is a [`BuiltinTag`]: a name bound to a [`TagKind`].
//! Binding a second name to the same kind gives an alias (`@exception`
//! behaves exactly like `@throws`).

use serde::{Deserialize, Serialize};

use super::TagHandler;
use crate::doc::{AccessLevel, DocError, DocParameter, DocRecord};

/// Character that marks a `@param` token as a parameter name.
pub const PARAMETER_SIGIL: char = '$';

/// Behaviour of a built-in tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Abstract,
    Access,
    Author,
    Copyright,
    Deprecated,
    Example,
    /// Recognised but writes nothing.
    Global,
    Ignore,
    /// Recognised but writes nothing.
    Internal,
    Link,
    Name,
    Package,
    Param,
    Return,
    See,
    Since,
    Static,
    SubPackage,
    Throws,
    Todo,
    Var,
    Version,
}

impl TagKind {
    /// Default tag names and the kind each one is bound to.
    pub const BUILTIN_NAMES: &'static [(&'static str, TagKind)] = &[
        ("abstract", TagKind::Abstract),
        ("access", TagKind::Access),
        ("author", TagKind::Author),
        ("copyright", TagKind::Copyright),
        ("deprecated", TagKind::Deprecated),
        ("example", TagKind::Example),
        ("exception", TagKind::Throws),
        ("global", TagKind::Global),
        ("ignore", TagKind::Ignore),
        ("internal", TagKind::Internal),
        ("link", TagKind::Link),
        ("name", TagKind::Name),
        ("package", TagKind::Package),
        ("param", TagKind::Param),
        ("return", TagKind::Return),
        ("see", TagKind::See),
        ("since", TagKind::Since),
        ("static", TagKind::Static),
        ("staticvar", TagKind::Static),
        ("subpackage", TagKind::SubPackage),
        ("throws", TagKind::Throws),
        ("todo", TagKind::Todo),
        ("var", TagKind::Var),
        ("version", TagKind::Version),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Abstract => "abstract",
            TagKind::Access => "access",
            TagKind::Author => "author",
            TagKind::Copyright => "copyright",
            TagKind::Deprecated => "deprecated",
            TagKind::Example => "example",
            TagKind::Global => "global",
            TagKind::Ignore => "ignore",
            TagKind::Internal => "internal",
            TagKind::Link => "link",
            TagKind::Name => "name",
            TagKind::Package => "package",
            TagKind::Param => "param",
            TagKind::Return => "return",
            TagKind::See => "see",
            TagKind::Since => "since",
            TagKind::Static => "static",
            TagKind::SubPackage => "subpackage",
            TagKind::Throws => "throws",
            TagKind::Todo => "todo",
            TagKind::Var => "var",
            TagKind::Version => "version",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TagKind {
    type Err = DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagKind::BUILTIN_NAMES
            .iter()
            .find(|(name, kind)| *name == s || kind.as_str() == s)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| DocError::UnknownTagKind(s.to_string()))
    }
}

/// Handler for one built-in tag name.
#[derive(Debug, Clone)]
pub struct BuiltinTag {
    name: String,
    kind: TagKind,
}

impl BuiltinTag {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }
}

impl TagHandler for BuiltinTag {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut DocRecord, lines: &[&str]) {
        match self.kind {
            // Flags ignore their lines
            TagKind::Abstract => record.is_abstract = true,
            TagKind::Ignore => record.is_ignored = true,
            TagKind::Static => record.is_static = true,
            TagKind::Global | TagKind::Internal => {}

            TagKind::Access => {
                let first = lines.first().copied().unwrap_or("");
                match AccessLevel::parse(first) {
                    Some(level) => record.access = Some(level),
                    None => tracing::debug!(value = first, "ignoring malformed @access"),
                }
            }

            TagKind::Deprecated => {
                record.deprecated_message = Some(lines.join("\n"));
                record.is_deprecated = true;
            }
            TagKind::Todo => record.add_todo(lines.join("\n")),
            TagKind::Author => record.author = Some(lines.join("\n")),
            TagKind::Copyright => record.copyright = Some(lines.join("\n")),
            TagKind::Example => record.example = Some(lines.join("\n")),
            TagKind::Link => record.link = Some(lines.join("\n")),
            TagKind::Name => record.name = Some(lines.join("\n")),
            TagKind::Package => record.package = Some(lines.join("\n")),
            TagKind::SubPackage => record.sub_package = Some(lines.join("\n")),
            TagKind::See => record.see = Some(lines.join("\n")),
            TagKind::Since => record.since = Some(lines.join("\n")),
            TagKind::Var => record.var_type = Some(lines.join("\n")),
            TagKind::Version => record.version = Some(lines.join("\n")),

            TagKind::Param => record.add_parameter(parse_param(&lines.join("\n"))),
            TagKind::Return => {
                if let Some(value) = parse_return(&lines.join("\n")) {
                    record.return_value = Some(value);
                }
            }
            TagKind::Throws => record.add_exception(parse_throws(&lines.join("\n"))),
        }
    }
}

/// Handler backed by a closure, for tags defined outside this crate.
pub struct FnTag<F> {
    name: String,
    apply: F,
}

impl<F> FnTag<F>
where
    F: Fn(&mut DocRecord, &[&str]) + Send + Sync,
{
    pub fn new(name: impl Into<String>, apply: F) -> Self {
        Self {
            name: name.into(),
            apply,
        }
    }
}

impl<F> TagHandler for FnTag<F>
where
    F: Fn(&mut DocRecord, &[&str]) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut DocRecord, lines: &[&str]) {
        (self.apply)(record, lines)
    }
}

/// Split at the first whitespace character of any kind, not only a space.
///
/// Run lines are joined with `\n`, so a type alone on the tag line still
/// ends there.
fn split_token(s: &str) -> (&str, Option<&str>) {
    match s.find(char::is_whitespace) {
        Some(pos) => {
            let ws_len = s[pos..].chars().next().map(char::len_utf8).unwrap_or(1);
            (&s[..pos], Some(&s[pos + ws_len..]))
        }
        None => (s, None),
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(str::to_string)
}

/// `type [$name] [description]`
///
/// The token after the type is only a name when it starts with the sigil;
/// otherwise it is the first word of the description.
fn parse_param(value: &str) -> DocParameter {
    let (type_name, rest) = split_token(value);
    let (mut name, mut description) = match rest {
        Some(rest) => {
            let (name, description) = split_token(rest);
            (non_empty(Some(name)), non_empty(description))
        }
        None => (None, None),
    };

    if let Some(token) = name.take() {
        if token.starts_with(PARAMETER_SIGIL) {
            name = Some(token);
        } else {
            description = Some(match description {
                Some(description) => format!("{} {}", token, description),
                None => token,
            });
        }
    }

    DocParameter {
        type_name: Some(type_name.to_string()),
        name,
        description,
    }
}

/// `type [description]`; a bare `null` is not worth recording.
///
/// The type ends at the first whitespace, so a tab or a line break after
/// it separates the description just like a space does.
fn parse_return(value: &str) -> Option<DocParameter> {
    let (type_name, description) = match split_token(value) {
        (type_name, Some(rest)) => (type_name, non_empty(Some(rest.trim()))),
        (type_name, None) => (type_name.trim(), None),
    };

    if type_name == "null" && description.is_none() {
        return None;
    }

    Some(DocParameter {
        type_name: Some(type_name.to_string()),
        name: None,
        description,
    })
}

/// `type [description]`, with the type ending at the first whitespace
/// (space, tab or line break).
fn parse_throws(value: &str) -> DocParameter {
    let (type_name, description) = split_token(value);
    DocParameter {
        type_name: Some(type_name.to_string()),
        name: None,
        description: non_empty(description),
    }
}
