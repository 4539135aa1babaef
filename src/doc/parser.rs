//! Comment block parser.
//!
//! Turns a raw `/** ... */` block into a [`DocRecord`]:
//!
//! ```text
//! /**
//!  * Short description, up to the first blank line.
//!  *
//!  * Long description, up to the first tag.
//!  * @param string $name the name
//!  * @return bool
//!  */
//! ```

use super::{DocRecord, TagRegistry};

/// Opening delimiter of a doc comment.
pub const COMMENT_START: &str = "/**";

/// Leading marker of a doc comment line.
pub const COMMENT_LINE: char = '*';

/// Closing delimiter of a doc comment.
pub const COMMENT_STOP: &str = "*/";

/// Parser for doc comment blocks.
///
/// Holds no per-parse state, so one parser can serve any number of blocks
/// and parsing the same text twice gives equal records.
#[derive(Debug, Default)]
pub struct DocParser {
    tags: TagRegistry,
}

impl DocParser {
    pub fn new(tags: TagRegistry) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Parse a raw comment block, delimiters included.
    pub fn parse(&self, comment: &str) -> DocRecord {
        let lines = comment_lines(comment);

        let mut record = DocRecord::new();
        if lines.is_empty() {
            return record;
        }

        let rest = self.take_description(&mut record, &lines);
        let rest = self.take_long_description(&mut record, rest);
        self.tags.apply_tags(&mut record, rest);

        record
    }

    /// Parse an optional comment; undocumented elements give an empty record.
    pub fn parse_opt(&self, comment: Option<&str>) -> DocRecord {
        comment.map(|c| self.parse(c)).unwrap_or_default()
    }

    /// Short description: lines up to a blank line (consumed) or a tag.
    fn take_description<'a>(&self, record: &mut DocRecord, lines: &'a [String]) -> &'a [String] {
        let mut parts = Vec::new();
        let mut consumed = 0;

        for line in lines {
            if line.is_empty() {
                consumed += 1;
                break;
            }
            if self.tags.classify(line).is_some() {
                break;
            }
            parts.push(line.as_str());
            consumed += 1;
        }

        record.description = join_description(&parts);
        &lines[consumed..]
    }

    /// Long description: everything up to the first tag.
    fn take_long_description<'a>(
        &self,
        record: &mut DocRecord,
        lines: &'a [String],
    ) -> &'a [String] {
        let end = lines
            .iter()
            .position(|line| self.tags.classify(line).is_some())
            .unwrap_or(lines.len());

        let parts: Vec<&str> = lines[..end]
            .iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty())
            .collect();

        record.long_description = join_description(&parts);
        &lines[end..]
    }
}

fn join_description(parts: &[&str]) -> Option<String> {
    let text = parts.join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Split a comment block into lines without the comment markers.
///
/// The first and last raw lines are always dropped; for a well-formed block
/// they hold only the delimiters. Whitespace around the block is ignored.
fn comment_lines(comment: &str) -> Vec<String> {
    let mut lines: Vec<String> = comment
        .trim()
        .split('\n')
        .map(|line| strip_comment_marker(line.trim()).to_string())
        .collect();

    if lines.len() <= 2 {
        return Vec::new();
    }

    lines.pop();
    lines.remove(0);
    lines
}

fn strip_comment_marker(line: &str) -> &str {
    if line == COMMENT_START || line == COMMENT_STOP {
        return "";
    }

    match line.strip_prefix(COMMENT_LINE) {
        Some(rest) => rest.trim(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{AccessLevel, DocParameter, TagKind};

    fn parse(comment: &str) -> DocRecord {
        DocParser::default().parse(comment)
    }

    #[test]
    fn test_comment_lines() {
        let lines = comment_lines("/**\n * First\n *\n *   indented  \n */");
        assert_eq!(lines, vec!["First", "", "indented"]);

        // Windows line endings
        let lines = comment_lines("/**\r\n * First\r\n */\r\n");
        assert_eq!(lines, vec!["First"]);

        // Trailing newline after the closing delimiter
        let lines = comment_lines("/**\n * @todo one\n */\n");
        assert_eq!(lines, vec!["@todo one"]);
    }

    #[test]
    fn test_strip_comment_marker() {
        assert_eq!(strip_comment_marker("/**"), "");
        assert_eq!(strip_comment_marker("*/"), "");
        assert_eq!(strip_comment_marker("* text"), "text");
        assert_eq!(strip_comment_marker("** text"), "* text");
        assert_eq!(strip_comment_marker("no marker"), "no marker");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("/** */").is_empty());
        assert!(parse("/**\n */").is_empty());
        assert!(DocParser::default().parse_opt(None).is_empty());
    }

    #[test]
    fn test_short_description_only() {
        let record = parse("/**\n * Gets the name\n * of the user\n */");
        assert_eq!(record.description.as_deref(), Some("Gets the name of the user"));
        assert!(record.long_description.is_none());
        assert!(record.parameters().is_empty());
        assert!(record.return_value.is_none());
    }

    #[test]
    fn test_short_and_long_description() {
        let record = parse(
            "/**\n * Short one.\n *\n * Long part one\n * continues.\n *\n * Second paragraph.\n * @since 2.0\n */",
        );
        assert_eq!(record.description.as_deref(), Some("Short one."));
        assert_eq!(
            record.long_description.as_deref(),
            Some("Long part one continues. Second paragraph.")
        );
        assert_eq!(record.since.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_tag_ends_short_description() {
        let record = parse("/**\n * Short\n * @return int the count\n */");
        assert_eq!(record.description.as_deref(), Some("Short"));
        assert!(record.long_description.is_none());
        assert_eq!(
            record.return_value,
            Some(DocParameter::new("int").with_description("the count"))
        );
    }

    #[test]
    fn test_tags_only() {
        let record = parse("/**\n * @var string\n */");
        assert!(record.description.is_none());
        assert!(record.long_description.is_none());
        assert_eq!(record.var_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_leading_blank_line() {
        let record = parse("/**\n *\n * Only long text\n */");
        assert!(record.description.is_none());
        assert_eq!(record.long_description.as_deref(), Some("Only long text"));
    }

    #[test]
    fn test_full_method_block() {
        let record = parse(
            r#"/**
     * Adds a user to the group
     *
     * The user is stored immediately.
     * @param string $name the name of the user
     * @param int $age
     * @param boolean flag to notify
     * @return null
     * @throws InvalidArgumentException when the name is empty
     * @exception RuntimeException
     * @access protected
     * @todo validate the age
     * @todo send a mail
     * @deprecated use addMember
     */"#,
        );

        assert_eq!(record.description.as_deref(), Some("Adds a user to the group"));
        assert_eq!(record.long_description.as_deref(), Some("The user is stored immediately."));

        let params = record.parameters();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name.as_deref(), Some("$name"));
        assert_eq!(params[1].name.as_deref(), Some("$age"));
        assert_eq!(params[2].name, None);
        assert_eq!(params[2].description.as_deref(), Some("flag to notify"));

        assert!(record.return_value.is_none());
        assert_eq!(record.exceptions.len(), 2);
        assert_eq!(record.exceptions[1].type_name.as_deref(), Some("RuntimeException"));
        assert_eq!(record.access, Some(AccessLevel::Protected));
        assert_eq!(record.todos, vec!["validate the age", "send a mail"]);
        assert!(record.is_deprecated);
        assert_eq!(record.deprecated_message.as_deref(), Some("use addMember"));
    }

    #[test]
    fn test_unknown_tag_folds_into_description() {
        let record = parse("/**\n * Short\n * @customthing foo\n */");
        assert_eq!(record.description.as_deref(), Some("Short @customthing foo"));
    }

    #[test]
    fn test_unknown_tag_folds_into_open_tag() {
        let record = parse("/**\n * @see Other\n * @customthing foo\n */");
        assert_eq!(record.see.as_deref(), Some("Other\n@customthing foo"));
    }

    #[test]
    fn test_last_single_valued_tag_wins() {
        let record = parse("/**\n * @access private\n * @access public\n * @var int\n * @var string\n */");
        assert_eq!(record.access, Some(AccessLevel::Public));
        assert_eq!(record.var_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_removed_tag_is_plain_text() {
        let mut tags = TagRegistry::with_builtin_tags();
        tags.remove("see");
        let parser = DocParser::new(tags);
        let record = parser.parse("/**\n * Short\n * @see Other\n */");
        assert_eq!(record.description.as_deref(), Some("Short @see Other"));
        assert!(record.see.is_none());
    }

    #[test]
    fn test_alias_tag() {
        let mut tags = TagRegistry::with_builtin_tags();
        tags.add_alias("fixme", TagKind::Todo).unwrap();
        let record = DocParser::new(tags).parse("/**\n * @fixme broken\n */");
        assert_eq!(record.todos, vec!["broken"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = DocParser::default();
        let comment = "/**\n * Short\n *\n * Long\n * @param int $a\n * @todo x\n */";
        assert_eq!(parser.parse(comment), parser.parse(comment));
    }
}
