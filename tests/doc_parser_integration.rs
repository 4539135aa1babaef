//! Integration tests for the doc comment parser.
//!
//! These tests parse the comment fixtures in testdata/comments and
//! exercise registry customisation through the public API.

use apidoc::doc::{AccessLevel, FnTag, TagKind};
use apidoc::{DocParser, DocRecord, TagRegistry};

fn fixture(name: &str) -> String {
    let path = format!("{}/testdata/comments/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(path).expect("fixture should exist")
}

// =============================================================================
// Fixtures
// =============================================================================

#[test]
fn test_full_block() {
    let record = DocParser::default().parse(&fixture("full.txt"));

    assert_eq!(
        record.description.as_deref(),
        Some("Gets the classes of a namespace")
    );
    assert_eq!(
        record.long_description.as_deref(),
        Some("Classes are looked up below every include path. Sub-namespaces are only read when asked for.")
    );

    let names: Vec<&str> = record
        .parameters()
        .iter()
        .filter_map(|p| p.name.as_deref())
        .collect();
    assert_eq!(names, vec!["$namespace", "$recursive", "$query"]);

    let query = record.parameter("$query").expect("query parameter");
    assert_eq!(query.type_name.as_deref(), Some("string"));
    assert_eq!(
        query.description.as_deref(),
        Some("Case insensitive, file name based search query")
    );

    let returns = record.return_value.as_ref().expect("return value");
    assert_eq!(returns.type_name.as_deref(), Some("array"));

    assert_eq!(record.exceptions.len(), 1);
    assert_eq!(record.exceptions[0].type_name.as_deref(), Some("Exception"));
    assert_eq!(
        record.exceptions[0].description.as_deref(),
        Some("when the include path\ncannot be read")
    );

    assert_eq!(record.access, Some(AccessLevel::Public));
    assert!(record.is_deprecated);
    assert_eq!(record.deprecated_message.as_deref(), Some("use classes() instead"));
    assert_eq!(record.todos, vec!["cache the result", "honour exclusions"]);

    // Unknown tags fold into the open run
    assert_eq!(
        record.see.as_deref(),
        Some("ApiBrowser\n@customthing is not a tag")
    );
}

#[test]
fn test_windows_line_endings() {
    let record = DocParser::default().parse(&fixture("windows.txt"));

    assert_eq!(
        record.description.as_deref(),
        Some("Constructs a new API browser")
    );
    let paths = record.parameter("$includePaths").expect("includePaths parameter");
    assert_eq!(paths.type_name.as_deref(), Some("array"));
    assert_eq!(paths.description.as_deref(), Some("The paths to read"));

    // A bare `@return null` is dropped
    assert!(record.return_value.is_none());
}

#[test]
fn test_reparse_is_equal() {
    let parser = DocParser::default();
    let text = fixture("full.txt");
    assert_eq!(parser.parse(&text), parser.parse(&text));
}

#[test]
fn test_record_serializes() {
    let record = DocParser::default().parse(&fixture("full.txt"));
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["access"], "public");
    assert_eq!(json["return"]["type"], "array");
    assert_eq!(json["parameters"][0]["name"], "$namespace");
    assert!(json.get("author").is_none());
}

// =============================================================================
// Registry customisation
// =============================================================================

#[test]
fn test_custom_tags() {
    let mut tags = TagRegistry::default();
    tags.add_alias("fixme", TagKind::Todo).unwrap();
    tags.add(Box::new(FnTag::new("api", |record: &mut DocRecord, lines: &[&str]| {
        record.add_todo(format!("api: {}", lines.join(" ")));
    })))
    .unwrap();
    tags.remove("see");

    let parser = DocParser::new(tags);
    let record = parser.parse("/**\n * Short\n * @see Other\n * @fixme later\n * @api stable\n */");

    // `@see` is now plain text and folds into the short description
    assert_eq!(record.description.as_deref(), Some("Short @see Other"));
    assert!(record.see.is_none());
    assert_eq!(record.todos, vec!["later", "api: stable"]);
}

#[test]
fn test_todo_count_matches_occurrences() {
    let parser = DocParser::default();
    for n in 0..5 {
        let mut comment = String::from("/**\n * Short\n");
        for i in 0..n {
            comment.push_str(&format!(" * @todo item {}\n", i));
        }
        comment.push_str(" */");

        let record = parser.parse(&comment);
        assert_eq!(record.todos.len(), n);
        for (i, todo) in record.todos.iter().enumerate() {
            assert_eq!(todo, &format!("item {}", i));
        }
    }
}
