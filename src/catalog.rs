//! Namespace and class catalog over source include paths.
//!
//! Namespaces are directories; classes are source files named after the
//! class they declare. Nothing is parsed here, the catalog only walks the
//! file system.

use globset::GlobSet;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Separator between namespace parts in catalog keys.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Separator between namespace parts in class names.
pub const CLASS_SEPARATOR: char = '\\';

/// Extensions of files considered as sources.
pub const DEFAULT_EXTENSIONS: &[&str] = &["php", "inc"];

/// File system catalog of namespaces and classes.
#[derive(Debug, Clone)]
pub struct Catalog {
    include_paths: Vec<PathBuf>,
    extensions: Vec<String>,
    excluded: Option<GlobSet>,
}

impl Catalog {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self {
            include_paths,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excluded: None,
        }
    }

    /// Replace the source extensions (without the leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Skip paths matching `excluded`, relative to their include path.
    pub fn with_excluded(mut self, excluded: GlobSet) -> Self {
        self.excluded = Some(excluded);
        self
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Every namespace that directly holds at least one file, sorted.
    ///
    /// With a `filter`, only namespaces below that namespace are listed,
    /// prefixed by it. The filter namespace itself is not listed.
    pub fn namespaces(&self, filter: Option<&str>) -> Vec<String> {
        let filter = filter.map(normalize_namespace).filter(|f| !f.is_empty());
        let mut namespaces = BTreeSet::new();

        for root in &self.include_paths {
            let base = match &filter {
                Some(f) => root.join(f),
                None => root.clone(),
            };
            if !base.is_dir() {
                debug!(path = %base.display(), "no namespace directory");
                continue;
            }

            for entry in self.walk(root, &base, usize::MAX) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(dir) = entry.path().parent() else {
                    continue;
                };
                if dir == base {
                    continue;
                }
                let Ok(relative) = dir.strip_prefix(&base) else {
                    continue;
                };

                let mut namespace = String::new();
                if let Some(f) = &filter {
                    namespace.push_str(f);
                    namespace.push(NAMESPACE_SEPARATOR);
                }
                namespace.push_str(&path_to_namespace(relative));
                namespaces.insert(namespace);
            }
        }

        namespaces.into_iter().collect()
    }

    /// Classes of `namespace`, keyed by `namespace/ClassName`.
    ///
    /// `namespace` may use either separator. With `recursive`, classes of
    /// sub-namespaces are included. `query` keeps only files whose name
    /// contains it, ignoring case.
    pub fn classes(
        &self,
        namespace: &str,
        recursive: bool,
        query: Option<&str>,
    ) -> BTreeMap<String, String> {
        let namespace = normalize_namespace(namespace);
        let query = query.filter(|q| !q.is_empty()).map(str::to_lowercase);
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut classes = BTreeMap::new();

        for root in &self.include_paths {
            let base = if namespace.is_empty() {
                root.clone()
            } else {
                root.join(&namespace)
            };
            if !base.is_dir() {
                debug!(path = %base.display(), "no namespace directory");
                continue;
            }

            for entry in self.walk(root, &base, max_depth) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Some(class) = self.class_of(path, query.as_deref()) else {
                    continue;
                };

                let relative = path
                    .parent()
                    .and_then(|dir| dir.strip_prefix(&base).ok())
                    .map(path_to_namespace)
                    .unwrap_or_default();

                let mut key = String::new();
                for part in [namespace.as_str(), relative.as_str()] {
                    if !part.is_empty() {
                        key.push_str(part);
                        key.push(NAMESPACE_SEPARATOR);
                    }
                }
                key.push_str(&class);
                classes.insert(key, class);
            }
        }

        classes
    }

    /// Class name for a file in `path`, if it is a source matching `query`.
    fn class_of(&self, path: &Path, query: Option<&str>) -> Option<String> {
        let extension = path.extension()?.to_str()?;
        if !self.extensions.iter().any(|e| e == extension) {
            return None;
        }

        let file_name = path.file_name()?.to_str()?;
        if let Some(q) = query {
            if !file_name.to_lowercase().contains(q) {
                return None;
            }
        }

        Some(path.file_stem()?.to_str()?.to_string())
    }

    fn walk<'a>(
        &'a self,
        root: &'a Path,
        base: &Path,
        max_depth: usize,
    ) -> impl Iterator<Item = DirEntry> + 'a {
        WalkDir::new(base)
            .follow_links(true)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !is_hidden(e) && !self.is_excluded(root, e.path()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    None
                }
            })
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Some(excluded) = &self.excluded else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excluded.is_match(relative) {
            debug!(path = %path.display(), "excluded");
            return true;
        }
        false
    }
}

/// Fully qualified class name for a class in a catalog namespace.
pub fn class_name(namespace: &str, class: &str) -> String {
    let namespace = namespace.trim_matches(|c: char| c == NAMESPACE_SEPARATOR || c == CLASS_SEPARATOR);
    if namespace.is_empty() {
        return class.to_string();
    }

    let mut name = namespace.replace(NAMESPACE_SEPARATOR, &CLASS_SEPARATOR.to_string());
    name.push(CLASS_SEPARATOR);
    name.push_str(class);
    name
}

fn normalize_namespace(namespace: &str) -> String {
    namespace
        .replace(CLASS_SEPARATOR, &NAMESPACE_SEPARATOR.to_string())
        .trim_matches(NAMESPACE_SEPARATOR)
        .to_string()
}

fn path_to_namespace(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(&NAMESPACE_SEPARATOR.to_string())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "<?php\n").unwrap();
        }
        temp
    }

    #[test]
    fn test_namespaces_only_with_files() {
        let temp = tree(&[
            "ride/library/api/ApiBrowser.php",
            "ride/library/api/doc/DocParser.php",
            "ride/library/README",
            "top.php",
        ]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);

        // `ride` holds only a directory
        assert_eq!(
            catalog.namespaces(None),
            vec!["ride/library", "ride/library/api", "ride/library/api/doc"]
        );
    }

    #[test]
    fn test_namespaces_filtered() {
        let temp = tree(&["ride/library/api/ApiBrowser.php", "ride/library/api/doc/DocParser.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);

        assert_eq!(
            catalog.namespaces(Some("ride/library")),
            vec!["ride/library/api", "ride/library/api/doc"]
        );
        assert_eq!(catalog.namespaces(Some("ride\\library\\api")), vec!["ride/library/api/doc"]);
        assert!(catalog.namespaces(Some("missing")).is_empty());
    }

    #[test]
    fn test_namespaces_merge_include_paths() {
        let one = tree(&["a/One.php"]);
        let two = tree(&["a/Two.php", "b/Three.php"]);
        let catalog = Catalog::new(vec![one.path().to_path_buf(), two.path().to_path_buf()]);
        assert_eq!(catalog.namespaces(None), vec!["a", "b"]);
    }

    #[test]
    fn test_hidden_directories_skipped() {
        let temp = tree(&[".git/objects/x.php", "app/.cache/Foo.php", "app/Job.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);
        assert_eq!(catalog.namespaces(None), vec!["app"]);

        let classes = catalog.classes("app", true, None);
        assert_eq!(classes.keys().collect::<Vec<_>>(), vec!["app/Job"]);
    }

    #[test]
    fn test_classes_in_namespace() {
        let temp = tree(&[
            "app/Job.php",
            "app/helpers.inc",
            "app/notes.txt",
            "app/model/User.php",
        ]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);

        let classes = catalog.classes("app", false, None);
        let expected: BTreeMap<String, String> = [
            ("app/Job".to_string(), "Job".to_string()),
            ("app/helpers".to_string(), "helpers".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(classes, expected);
    }

    #[test]
    fn test_classes_recursive() {
        let temp = tree(&["app/Job.php", "app/model/User.php", "app/model/sub/Role.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);

        let classes = catalog.classes("app\\", true, None);
        assert_eq!(
            classes.keys().collect::<Vec<_>>(),
            vec!["app/Job", "app/model/User", "app/model/sub/Role"]
        );
        assert_eq!(classes["app/model/sub/Role"], "Role");
    }

    #[test]
    fn test_classes_query_case_insensitive() {
        let temp = tree(&["app/UserRepository.php", "app/User.php", "app/Job.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);

        let classes = catalog.classes("app", false, Some("user"));
        assert_eq!(classes.keys().collect::<Vec<_>>(), vec!["app/User", "app/UserRepository"]);
    }

    #[test]
    fn test_classes_root_namespace() {
        let temp = tree(&["Top.php", "app/Job.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf()]);
        let classes = catalog.classes("", false, None);
        assert_eq!(classes.keys().collect::<Vec<_>>(), vec!["Top"]);
    }

    #[test]
    fn test_missing_namespace_is_empty() {
        let temp = tree(&["app/Job.php"]);
        let catalog = Catalog::new(vec![temp.path().to_path_buf(), PathBuf::from("/nonexistent")]);
        assert!(catalog.classes("nope", true, None).is_empty());
        assert_eq!(catalog.classes("app", false, None).len(), 1);
    }

    #[test]
    fn test_custom_extensions_and_exclusion() {
        let temp = tree(&["app/Job.php5", "app/Job.php", "app/tests/JobTest.php5"]);
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("**/tests/**").unwrap());
        builder.add(Glob::new("**/tests").unwrap());
        let catalog = Catalog::new(vec![temp.path().to_path_buf()])
            .with_extensions(["php5"])
            .with_excluded(builder.build().unwrap());

        let classes = catalog.classes("app", true, None);
        assert_eq!(classes.keys().collect::<Vec<_>>(), vec!["app/Job"]);
        assert_eq!(catalog.namespaces(None), vec!["app"]);
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("ride/library/api", "ApiBrowser"), "ride\\library\\api\\ApiBrowser");
        assert_eq!(class_name("ride/library/", "Foo"), "ride\\library\\Foo");
        assert_eq!(class_name("", "Foo"), "Foo");
    }
}
