//! YAML-described class shapes.
//!
//! A manifest lists classes the way a reflection facility would report
//! them, but only with what each class declares itself. Inherited methods,
//! properties, interfaces and constants are filled in from the parent
//! chain when a class is looked up, along with the interfaces those
//! interfaces extend.
//!
//! ```yaml
//! classes:
//!   - name: app\Job
//!     parent: app\Base
//!     interfaces: [app\Runnable]
//!     file: src/app/Job.php
//!     doc: |
//!       /**
//!        * A job
//!        */
//!     methods:
//!       - name: run
//!         visibility: public
//!         lines: [12, 20]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    ClassInfo, ClassKind, Introspector, MethodInfo, PropertyInfo, ReflectError, SourceLocation,
    Visibility,
};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
struct ManifestFile {
    #[serde(default)]
    classes: Vec<ClassEntry>,
}

/// A class as written in the manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Source file for methods that give `lines` without their own `file`.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
    #[serde(default)]
    pub constants: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// 1-based declaration and closing lines.
    #[serde(default)]
    pub lines: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub doc: Option<String>,
}

/// Introspector backed by a class manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    classes: BTreeMap<String, ClassEntry>,
    /// Directory relative source paths are resolved against.
    base_dir: PathBuf,
}

impl Manifest {
    /// Parse a manifest from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut manifest = Self::from_yaml(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Parse a manifest from YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let file: ManifestFile = serde_yaml::from_str(content)?;

        let mut classes = BTreeMap::new();
        for entry in file.classes {
            if entry.name.is_empty() {
                anyhow::bail!("manifest class without a name");
            }
            let name = entry.name.clone();
            if classes.insert(name.clone(), entry).is_some() {
                anyhow::bail!("duplicate class in manifest: {}", name);
            }
        }

        Ok(Self {
            classes,
            base_dir: PathBuf::new(),
        })
    }

    /// Class names, sorted.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    fn entry(&self, name: &str) -> Result<&ClassEntry, ReflectError> {
        self.classes
            .get(name)
            .ok_or_else(|| ReflectError::UnknownClass(name.to_string()))
    }

    /// Depth-first, in declaration order: each interface is followed by
    /// the interfaces it extends. Interfaces missing from the manifest are
    /// listed but not expanded.
    fn collect_interfaces(
        &self,
        declared: &[String],
        seen: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        for interface in declared {
            if !seen.insert(interface.clone()) {
                continue;
            }
            out.push(interface.clone());
            if let Some(entry) = self.classes.get(interface) {
                self.collect_interfaces(&entry.interfaces, seen, out);
            }
        }
    }

    fn method_info(&self, class: &ClassEntry, method: &MethodEntry) -> MethodInfo {
        let location = method.lines.and_then(|(start_line, end_line)| {
            let file = method.file.as_ref().or(class.file.as_ref())?;
            Some(SourceLocation {
                file: self.base_dir.join(file),
                start_line,
                end_line,
            })
        });

        MethodInfo {
            name: method.name.clone(),
            declaring_class: class.name.clone(),
            visibility: method.visibility,
            is_static: method.is_static,
            is_abstract: method.is_abstract,
            is_final: method.is_final,
            doc_comment: method.doc.clone(),
            location,
        }
    }
}

impl Introspector for Manifest {
    fn class(&self, name: &str) -> Result<ClassInfo, ReflectError> {
        let entry = self.entry(name)?;
        let parents = self.parent_chain(name)?;

        let mut info = ClassInfo {
            name: entry.name.clone(),
            kind: entry.kind,
            is_abstract: entry.is_abstract,
            is_final: entry.is_final,
            doc_comment: entry.doc.clone(),
            ..ClassInfo::default()
        };

        // The class first, then ancestors nearest first: the first
        // declaration seen for a name is the one that wins.
        let mut seen_interfaces = HashSet::new();
        let mut chain = vec![entry];
        for parent in &parents {
            chain.push(self.entry(parent)?);
        }

        for (depth, class) in chain.into_iter().enumerate() {
            self.collect_interfaces(&class.interfaces, &mut seen_interfaces, &mut info.interfaces);

            for method in &class.methods {
                if !info.methods.contains_key(&method.name) {
                    info.methods
                        .insert(method.name.clone(), self.method_info(class, method));
                }
            }

            for property in &class.properties {
                // Private members of ancestors are not visible
                if depth > 0 && property.visibility == Visibility::Private {
                    continue;
                }
                info.properties
                    .entry(property.name.clone())
                    .or_insert_with(|| PropertyInfo {
                        name: property.name.clone(),
                        declaring_class: class.name.clone(),
                        visibility: property.visibility,
                        is_static: property.is_static,
                        doc_comment: property.doc.clone(),
                    });
            }

            for (constant, value) in &class.constants {
                info.constants
                    .entry(constant.clone())
                    .or_insert_with(|| constant_text(value));
            }
        }

        // Methods an interface declares and nothing in the chain
        // implements, as an abstract class or a sub-interface reports them.
        for interface in &info.interfaces {
            let Some(entry) = self.classes.get(interface) else {
                continue;
            };
            for method in &entry.methods {
                if !info.methods.contains_key(&method.name) {
                    info.methods
                        .insert(method.name.clone(), self.method_info(entry, method));
                }
            }
        }

        Ok(info)
    }

    fn parent_chain(&self, name: &str) -> Result<Vec<String>, ReflectError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([name.to_string()]);
        let mut current = self.entry(name)?;

        while let Some(parent) = &current.parent {
            if !visited.insert(parent.clone()) {
                return Err(ReflectError::InheritanceCycle(parent.clone()));
            }
            current = self.entry(parent)?;
            chain.push(parent.clone());
        }

        Ok(chain)
    }
}

fn constant_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::find_declaring_interface;

    const YAML: &str = r#"
classes:
  - name: A
    interfaces: [Countable]
    file: A.php
    methods:
      - name: m1
        lines: [3, 6]
      - name: shared
        doc: "/**\n * From A\n */"
      - name: hidden
        visibility: private
    properties:
      - name: secret
        visibility: private
      - name: open
    constants:
      LIMIT: 10
      NAME: a
  - name: B
    parent: A
    interfaces: [Stringable, Countable]
    methods:
      - name: m2
      - name: shared
        doc: "/**\n * From B\n */"
  - name: C
    parent: B
    methods:
      - name: m3
    constants:
      NAME: c
"#;

    #[test]
    fn test_parent_chain_nearest_first() {
        let manifest = Manifest::from_yaml(YAML).unwrap();
        assert_eq!(manifest.parent_chain("C").unwrap(), vec!["B", "A"]);
        assert!(manifest.parent_chain("A").unwrap().is_empty());
        assert!(matches!(
            manifest.parent_chain("Nope"),
            Err(ReflectError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_flattened_methods() {
        let manifest = Manifest::from_yaml(YAML).unwrap();
        let c = manifest.class("C").unwrap();

        let names: Vec<&String> = c.methods.keys().collect();
        assert_eq!(names, vec!["hidden", "m1", "m2", "m3", "shared"]);
        assert_eq!(c.methods["m1"].declaring_class, "A");
        assert_eq!(c.methods["m2"].declaring_class, "B");
        assert_eq!(c.methods["m3"].declaring_class, "C");
        // Nearest declaration wins
        assert_eq!(c.methods["shared"].declaring_class, "B");
        assert!(c.methods["shared"].doc_comment.as_deref().unwrap().contains("From B"));
    }

    #[test]
    fn test_inherited_interfaces_properties_constants() {
        let manifest = Manifest::from_yaml(YAML).unwrap();
        let c = manifest.class("C").unwrap();

        assert_eq!(c.interfaces, vec!["Stringable", "Countable"]);
        assert!(c.properties.contains_key("open"));
        assert!(!c.properties.contains_key("secret"));
        assert_eq!(c.constants["LIMIT"], "10");
        assert_eq!(c.constants["NAME"], "c");

        let a = manifest.class("A").unwrap();
        assert!(a.properties.contains_key("secret"));
    }

    const INTERFACES: &str = r#"
classes:
  - name: Readable
    kind: interface
    methods:
      - name: read
        abstract: true
  - name: Stream
    kind: interface
    interfaces: [Readable, Closeable]
    methods:
      - name: close
        abstract: true
  - name: BaseStream
    abstract: true
    interfaces: [Stream]
    methods:
      - name: close
  - name: FileStream
    parent: BaseStream
    methods:
      - name: read
"#;

    #[test]
    fn test_interfaces_are_flattened() {
        let manifest = Manifest::from_yaml(INTERFACES).unwrap();

        let stream = manifest.class("Stream").unwrap();
        assert_eq!(stream.interfaces, vec!["Readable", "Closeable"]);
        assert_eq!(stream.methods["read"].declaring_class, "Readable");
        assert_eq!(stream.methods["close"].declaring_class, "Stream");

        let file = manifest.class("FileStream").unwrap();
        assert_eq!(file.interfaces, vec!["Stream", "Readable", "Closeable"]);
        assert_eq!(file.methods["read"].declaring_class, "FileStream");
        assert_eq!(file.methods["close"].declaring_class, "BaseStream");
    }

    #[test]
    fn test_abstract_class_lists_unimplemented_interface_methods() {
        let manifest = Manifest::from_yaml(INTERFACES).unwrap();
        let base = manifest.class("BaseStream").unwrap();

        let read = &base.methods["read"];
        assert_eq!(read.declaring_class, "Readable");
        assert!(read.is_abstract);
        assert_eq!(base.methods["close"].declaring_class, "BaseStream");
    }

    #[test]
    fn test_declaring_interface_through_extended_interface() {
        let manifest = Manifest::from_yaml(INTERFACES).unwrap();
        let file = manifest.class("FileStream").unwrap();

        // The nearest listed interface that has the method wins
        assert_eq!(
            find_declaring_interface(&manifest, &file, "read").unwrap().as_deref(),
            Some("Stream")
        );
        assert_eq!(
            find_declaring_interface(&manifest, &file, "close").unwrap().as_deref(),
            Some("Stream")
        );
    }

    #[test]
    fn test_interface_cycle_terminates() {
        let yaml = r#"
classes:
  - name: P
    kind: interface
    interfaces: [Q]
  - name: Q
    kind: interface
    interfaces: [P]
  - name: R
    interfaces: [P]
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.class("R").unwrap().interfaces, vec!["P", "Q"]);
    }

    #[test]
    fn test_method_location_uses_class_file() {
        let manifest = Manifest::from_yaml(YAML).unwrap();
        let a = manifest.class("A").unwrap();
        let location = a.methods["m1"].location.as_ref().unwrap();
        assert_eq!(location.file, PathBuf::from("A.php"));
        assert_eq!((location.start_line, location.end_line), (3, 6));
        assert!(a.methods["shared"].location.is_none());
    }

    #[test]
    fn test_cycle_detected() {
        let yaml = r#"
classes:
  - name: X
    parent: Y
  - name: Y
    parent: X
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert!(matches!(
            manifest.parent_chain("X"),
            Err(ReflectError::InheritanceCycle(_))
        ));
        assert!(manifest.class("Y").is_err());
    }

    #[test]
    fn test_unknown_parent() {
        let yaml = "classes:\n  - name: X\n    parent: Missing\n";
        let manifest = Manifest::from_yaml(yaml).unwrap();
        match manifest.class("X") {
            Err(ReflectError::UnknownClass(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected unknown class, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let yaml = "classes:\n  - name: X\n  - name: X\n";
        let err = Manifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate class"));
    }
}
