//! Documented views over introspected classes and members.
//!
//! Each view parses its doc comment on first access and keeps the record,
//! so repeated `doc()` calls on the same view are free. Views are not
//! shared between threads; build one per request.

use once_cell::unsync::OnceCell;
use std::collections::BTreeMap;

use super::inheritance::{find_declaring_interface, resolve_ownership, Ownership};
use super::source::method_code;
use super::{ClassInfo, ClassKind, Introspector, MethodInfo, PropertyInfo, ReflectError, Visibility};
use crate::doc::{DocParser, DocRecord};

/// A class together with its parsed documentation.
pub struct ClassView<'a, I: Introspector + ?Sized> {
    parser: &'a DocParser,
    introspector: &'a I,
    info: ClassInfo,
    doc: OnceCell<DocRecord>,
    methods: OnceCell<Vec<MethodView<'a, I>>>,
    properties: OnceCell<Vec<PropertyView<'a>>>,
}

impl<'a, I: Introspector + ?Sized> ClassView<'a, I> {
    /// Look up `name` through the introspector.
    pub fn load(parser: &'a DocParser, introspector: &'a I, name: &str) -> Result<Self, ReflectError> {
        let info = introspector.class(name)?;
        Ok(Self::new(parser, introspector, info))
    }

    pub fn new(parser: &'a DocParser, introspector: &'a I, info: ClassInfo) -> Self {
        Self {
            parser,
            introspector,
            info,
            doc: OnceCell::new(),
            methods: OnceCell::new(),
            properties: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &ClassInfo {
        &self.info
    }

    pub fn doc(&self) -> &DocRecord {
        self.doc.get_or_init(|| {
            tracing::trace!(class = %self.info.name, "parsing class doc comment");
            self.parser.parse_opt(self.info.doc_comment.as_deref())
        })
    }

    /// `[final ][abstract ]class`, `[final ]interface` or `trait`.
    pub fn type_string(&self) -> String {
        let mut s = String::new();
        if self.info.is_final {
            s.push_str("final ");
        }

        match self.info.kind {
            ClassKind::Interface => s.push_str("interface"),
            ClassKind::Trait => s.push_str("trait"),
            ClassKind::Class => {
                if self.info.is_abstract {
                    s.push_str("abstract ");
                }
                s.push_str("class");
            }
        }

        s
    }

    /// All methods, inherited ones included, sorted by name.
    pub fn methods(&self) -> &[MethodView<'a, I>] {
        self.methods.get_or_init(|| {
            self.info
                .methods
                .values()
                .map(|m| MethodView::new(self.parser, self.introspector, &self.info.name, m.clone()))
                .collect()
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodView<'a, I>> {
        self.methods().iter().find(|m| m.name() == name)
    }

    /// Properties passing `filter`, sorted by name.
    pub fn properties(&self, filter: PropertyFilter) -> Vec<&PropertyView<'a>> {
        self.properties
            .get_or_init(|| {
                self.info
                    .properties
                    .values()
                    .map(|p| PropertyView::new(self.parser, p.clone()))
                    .collect()
            })
            .iter()
            .filter(|p| filter.matches(p.info()))
            .collect()
    }

    /// Constants sorted by name.
    pub fn constants(&self) -> &BTreeMap<String, String> {
        &self.info.constants
    }

    /// Methods grouped by declaring ancestor, root first.
    pub fn ownership(&self) -> Result<Ownership, ReflectError> {
        let parents = self.introspector.parent_chain(&self.info.name)?;
        Ok(resolve_ownership(&self.info, &parents))
    }

    /// First declared interface that declares `method`.
    pub fn method_interface(&self, method: &str) -> Result<Option<String>, ReflectError> {
        find_declaring_interface(self.introspector, &self.info, method)
    }
}

/// A method together with its parsed documentation and source.
pub struct MethodView<'a, I: Introspector + ?Sized> {
    parser: &'a DocParser,
    introspector: &'a I,
    class: String,
    info: MethodInfo,
    doc: OnceCell<DocRecord>,
    code: OnceCell<String>,
}

impl<'a, I: Introspector + ?Sized> MethodView<'a, I> {
    /// `class` is the class the method was looked up on, which may differ
    /// from the declaring class.
    pub fn new(parser: &'a DocParser, introspector: &'a I, class: &str, info: MethodInfo) -> Self {
        Self {
            parser,
            introspector,
            class: class.to_string(),
            info,
            doc: OnceCell::new(),
            code: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    pub fn doc(&self) -> &DocRecord {
        self.doc
            .get_or_init(|| self.parser.parse_opt(self.info.doc_comment.as_deref()))
    }

    /// Literal method body, de-indented. Read once, then cached.
    pub fn code(&self) -> Result<&str, ReflectError> {
        self.code
            .get_or_try_init(|| method_code(self.introspector, &self.info))
            .map(String::as_str)
    }

    /// `[final |abstract ]<visibility>[ static]`
    pub fn type_string(&self) -> String {
        let mut s = String::new();
        if self.info.is_final {
            s.push_str("final ");
        } else if self.info.is_abstract {
            s.push_str("abstract ");
        }

        s.push_str(self.info.visibility.as_str());

        if self.info.is_static {
            s.push_str(" static");
        }

        s
    }

    /// Whether the method is declared in `class`, or in the class this
    /// view was looked up on when `class` is `None`.
    pub fn is_declared_in(&self, class: Option<&str>) -> bool {
        let class = class.unwrap_or(&self.class);
        self.info.declaring_class == class
    }

    /// Whether the method comes from an ancestor rather than the class itself.
    pub fn is_inherited(&self) -> bool {
        !self.is_declared_in(None)
    }
}

/// Which properties [`ClassView::properties`] returns.
///
/// A property passes when its visibility is selected or, with `statics`,
/// when it is static. The default selects public and protected ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFilter {
    pub public: bool,
    pub protected: bool,
    pub private: bool,
    pub statics: bool,
}

impl PropertyFilter {
    pub const ALL: PropertyFilter = PropertyFilter {
        public: true,
        protected: true,
        private: true,
        statics: true,
    };

    pub fn matches(&self, property: &PropertyInfo) -> bool {
        let by_visibility = match property.visibility {
            Visibility::Public => self.public,
            Visibility::Protected => self.protected,
            Visibility::Private => self.private,
        };
        by_visibility || (self.statics && property.is_static)
    }
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            public: true,
            protected: true,
            private: false,
            statics: false,
        }
    }
}

/// A property together with its parsed documentation.
pub struct PropertyView<'a> {
    parser: &'a DocParser,
    info: PropertyInfo,
    doc: OnceCell<DocRecord>,
}

impl<'a> PropertyView<'a> {
    pub fn new(parser: &'a DocParser, info: PropertyInfo) -> Self {
        Self {
            parser,
            info,
            doc: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &PropertyInfo {
        &self.info
    }

    pub fn doc(&self) -> &DocRecord {
        self.doc
            .get_or_init(|| self.parser.parse_opt(self.info.doc_comment.as_deref()))
    }

    /// `<visibility>[ static]`
    pub fn type_string(&self) -> String {
        if self.info.is_static {
            format!("{} static", self.info.visibility)
        } else {
            self.info.visibility.to_string()
        }
    }
}
