//! apidoc - API documentation browser core.
//!
//! apidoc reads PHPDoc-style comment blocks into structured records and
//! relates class members to the ancestors and interfaces that declare them.
//!
//! # Architecture
//!
//! - `doc`: comment block parser, documentation record and `@tag` registry
//! - `reflect`: class introspection, method ownership and documented views
//! - `catalog`: namespace and class listing over include paths
//! - `config`: YAML configuration (`apidoc.yaml`)
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a Tag
//!
//! Implement `TagHandler` (or wrap a closure in `FnTag`) and register it on
//! a `TagRegistry` before building the `DocParser`.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod doc;
pub mod logging;
pub mod reflect;
pub mod report;

pub use catalog::Catalog;
pub use config::Config;
pub use doc::{DocError, DocParameter, DocParser, DocRecord, TagHandler, TagKind, TagRegistry};
pub use reflect::{
    find_declaring_interface, resolve_ownership, ClassInfo, ClassView, Introspector, Manifest,
    MethodInfo, Ownership, ReflectError,
};
