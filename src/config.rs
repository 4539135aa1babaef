//! Configuration file for apidoc.
//!
//! ```yaml
//! include_paths: [src, vendor/lib]
//! source_extensions: [php, inc]
//! excluded_paths: ["**/tests/**"]
//! tags:
//!   disabled: [internal]
//!   aliases:
//!     fixme: todo
//! ```

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, DEFAULT_EXTENSIONS};
use crate::doc::{TagKind, TagRegistry};

/// Config file names looked up in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["apidoc.yaml", ".apidoc.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Roots of the namespace tree.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Source file extensions, without the dot (default: php, inc)
    #[serde(default)]
    pub source_extensions: Vec<String>,
    /// Glob patterns for paths to leave out of the catalog (e.g., "**/tests/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub tags: TagsConfig,
}

/// Tag registry adjustments.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TagsConfig {
    /// Built-in tags to unregister.
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Extra tag names mapped to a built-in tag kind.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path`, or the first discovered config file, or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };

        match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading config");
                let config = Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?;
                validate(&config)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Returns the source extensions (defaults to php and inc).
    pub fn source_extensions(&self) -> Vec<String> {
        if self.source_extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.source_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        }
    }

    /// Compiled `excluded_paths`, or `None` when there are none.
    pub fn excluded_globset(&self) -> anyhow::Result<Option<GlobSet>> {
        if self.excluded_paths.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
            builder.add(glob);
        }
        Ok(Some(builder.build()?))
    }

    /// Built-in tags minus the disabled ones, plus the aliases.
    pub fn tag_registry(&self) -> anyhow::Result<TagRegistry> {
        let mut registry = TagRegistry::with_builtin_tags();

        for name in &self.tags.disabled {
            if registry.remove(name).is_none() {
                tracing::warn!(tag = %name, "disabled tag is not registered");
            }
        }

        for (name, kind) in &self.tags.aliases {
            let kind: TagKind = kind
                .parse()
                .map_err(|e| anyhow::anyhow!("alias {:?}: {}", name, e))?;
            registry.add_alias(name, kind)?;
        }

        Ok(registry)
    }

    /// Catalog over `paths`, or over the configured include paths when
    /// `paths` is empty.
    pub fn catalog(&self, paths: &[PathBuf]) -> anyhow::Result<Catalog> {
        let include_paths = if paths.is_empty() {
            self.include_paths.clone()
        } else {
            paths.to_vec()
        };
        if include_paths.is_empty() {
            anyhow::bail!("no include paths given and none configured");
        }

        let mut catalog = Catalog::new(include_paths).with_extensions(self.source_extensions());
        if let Some(excluded) = self.excluded_globset()? {
            catalog = catalog.with_excluded(excluded);
        }
        Ok(catalog)
    }
}

/// Find a config file in the current directory, then in the user config
/// directory.
pub fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }

    directories::ProjectDirs::from("", "", "apidoc")
        .map(|dirs| dirs.config_dir().join(DEFAULT_CONFIG_NAMES[0]))
        .filter(|path| path.exists())
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    for extension in &config.source_extensions {
        if extension.trim_start_matches('.').is_empty() {
            anyhow::bail!("empty source extension");
        }
    }

    // Validate aliases name a known kind and a valid tag name
    config.tag_registry()?;

    Ok(())
}
