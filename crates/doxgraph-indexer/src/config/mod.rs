//! Indexer configuration loaded from `doxgraph.toml`

use crate::error::IndexError;
use doxgraph_core::DEFAULT_MAX_CHILDREN;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "doxgraph.toml";

/// How the group scope stack is shared between input units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeMode {
    /// Each unit starts with an empty stack.
    #[default]
    PerUnit,
    /// Units are processed as one stream sharing a stack.
    Concatenated,
}

/// Which declarations inside `@{ ... @}` join the open group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImplicitMembership {
    #[default]
    All,
    /// Only symbols at namespace or file scope.
    TopLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerConfig {
    pub scope_mode: ScopeMode,
    pub implicit_membership: ImplicitMembership,
    /// Treat leading untagged text as the brief.
    pub implicit_brief: bool,
    /// Tokenize and associate units on the rayon pool.
    pub parallel: bool,
    pub max_children: usize,
    /// File extensions picked up when walking directories.
    pub extensions: Vec<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            scope_mode: ScopeMode::default(),
            implicit_membership: ImplicitMembership::default(),
            implicit_brief: true,
            parallel: true,
            max_children: DEFAULT_MAX_CHILDREN,
            extensions: ["h", "hh", "hpp", "hxx", "c", "cc", "cpp", "cxx"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl IndexerConfig {
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, IndexError> {
        toml::from_str(content).map_err(|source| IndexError::Config {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexError::io(path, e))?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `doxgraph.toml` from `root`, falling back to defaults.
    pub fn discover(root: &Path) -> Result<Self, IndexError> {
        let path = root.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}
