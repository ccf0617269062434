//! Snapshot persistence for resolved graphs

use crate::diagnostics::Diagnostic;
use crate::error::CoreError;
use crate::model::{Group, Symbol, SymbolKey};
use crate::resolved::ResolvedGraph;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache directory: .doxgraph/
pub const CACHE_DIR: &str = ".doxgraph";

/// Graph snapshot file
pub const GRAPH_CACHE: &str = "graph.json";

/// A symbol with its containment materialized for readers without the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRecord {
    #[serde(flatten)]
    pub symbol: Symbol,
    pub parent: Option<SymbolKey>,
    pub children: Vec<SymbolKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub version: String,
    pub cached_at: String,
    pub symbols: Vec<SymbolRecord>,
    pub groups: Vec<Group>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GraphSnapshot {
    pub fn from_resolved(resolved: &ResolvedGraph) -> Self {
        let symbols = resolved
            .symbols()
            .map(|symbol| SymbolRecord {
                parent: resolved.parent(&symbol.key).map(|p| p.key.clone()),
                children: resolved
                    .children(&symbol.key)
                    .into_iter()
                    .map(|c| c.key.clone())
                    .collect(),
                symbol: symbol.clone(),
            })
            .collect();

        GraphSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            cached_at: chrono::Utc::now().to_rfc3339(),
            symbols,
            groups: resolved.groups().cloned().collect(),
            diagnostics: resolved.diagnostics().to_vec(),
        }
    }
}

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Get graph snapshot file path
pub fn graph_cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(GRAPH_CACHE)
}

/// Ensure cache directory exists
pub fn ensure_cache_dir(root: &Path) -> Result<(), CoreError> {
    let cache = cache_dir(root);
    if !cache.exists() {
        std::fs::create_dir_all(&cache).map_err(|e| CoreError::io(&cache, e))?;
    }
    Ok(())
}

/// Serialize the resolved graph as a JSON snapshot.
pub fn save_graph(resolved: &ResolvedGraph, root: &Path) -> Result<PathBuf, CoreError> {
    ensure_cache_dir(root)?;
    let path = graph_cache_path(root);

    let snapshot = GraphSnapshot::from_resolved(resolved);
    let json_str = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(&path, json_str).map_err(|e| CoreError::io(&path, e))?;

    tracing::debug!(
        "Graph snapshot saved: {} ({} symbols, {} groups)",
        path.display(),
        snapshot.symbols.len(),
        snapshot.groups.len()
    );
    Ok(path)
}

/// Load a snapshot written by the same version, if one exists.
pub fn load_graph(root: &Path) -> Result<Option<GraphSnapshot>, CoreError> {
    let path = graph_cache_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let json_str = std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
    let snapshot: GraphSnapshot = serde_json::from_str(&json_str)?;
    if snapshot.version != env!("CARGO_PKG_VERSION") {
        return Err(CoreError::VersionMismatch {
            found: snapshot.version,
            expected: env!("CARGO_PKG_VERSION").to_string(),
        });
    }

    tracing::debug!("Graph snapshot loaded from: {}", path.display());
    Ok(Some(snapshot))
}

/// Clear cache directory
pub fn clear_cache(root: &Path) -> Result<(), CoreError> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache).map_err(|e| CoreError::io(&cache, e))?;
    }
    Ok(())
}
