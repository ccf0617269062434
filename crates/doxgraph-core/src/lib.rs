//! Doxgraph Core: documentation graph model, symbol table and resolved view

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod model;
pub mod outline;
pub mod resolved;
pub mod symbols;


#[cfg(test)]
pub mod test_utils;

pub use model::{
    BaseRef, DeclKind, DeclarationSkeleton, FileMetadata, Group, NodeId, ParamDoc, Symbol,
    SymbolKey, SymbolKind, TemplateParamDoc, qualify, split_qualified,
};
pub use graph::{Graph, Relation};
pub use symbols::SymbolTable;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::CoreError;
pub use resolved::ResolvedGraph;
pub use outline::{DEFAULT_MAX_CHILDREN, GroupOutline, outline, render_outline};
pub use cache::{CACHE_DIR, GRAPH_CACHE, GraphSnapshot, SymbolRecord, cache_dir, graph_cache_path, ensure_cache_dir, save_graph, load_graph, clear_cache};
