//! Test utilities for doxgraph-core

use crate::graph::{Graph, Relation};
use crate::model::{Symbol, SymbolKey, SymbolKind};
use crate::resolved::ResolvedGraph;
use tempfile::TempDir;

/// Build a symbol with a brief and optional group memberships.
pub fn symbol(qualified_name: &str, kind: SymbolKind, brief: &str, groups: &[&str]) -> Symbol {
    let mut symbol = Symbol::new(SymbolKey::new(qualified_name, kind));
    symbol.brief = brief.to_string();
    symbol.groups = groups.iter().map(|g| g.to_string()).collect();
    symbol
}

/// A resolved graph shaped like the `my_project` fixture:
/// namespace, a grouped struct with a method, a grouped function and a
/// function placed by `\ingroup`.
pub fn create_sample_graph() -> ResolvedGraph {
    let mut graph = Graph::new();

    let ns = graph.add_symbol(symbol(
        "my_project",
        SymbolKind::Namespace,
        "Root namespace of the example project",
        &[],
    ));
    let my_struct = graph.add_symbol(symbol("my_project::MyStruct", SymbolKind::Struct, "A struct", &["a"]));
    let method = graph.add_symbol(symbol(
        "my_project::MyStruct::method",
        SymbolKind::Method,
        "A method",
        &["a"],
    ));
    let f = graph.add_symbol(symbol("my_project::f", SymbolKind::Function, "A function inside the group", &["a"]));
    graph.add_symbol(symbol("function_outside_group", SymbolKind::Function, "A function", &["b"]));

    graph.add_edge(ns, my_struct, Relation::Contains);
    graph.add_edge(my_struct, method, Relation::Contains);
    graph.add_edge(ns, f, Relation::Contains);

    {
        let a = graph.ensure_group("a");
        a.title = "Group A".to_string();
        a.brief = "The A group".to_string();
        a.defined = true;
    }
    {
        let b = graph.ensure_group("b");
        b.title = "Group B".to_string();
        b.defined = true;
    }

    let memberships: Vec<(String, SymbolKey)> = graph
        .all_symbols()
        .flat_map(|s| s.groups.iter().map(move |g| (g.clone(), s.key.clone())))
        .collect();
    for (group, key) in memberships {
        graph.ensure_group(&group).members.push(key);
    }

    ResolvedGraph::new(graph, Vec::new())
}

/// Create an empty temporary project root.
pub fn create_project_root() -> TempDir {
    TempDir::new().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_graph_is_consistent() {
        let resolved = create_sample_graph();
        assert_eq!(resolved.symbol_count(), 5);
        assert!(resolved.consistency_violations().is_empty());
        assert_eq!(resolved.group("a").unwrap().members.len(), 3);
    }
}
