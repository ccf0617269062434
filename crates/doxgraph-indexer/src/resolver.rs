//! Cross-reference resolver
//!
//! Runs once after every unit has been merged: links base-class names to
//! their symbols, prunes placeholders that were replaced by real
//! containers, materializes group member lists and reports whatever is
//! still dangling.

use crate::builder::BuildOutput;
use doxgraph_core::{
    DiagnosticKind, Diagnostics, Graph, NodeId, Relation, ResolvedGraph, SymbolKind, qualify,
    split_qualified,
};

/// Produce the final read-only graph.
pub fn resolve(output: BuildOutput) -> ResolvedGraph {
    let BuildOutput {
        mut graph,
        mut diagnostics,
        open_scopes,
    } = output;

    prune_placeholders(&mut graph, &mut diagnostics);
    resolve_bases(&mut graph, &mut diagnostics);
    materialize_groups(&mut graph, &mut diagnostics);

    for (unit, frame) in open_scopes {
        diagnostics.report(
            DiagnosticKind::ScopeImbalance,
            &unit,
            Some(frame.line),
            Some(format!("group {}", frame.group)),
            format!("group `{}` opened with `@{{` is never closed", frame.group),
        );
    }

    let resolved = ResolvedGraph::new(graph, diagnostics.into_vec());
    let violations = resolved.consistency_violations();
    for violation in &violations {
        tracing::error!("Inconsistent documentation graph: {}", violation);
    }
    debug_assert!(violations.is_empty(), "{:?}", violations);

    tracing::info!(
        "Resolved {} symbols in {} groups ({} diagnostics)",
        resolved.symbol_count(),
        resolved.groups().count(),
        resolved.diagnostics().len()
    );
    resolved
}

/// Unit and line to blame for a symbol-level diagnostic.
fn origin(graph: &Graph, id: NodeId) -> (String, Option<u32>) {
    graph
        .symbol(id)
        .map(|s| (s.units.first().cloned().unwrap_or_default(), s.line))
        .unwrap_or_default()
}

fn prune_placeholders(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    for id in graph.node_ids() {
        let Some(name) = graph
            .symbol(id)
            .filter(|s| s.is_placeholder())
            .map(|s| s.qualified_name().to_string())
        else {
            continue;
        };

        let children = graph.children_of(id);
        let Some(&first_child) = children.first() else {
            graph.remove_symbol(id);
            continue;
        };

        let (unit, line) = origin(graph, first_child);
        diagnostics.report(
            DiagnosticKind::UnresolvedReference,
            &unit,
            line,
            Some(name.clone()),
            format!(
                "scope `{}` is never declared; {} member(s) keep a placeholder parent",
                name,
                children.len()
            ),
        );
    }
}

fn compound_named(graph: &Graph, qualified_name: &str) -> Option<NodeId> {
    graph.find_by_qualified(qualified_name).into_iter().find(|&id| {
        graph.symbol(id).is_some_and(|s| {
            matches!(
                s.kind(),
                SymbolKind::Class | SymbolKind::Struct | SymbolKind::Template
            )
        })
    })
}

/// Look a base name up from the deriving class outwards. A leading `::`
/// forces a global lookup; template arguments are ignored.
fn lookup_base(graph: &Graph, derived: &str, base: &str) -> Option<NodeId> {
    let base = base.split('<').next().unwrap_or(base).trim();
    if let Some(global) = base.strip_prefix("::") {
        return compound_named(graph, global);
    }

    let mut scope = Some(derived);
    loop {
        if let Some(id) = compound_named(graph, &qualify(scope, base)) {
            return Some(id);
        }
        match scope {
            Some(current) => scope = split_qualified(current).0,
            None => return None,
        }
    }
}

fn resolve_bases(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    let mut links = Vec::new();

    for id in graph.node_ids() {
        let Some(symbol) = graph.symbol(id) else {
            continue;
        };
        for (index, base) in symbol.bases.iter().enumerate() {
            match lookup_base(graph, symbol.qualified_name(), &base.name) {
                Some(target) if target != id => links.push((id, index, target)),
                _ => {
                    let (unit, line) = origin(graph, id);
                    diagnostics.report(
                        DiagnosticKind::UnresolvedReference,
                        &unit,
                        line,
                        Some(symbol.key.to_string()),
                        format!("base `{}` of {} is never declared", base.name, symbol.key),
                    );
                }
            }
        }
    }

    for (id, index, target) in links {
        let target_key = graph.symbol(target).map(|s| s.key.clone());
        if let Some(base) = graph
            .symbol_mut(id)
            .and_then(|s| s.bases.get_mut(index))
        {
            base.target = target_key;
        }
        graph.add_edge(id, target, Relation::Inherits);
    }
}

fn materialize_groups(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    for group in graph.groups_mut() {
        group.members.clear();
    }

    let memberships: Vec<(String, doxgraph_core::SymbolKey)> = graph
        .all_symbols()
        .flat_map(|s| s.groups.iter().map(move |g| (g.clone(), s.key.clone())))
        .collect();
    for (group, key) in memberships {
        let group = graph.ensure_group(&group);
        if !group.has_member(&key) {
            group.members.push(key);
        }
    }

    let nested: Vec<String> = graph
        .groups()
        .flat_map(|g| g.subgroups.iter().cloned())
        .collect();
    for key in nested {
        graph.ensure_group(&key);
    }

    let undefined: Vec<(String, String, Option<u32>)> = graph
        .groups()
        .filter(|g| !g.defined)
        .map(|g| {
            let (unit, line) = g
                .members
                .first()
                .and_then(|key| graph.lookup(key))
                .map(|id| origin(graph, id))
                .unwrap_or_default();
            (g.key.clone(), unit, line)
        })
        .collect();
    for (key, unit, line) in undefined {
        diagnostics.report(
            DiagnosticKind::UnresolvedReference,
            &unit,
            line,
            Some(format!("group {}", key)),
            format!("group `{}` is referenced but never defined", key),
        );
    }
}
