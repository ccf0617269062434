//! Read-only view over a fully resolved documentation graph

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::graph::Graph;
use crate::model::{Group, Symbol, SymbolKey, SymbolKind};

/// The graph handed to renderers. Immutable once constructed.
#[derive(Debug)]
pub struct ResolvedGraph {
    graph: Graph,
    diagnostics: Vec<Diagnostic>,
}

impl ResolvedGraph {
    pub fn new(graph: Graph, diagnostics: Vec<Diagnostic>) -> Self {
        ResolvedGraph { graph, diagnostics }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn get(&self, key: &SymbolKey) -> Option<&Symbol> {
        self.graph.get(key)
    }

    /// Look up by qualified name and kind.
    pub fn symbol(&self, qualified_name: &str, kind: SymbolKind) -> Option<&Symbol> {
        self.graph.get(&SymbolKey::new(qualified_name, kind))
    }

    /// Every symbol sharing a qualified name.
    pub fn find(&self, qualified_name: &str) -> Vec<&Symbol> {
        self.graph
            .find_by_qualified(qualified_name)
            .into_iter()
            .filter_map(|id| self.graph.symbol(id))
            .collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.graph.all_symbols()
    }

    pub fn symbol_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.graph.group(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.graph.groups()
    }

    pub fn parent(&self, key: &SymbolKey) -> Option<&Symbol> {
        let id = self.graph.lookup(key)?;
        self.graph.parent_of(id).and_then(|p| self.graph.symbol(p))
    }

    pub fn children(&self, key: &SymbolKey) -> Vec<&Symbol> {
        self.related(key, Graph::children_of)
    }

    pub fn bases(&self, key: &SymbolKey) -> Vec<&Symbol> {
        self.related(key, Graph::bases_of)
    }

    pub fn derived(&self, key: &SymbolKey) -> Vec<&Symbol> {
        self.related(key, Graph::derived_of)
    }

    fn related(
        &self,
        key: &SymbolKey,
        edges: fn(&Graph, crate::model::NodeId) -> Vec<crate::model::NodeId>,
    ) -> Vec<&Symbol> {
        match self.graph.lookup(key) {
            Some(id) => edges(&self.graph, id)
                .into_iter()
                .filter_map(|c| self.graph.symbol(c))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Cross-map invariants: every group member is a symbol, every symbol
    /// membership names a group, and the two views agree.
    pub fn consistency_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for group in self.graph.groups() {
            for member in &group.members {
                match self.graph.get(member) {
                    None => violations.push(format!(
                        "group `{}` lists missing symbol {}",
                        group.key, member
                    )),
                    Some(symbol) if !symbol.groups.contains(&group.key) => violations.push(
                        format!("group `{}` lists {} without back-reference", group.key, member),
                    ),
                    Some(_) => {}
                }
            }
            for sub in &group.subgroups {
                if self.graph.group(sub).is_none() {
                    violations.push(format!("group `{}` nests missing group `{}`", group.key, sub));
                }
            }
        }
        for symbol in self.graph.all_symbols() {
            for key in &symbol.groups {
                match self.graph.group(key) {
                    None => violations.push(format!("{} names missing group `{}`", symbol.key, key)),
                    Some(group) if !group.has_member(&symbol.key) => violations.push(format!(
                        "{} in `{}` but not listed as member",
                        symbol.key, key
                    )),
                    Some(_) => {}
                }
            }
        }
        violations
    }
}
