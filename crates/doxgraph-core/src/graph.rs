//! Graph wrapper using petgraph::StableDiGraph keyed by symbol identity

use crate::model::*;
use crate::symbols::SymbolTable;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Relationship carried by a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Relation {
    /// Parent owns child (namespace member, class member, enumerator).
    Contains,
    /// Derived class points at its resolved base.
    Inherits,
}

/// The documentation graph: symbols, containment/inheritance edges and groups.
pub struct Graph {
    inner: StableDiGraph<Symbol, Relation>,
    symbols: SymbolTable,
    groups: Vec<Group>,
    group_index: HashMap<String, usize>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("group_count", &self.groups.len())
            .finish()
    }
}

fn index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}

fn node_id(idx: NodeIndex) -> NodeId {
    NodeId(idx.index() as u64)
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            symbols: SymbolTable::new(),
            groups: Vec::new(),
            group_index: HashMap::new(),
        }
    }

    /// Add a symbol. Returns the existing NodeId if the key is already present.
    pub fn add_symbol(&mut self, symbol: Symbol) -> NodeId {
        if let Some(existing) = self.symbols.lookup(&symbol.key) {
            return existing;
        }
        let key = symbol.key.clone();
        let id = node_id(self.inner.add_node(symbol));
        self.symbols.insert(key, id);
        id
    }

    /// Remove a symbol and all its edges.
    pub fn remove_symbol(&mut self, id: NodeId) -> Option<Symbol> {
        let symbol = self.inner.remove_node(index(id))?;
        self.symbols.remove(&symbol.key);
        Some(symbol)
    }

    pub fn symbol(&self, id: NodeId) -> Option<&Symbol> {
        self.inner.node_weight(index(id))
    }

    pub fn symbol_mut(&mut self, id: NodeId) -> Option<&mut Symbol> {
        self.inner.node_weight_mut(index(id))
    }

    pub fn lookup(&self, key: &SymbolKey) -> Option<NodeId> {
        self.symbols.lookup(key)
    }

    pub fn get(&self, key: &SymbolKey) -> Option<&Symbol> {
        self.lookup(key).and_then(|id| self.symbol(id))
    }

    pub fn get_mut(&mut self, key: &SymbolKey) -> Option<&mut Symbol> {
        let id = self.lookup(key)?;
        self.symbol_mut(id)
    }

    pub fn contains(&self, key: &SymbolKey) -> bool {
        self.symbols.contains(key)
    }

    /// Every node carrying a qualified name, in insertion order.
    pub fn find_by_qualified(&self, qualified_name: &str) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .symbols
            .keys_named(qualified_name)
            .iter()
            .filter_map(|key| self.symbols.lookup(key))
            .collect();
        ids.sort();
        ids
    }

    /// Prefer a node able to own children when a name is shared by several kinds.
    pub fn find_container(&self, qualified_name: &str) -> Option<NodeId> {
        let ids = self.find_by_qualified(qualified_name);
        ids.iter()
            .copied()
            .find(|&id| {
                self.symbol(id)
                    .is_some_and(|s| s.kind().is_container() && !s.is_placeholder())
            })
            .or_else(|| ids.first().copied())
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all symbols in declaration order.
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Node ids in declaration order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.inner.node_indices().map(node_id).collect();
        ids.sort();
        ids
    }

    /// Add an edge unless an identical one already exists.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, relation: Relation) {
        if !self.has_edge_between(source, target, relation) {
            self.inner.add_edge(index(source), index(target), relation);
        }
    }

    pub fn has_edge_between(&self, source: NodeId, target: NodeId, relation: Relation) -> bool {
        self.inner
            .edges_directed(index(source), Direction::Outgoing)
            .any(|e| e.target() == index(target) && *e.weight() == relation)
    }

    /// Move `child` under `parent`, dropping any previous containment edge.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        let stale: Vec<_> = self
            .inner
            .edges_directed(index(child), Direction::Incoming)
            .filter(|e| *e.weight() == Relation::Contains && e.source() != index(parent))
            .map(|e| e.id())
            .collect();
        for edge in stale {
            self.inner.remove_edge(edge);
        }
        self.add_edge(parent, child, Relation::Contains);
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.inner
            .edges_directed(index(id), Direction::Incoming)
            .find(|e| *e.weight() == Relation::Contains)
            .map(|e| node_id(e.source()))
    }

    /// Owned children in declaration order.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.targets(id, Relation::Contains)
    }

    /// Resolved bases of a derived symbol.
    pub fn bases_of(&self, id: NodeId) -> Vec<NodeId> {
        self.targets(id, Relation::Inherits)
    }

    /// Symbols deriving from `id`.
    pub fn derived_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .inner
            .edges_directed(index(id), Direction::Incoming)
            .filter(|e| *e.weight() == Relation::Inherits)
            .map(|e| node_id(e.source()))
            .collect();
        ids.sort();
        ids
    }

    fn targets(&self, id: NodeId, relation: Relation) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .inner
            .edges_directed(index(id), Direction::Outgoing)
            .filter(|e| *e.weight() == relation)
            .map(|e| node_id(e.target()))
            .collect();
        ids.sort();
        ids
    }

    /// Containment ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            if parent == id || ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = parent;
        }
        ancestors
    }

    // ── Groups ──────────────────────────────────────────────

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.group_index.get(key).map(|&i| &self.groups[i])
    }

    pub fn group_mut(&mut self, key: &str) -> Option<&mut Group> {
        let i = *self.group_index.get(key)?;
        Some(&mut self.groups[i])
    }

    /// Fetch a group, creating it lazily on first reference.
    pub fn ensure_group(&mut self, key: &str) -> &mut Group {
        let i = match self.group_index.get(key) {
            Some(&i) => i,
            None => {
                self.groups.push(Group::new(key));
                let i = self.groups.len() - 1;
                self.group_index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.groups[i]
    }

    /// Groups in order of first appearance.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
