//! Symbol table for identity-key and qualified-name lookup

use crate::model::{NodeId, SymbolKey};
use std::collections::HashMap;

/// Symbol table mapping identity keys to NodeIds.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<SymbolKey, NodeId>,
    /// For name lookup: qualified name -> every key carrying that name
    by_name: HashMap<String, Vec<SymbolKey>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Insert a symbol. Re-inserting a key only updates its NodeId.
    pub fn insert(&mut self, key: SymbolKey, node_id: NodeId) {
        if self.symbols.insert(key.clone(), node_id).is_none() {
            self.by_name
                .entry(key.qualified_name.clone())
                .or_default()
                .push(key);
        }
    }

    /// Look up a symbol by identity key.
    pub fn lookup(&self, key: &SymbolKey) -> Option<NodeId> {
        self.symbols.get(key).copied()
    }

    /// Every key registered under a qualified name, in insertion order.
    pub fn keys_named(&self, qualified_name: &str) -> &[SymbolKey] {
        self.by_name
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &SymbolKey) -> bool {
        self.symbols.contains_key(key)
    }

    /// Remove a key (placeholder replacement).
    pub fn remove(&mut self, key: &SymbolKey) -> Option<NodeId> {
        let removed = self.symbols.remove(key)?;
        if let Some(keys) = self.by_name.get_mut(&key.qualified_name) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.by_name.remove(&key.qualified_name);
            }
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SymbolKind;

    #[test]
    fn name_index_tracks_every_kind() {
        let mut table = SymbolTable::new();
        let ns = SymbolKey::new("example", SymbolKind::Namespace);
        let func = SymbolKey::new("example", SymbolKind::Function);
        table.insert(ns.clone(), NodeId(0));
        table.insert(func.clone(), NodeId(1));
        table.insert(ns.clone(), NodeId(0));

        assert_eq!(table.len(), 2);
        assert_eq!(table.keys_named("example"), &[ns.clone(), func.clone()]);

        assert_eq!(table.remove(&ns), Some(NodeId(0)));
        assert_eq!(table.keys_named("example"), &[func]);
        assert!(table.keys_named("missing").is_empty());
    }
}
