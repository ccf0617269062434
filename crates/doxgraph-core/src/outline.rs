//! Per-group outlines for table-of-contents style rendering

use crate::model::{SymbolKey, SymbolKind};
use crate::resolved::ResolvedGraph;
use std::collections::HashSet;
use std::fmt::Write;

/// Default cap on listed children per category.
pub const DEFAULT_MAX_CHILDREN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupOutline {
    pub key: String,
    pub title: String,
    pub subgroups: Vec<String>,
    /// Classes, structs and enums.
    pub compounds: Vec<SymbolKey>,
    pub namespaces: Vec<SymbolKey>,
    pub files: Vec<SymbolKey>,
    /// Functions, methods, fields, enumerators.
    pub members: Vec<SymbolKey>,
}

impl GroupOutline {
    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
            && self.namespaces.is_empty()
            && self.files.is_empty()
            && self.members.is_empty()
    }
}

/// Build outlines for every group, in first-appearance order.
///
/// A symbol is listed only under the first group that lists it; each
/// category is capped at `max_children`.
pub fn outline(resolved: &ResolvedGraph, max_children: usize) -> Vec<GroupOutline> {
    let mut seen: HashSet<&SymbolKey> = HashSet::new();
    let mut outlines = Vec::new();

    for group in resolved.groups() {
        let mut entry = GroupOutline {
            key: group.key.clone(),
            title: group.title.clone(),
            subgroups: group.subgroups.clone(),
            ..Default::default()
        };

        for member in &group.members {
            if seen.contains(member) {
                continue;
            }
            let bucket = match member.kind {
                kind if kind.is_compound() => &mut entry.compounds,
                SymbolKind::Namespace => &mut entry.namespaces,
                SymbolKind::File => &mut entry.files,
                _ => &mut entry.members,
            };
            if bucket.len() < max_children {
                bucket.push(member.clone());
                seen.insert(member);
            } else {
                tracing::debug!(
                    "Outline for `{}` capped at {}: skipping {}",
                    group.key,
                    max_children,
                    member
                );
            }
        }

        outlines.push(entry);
    }

    outlines
}

/// Plain-text rendering used by the CLI.
pub fn render_outline(outlines: &[GroupOutline]) -> String {
    let mut out = String::new();
    for group in outlines {
        if group.title.is_empty() {
            let _ = writeln!(out, "{}", group.key);
        } else {
            let _ = writeln!(out, "{} ({})", group.key, group.title);
        }
        for sub in &group.subgroups {
            let _ = writeln!(out, "  group {}", sub);
        }
        for key in group
            .compounds
            .iter()
            .chain(&group.namespaces)
            .chain(&group.files)
            .chain(&group.members)
        {
            let _ = writeln!(out, "  {}", key);
        }
    }
    out
}
