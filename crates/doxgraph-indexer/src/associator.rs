//! Declaration associator
//!
//! Walks one input unit in source order and pairs each documentation block
//! with what it documents: the next declaration, the previous one for
//! trailing comments, the unit itself for file-level blocks, or a group for
//! blocks carrying `\defgroup`/`\addtogroup`. `@{` and `@}` markers are
//! split out into their own events so the builder sees them at the right
//! position relative to declarations.
//!
//! Association is a pure function of one unit and runs in parallel across
//! units; everything order-dependent across units happens in the builder.

use crate::comment::{CommentBlock, Tag, TagEntry, tokenize_raw};
use crate::extractor::{InputUnit, UnitItem};
use doxgraph_core::DeclarationSkeleton;

#[derive(Debug, Clone, PartialEq)]
pub enum Association {
    /// A declaration with the documentation that preceded it, if any.
    Declaration {
        decl: DeclarationSkeleton,
        doc: Option<CommentBlock>,
    },
    /// Documents the most recent declaration.
    Trailing(CommentBlock),
    FileDoc(CommentBlock),
    GroupDoc(CommentBlock),
    ScopeOpen { line: u32 },
    ScopeClose { line: u32 },
    /// Documentation with nothing to attach to.
    Orphan(CommentBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociatedUnit {
    pub name: String,
    pub basename: String,
    pub associations: Vec<Association>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockRole {
    Group,
    File,
    Declaration,
}

fn role_of(block: &CommentBlock) -> BlockRole {
    if block.group_definition().is_some() {
        BlockRole::Group
    } else if block.is_file_level() {
        BlockRole::File
    } else {
        BlockRole::Declaration
    }
}

fn marker(entry: &TagEntry, block_line: u32) -> Association {
    let line = block_line + entry.offset;
    match entry.tag {
        Tag::GroupOpen => Association::ScopeOpen { line },
        _ => Association::ScopeClose { line },
    }
}

/// Split a block into its documentation part and its scope markers.
///
/// Markers written before a group definition take effect before it, so
/// `@}` followed by `\defgroup b` and `@{` in one block closes the old
/// group and opens `b`.
fn split_block(block: CommentBlock, pending: &mut Vec<CommentBlock>, out: &mut Vec<Association>) {
    let role = role_of(&block);
    let anchor = match role {
        BlockRole::Group => block.entries.iter().position(|e| e.tag.is_group_definition()),
        _ => block.entries.iter().position(|e| !e.tag.is_structural()),
    };

    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut entries = Vec::new();
    for (index, entry) in block.entries.into_iter().enumerate() {
        if entry.tag.is_structural() {
            let event = marker(&entry, block.line);
            if anchor.is_some_and(|a| index < a) {
                before.push(event);
            } else {
                after.push(event);
            }
        } else {
            entries.push(entry);
        }
    }

    out.extend(before);
    if !entries.is_empty() {
        let doc = CommentBlock {
            entries,
            line: block.line,
            trailing: false,
        };
        match role {
            BlockRole::Group => out.push(Association::GroupDoc(doc)),
            BlockRole::File => out.push(Association::FileDoc(doc)),
            BlockRole::Declaration => pending.push(doc),
        }
    }
    out.extend(after);
}

/// Associate every comment of `unit` with its target.
pub fn associate(unit: &InputUnit) -> AssociatedUnit {
    let mut associations = Vec::new();
    let mut pending: Vec<CommentBlock> = Vec::new();
    // Whether a trailing comment here would document a modelled declaration.
    let mut can_trail = false;

    for item in &unit.items {
        match item {
            UnitItem::Comment(raw) => {
                let block = tokenize_raw(&raw.text, raw.line);
                if block.is_empty() {
                    continue;
                }
                if block.trailing {
                    if can_trail {
                        associations.push(Association::Trailing(block));
                    } else {
                        associations.push(Association::Orphan(block));
                    }
                    continue;
                }
                split_block(block, &mut pending, &mut associations);
            }
            UnitItem::Declaration(decl) => {
                can_trail = true;
                associations.push(Association::Declaration {
                    decl: decl.clone(),
                    doc: CommentBlock::merge(std::mem::take(&mut pending)),
                });
            }
            UnitItem::Skipped { line } => {
                can_trail = false;
                if !pending.is_empty() {
                    tracing::debug!(
                        "Dropping {} blocks documenting an unmodelled declaration at {}:{}",
                        pending.len(),
                        unit.name,
                        line
                    );
                }
                associations.extend(pending.drain(..).map(Association::Orphan));
            }
        }
    }

    associations.extend(pending.into_iter().map(Association::Orphan));

    tracing::debug!(
        "Associated {} events in unit {}",
        associations.len(),
        unit.name
    );

    AssociatedUnit {
        name: unit.name.clone(),
        basename: unit.basename().to_string(),
        associations,
    }
}
