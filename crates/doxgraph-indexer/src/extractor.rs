//! Input units and the declaration source trait

use crate::error::IndexError;
use doxgraph_core::DeclarationSkeleton;
use std::path::Path;

/// A raw documentation comment as it appears in the source, decoration included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub text: String,
    pub line: u32,
}

impl RawComment {
    pub fn new(text: impl Into<String>, line: u32) -> Self {
        RawComment {
            text: text.into(),
            line,
        }
    }
}

/// One item of an input unit, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitItem {
    Comment(RawComment),
    Declaration(DeclarationSkeleton),
    /// A declaration the source does not model (variable, alias, forward
    /// declaration, macro). Documentation before it documents nothing.
    Skipped { line: u32 },
}

impl UnitItem {
    pub fn line(&self) -> u32 {
        match self {
            UnitItem::Comment(comment) => comment.line,
            UnitItem::Declaration(decl) => decl.line,
            UnitItem::Skipped { line } => *line,
        }
    }
}

/// A named stream of comments and declarations, typically one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputUnit {
    pub name: String,
    pub items: Vec<UnitItem>,
}

impl InputUnit {
    pub fn new(name: impl Into<String>) -> Self {
        InputUnit {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn comment(mut self, text: impl Into<String>, line: u32) -> Self {
        self.items.push(UnitItem::Comment(RawComment::new(text, line)));
        self
    }

    pub fn declaration(mut self, decl: DeclarationSkeleton) -> Self {
        self.items.push(UnitItem::Declaration(decl));
        self
    }

    pub fn skipped(mut self, line: u32) -> Self {
        self.items.push(UnitItem::Skipped { line });
        self
    }

    /// Unit name without directories, used as the default file symbol name.
    pub fn basename(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// Produces the ordered comment/declaration stream for one source file.
pub trait DeclarationSource: Send + Sync {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<InputUnit, IndexError>;
}
