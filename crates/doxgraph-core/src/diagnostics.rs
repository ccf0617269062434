//! Non-fatal documentation diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A tag recognized but missing required structure.
    MalformedTag,
    /// A base class, parent scope, group or `\tparam` that never resolves.
    UnresolvedReference,
    /// `@}` without an open scope, a dangling `@{`, or frames left open at end of unit.
    ScopeImbalance,
    /// Two differing non-empty values for one scalar field of one symbol.
    DuplicateConflict,
    /// A documentation block that documents nothing.
    OrphanComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::ScopeImbalance => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedTag => "malformed-tag",
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
            DiagnosticKind::ScopeImbalance => "scope-imbalance",
            DiagnosticKind::DuplicateConflict => "duplicate-conflict",
            DiagnosticKind::OrphanComment => "orphan-comment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Input unit name (file path) the problem was found in.
    pub unit: String,
    pub line: Option<u32>,
    /// Symbol key or group key the diagnostic is attached to.
    pub subject: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}[{}]: {}", severity_label(self.severity), self.kind, self.message)
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

/// Ordered diagnostics collector. Every push is mirrored to the log.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        unit: &str,
        line: Option<u32>,
        subject: Option<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            severity: kind.severity(),
            unit: unit.to_string(),
            line,
            subject,
            message: message.into(),
        };
        tracing::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_and_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(
            DiagnosticKind::ScopeImbalance,
            "A.cpp",
            Some(12),
            Some("a".to_string()),
            "`@}` without a matching `@{`",
        );
        let rendered = diagnostics.iter().next().unwrap().to_string();
        assert_eq!(
            rendered,
            "A.cpp:12: error[scope-imbalance]: `@}` without a matching `@{`"
        );
    }
}
