//! Core data structures for the documentation graph

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable index of a symbol node inside the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

/// Declaration kinds reported by the external declaration parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Namespace,
    Class,
    Struct,
    Method,
    StaticMethod,
    StaticField,
    Field,
    Function,
    Template,
    Enum,
    Enumerator,
}

/// Discriminates what kind of documented entity a symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SymbolKind {
    // ── Synthetic ───────────────────────────────────────────
    File,

    // ── Declarations ────────────────────────────────────────
    Namespace,
    Class,
    Struct,
    Method,
    StaticMethod,
    StaticField,
    Field,
    Function,
    Template,
    Enum,
    Enumerator,

    // ── Forward reference stand-in ──────────────────────────
    Placeholder,
}

impl From<DeclKind> for SymbolKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Namespace => SymbolKind::Namespace,
            DeclKind::Class => SymbolKind::Class,
            DeclKind::Struct => SymbolKind::Struct,
            DeclKind::Method => SymbolKind::Method,
            DeclKind::StaticMethod => SymbolKind::StaticMethod,
            DeclKind::StaticField => SymbolKind::StaticField,
            DeclKind::Field => SymbolKind::Field,
            DeclKind::Function => SymbolKind::Function,
            DeclKind::Template => SymbolKind::Template,
            DeclKind::Enum => SymbolKind::Enum,
            DeclKind::Enumerator => SymbolKind::Enumerator,
        }
    }
}

impl SymbolKind {
    /// Kinds that can own child symbols.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            SymbolKind::File
                | SymbolKind::Namespace
                | SymbolKind::Class
                | SymbolKind::Struct
                | SymbolKind::Enum
                | SymbolKind::Placeholder
        )
    }

    /// Class-like kinds (listed as compounds in outlines).
    pub fn is_compound(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Struct | SymbolKind::Enum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::File => "file",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Method => "method",
            SymbolKind::StaticMethod => "static-method",
            SymbolKind::StaticField => "static-field",
            SymbolKind::Field => "field",
            SymbolKind::Function => "function",
            SymbolKind::Template => "template",
            SymbolKind::Enum => "enum",
            SymbolKind::Enumerator => "enumerator",
            SymbolKind::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a symbol: qualified name plus kind. Unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolKey {
    pub qualified_name: String,
    pub kind: SymbolKind,
}

impl SymbolKey {
    pub fn new(qualified_name: impl Into<String>, kind: SymbolKind) -> Self {
        SymbolKey {
            qualified_name: qualified_name.into(),
            kind,
        }
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.qualified_name)
    }
}

/// Join an optional enclosing scope and a name with `::`.
pub fn qualify(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) if !scope.is_empty() => format!("{}::{}", scope, name),
        _ => name.to_string(),
    }
}

/// Split `a::b::c` into (`Some("a::b")`, `"c"`).
pub fn split_qualified(qualified: &str) -> (Option<&str>, &str) {
    match qualified.rfind("::") {
        Some(pos) => (Some(&qualified[..pos]), &qualified[pos + 2..]),
        None => (None, qualified),
    }
}

/// Read-only declaration description produced by the declaration parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSkeleton {
    pub kind: DeclKind,
    pub name: String,
    /// Qualified name of the enclosing namespace or class.
    pub parent: Option<String>,
    /// Base class names exactly as written (`Example`, `::ns::Base`).
    pub bases: Vec<String>,
    /// Owning enum name, relative to `parent`. Enumerators only.
    pub owning_enum: Option<String>,
    pub template_params: Vec<String>,
    pub line: u32,
}

impl DeclarationSkeleton {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        DeclarationSkeleton {
            kind,
            name: name.into(),
            parent: None,
            bases: Vec::new(),
            owning_enum: None,
            template_params: Vec::new(),
            line: 0,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn with_owning_enum(mut self, owning_enum: impl Into<String>) -> Self {
        self.owning_enum = Some(owning_enum.into());
        self
    }

    pub fn with_template_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Qualified name of the symbol that owns this declaration.
    pub fn owner(&self) -> Option<String> {
        match (&self.owning_enum, self.kind) {
            (Some(owning_enum), DeclKind::Enumerator) => {
                Some(qualify(self.parent.as_deref(), owning_enum))
            }
            _ => self.parent.clone().filter(|p| !p.is_empty()),
        }
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.owner().as_deref(), &self.name)
    }

    pub fn key(&self) -> SymbolKey {
        SymbolKey::new(self.qualified_name(), self.kind.into())
    }
}

/// `\param` documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    /// `in`, `out` or `in,out` from `\param[...]`.
    pub direction: Option<String>,
    pub text: String,
}

/// A template parameter matched by name against `\tparam` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParamDoc {
    pub name: String,
    pub text: Option<String>,
}

/// Weak reference to a base class: a lookup key, filled in by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRef {
    pub name: String,
    pub target: Option<SymbolKey>,
}

/// File-level metadata tags. `Some("")` means the tag was present but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
    pub copyright: Option<String>,
}

impl FileMetadata {
    pub fn is_empty(&self) -> bool {
        self.file.is_none()
            && self.author.is_none()
            && self.version.is_none()
            && self.date.is_none()
            && self.copyright.is_none()
    }
}

/// The resolved unit of documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub key: SymbolKey,
    pub name: String,
    pub brief: String,
    pub details: String,
    pub params: Vec<ParamDoc>,
    pub returns: String,
    pub template_params: Vec<TemplateParamDoc>,
    /// `\tparam` entries naming no declared template parameter.
    pub unresolved_tparams: Vec<TemplateParamDoc>,
    pub metadata: FileMetadata,
    pub groups: BTreeSet<String>,
    pub bases: Vec<BaseRef>,
    /// Input units that declared this symbol, in first-seen order.
    pub units: Vec<String>,
    pub line: Option<u32>,
}

impl Symbol {
    pub fn new(key: SymbolKey) -> Self {
        let name = split_qualified(&key.qualified_name).1.to_string();
        Symbol {
            key,
            name,
            brief: String::new(),
            details: String::new(),
            params: Vec::new(),
            returns: String::new(),
            template_params: Vec::new(),
            unresolved_tparams: Vec::new(),
            metadata: FileMetadata::default(),
            groups: BTreeSet::new(),
            bases: Vec::new(),
            units: Vec::new(),
            line: None,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        self.key.kind
    }

    pub fn qualified_name(&self) -> &str {
        &self.key.qualified_name
    }

    pub fn is_placeholder(&self) -> bool {
        self.key.kind == SymbolKind::Placeholder
    }

    pub fn param(&self, name: &str) -> Option<&ParamDoc> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// A user-defined collection of documented symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    pub title: String,
    pub brief: String,
    pub details: String,
    /// Materialized by resolution, in symbol declaration order.
    pub members: Vec<SymbolKey>,
    pub subgroups: Vec<String>,
    /// Seen through `\defgroup`/`\addtogroup`, not only `\ingroup`.
    pub defined: bool,
}

impl Group {
    pub fn new(key: impl Into<String>) -> Self {
        Group {
            key: key.into(),
            title: String::new(),
            brief: String::new(),
            details: String::new(),
            members: Vec::new(),
            subgroups: Vec::new(),
            defined: false,
        }
    }

    pub fn has_member(&self, key: &SymbolKey) -> bool {
        self.members.contains(key)
    }

    pub fn add_subgroup(&mut self, key: &str) {
        if key != self.key && !self.subgroups.iter().any(|k| k == key) {
            self.subgroups.push(key.to_string());
        }
    }
}
