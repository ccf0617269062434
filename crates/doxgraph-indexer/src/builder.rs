//! Symbol model builder
//!
//! Consumes associated units in input order and merges them into one
//! [`Graph`]. Merging is keyed on `(qualified name, kind)`; for every scalar
//! field the first non-empty value wins and a differing non-empty value is
//! reported as a duplicate conflict. Group membership is a set union, so
//! feeding the same documentation twice is a no-op.

use crate::associator::{AssociatedUnit, Association};
use crate::comment::{CommentBlock, Tag};
use crate::config::{ImplicitMembership, IndexerConfig};
use crate::scope::{ScopeFrame, ScopeTracker, ScopeViolation};
use doxgraph_core::{
    BaseRef, DeclarationSkeleton, DiagnosticKind, Diagnostics, Graph, NodeId, ParamDoc, Symbol,
    SymbolKey, SymbolKind, TemplateParamDoc,
};

/// Everything the resolver needs from the build phase.
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub graph: Graph,
    pub diagnostics: Diagnostics,
    /// Scopes still open when their unit (or the whole run) ended.
    pub open_scopes: Vec<(String, ScopeFrame)>,
}

pub struct ModelBuilder<'a> {
    config: &'a IndexerConfig,
    graph: Graph,
    diagnostics: Diagnostics,
    open_scopes: Vec<(String, ScopeFrame)>,
}

/// Documentation extracted from one block, ready to merge.
struct DocFields<'b> {
    brief: String,
    details: String,
    returns: &'b str,
    /// `\brief` and `\return` repeated by later merged blocks.
    extra_briefs: Vec<&'b str>,
    extra_returns: Vec<&'b str>,
    params: Vec<ParamDoc>,
    tparams: Vec<(&'b str, &'b str)>,
    groups: Vec<&'b str>,
    file: Option<&'b str>,
    author: Option<&'b str>,
    version: Option<&'b str>,
    date: Option<&'b str>,
    copyright: Option<&'b str>,
}

impl<'b> DocFields<'b> {
    fn from_block(block: &'b CommentBlock, implicit_brief: bool) -> Self {
        let body_of = move |tag: Tag| {
            block
                .first(&tag)
                .map(|e| e.body.as_str())
                .filter(|body| !body.is_empty())
        };

        DocFields {
            brief: block.brief(implicit_brief).unwrap_or_default().to_string(),
            details: block.details(implicit_brief),
            returns: body_of(Tag::Return).unwrap_or_default(),
            extra_briefs: block.all(&Tag::Brief).skip(1).map(|e| e.body.as_str()).collect(),
            extra_returns: block.all(&Tag::Return).skip(1).map(|e| e.body.as_str()).collect(),
            // Nameless entries stay as empty-named docs next to a MalformedTag.
            params: block
                .all(&Tag::Param)
                .map(|e| ParamDoc {
                    name: e.argument.clone(),
                    direction: e.direction.clone(),
                    text: e.body.clone(),
                })
                .collect(),
            tparams: block
                .all(&Tag::TParam)
                .map(|e| (e.argument.as_str(), e.body.as_str()))
                .collect(),
            groups: block.ingroups(),
            file: block
                .first(&Tag::File)
                .map(|e| e.argument.as_str())
                .filter(|arg| !arg.is_empty()),
            author: body_of(Tag::Author),
            version: body_of(Tag::Version),
            date: body_of(Tag::Date),
            copyright: body_of(Tag::Copyright),
        }
    }
}

fn merge_text(field: &mut String, incoming: &str, name: &str, conflicts: &mut Vec<String>) {
    if incoming.is_empty() || field == incoming {
        return;
    }
    if field.is_empty() {
        *field = incoming.to_string();
    } else {
        conflicts.push(format!("{}: kept \"{}\", ignored \"{}\"", name, field, incoming));
    }
}

fn merge_option(
    field: &mut Option<String>,
    incoming: Option<&str>,
    name: &str,
    conflicts: &mut Vec<String>,
) {
    let Some(incoming) = incoming.filter(|s| !s.is_empty()) else {
        return;
    };
    match field.as_deref() {
        Some(existing) if existing == incoming => {}
        Some(existing) if !existing.is_empty() => conflicts.push(format!(
            "{}: kept \"{}\", ignored \"{}\"",
            name, existing, incoming
        )),
        _ => *field = Some(incoming.to_string()),
    }
}

impl<'a> ModelBuilder<'a> {
    pub fn new(config: &'a IndexerConfig) -> Self {
        ModelBuilder {
            config,
            graph: Graph::new(),
            diagnostics: Diagnostics::new(),
            open_scopes: Vec::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Merge one unit. The tracker carries scope state in and out so the
    /// caller decides whether units share a stack.
    pub fn apply_unit(&mut self, unit: &AssociatedUnit, tracker: &mut ScopeTracker) {
        let mut last_declared: Option<NodeId> = None;

        for association in &unit.associations {
            match association {
                Association::Declaration { decl, doc } => {
                    last_declared = Some(self.declare(unit, decl, doc.as_ref(), tracker));
                }
                Association::Trailing(block) => match last_declared {
                    Some(id) => self.document(&unit.name, id, block, true),
                    None => self.report_orphan(&unit.name, block),
                },
                Association::FileDoc(block) => self.document_file(unit, block, tracker),
                Association::GroupDoc(block) => self.document_group(&unit.name, block, tracker),
                Association::ScopeOpen { line } => {
                    if let Err(violation) = tracker.open(*line) {
                        self.report_scope(&unit.name, violation);
                    }
                }
                Association::ScopeClose { line } => {
                    if let Err(violation) = tracker.close(*line) {
                        self.report_scope(&unit.name, violation);
                    }
                }
                Association::Orphan(block) => self.report_orphan(&unit.name, block),
            }
        }
    }

    /// Record frames still open at the end of `unit` and reset the tracker.
    pub fn close_unit(&mut self, unit: &str, tracker: &mut ScopeTracker) {
        for frame in tracker.finish() {
            self.open_scopes.push((unit.to_string(), frame));
        }
    }

    pub fn finish(self) -> BuildOutput {
        tracing::debug!(
            "Built {} symbols and {} groups with {} diagnostics",
            self.graph.node_count(),
            self.graph.group_count(),
            self.diagnostics.len()
        );
        BuildOutput {
            graph: self.graph,
            diagnostics: self.diagnostics,
            open_scopes: self.open_scopes,
        }
    }

    fn declare(
        &mut self,
        unit: &AssociatedUnit,
        decl: &DeclarationSkeleton,
        doc: Option<&CommentBlock>,
        tracker: &ScopeTracker,
    ) -> NodeId {
        let key = decl.key();
        let id = match self.graph.lookup(&key) {
            Some(id) => id,
            None => {
                let mut symbol = Symbol::new(key.clone());
                symbol.line = Some(decl.line);
                let id = self.graph.add_symbol(symbol);
                if key.kind.is_container() {
                    self.adopt_placeholder_children(&key.qualified_name, id);
                }
                id
            }
        };

        self.attach_to_owner(id, decl.owner());

        if let Some(symbol) = self.graph.symbol_mut(id) {
            for name in &decl.template_params {
                if !symbol.template_params.iter().any(|t| &t.name == name) {
                    symbol.template_params.push(TemplateParamDoc {
                        name: name.clone(),
                        text: None,
                    });
                }
            }
            for base in &decl.bases {
                if !symbol.bases.iter().any(|b| &b.name == base) {
                    symbol.bases.push(BaseRef {
                        name: base.clone(),
                        target: None,
                    });
                }
            }
            if !symbol.units.contains(&unit.name) {
                symbol.units.push(unit.name.clone());
            }
        }

        if let Some(block) = doc {
            self.document(&unit.name, id, block, self.config.implicit_brief);
        }
        self.join_current_group(id, tracker);
        id
    }

    /// Link `id` under the symbol named `owner`, creating a placeholder when
    /// the owner has not been declared yet.
    fn attach_to_owner(&mut self, id: NodeId, owner: Option<String>) {
        let Some(owner) = owner else {
            return;
        };

        let parent = match self.container_named(&owner) {
            Some(parent) => parent,
            None => {
                let key = SymbolKey::new(owner.as_str(), SymbolKind::Placeholder);
                match self.graph.lookup(&key) {
                    Some(placeholder) => placeholder,
                    None => {
                        tracing::debug!("Creating placeholder for undeclared scope `{}`", owner);
                        self.graph.add_symbol(Symbol::new(key))
                    }
                }
            }
        };

        if parent != id {
            self.graph.set_parent(id, parent);
        }
    }

    fn container_named(&self, qualified_name: &str) -> Option<NodeId> {
        self.graph
            .find_by_qualified(qualified_name)
            .into_iter()
            .find(|&id| {
                self.graph
                    .symbol(id)
                    .is_some_and(|s| s.kind().is_container() && !s.is_placeholder())
            })
    }

    /// Move children of a placeholder onto the container that replaces it.
    /// The emptied placeholder is pruned by the resolver.
    fn adopt_placeholder_children(&mut self, qualified_name: &str, container: NodeId) {
        let key = SymbolKey::new(qualified_name, SymbolKind::Placeholder);
        let Some(placeholder) = self.graph.lookup(&key) else {
            return;
        };
        let children = self.graph.children_of(placeholder);
        tracing::debug!(
            "Resolved placeholder `{}`: re-linking {} children",
            qualified_name,
            children.len()
        );
        for child in children {
            self.graph.set_parent(child, container);
        }
    }

    fn join_current_group(&mut self, id: NodeId, tracker: &ScopeTracker) {
        let Some(group) = tracker.current() else {
            return;
        };

        let eligible = match self.config.implicit_membership {
            ImplicitMembership::All => true,
            ImplicitMembership::TopLevel => match self.graph.parent_of(id) {
                None => true,
                Some(parent) => self.graph.symbol(parent).is_some_and(|s| {
                    matches!(s.kind(), SymbolKind::Namespace | SymbolKind::File)
                }),
            },
        };
        if !eligible {
            return;
        }

        if let Some(symbol) = self.graph.symbol_mut(id) {
            symbol.groups.insert(group.to_string());
        }
        self.graph.ensure_group(group);
    }

    /// Merge a documentation block into an existing symbol.
    fn document(&mut self, unit: &str, id: NodeId, block: &CommentBlock, implicit_brief: bool) {
        self.report_malformed(unit, block);
        for entry in &block.entries {
            if let Tag::Unknown(name) = &entry.tag {
                tracing::debug!("Ignoring unknown tag `{}` at {}:{}", name, unit, block.line + entry.offset);
            }
        }

        let fields = DocFields::from_block(block, implicit_brief);
        let mut conflicts = Vec::new();
        let mut unresolved = Vec::new();

        let Some(symbol) = self.graph.symbol_mut(id) else {
            return;
        };
        let subject = symbol.key.to_string();

        merge_text(&mut symbol.brief, &fields.brief, "brief", &mut conflicts);
        merge_text(&mut symbol.details, &fields.details, "details", &mut conflicts);
        merge_text(&mut symbol.returns, fields.returns, "return", &mut conflicts);
        for brief in fields.extra_briefs {
            merge_text(&mut symbol.brief, brief, "brief", &mut conflicts);
        }
        for returns in fields.extra_returns {
            merge_text(&mut symbol.returns, returns, "return", &mut conflicts);
        }

        for param in fields.params {
            match symbol.params.iter_mut().find(|p| p.name == param.name) {
                Some(existing) => {
                    let label = format!("param `{}`", param.name);
                    merge_text(&mut existing.text, &param.text, &label, &mut conflicts);
                    if existing.direction.is_none() {
                        existing.direction = param.direction;
                    }
                }
                None => symbol.params.push(param),
            }
        }

        for (name, text) in fields.tparams {
            let label = format!("tparam `{}`", name);
            match symbol.template_params.iter_mut().find(|t| t.name == name) {
                Some(existing) => merge_option(&mut existing.text, Some(text), &label, &mut conflicts),
                None => match symbol.unresolved_tparams.iter_mut().find(|t| t.name == name) {
                    Some(existing) => {
                        merge_option(&mut existing.text, Some(text), &label, &mut conflicts)
                    }
                    None => {
                        symbol.unresolved_tparams.push(TemplateParamDoc {
                            name: name.to_string(),
                            text: Some(text.to_string()).filter(|t| !t.is_empty()),
                        });
                        // A nameless `\tparam` is already reported as malformed.
                        if !name.is_empty() {
                            unresolved.push(name.to_string());
                        }
                    }
                },
            }
        }

        let metadata = &mut symbol.metadata;
        merge_option(&mut metadata.file, fields.file, "file", &mut conflicts);
        merge_option(&mut metadata.author, fields.author, "author", &mut conflicts);
        merge_option(&mut metadata.version, fields.version, "version", &mut conflicts);
        merge_option(&mut metadata.date, fields.date, "date", &mut conflicts);
        merge_option(&mut metadata.copyright, fields.copyright, "copyright", &mut conflicts);

        for group in &fields.groups {
            symbol.groups.insert(group.to_string());
        }

        for group in &fields.groups {
            self.graph.ensure_group(group);
        }

        for conflict in conflicts {
            self.diagnostics.report(
                DiagnosticKind::DuplicateConflict,
                unit,
                Some(block.line),
                Some(subject.clone()),
                format!("conflicting documentation for {}: {}", subject, conflict),
            );
        }
        for name in unresolved {
            self.diagnostics.report(
                DiagnosticKind::UnresolvedReference,
                unit,
                Some(block.line),
                Some(subject.clone()),
                format!("\\tparam `{}` does not name a template parameter of {}", name, subject),
            );
        }
    }

    fn document_file(&mut self, unit: &AssociatedUnit, block: &CommentBlock, tracker: &ScopeTracker) {
        let name = block
            .first(&Tag::File)
            .map(|e| e.argument.as_str())
            .filter(|arg| !arg.is_empty())
            .unwrap_or(unit.basename.as_str());
        let key = SymbolKey::new(name, SymbolKind::File);

        let id = self.graph.add_symbol(Symbol::new(key));
        if let Some(symbol) = self.graph.symbol_mut(id) {
            if symbol.line.is_none() {
                symbol.line = Some(block.line);
            }
            if !symbol.units.contains(&unit.name) {
                symbol.units.push(unit.name.clone());
            }
        }

        self.document(&unit.name, id, block, self.config.implicit_brief);
        self.join_current_group(id, tracker);
    }

    fn document_group(&mut self, unit: &str, block: &CommentBlock, tracker: &mut ScopeTracker) {
        self.report_malformed(unit, block);
        let Some(definition) = block.group_definition() else {
            return;
        };

        // A `\defgroup` without a key still defines a (nameless) group.
        let key = definition.argument.as_str();
        let is_defgroup = definition.tag == Tag::DefGroup;
        let brief = block.brief(self.config.implicit_brief).unwrap_or_default();
        let details = block.details(self.config.implicit_brief);
        let mut conflicts = Vec::new();

        {
            let group = self.graph.ensure_group(key);
            group.defined = true;
            if is_defgroup {
                merge_text(&mut group.title, &definition.body, "title", &mut conflicts);
            } else if group.title.is_empty() {
                group.title = definition.body.clone();
            }
            merge_text(&mut group.brief, brief, "brief", &mut conflicts);
            merge_text(&mut group.details, &details, "details", &mut conflicts);
        }

        let parents: Vec<String> = tracker
            .current()
            .into_iter()
            .chain(block.ingroups())
            .filter(|parent| *parent != key)
            .map(str::to_string)
            .collect();
        for parent in parents {
            self.graph.ensure_group(&parent).add_subgroup(key);
        }

        for conflict in conflicts {
            self.diagnostics.report(
                DiagnosticKind::DuplicateConflict,
                unit,
                Some(block.line),
                Some(format!("group {}", key)),
                format!("conflicting documentation for group `{}`: {}", key, conflict),
            );
        }

        tracing::debug!("Defined group `{}` at {}:{}", key, unit, block.line);
        tracker.define(key);
    }

    fn report_malformed(&mut self, unit: &str, block: &CommentBlock) {
        for entry in block.malformed() {
            self.diagnostics.report(
                DiagnosticKind::MalformedTag,
                unit,
                Some(block.line + entry.offset),
                None,
                format!("`\\{}` requires an argument", entry.tag.keyword()),
            );
        }
    }

    fn report_orphan(&mut self, unit: &str, block: &CommentBlock) {
        self.diagnostics.report(
            DiagnosticKind::OrphanComment,
            unit,
            Some(block.line),
            None,
            "documentation comment is not attached to any declaration",
        );
    }

    fn report_scope(&mut self, unit: &str, violation: ScopeViolation) {
        let (line, message) = match violation {
            ScopeViolation::DanglingOpen { line } => {
                (line, "`@{` without a preceding group definition")
            }
            ScopeViolation::UnmatchedClose { line } => (line, "`@}` without a matching `@{`"),
        };
        self.diagnostics.report(
            DiagnosticKind::ScopeImbalance,
            unit,
            Some(line),
            None,
            message,
        );
    }
}
