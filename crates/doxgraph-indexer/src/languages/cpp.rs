//! C/C++ declaration source using tree-sitter
//!
//! Walks the syntax tree in source order and emits documentation comments
//! and declaration skeletons as one stream. Adjacent `///` (or `//!`) lines
//! are joined into a single comment; plain `//` and `/* */` comments are
//! not documentation and are dropped.

use crate::error::IndexError;
use crate::extractor::{DeclarationSource, InputUnit, RawComment, UnitItem};
use crate::parser_pool::{self, FileType, ParseRequest};
use doxgraph_core::{DeclKind, DeclarationSkeleton, split_qualified};
use std::path::Path;
use tree_sitter::{Node, Point};

pub struct CppExtractor;

impl DeclarationSource for CppExtractor {
    fn extract(&self, path: &Path, content: &[u8]) -> Result<InputUnit, IndexError> {
        let source = std::str::from_utf8(content).map_err(|e| IndexError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let parsed = parser_pool::parse(ParseRequest {
            file_type: FileType::Cpp,
            content: source,
            path,
        })?;

        let mut walker = Walker::new(source.as_bytes());
        walker.visit(parsed.tree.root_node());

        tracing::debug!(
            "Extracted {} items from {}",
            walker.items.len(),
            path.display()
        );
        Ok(InputUnit {
            name: path.display().to_string(),
            items: walker.items,
        })
    }
}

fn line_of(point: Point) -> u32 {
    (point.row as u32) + 1
}

/// Documentation comment styles; `////` and `/***` rulers are not docs.
fn is_doc_comment(text: &str) -> bool {
    let line_doc = (text.starts_with("///") && !text.starts_with("////")) || text.starts_with("//!");
    let block_doc = (text.starts_with("/**") && !text.starts_with("/***") && text != "/**/")
        || text.starts_with("/*!");
    line_doc || block_doc
}

fn is_line_doc(text: &str) -> bool {
    text.starts_with("///") || text.starts_with("//!")
}

fn is_trailing_doc(text: &str) -> bool {
    ["///<", "//!<", "/**<", "/*!<"]
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

struct Walker<'s> {
    source: &'s [u8],
    items: Vec<UnitItem>,
    /// Enclosing namespaces and classes, innermost last.
    scope: Vec<String>,
    /// Parameter names of a `template <...>` waiting for its declaration.
    pending_template: Option<Vec<String>>,
    /// Last row of a line comment that a following line may extend.
    open_line_comment: Option<usize>,
    /// Directly inside a class or struct body.
    in_class: bool,
    /// Declarations emitted so far.
    emitted: usize,
}

impl<'s> Walker<'s> {
    fn new(source: &'s [u8]) -> Self {
        Walker {
            source,
            items: Vec::new(),
            scope: Vec::new(),
            pending_template: None,
            open_line_comment: None,
            in_class: false,
            emitted: 0,
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    fn current_scope(&self) -> Option<String> {
        if self.scope.is_empty() {
            None
        } else {
            Some(self.scope.join("::"))
        }
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            "comment" => self.comment(node),
            "namespace_definition" => self.namespace(node),
            "class_specifier" | "struct_specifier" | "union_specifier" => self.class(node),
            "enum_specifier" => self.enumeration(node),
            "template_declaration" => self.template(node),
            "function_definition" => self.function_definition(node),
            "declaration" | "field_declaration" => self.declaration(node),
            "alias_declaration"
            | "type_definition"
            | "using_declaration"
            | "namespace_alias_definition"
            | "static_assert_declaration"
            | "friend_declaration"
            | "preproc_def"
            | "preproc_function_def" => self.skipped(node),
            "compound_statement" | "preproc_include" => {}
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.visit(child);
        }
    }

    fn comment(&mut self, node: Node) {
        let text = self.text(node).trim_end();
        if !is_doc_comment(text) {
            return;
        }

        let row = node.start_position().row;
        let joinable = is_line_doc(text) && !is_trailing_doc(text);
        if joinable && row > 0 && self.open_line_comment == Some(row - 1) {
            if let Some(UnitItem::Comment(previous)) = self.items.last_mut() {
                previous.text.push('\n');
                previous.text.push_str(text);
                self.open_line_comment = Some(node.end_position().row);
                return;
            }
        }

        self.items.push(UnitItem::Comment(RawComment::new(
            text,
            line_of(node.start_position()),
        )));
        self.open_line_comment = if joinable {
            Some(node.end_position().row)
        } else {
            None
        };
    }

    fn emit(&mut self, decl: DeclarationSkeleton) {
        self.open_line_comment = None;
        self.emitted += 1;
        self.items.push(UnitItem::Declaration(decl));
    }

    /// Mark a declaration that produces no skeleton so documentation above
    /// it is not carried to the next one.
    fn skipped(&mut self, node: Node) {
        self.open_line_comment = None;
        self.pending_template = None;
        self.items.push(UnitItem::Skipped {
            line: line_of(node.start_position()),
        });
    }

    fn skeleton(&mut self, kind: DeclKind, name: &str, node: Node) -> DeclarationSkeleton {
        // `Outer::Inner` names declared out of line carry their own scope.
        let (prefix, name) = split_qualified(name);
        let parent = match (self.current_scope(), prefix) {
            (Some(scope), Some(prefix)) => Some(format!("{}::{}", scope, prefix)),
            (scope, prefix) => scope.or(prefix.map(str::to_string)),
        };

        let mut decl = DeclarationSkeleton::new(kind, name).at_line(line_of(node.start_position()));
        if let Some(parent) = parent {
            decl = decl.with_parent(parent);
        }
        if let Some(params) = self.pending_template.take() {
            decl = decl.with_template_params(params);
        }
        decl
    }

    fn namespace(&mut self, node: Node) {
        let segments: Vec<String> = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .map(|name| name.split("::").map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        let depth = self.scope.len();
        for segment in &segments {
            let decl = self.skeleton(DeclKind::Namespace, segment, node);
            self.emit(decl);
            self.scope.push(segment.clone());
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body);
        }
        self.scope.truncate(depth);
    }

    fn class(&mut self, node: Node) {
        let Some(body) = node.child_by_field_name("body") else {
            // Forward declaration or elaborated type.
            self.skipped(node);
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            self.pending_template = None;
            self.visit_children(body);
            return;
        };

        let name = self.text(name_node);
        let name = name.split('<').next().unwrap_or(name).trim();
        let kind = if node.kind() == "class_specifier" {
            DeclKind::Class
        } else {
            DeclKind::Struct
        };

        let mut decl = self.skeleton(kind, name, node);
        for base in self.bases(node) {
            decl = decl.with_base(base);
        }
        let qualified = decl.qualified_name();
        self.emit(decl);

        let saved = std::mem::replace(&mut self.scope, vec![qualified]);
        let was_class = std::mem::replace(&mut self.in_class, true);
        self.visit_children(body);
        self.in_class = was_class;
        self.scope = saved;
    }

    fn bases(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        let Some(clause) = node
            .children(&mut cursor)
            .find(|child| child.kind() == "base_class_clause")
        else {
            return Vec::new();
        };

        let mut clause_cursor = clause.walk();
        clause
            .named_children(&mut clause_cursor)
            .filter(|child| {
                matches!(
                    child.kind(),
                    "type_identifier" | "qualified_identifier" | "template_type"
                )
            })
            .map(|child| self.text(child).to_string())
            .collect()
    }

    fn enumeration(&mut self, node: Node) {
        let Some(body) = node.child_by_field_name("body") else {
            self.skipped(node);
            return;
        };
        let Some(name_node) = node.child_by_field_name("name") else {
            self.visit_children(body);
            return;
        };
        let name = self.text(name_node).to_string();
        let decl = self.skeleton(DeclKind::Enum, &name, node);
        let enum_name = split_qualified(&decl.qualified_name()).1.to_string();
        let owner_scope = decl.parent.clone();
        self.emit(decl);

        let mut cursor = body.walk();
        let children: Vec<Node> = body.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "comment" => self.comment(child),
                "enumerator" => {
                    let Some(value_name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    let mut decl = DeclarationSkeleton::new(DeclKind::Enumerator, self.text(value_name))
                        .with_owning_enum(enum_name.as_str())
                        .at_line(line_of(child.start_position()));
                    if let Some(scope) = &owner_scope {
                        decl = decl.with_parent(scope.as_str());
                    }
                    self.emit(decl);
                }
                _ => {}
            }
        }
    }

    fn template(&mut self, node: Node) {
        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.template_params(list))
            .unwrap_or_default();

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "template_parameter_list" {
                continue;
            }
            if child.kind() != "comment" {
                self.pending_template = Some(params.clone());
            }
            self.visit(child);
        }
        self.pending_template = None;
    }

    fn template_params(&self, list: Node) -> Vec<String> {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter_map(|param| {
                let name = match param.kind() {
                    "type_parameter_declaration" | "variadic_type_parameter_declaration" => {
                        let mut inner = param.walk();
                        let found = param
                            .named_children(&mut inner)
                            .find(|n| n.kind() == "type_identifier");
                        found
                    }
                    "optional_type_parameter_declaration" => param.child_by_field_name("name"),
                    "parameter_declaration" | "optional_parameter_declaration" => {
                        param.child_by_field_name("declarator")
                    }
                    _ => None,
                }?;
                Some(self.text(name).trim_start_matches("...").to_string())
            })
            .collect()
    }

    fn function_definition(&mut self, node: Node) {
        let before = self.emitted;
        if let Some(declarator) = node.child_by_field_name("declarator") {
            self.function(node, declarator, self.is_static(node));
        }
        if self.emitted == before {
            self.skipped(node);
        }
    }

    fn declaration(&mut self, node: Node) {
        let before = self.emitted;
        if let Some(ty) = node.child_by_field_name("type") {
            if matches!(
                ty.kind(),
                "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier"
            ) && ty.child_by_field_name("body").is_some()
            {
                self.visit(ty);
            }
        }

        let is_static = self.is_static(node);
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();
        for declarator in declarators {
            if find_function_declarator(declarator).is_some() {
                self.function(node, declarator, is_static);
            } else if self.in_class {
                if let Some(name) = self.field_name(declarator) {
                    let kind = if is_static {
                        DeclKind::StaticField
                    } else {
                        DeclKind::Field
                    };
                    let decl = self.skeleton(kind, name, node);
                    self.emit(decl);
                }
            }
        }
        if self.emitted == before {
            // Namespace-scope variables and other unmodelled declarations.
            self.skipped(node);
        }
        self.pending_template = None;
    }

    fn function(&mut self, node: Node, declarator: Node, is_static: bool) {
        let Some(function) = find_function_declarator(declarator) else {
            return;
        };
        let Some(name_node) = function.child_by_field_name("declarator") else {
            return;
        };
        let name = match name_node.kind() {
            "template_function" => name_node
                .child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or_else(|| self.text(name_node)),
            "parenthesized_declarator" => return,
            _ => self.text(name_node),
        };

        let out_of_line = split_qualified(name).0.is_some();
        let kind = if self.pending_template.is_some() && !self.in_class && !out_of_line {
            DeclKind::Template
        } else if self.in_class || out_of_line {
            if is_static {
                DeclKind::StaticMethod
            } else {
                DeclKind::Method
            }
        } else {
            DeclKind::Function
        };

        let decl = self.skeleton(kind, name, node);
        self.emit(decl);
    }

    fn field_name(&self, declarator: Node) -> Option<&'s str> {
        let mut node = declarator;
        loop {
            match node.kind() {
                "field_identifier" | "identifier" => return Some(self.text(node)),
                _ => node = inner_declarator(node)?,
            }
        }
    }

    fn is_static(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|child| child.kind() == "storage_class_specifier" && self.text(child) == "static");
        found
    }
}

fn inner_declarator(node: Node) -> Option<Node> {
    node.child_by_field_name("declarator").or_else(|| {
        let count = node.named_child_count();
        if count == 0 {
            None
        } else {
            node.named_child(count - 1)
        }
    })
}

fn find_function_declarator(declarator: Node) -> Option<Node> {
    let mut node = declarator;
    loop {
        match node.kind() {
            "function_declarator" => return Some(node),
            "identifier" | "field_identifier" | "qualified_identifier" | "array_declarator" => {
                return None;
            }
            _ => node = inner_declarator(node)?,
        }
    }
}
