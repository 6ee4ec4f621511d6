//! Go language analyzer using tree-sitter.
//!
//! Extracts:
//! - Function and method declarations with signatures and receivers
//! - Struct declarations with their fields
//! - Interface declarations with their method sets and embedded types
//! - Imports and the package clause
//! - Control flow for complexity

use std::collections::HashSet;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{
    count_lines, is_exported, results_suffix, ControlFlowInfo, Declaration, DeclarationKind,
    Field, FileFacts, Import, LanguageAnalyzer, MethodSpec, ParsedFile, Signature, Span,
};

/// Tree-sitter query for extracting Go declarations.
const DECLARATION_QUERY: &str = r#"
; Function declarations
(function_declaration
  name: (identifier) @func_name
) @function

; Method declarations (with receiver)
(method_declaration
  name: (field_identifier) @method_name
) @method

; Struct types
(type_spec
  name: (type_identifier) @type_name
  type: (struct_type)
) @struct

; Interface types
(type_spec
  name: (type_identifier) @type_name
  type: (interface_type)
) @interface
"#;

/// Tree-sitter query for extracting imports.
const IMPORT_QUERY: &str = r#"
(import_declaration
  (import_spec
    name: (package_identifier)? @alias
    path: (interpreted_string_literal) @path
  )
) @import

(import_declaration
  (import_spec_list
    (import_spec
      name: (package_identifier)? @alias
      path: (interpreted_string_literal) @path
    ) @import_item
  )
) @import_group
"#;

/// Tree-sitter query for control flow nodes (complexity calculation).
///
/// `for_statement` covers range loops too. `select` and its clauses are left out.
const CONTROL_FLOW_QUERY: &str = r#"
(if_statement) @if
(for_statement) @for
(expression_switch_statement) @switch
(type_switch_statement) @switch
(expression_case) @case
(type_case) @case
(default_case) @default_case
"#;

/// Go language analyzer.
pub struct GoAnalyzer {
    language: Language,
}

impl GoAnalyzer {
    /// Create a new Go analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Extract the package name from the package clause.
    fn extract_package(&self, parsed: &ParsedFile) -> Option<String> {
        let root = parsed.tree.root_node();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let name = clause.named_child(0)?;
        Some(parsed.node_text(name).to_string())
    }

    /// Extract declarations from a parsed file.
    fn extract_declarations(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<Declaration>> {
        let query = Query::new(&self.language, DECLARATION_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut declarations = Vec::new();
        let mut seen_positions = HashSet::new();

        while let Some(m) = matches.next() {
            let mut name = String::new();
            let mut kind = None;
            let mut decl_node = None;

            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                match capture_name {
                    "func_name" | "method_name" | "type_name" => {
                        name = parsed.node_text(capture.node).to_string();
                    }
                    "function" => {
                        kind = Some(DeclarationKind::Function);
                        decl_node = Some(capture.node);
                    }
                    "method" => {
                        kind = Some(DeclarationKind::Method);
                        decl_node = Some(capture.node);
                    }
                    "struct" => {
                        kind = Some(DeclarationKind::Struct);
                        decl_node = Some(capture.node);
                    }
                    "interface" => {
                        kind = Some(DeclarationKind::Interface);
                        decl_node = Some(capture.node);
                    }
                    _ => {}
                }
            }

            let (Some(kind), Some(node)) = (kind, decl_node) else {
                continue;
            };
            if name.is_empty() || !seen_positions.insert((node.start_byte(), name.clone())) {
                continue;
            }

            declarations.push(self.build_declaration(parsed, name, kind, node)?);
        }

        // Sort by position for deterministic output
        declarations.sort_by_key(|d| (d.span.start_byte, d.name.clone()));

        Ok(declarations)
    }

    fn build_declaration(
        &self,
        parsed: &ParsedFile,
        name: String,
        kind: DeclarationKind,
        node: Node,
    ) -> anyhow::Result<Declaration> {
        let mut decl = Declaration {
            exported: is_exported(&name),
            name,
            kind,
            span: Span::from_node(node),
            receiver: None,
            signature: None,
            control_flow: None,
            fields: Vec::new(),
            methods: Vec::new(),
            embedded: Vec::new(),
        };

        match kind {
            DeclarationKind::Function | DeclarationKind::Method => {
                if kind == DeclarationKind::Method {
                    decl.receiver = node
                        .child_by_field_name("receiver")
                        .and_then(|r| receiver_type(parsed, r));
                }
                decl.signature = Some(signature_of(parsed, node));
                if let Some(body) = node.child_by_field_name("body") {
                    decl.control_flow = Some(self.extract_control_flow(parsed, body)?);
                }
            }
            DeclarationKind::Struct => {
                if let Some(body) = node.child_by_field_name("type") {
                    decl.fields = struct_fields(parsed, body);
                }
            }
            DeclarationKind::Interface => {
                if let Some(body) = node.child_by_field_name("type") {
                    let (methods, embedded) = interface_elements(parsed, body);
                    decl.methods = methods;
                    decl.embedded = embedded;
                }
            }
        }

        Ok(decl)
    }

    /// Extract control flow information from a function body.
    fn extract_control_flow(
        &self,
        parsed: &ParsedFile,
        body_node: Node,
    ) -> anyhow::Result<ControlFlowInfo> {
        let query = Query::new(&self.language, CONTROL_FLOW_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, body_node, &parsed.source[..]);

        let mut info = ControlFlowInfo::default();

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                match name {
                    "if" => info.if_count += 1,
                    "for" => info.loop_count += 1,
                    "switch" => info.switch_count += 1,
                    "case" => info.case_count += 1,
                    "default_case" => {
                        // select's default is a communication clause, not a case
                        let in_select = capture
                            .node
                            .parent()
                            .map(|p| p.kind() == "select_statement")
                            .unwrap_or(false);
                        if !in_select {
                            info.case_count += 1;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(info)
    }

    /// Extract imports from a parsed file.
    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<Import>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();
        let mut seen_paths = HashSet::new();

        while let Some(m) = matches.next() {
            let mut path = String::new();
            let mut alias = None;
            let mut import_node = None;

            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                match name {
                    "path" => {
                        let raw = parsed.node_text(capture.node);
                        path = raw.trim_matches('"').to_string();
                        import_node = Some(capture.node);
                    }
                    "alias" => {
                        alias = Some(parsed.node_text(capture.node).to_string());
                    }
                    _ => {}
                }
            }

            if !path.is_empty() && seen_paths.insert(path.clone()) {
                if let Some(node) = import_node {
                    imports.push(Import {
                        path,
                        alias,
                        span: Span::from_node(node),
                    });
                }
            }
        }

        // Sort by path for deterministic output
        imports.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(imports)
    }
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let root = parsed.tree.root_node();
        let has_parse_errors = root.has_error();
        let parse_error = if has_parse_errors {
            Some(first_error_message(root))
        } else {
            None
        };

        Ok(FileFacts {
            path: parsed.path.clone(),
            language: self.language_id().to_string(),
            package: self.extract_package(parsed),
            declarations: self.extract_declarations(parsed)?,
            imports: self.extract_imports(parsed)?,
            line_count: count_lines(&parsed.source),
            has_parse_errors,
            parse_error,
        })
    }
}

/// Describe the first ERROR or MISSING node in the tree.
fn first_error_message(root: Node) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("syntax error at {}:{}", pos.row + 1, pos.column + 1);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        // Reverse so the leftmost child is visited first
        stack.extend(children.into_iter().rev());
    }
    "source contains syntax errors".to_string()
}

/// Resolve the base type name of a method receiver (`*List[T]` -> `List`).
fn receiver_type(parsed: &ParsedFile, receiver: Node) -> Option<String> {
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    loop {
        match ty.kind() {
            "pointer_type" | "parenthesized_type" => ty = ty.named_child(0)?,
            "generic_type" => ty = ty.child_by_field_name("type")?,
            _ => break,
        }
    }
    Some(parsed.node_text(ty).to_string())
}

/// Build a signature from a node with `parameters` and `result` fields.
fn signature_of(parsed: &ParsedFile, node: Node) -> Signature {
    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameter_types(parsed, p))
        .unwrap_or_default();
    let results = match node.child_by_field_name("result") {
        Some(r) if r.kind() == "parameter_list" => parameter_types(parsed, r),
        Some(r) => vec![type_string(parsed, r)],
        None => Vec::new(),
    };
    Signature { params, results }
}

/// One type string per declared name; unnamed parameters count once.
fn parameter_types(parsed: &ParsedFile, list: Node) -> Vec<String> {
    let mut types = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        match decl.kind() {
            "parameter_declaration" => {
                let Some(ty) = decl.child_by_field_name("type") else {
                    continue;
                };
                let rendered = type_string(parsed, ty);
                let mut name_cursor = decl.walk();
                let names = decl
                    .children_by_field_name("name", &mut name_cursor)
                    .count()
                    .max(1);
                types.extend(std::iter::repeat(rendered).take(names));
            }
            "variadic_parameter_declaration" => {
                if let Some(ty) = decl.child_by_field_name("type") {
                    types.push(format!("...{}", type_string(parsed, ty)));
                }
            }
            _ => {}
        }
    }
    types
}

fn struct_fields(parsed: &ParsedFile, struct_type: Node) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut cursor = struct_type.walk();
    let Some(list) = struct_type
        .named_children(&mut cursor)
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return fields;
    };

    let mut list_cursor = list.walk();
    for decl in list.named_children(&mut list_cursor) {
        if decl.kind() != "field_declaration" {
            continue;
        }
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut type_str = type_string(parsed, ty);
        let tag = decl
            .child_by_field_name("tag")
            .map(|t| parsed.node_text(t).to_string());

        let mut name_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| parsed.node_text(n).to_string())
            .collect();

        if names.is_empty() {
            let mut child_cursor = decl.walk();
            let pointer = decl.children(&mut child_cursor).any(|c| c.kind() == "*");
            if pointer {
                type_str = format!("*{}", type_str);
            }
            fields.push(Field {
                name: embedded_name(&type_str),
                type_string: type_str,
                tag,
                embedded: true,
            });
        } else {
            for name in names {
                fields.push(Field {
                    name,
                    type_string: type_str.clone(),
                    tag: tag.clone(),
                    embedded: false,
                });
            }
        }
    }
    fields
}

/// Name Go gives an embedded field: the unqualified type name.
fn embedded_name(type_str: &str) -> String {
    let base = type_str.trim_start_matches('*');
    let base = base.split('[').next().unwrap_or(base);
    base.rsplit('.').next().unwrap_or(base).to_string()
}

fn interface_elements(parsed: &ParsedFile, iface: Node) -> (Vec<MethodSpec>, Vec<String>) {
    let mut methods = Vec::new();
    let mut embedded = Vec::new();
    let mut cursor = iface.walk();
    for elem in iface.named_children(&mut cursor) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                if let Some(name) = elem.child_by_field_name("name") {
                    methods.push(MethodSpec {
                        name: parsed.node_text(name).to_string(),
                        signature: signature_of(parsed, elem),
                    });
                }
            }
            "comment" => {}
            _ => embedded.push(type_string(parsed, elem)),
        }
    }
    (methods, embedded)
}

/// Render a type expression as Go source would print it.
///
/// Handles pointers, arrays, slices, maps, channels, function types,
/// qualified (selector) types and generic instantiations. Anything else
/// falls back to the node text with whitespace collapsed.
pub(crate) fn type_string(parsed: &ParsedFile, node: Node) -> String {
    let field = |name: &str| {
        node.child_by_field_name(name)
            .map(|n| type_string(parsed, n))
            .unwrap_or_default()
    };
    let first_named = || {
        node.named_child(0)
            .map(|n| type_string(parsed, n))
            .unwrap_or_default()
    };

    match node.kind() {
        "pointer_type" => format!("*{}", first_named()),
        "slice_type" => format!("[]{}", field("element")),
        "array_type" => {
            let length = node
                .child_by_field_name("length")
                .map(|n| parsed.node_text(n).to_string())
                .unwrap_or_default();
            format!("[{}]{}", length, field("element"))
        }
        "implicit_length_array_type" => format!("[...]{}", field("element")),
        "map_type" => format!("map[{}]{}", field("key"), field("value")),
        "channel_type" => {
            let first = node.child(0).map(|c| c.kind()).unwrap_or("");
            let second = node.child(1).map(|c| c.kind()).unwrap_or("");
            let prefix = if first == "<-" {
                "<-chan"
            } else if second == "<-" {
                "chan<-"
            } else {
                "chan"
            };
            format!("{} {}", prefix, field("value"))
        }
        "function_type" => {
            let sig = signature_of(parsed, node);
            format!(
                "func({}){}",
                sig.params.join(", "),
                results_suffix(&sig.results)
            )
        }
        "qualified_type" => format!("{}.{}", field("package"), field("name")),
        "generic_type" => {
            let args = node
                .child_by_field_name("type_arguments")
                .map(|args| {
                    let mut cursor = args.walk();
                    args.named_children(&mut cursor)
                        .map(|a| type_string(parsed, a))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            format!("{}[{}]", field("type"), args)
        }
        "type_elem" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .map(|n| type_string(parsed, n))
                .collect::<Vec<_>>()
                .join(" | ")
        }
        "negated_type" => format!("~{}", first_named()),
        "parenthesized_type" => first_named(),
        "struct_type" => {
            if struct_fields(parsed, node).is_empty() {
                "struct{}".to_string()
            } else {
                "struct{...}".to_string()
            }
        }
        "interface_type" => {
            if node.named_child_count() == 0 {
                "interface{}".to_string()
            } else {
                "interface{...}".to_string()
            }
        }
        _ => parsed
            .node_text(node)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}
