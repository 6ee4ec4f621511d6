//! Fact structures extracted from AST analysis.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Function,
    Method,
    Struct,
    Interface,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Method => "method",
            DeclarationKind::Struct => "struct",
            DeclarationKind::Interface => "interface",
        }
    }

    /// Check if this is a callable (function or method).
    pub fn is_callable(&self) -> bool {
        matches!(self, DeclarationKind::Function | DeclarationKind::Method)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter and result types of a callable, rendered as Go type strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// One entry per declared parameter (`a, b int` yields two entries).
    pub params: Vec<String>,
    /// One entry per result.
    pub results: Vec<String>,
}

impl Signature {
    /// Render as `(params) results`, the way Go prints a func type without the keyword.
    pub fn render(&self) -> String {
        format!("({}){}", self.params.join(", "), results_suffix(&self.results))
    }
}

/// Format a result list the way Go source writes it after the parameter list.
pub fn results_suffix(results: &[String]) -> String {
    match results.len() {
        0 => String::new(),
        1 => format!(" {}", results[0]),
        _ => format!(" ({})", results.join(", ")),
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name. For embedded fields this is the embedded type's name.
    pub name: String,
    /// Field type as a Go type string.
    pub type_string: String,
    /// Raw struct tag, including the quotes.
    pub tag: Option<String>,
    /// Whether the field is embedded.
    pub embedded: bool,
}

/// A method listed in an interface body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub signature: Signature,
}

/// A declaration extracted from source code.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The declaration name.
    pub name: String,
    /// The kind of declaration.
    pub kind: DeclarationKind,
    /// Source span for the entire declaration.
    pub span: Span,
    /// For methods: the receiver type (e.g., "Config" for `func (c *Config) Validate()`).
    pub receiver: Option<String>,
    /// Whether the name is exported (starts with an upper-case letter).
    pub exported: bool,
    /// Callable signature (functions and methods).
    pub signature: Option<Signature>,
    /// Control flow of the body (functions and methods that have one).
    pub control_flow: Option<ControlFlowInfo>,
    /// Struct fields.
    pub fields: Vec<Field>,
    /// Interface methods.
    pub methods: Vec<MethodSpec>,
    /// Interface embedded types and type-set elements.
    pub embedded: Vec<String>,
}

impl Declaration {
    /// Get the fully qualified name (receiver.name for methods).
    pub fn qualified_name(&self) -> String {
        if let Some(ref recv) = self.receiver {
            format!("{}.{}", recv, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Cyclomatic complexity of the body. Declarations without a body score 1.
    pub fn complexity(&self) -> u32 {
        self.control_flow
            .as_ref()
            .map(ControlFlowInfo::cyclomatic_complexity)
            .unwrap_or(1)
    }
}

/// Control flow information for cyclomatic complexity calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFlowInfo {
    /// Number of if statements (each `else if` is its own statement).
    pub if_count: usize,
    /// Number of for statements, range loops included.
    pub loop_count: usize,
    /// Number of expression and type switch statements.
    pub switch_count: usize,
    /// Number of switch case clauses, `default` included.
    pub case_count: usize,
}

impl ControlFlowInfo {
    /// Calculate cyclomatic complexity.
    ///
    /// CC = 1 + if + for + switch + case. Boolean operators inside conditions
    /// are not counted, and neither are `select` statements or their clauses.
    pub fn cyclomatic_complexity(&self) -> u32 {
        let decision_points =
            self.if_count + self.loop_count + self.switch_count + self.case_count;

        1 + decision_points as u32
    }
}

/// An import declaration.
#[derive(Debug, Clone)]
pub struct Import {
    /// The import path.
    pub path: String,
    /// Optional alias (e.g., `import foo "bar"` -> alias is "foo").
    pub alias: Option<String>,
    /// Source span.
    pub span: Span,
}

/// All facts extracted from a single file.
#[derive(Debug, Clone)]
pub struct FileFacts {
    /// File path.
    pub path: String,
    /// Language identifier.
    pub language: String,
    /// Package name from the package clause.
    pub package: Option<String>,
    /// All declarations in the file, in source order.
    pub declarations: Vec<Declaration>,
    /// All imports in the file, sorted by path.
    pub imports: Vec<Import>,
    /// Number of lines in the file.
    pub line_count: usize,
    /// Whether the file had parse errors.
    pub has_parse_errors: bool,
    /// Parse error message (if any).
    pub parse_error: Option<String>,
}

impl FileFacts {
    /// Find a declaration by name.
    pub fn find_declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Iterate over functions and methods.
    pub fn callables(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.kind.is_callable())
    }

    /// Iterate over declarations of one kind.
    pub fn of_kind(&self, kind: DeclarationKind) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.kind == kind)
    }

    /// Whether the file is an executable entry point (`package main` with `func main()`).
    pub fn declares_entry_point(&self) -> bool {
        self.package.as_deref() == Some("main")
            && self.declarations.iter().any(|d| {
                d.kind == DeclarationKind::Function
                    && d.name == "main"
                    && d.signature
                        .as_ref()
                        .map(|s| s.params.is_empty() && s.results.is_empty())
                        .unwrap_or(false)
            })
    }
}

/// Go's exported-identifier rule: the first character is an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Count lines the way editors do: a trailing newline does not start a new line.
pub fn count_lines(source: &[u8]) -> usize {
    if source.is_empty() {
        return 0;
    }
    let newlines = source.iter().filter(|b| **b == b'\n').count();
    if source.ends_with(b"\n") {
        newlines
    } else {
        newlines + 1
    }
}
