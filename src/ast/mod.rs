//! The SQL abstract syntax tree.
//!
//! Each syntactic category is a closed sum type; shared behaviour is the
//! [AstNode] trait, which every concrete node implements: it renders itself
//! back to SQL (via [std::fmt::Display], implemented in the codegen module)
//! and reports its source span. Spans are auxiliary: they are skipped by
//! serde, so the serialized form of two trees is equal exactly when the
//! trees are structurally equal.

use serde::{Deserialize, Serialize};

use crate::error::{merge_spans, Span};

pub use self::expr::*;
pub use self::node::*;
pub use self::query::*;
pub use self::stmt::*;
pub use self::types::DataType;

mod expr;
mod node;
mod query;
pub mod rewrite;
mod stmt;
mod types;
pub mod visitor;

/// Shared behaviour of every concrete AST node: faithful SQL re-rendering
/// and span reporting. A node's span is derived from its own stored
/// positions and those of its children; hand-built nodes may report `None`.
pub trait AstNode: std::fmt::Display {
    fn span(&self) -> Option<Span>;

    /// The SQL fragment this node represents.
    fn to_sql(&self) -> String {
        self.to_string()
    }
}

/// An identifier, with its original quoting preserved (`None` for a bare
/// word, or the opening quote character).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub value: String,
    pub quote_style: Option<char>,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl Ident {
    /// An unquoted identifier without a position, for building trees by hand.
    pub fn new<S: Into<String>>(value: S) -> Self {
        Ident {
            value: value.into(),
            quote_style: None,
            span: None,
        }
    }

    pub fn with_quote<S: Into<String>>(quote: char, value: S) -> Self {
        Ident {
            value: value.into(),
            quote_style: Some(quote),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

impl AstNode for Ident {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

/// A possibly multi-part name of a table, view, index or custom type,
/// e.g. `db.schema.obj`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectName(pub Vec<Ident>);

impl ObjectName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ObjectName(vec![Ident::new(name)])
    }
}

impl AstNode for ObjectName {
    fn span(&self) -> Option<Span> {
        self.0.iter().fold(None, |acc, i| merge_spans(acc, i.span))
    }
}

/// A parsed source: statements in source order plus, when comment retention
/// is enabled, the comment groups in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct File {
    pub stmts: Vec<Statement>,
    pub comments: Vec<CommentGroup>,
}

impl AstNode for File {
    fn span(&self) -> Option<Span> {
        self.stmts
            .iter()
            .fold(None, |acc, s| merge_spans(acc, s.span()))
    }
}

/// One retained comment. The text excludes the `--` or `/* */` markers; a
/// line comment keeps its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl Comment {
    /// Whether this is a `--` comment that consumed its line ending. Only
    /// line comments merge into multi-comment groups.
    pub fn is_line(&self) -> bool {
        self.text.ends_with('\n') && self.span.map_or(true, |s| s.end.column == 0)
    }
}

/// A run of adjacent single-line comments not separated by a blank line (or
/// a single block comment), forming one attachment unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn span(&self) -> Option<Span> {
        self.comments
            .iter()
            .fold(None, |acc, c| merge_spans(acc, c.span))
    }

    /// The last source line this group occupies, not counting a trailing
    /// newline consumed by a line comment.
    pub fn last_line(&self) -> Option<usize> {
        let last = self.comments.last()?;
        let span = last.span?;
        Some(if last.is_line() {
            span.end.line.saturating_sub(1)
        } else {
            span.end.line
        })
    }

    /// Concatenated text of the group, for callers that want the prose.
    pub fn text(&self) -> String {
        self.comments.iter().map(|c| c.text.as_str()).collect()
    }
}
