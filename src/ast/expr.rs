use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::error::{merge_spans, Span};

use super::{AstNode, DataType, Ident, ObjectName, OrderByExpr, Query};

/// An expression node. The kind carries the shape; the span is auxiliary and
/// is ignored by serde-based structural comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind, span: None }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner, strum::AsRefStr)]
pub enum ExprKind {
    /// A plain column or table name
    Ident(Ident),
    /// A `.`-separated name, e.g. `table_alias.column` or `db.schema.col`.
    /// Always has at least one part.
    CompoundIdent(Vec<Ident>),
    /// Unqualified `*`. SQL allows this in limited contexts (right after
    /// `SELECT`, or inside an aggregate such as `COUNT(*)`); the parser
    /// accepts it wherever an expression may start and leaves the rest to
    /// the caller.
    Wildcard,
    /// Qualified `*`, e.g. `alias.*`. Always has at least one qualifier.
    QualifiedWildcard(Vec<Ident>),
    Value(Value),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expr>,
    },
    /// `expr IS [NOT] NULL`
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    /// `expr [NOT] IN (val1, val2, ...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `expr [NOT] IN (SELECT ...)`; the right side is always a full query
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<Query>,
        negated: bool,
    },
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `CAST(expr AS type)` and the PostgreSQL spelling `expr::type`
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },
    /// A parenthesised expression, e.g. `(foo > bar)`
    Nested(Box<Expr>),
    Function(Function),
    Case(Case),
    /// `[NOT] EXISTS (SELECT ...)`; always embeds a full query
    Exists {
        negated: bool,
        query: Box<Query>,
    },
    /// A parenthesised sub-query used as a value, e.g. `SELECT (subquery) AS x`
    Subquery(Box<Query>),
}

impl AstNode for Expr {
    fn span(&self) -> Option<Span> {
        use ExprKind::*;
        if self.span.is_some() {
            return self.span;
        }
        // Derive from the children when the node itself was built by hand.
        match &self.kind {
            Ident(ident) => ident.span,
            CompoundIdent(idents) | QualifiedWildcard(idents) => {
                idents.iter().fold(None, |acc, i| merge_spans(acc, i.span))
            }
            BinaryOp { left, right, .. } => merge_spans(left.span(), right.span()),
            UnaryOp { expr, .. } | Nested(expr) | IsNull { expr, .. } => expr.span(),
            Between { expr, high, .. } => merge_spans(expr.span(), high.span()),
            Cast { expr, .. } => expr.span(),
            Function(function) => function.span,
            _ => None,
        }
    }
}

/// A literal value.
///
/// Numbers keep their parsed representation: a lexeme with a `.` becomes
/// [Value::Double], anything else [Value::Long]. The date/time members hold
/// the raw string of a typed literal such as `DATE '2023-01-02'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Value {
    Long(i64),
    Double(f64),
    SingleQuotedString(String),
    NationalStringLiteral(String),
    Boolean(bool),
    Date(String),
    Time(String),
    Timestamp(String),
    Null,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum BinaryOperator {
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "-")]
    Minus,
    #[strum(to_string = "*")]
    Multiply,
    #[strum(to_string = "/")]
    Divide,
    #[strum(to_string = "%")]
    Modulus,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">=")]
    GtEq,
    #[strum(to_string = "<=")]
    LtEq,
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = "<>")]
    NotEq,
    #[strum(to_string = "AND")]
    And,
    #[strum(to_string = "OR")]
    Or,
    #[strum(to_string = "LIKE")]
    Like,
    #[strum(to_string = "NOT LIKE")]
    NotLike,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum UnaryOperator {
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "-")]
    Minus,
    #[strum(to_string = "NOT")]
    Not,
}

/// A function call, e.g. `COUNT(t1.id)`, optionally windowed with `OVER`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: ObjectName,
    pub args: Vec<Expr>,
    pub over: Option<WindowSpec>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// `CASE [operand] WHEN condition THEN result ... [ELSE else_result] END`.
///
/// Conditions and results are kept in matching order; only a complete single
/// expression is recognised as a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub operand: Option<Box<Expr>>,
    pub conditions: Vec<Expr>,
    pub results: Vec<Expr>,
    pub else_result: Option<Box<Expr>>,
}

/// A window specification, i.e. the inside of `OVER (...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub window_frame: Option<WindowFrame>,
}

/// The rows considered by a window function, e.g.
/// `RANGE UNBOUNDED PRECEDING` or `ROWS BETWEEN 5 PRECEDING AND CURRENT ROW`.
///
/// `end_bound` is `None` exactly when the `BETWEEN .. AND ..` form was not
/// used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFrame {
    pub units: WindowFrameUnits,
    pub start_bound: WindowFrameBound,
    pub end_bound: Option<WindowFrameBound>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum WindowFrameUnits {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFrameBound {
    /// `CURRENT ROW`
    CurrentRow,
    /// `<N> PRECEDING` or, with `None`, `UNBOUNDED PRECEDING`
    Preceding(Option<u64>),
    /// `<N> FOLLOWING` or, with `None`, `UNBOUNDED FOLLOWING`
    Following(Option<u64>),
}

impl AstNode for Value {
    fn span(&self) -> Option<Span> {
        None
    }
}

impl AstNode for WindowSpec {
    fn span(&self) -> Option<Span> {
        let partition = self
            .partition_by
            .iter()
            .fold(None, |acc, e| merge_spans(acc, e.span()));
        self.order_by
            .iter()
            .fold(partition, |acc, o| merge_spans(acc, o.span()))
    }
}

impl AstNode for WindowFrame {
    fn span(&self) -> Option<Span> {
        None
    }
}
