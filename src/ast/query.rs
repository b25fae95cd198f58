use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::error::{merge_spans, Span};

use super::{AstNode, Expr, Ident, ObjectName};

/// A complete query: optional CTE list, a body, then optional ORDER BY and
/// LIMIT/OFFSET clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub ctes: Vec<Cte>,
    pub body: SetExpr,
    pub order_by: Vec<OrderByExpr>,
    pub limit: Option<Limit>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// `LIMIT { ALL | n } [OFFSET n]`.
///
/// Both `LIMIT ALL` and `LIMIT ALL OFFSET n` are valid PostgreSQL, so the
/// combination is preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub all: bool,
    pub quantity: Option<Box<Expr>>,
    pub offset: Option<Box<Expr>>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// A named sub-query bound by `WITH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub name: Ident,
    pub query: Box<Query>,
}

/// A query body: a plain `SELECT`, a parenthesised query, or a set operation
/// combining two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum SetExpr {
    Select(Box<Select>),
    Query(Box<Query>),
    SetOperation {
        op: SetOperator,
        all: bool,
        left: Box<SetExpr>,
        right: Box<SetExpr>,
    },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SetOperator {
    Union,
    Except,
    Intersect,
}

/// One `SELECT` clause group: projection, FROM, WHERE, GROUP BY, HAVING.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableReference>,
    pub selection: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// One element of the projection list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum SelectItem {
    /// An expression without an alias
    UnnamedExpr(Expr),
    /// `expr AS alias` (or with the `AS` elided)
    ExprWithAlias { expr: Expr, alias: Ident },
    /// `alias.*`
    QualifiedWildcard(Vec<Ident>),
    /// A plain `*`
    Wildcard,
}

/// Anything that yields a logical table within a FROM clause: a plain table,
/// a derived sub-query, or a join tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum TableReference {
    Table(Table),
    Derived(Derived),
    QualifiedJoin(QualifiedJoin),
    NaturalJoin(NaturalJoin),
    CrossJoin(CrossJoin),
}

/// A named table, optionally aliased, with table-function arguments and
/// table hints where the dialect allows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: ObjectName,
    pub alias: Option<Ident>,
    pub args: Vec<Expr>,
    pub with_hints: Vec<Expr>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// `[LATERAL] (subquery) [AS alias]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub lateral: bool,
    pub subquery: Box<Query>,
    pub alias: Option<Ident>,
    #[serde(skip)]
    pub span: Option<Span>,
}

/// A join with an explicit specification, or the implicit join produced by a
/// comma-separated FROM list (join type [JoinType::Implicit], no spec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedJoin {
    pub left: Box<TableReference>,
    pub join_type: JoinType,
    pub right: Box<TableReference>,
    pub spec: Option<JoinSpec>,
}

/// `left NATURAL [join type] JOIN right`; natural joins take a type but no
/// specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalJoin {
    pub left: Box<TableReference>,
    pub join_type: JoinType,
    pub right: Box<TableReference>,
}

/// `reference CROSS JOIN factor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossJoin {
    pub reference: Box<TableReference>,
    pub factor: Box<TableReference>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum JoinType {
    #[strum(to_string = "INNER")]
    Inner,
    #[strum(to_string = "LEFT")]
    Left,
    #[strum(to_string = "LEFT OUTER")]
    LeftOuter,
    #[strum(to_string = "RIGHT")]
    Right,
    #[strum(to_string = "RIGHT OUTER")]
    RightOuter,
    #[strum(to_string = "FULL")]
    Full,
    #[strum(to_string = "FULL OUTER")]
    FullOuter,
    /// The join type of a comma-separated FROM list
    #[strum(to_string = "IMPLICIT")]
    Implicit,
}

/// `ON expr` or `USING (column, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum JoinSpec {
    On(Expr),
    Using(Vec<Ident>),
}

/// One `ORDER BY` element; `asc` is `None` when no direction was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub asc: Option<bool>,
}

impl AstNode for Query {
    fn span(&self) -> Option<Span> {
        if self.span.is_some() {
            return self.span;
        }
        let ctes = self.ctes.iter().fold(None, |acc, c| merge_spans(acc, c.span()));
        merge_spans(ctes, self.body.span())
    }
}

impl AstNode for Limit {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

impl AstNode for Cte {
    fn span(&self) -> Option<Span> {
        merge_spans(self.name.span, self.query.span())
    }
}

impl AstNode for SetExpr {
    fn span(&self) -> Option<Span> {
        match self {
            SetExpr::Select(select) => select.span(),
            SetExpr::Query(query) => query.span(),
            SetExpr::SetOperation { left, right, .. } => merge_spans(left.span(), right.span()),
        }
    }
}

impl AstNode for Select {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

impl AstNode for SelectItem {
    fn span(&self) -> Option<Span> {
        match self {
            SelectItem::UnnamedExpr(expr) => expr.span(),
            SelectItem::ExprWithAlias { expr, alias } => merge_spans(expr.span(), alias.span),
            SelectItem::QualifiedWildcard(idents) => {
                idents.iter().fold(None, |acc, i| merge_spans(acc, i.span))
            }
            SelectItem::Wildcard => None,
        }
    }
}

impl AstNode for TableReference {
    fn span(&self) -> Option<Span> {
        match self {
            TableReference::Table(table) => table.span,
            TableReference::Derived(derived) => derived.span,
            TableReference::QualifiedJoin(join) => merge_spans(join.left.span(), join.right.span()),
            TableReference::NaturalJoin(join) => merge_spans(join.left.span(), join.right.span()),
            TableReference::CrossJoin(join) => {
                merge_spans(join.reference.span(), join.factor.span())
            }
        }
    }
}

impl AstNode for JoinSpec {
    fn span(&self) -> Option<Span> {
        match self {
            JoinSpec::On(expr) => expr.span(),
            JoinSpec::Using(idents) => {
                idents.iter().fold(None, |acc, i| merge_spans(acc, i.span))
            }
        }
    }
}

impl AstNode for OrderByExpr {
    fn span(&self) -> Option<Span> {
        self.expr.span()
    }
}

impl AstNode for JoinType {
    fn span(&self) -> Option<Span> {
        None
    }
}
