use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::error::{merge_spans, Span};

use super::{AstNode, DataType, Expr, Ident, ObjectName, Query};

/// A top-level statement. Like [super::Expr], a thin wrapper pairing the
/// kind with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Statement { kind, span: None }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
}

impl From<StatementKind> for Statement {
    fn from(kind: StatementKind) -> Self {
        Statement::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner, strum::AsRefStr)]
pub enum StatementKind {
    Query(Box<Query>),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    CreateTable(CreateTable),
    CreateView(CreateView),
    CreateIndex(CreateIndex),
    DropTable(DropTable),
    DropIndex(DropIndex),
    AlterTable(AlterTable),
    /// `EXPLAIN <statement>`
    Explain(Box<Statement>),
}

impl AstNode for Statement {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

/// `INSERT INTO table [(columns)] { VALUES ... | query }
/// [ON DUPLICATE KEY UPDATE assignments]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table_name: ObjectName,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    /// MySQL's upsert clause; empty when not present
    pub on_duplicate_update: Vec<Assignment>,
}

/// The rows fed into an INSERT: either a `VALUES` constructor or a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum InsertSource {
    /// `VALUES (a, b), (c, d), ...`
    Values(Vec<Vec<Expr>>),
    Subquery(Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table_name: ObjectName,
    pub assignments: Vec<Assignment>,
    pub selection: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table_name: ObjectName,
    pub selection: Option<Expr>,
}

/// `column = expr`, as used by UPDATE and ON DUPLICATE KEY UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Ident,
    pub value: Expr,
}

/// `CREATE TABLE name (elements)`. Elements keep their source order so that
/// comments can be attached per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub name: ObjectName,
    pub elements: Vec<TableElement>,
}

/// One parenthesised element of a CREATE TABLE: a column definition or a
/// table-level constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum TableElement {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

impl AstNode for TableElement {
    fn span(&self) -> Option<Span> {
        match self {
            TableElement::Column(column) => column.span,
            TableElement::Constraint(constraint) => constraint.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: Ident,
    pub data_type: DataType,
    pub default: Option<Expr>,
    pub constraints: Vec<ColumnConstraint>,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl AstNode for ColumnDef {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

/// A single column constraint, optionally named with `CONSTRAINT name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConstraint {
    pub name: Option<Ident>,
    pub spec: ColumnConstraintSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum ColumnConstraintSpec {
    NotNull,
    Unique,
    PrimaryKey,
    References {
        table: ObjectName,
        columns: Vec<Ident>,
    },
    Check(Expr),
}

/// A table-level constraint, optionally named with `CONSTRAINT name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub spec: TableConstraintSpec,
    #[serde(skip)]
    pub span: Option<Span>,
}

impl AstNode for TableConstraint {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum TableConstraintSpec {
    /// `UNIQUE (columns)` or, with `is_primary`, `PRIMARY KEY (columns)`
    Unique {
        columns: Vec<Ident>,
        is_primary: bool,
    },
    /// `FOREIGN KEY (columns) REFERENCES table (referred_columns)`
    ForeignKey {
        columns: Vec<Ident>,
        table: ObjectName,
        referred_columns: Vec<Ident>,
    },
    Check(Expr),
}

/// `CREATE [MATERIALIZED] VIEW name AS query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateView {
    pub name: ObjectName,
    pub materialized: bool,
    pub query: Box<Query>,
}

/// `CREATE [UNIQUE] INDEX [name] ON table [USING method] (columns)
/// [WHERE predicate]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
    pub name: Option<ObjectName>,
    pub table_name: ObjectName,
    pub unique: bool,
    pub method: Option<Ident>,
    pub columns: Vec<Ident>,
    pub selection: Option<Expr>,
}

/// `DROP TABLE [IF EXISTS] names [CASCADE]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub names: Vec<ObjectName>,
    pub if_exists: bool,
    pub cascade: bool,
}

/// `DROP INDEX names`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndex {
    pub names: Vec<ObjectName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub name: ObjectName,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum AlterTableAction {
    AddColumn(ColumnDef),
    AddConstraint(TableConstraint),
    DropConstraint {
        name: Ident,
        cascade: bool,
    },
    DropColumn {
        name: Ident,
        cascade: bool,
    },
    AlterColumn {
        column: Ident,
        action: AlterColumnAction,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum AlterColumnAction {
    SetDefault(Expr),
    DropDefault,
    SetNotNull,
    DropNotNull,
    /// `ALTER COLUMN c TYPE t`
    SetDataType(DataType),
}

impl AstNode for AlterTableAction {
    fn span(&self) -> Option<Span> {
        match self {
            AlterTableAction::AddColumn(column) => column.span,
            AlterTableAction::AddConstraint(constraint) => constraint.span,
            AlterTableAction::DropConstraint { name, .. }
            | AlterTableAction::DropColumn { name, .. } => name.span,
            AlterTableAction::AlterColumn { column, action } => {
                merge_spans(column.span, action.span())
            }
        }
    }
}

impl AstNode for AlterColumnAction {
    fn span(&self) -> Option<Span> {
        match self {
            AlterColumnAction::SetDefault(expr) => expr.span(),
            _ => None,
        }
    }
}

impl AstNode for Assignment {
    fn span(&self) -> Option<Span> {
        merge_spans(self.id.span, self.value.span())
    }
}

impl AstNode for ColumnConstraint {
    fn span(&self) -> Option<Span> {
        let name = self.name.as_ref().and_then(|n| n.span);
        match &self.spec {
            ColumnConstraintSpec::Check(expr) => merge_spans(name, expr.span()),
            ColumnConstraintSpec::References { table, .. } => merge_spans(name, table.span()),
            _ => name,
        }
    }
}

impl AstNode for InsertSource {
    fn span(&self) -> Option<Span> {
        match self {
            InsertSource::Values(rows) => rows
                .iter()
                .flatten()
                .fold(None, |acc, e| merge_spans(acc, e.span())),
            InsertSource::Subquery(query) => query.span(),
        }
    }
}
