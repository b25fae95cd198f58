//! A uniform view over the AST for traversal and rewriting.
//!
//! Every syntactic category is a member of the [Node] union, with borrowed
//! ([NodeRef]) and mutable ([NodeMut]) counterparts and a [NodeKind] tag.
//! [NodeRef::children] enumerates each node's semantically relevant
//! children in declaration order; leaves (identifiers, values, type
//! tokens, join types) enumerate nothing.

use super::*;

/// Conversions between a concrete node type and the [Node] union.
pub trait AsNode: Sized + Into<Node> {
    const KIND: NodeKind;

    fn as_node_ref(&self) -> NodeRef<'_>;
    fn as_node_mut(&mut self) -> NodeMut<'_>;
    /// Unwrap a union value back into this type; hands the value back when
    /// the category does not match.
    fn from_node(node: Node) -> Result<Self, Node>;
}

macro_rules! node_union {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// An owned AST node of any category.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Node {
            $($variant($ty)),+
        }

        /// The category tag of a node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
        pub enum NodeKind {
            $($variant),+
        }

        /// A borrowed AST node of any category.
        #[derive(Debug, Clone, Copy)]
        pub enum NodeRef<'a> {
            $($variant(&'a $ty)),+
        }

        /// A mutably borrowed AST node of any category.
        #[derive(Debug)]
        pub enum NodeMut<'a> {
            $($variant(&'a mut $ty)),+
        }

        impl Node {
            pub fn kind(&self) -> NodeKind {
                match self { $(Node::$variant(_) => NodeKind::$variant),+ }
            }

            pub fn as_ref(&self) -> NodeRef<'_> {
                match self { $(Node::$variant(inner) => NodeRef::$variant(inner)),+ }
            }
        }

        impl<'a> NodeRef<'a> {
            pub fn kind(self) -> NodeKind {
                match self { $(NodeRef::$variant(_) => NodeKind::$variant),+ }
            }
        }

        impl<'a> NodeMut<'a> {
            pub fn kind(&self) -> NodeKind {
                match self { $(NodeMut::$variant(_) => NodeKind::$variant),+ }
            }

            /// Downgrade to a shared view.
            pub fn reborrow(&self) -> NodeRef<'_> {
                match self { $(NodeMut::$variant(inner) => NodeRef::$variant(inner)),+ }
            }
        }

        $(
            impl From<$ty> for Node {
                fn from(node: $ty) -> Node {
                    Node::$variant(node)
                }
            }

            impl<'a> From<&'a $ty> for NodeRef<'a> {
                fn from(node: &'a $ty) -> NodeRef<'a> {
                    NodeRef::$variant(node)
                }
            }

            impl AsNode for $ty {
                const KIND: NodeKind = NodeKind::$variant;

                fn as_node_ref(&self) -> NodeRef<'_> {
                    NodeRef::$variant(self)
                }

                fn as_node_mut(&mut self) -> NodeMut<'_> {
                    NodeMut::$variant(self)
                }

                fn from_node(node: Node) -> Result<Self, Node> {
                    match node {
                        Node::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

node_union!(
    File => File,
    Statement => Statement,
    Query => Query,
    Cte => Cte,
    SetExpr => SetExpr,
    Select => Select,
    SelectItem => SelectItem,
    TableReference => TableReference,
    JoinType => JoinType,
    JoinSpec => JoinSpec,
    OrderByExpr => OrderByExpr,
    Limit => Limit,
    Expr => Expr,
    Value => Value,
    WindowSpec => WindowSpec,
    WindowFrame => WindowFrame,
    Ident => Ident,
    ObjectName => ObjectName,
    DataType => DataType,
    TableElement => TableElement,
    ColumnDef => ColumnDef,
    ColumnConstraint => ColumnConstraint,
    TableConstraint => TableConstraint,
    AlterTableAction => AlterTableAction,
    AlterColumnAction => AlterColumnAction,
    Assignment => Assignment,
    InsertSource => InsertSource,
);

impl<'a> NodeRef<'a> {
    /// Every semantically relevant child, left to right in declaration
    /// order. Must stay in lockstep with the mutable walk in
    /// [super::rewrite].
    pub fn children(self) -> Vec<NodeRef<'a>> {
        let mut out: Vec<NodeRef<'a>> = Vec::new();
        match self {
            NodeRef::File(file) => {
                out.extend(file.stmts.iter().map(NodeRef::Statement));
            }
            NodeRef::Statement(stmt) => match &stmt.kind {
                StatementKind::Query(query) => out.push(NodeRef::Query(query)),
                StatementKind::Insert(insert) => {
                    out.push(NodeRef::ObjectName(&insert.table_name));
                    out.extend(insert.columns.iter().map(NodeRef::Ident));
                    out.push(NodeRef::InsertSource(&insert.source));
                    out.extend(insert.on_duplicate_update.iter().map(NodeRef::Assignment));
                }
                StatementKind::Update(update) => {
                    out.push(NodeRef::ObjectName(&update.table_name));
                    out.extend(update.assignments.iter().map(NodeRef::Assignment));
                    out.extend(update.selection.iter().map(NodeRef::Expr));
                }
                StatementKind::Delete(delete) => {
                    out.push(NodeRef::ObjectName(&delete.table_name));
                    out.extend(delete.selection.iter().map(NodeRef::Expr));
                }
                StatementKind::CreateTable(create) => {
                    out.push(NodeRef::ObjectName(&create.name));
                    out.extend(create.elements.iter().map(NodeRef::TableElement));
                }
                StatementKind::CreateView(create) => {
                    out.push(NodeRef::ObjectName(&create.name));
                    out.push(NodeRef::Query(&create.query));
                }
                StatementKind::CreateIndex(create) => {
                    out.extend(create.name.iter().map(NodeRef::ObjectName));
                    out.push(NodeRef::ObjectName(&create.table_name));
                    out.extend(create.method.iter().map(NodeRef::Ident));
                    out.extend(create.columns.iter().map(NodeRef::Ident));
                    out.extend(create.selection.iter().map(NodeRef::Expr));
                }
                StatementKind::DropTable(drop) => {
                    out.extend(drop.names.iter().map(NodeRef::ObjectName));
                }
                StatementKind::DropIndex(drop) => {
                    out.extend(drop.names.iter().map(NodeRef::ObjectName));
                }
                StatementKind::AlterTable(alter) => {
                    out.push(NodeRef::ObjectName(&alter.name));
                    out.push(NodeRef::AlterTableAction(&alter.action));
                }
                StatementKind::Explain(inner) => out.push(NodeRef::Statement(inner)),
            },
            NodeRef::Query(query) => {
                out.extend(query.ctes.iter().map(NodeRef::Cte));
                out.push(NodeRef::SetExpr(&query.body));
                out.extend(query.order_by.iter().map(NodeRef::OrderByExpr));
                out.extend(query.limit.iter().map(NodeRef::Limit));
            }
            NodeRef::Cte(cte) => {
                out.push(NodeRef::Ident(&cte.name));
                out.push(NodeRef::Query(&cte.query));
            }
            NodeRef::SetExpr(body) => match body {
                SetExpr::Select(select) => out.push(NodeRef::Select(select)),
                SetExpr::Query(query) => out.push(NodeRef::Query(query)),
                SetExpr::SetOperation { left, right, .. } => {
                    out.push(NodeRef::SetExpr(left));
                    out.push(NodeRef::SetExpr(right));
                }
            },
            NodeRef::Select(select) => {
                out.extend(select.projection.iter().map(NodeRef::SelectItem));
                out.extend(select.from.iter().map(NodeRef::TableReference));
                out.extend(select.selection.iter().map(NodeRef::Expr));
                out.extend(select.group_by.iter().map(NodeRef::Expr));
                out.extend(select.having.iter().map(NodeRef::Expr));
            }
            NodeRef::SelectItem(item) => match item {
                SelectItem::UnnamedExpr(expr) => out.push(NodeRef::Expr(expr)),
                SelectItem::ExprWithAlias { expr, alias } => {
                    out.push(NodeRef::Expr(expr));
                    out.push(NodeRef::Ident(alias));
                }
                SelectItem::QualifiedWildcard(idents) => {
                    out.extend(idents.iter().map(NodeRef::Ident));
                }
                SelectItem::Wildcard => {}
            },
            NodeRef::TableReference(reference) => match reference {
                TableReference::Table(table) => {
                    out.push(NodeRef::ObjectName(&table.name));
                    out.extend(table.alias.iter().map(NodeRef::Ident));
                    out.extend(table.args.iter().map(NodeRef::Expr));
                    out.extend(table.with_hints.iter().map(NodeRef::Expr));
                }
                TableReference::Derived(derived) => {
                    out.push(NodeRef::Query(&derived.subquery));
                    out.extend(derived.alias.iter().map(NodeRef::Ident));
                }
                TableReference::QualifiedJoin(join) => {
                    out.push(NodeRef::TableReference(&join.left));
                    out.push(NodeRef::JoinType(&join.join_type));
                    out.push(NodeRef::TableReference(&join.right));
                    out.extend(join.spec.iter().map(NodeRef::JoinSpec));
                }
                TableReference::NaturalJoin(join) => {
                    out.push(NodeRef::TableReference(&join.left));
                    out.push(NodeRef::JoinType(&join.join_type));
                    out.push(NodeRef::TableReference(&join.right));
                }
                TableReference::CrossJoin(join) => {
                    out.push(NodeRef::TableReference(&join.reference));
                    out.push(NodeRef::TableReference(&join.factor));
                }
            },
            NodeRef::JoinType(_) => {}
            NodeRef::JoinSpec(spec) => match spec {
                JoinSpec::On(expr) => out.push(NodeRef::Expr(expr)),
                JoinSpec::Using(idents) => out.extend(idents.iter().map(NodeRef::Ident)),
            },
            NodeRef::OrderByExpr(order_by) => out.push(NodeRef::Expr(&order_by.expr)),
            NodeRef::Limit(limit) => {
                out.extend(limit.quantity.iter().map(|e| NodeRef::Expr(e)));
                out.extend(limit.offset.iter().map(|e| NodeRef::Expr(e)));
            }
            NodeRef::Expr(expr) => match &expr.kind {
                ExprKind::Ident(ident) => out.push(NodeRef::Ident(ident)),
                ExprKind::CompoundIdent(idents) | ExprKind::QualifiedWildcard(idents) => {
                    out.extend(idents.iter().map(NodeRef::Ident));
                }
                ExprKind::Wildcard => {}
                ExprKind::Value(value) => out.push(NodeRef::Value(value)),
                ExprKind::BinaryOp { left, right, .. } => {
                    out.push(NodeRef::Expr(left));
                    out.push(NodeRef::Expr(right));
                }
                ExprKind::UnaryOp { expr, .. } | ExprKind::Nested(expr) => {
                    out.push(NodeRef::Expr(expr));
                }
                ExprKind::IsNull { expr, .. } => out.push(NodeRef::Expr(expr)),
                ExprKind::InList { expr, list, .. } => {
                    out.push(NodeRef::Expr(expr));
                    out.extend(list.iter().map(NodeRef::Expr));
                }
                ExprKind::InSubquery { expr, subquery, .. } => {
                    out.push(NodeRef::Expr(expr));
                    out.push(NodeRef::Query(subquery));
                }
                ExprKind::Between {
                    expr, low, high, ..
                } => {
                    out.push(NodeRef::Expr(expr));
                    out.push(NodeRef::Expr(low));
                    out.push(NodeRef::Expr(high));
                }
                ExprKind::Cast { expr, data_type } => {
                    out.push(NodeRef::Expr(expr));
                    out.push(NodeRef::DataType(data_type));
                }
                ExprKind::Function(function) => {
                    out.push(NodeRef::ObjectName(&function.name));
                    out.extend(function.args.iter().map(NodeRef::Expr));
                    out.extend(function.over.iter().map(NodeRef::WindowSpec));
                }
                ExprKind::Case(case) => {
                    out.extend(case.operand.iter().map(|e| NodeRef::Expr(e)));
                    out.extend(case.conditions.iter().map(NodeRef::Expr));
                    out.extend(case.results.iter().map(NodeRef::Expr));
                    out.extend(case.else_result.iter().map(|e| NodeRef::Expr(e)));
                }
                ExprKind::Exists { query, .. } | ExprKind::Subquery(query) => {
                    out.push(NodeRef::Query(query));
                }
            },
            NodeRef::Value(_) => {}
            NodeRef::WindowSpec(spec) => {
                out.extend(spec.partition_by.iter().map(NodeRef::Expr));
                out.extend(spec.order_by.iter().map(NodeRef::OrderByExpr));
                out.extend(spec.window_frame.iter().map(NodeRef::WindowFrame));
            }
            NodeRef::WindowFrame(_) => {}
            NodeRef::Ident(_) => {}
            NodeRef::ObjectName(name) => out.extend(name.0.iter().map(NodeRef::Ident)),
            NodeRef::DataType(data_type) => match data_type {
                DataType::Array(inner) => out.push(NodeRef::DataType(inner)),
                DataType::Custom(name) => out.push(NodeRef::ObjectName(name)),
                _ => {}
            },
            NodeRef::TableElement(element) => match element {
                TableElement::Column(column) => out.push(NodeRef::ColumnDef(column)),
                TableElement::Constraint(constraint) => {
                    out.push(NodeRef::TableConstraint(constraint));
                }
            },
            NodeRef::ColumnDef(column) => {
                out.push(NodeRef::Ident(&column.name));
                out.push(NodeRef::DataType(&column.data_type));
                out.extend(column.default.iter().map(NodeRef::Expr));
                out.extend(column.constraints.iter().map(NodeRef::ColumnConstraint));
            }
            NodeRef::ColumnConstraint(constraint) => {
                out.extend(constraint.name.iter().map(NodeRef::Ident));
                match &constraint.spec {
                    ColumnConstraintSpec::References { table, columns } => {
                        out.push(NodeRef::ObjectName(table));
                        out.extend(columns.iter().map(NodeRef::Ident));
                    }
                    ColumnConstraintSpec::Check(expr) => out.push(NodeRef::Expr(expr)),
                    _ => {}
                }
            }
            NodeRef::TableConstraint(constraint) => {
                out.extend(constraint.name.iter().map(NodeRef::Ident));
                match &constraint.spec {
                    TableConstraintSpec::Unique { columns, .. } => {
                        out.extend(columns.iter().map(NodeRef::Ident));
                    }
                    TableConstraintSpec::ForeignKey {
                        columns,
                        table,
                        referred_columns,
                    } => {
                        out.extend(columns.iter().map(NodeRef::Ident));
                        out.push(NodeRef::ObjectName(table));
                        out.extend(referred_columns.iter().map(NodeRef::Ident));
                    }
                    TableConstraintSpec::Check(expr) => out.push(NodeRef::Expr(expr)),
                }
            }
            NodeRef::AlterTableAction(action) => match action {
                AlterTableAction::AddColumn(column) => out.push(NodeRef::ColumnDef(column)),
                AlterTableAction::AddConstraint(constraint) => {
                    out.push(NodeRef::TableConstraint(constraint));
                }
                AlterTableAction::DropConstraint { name, .. }
                | AlterTableAction::DropColumn { name, .. } => out.push(NodeRef::Ident(name)),
                AlterTableAction::AlterColumn { column, action } => {
                    out.push(NodeRef::Ident(column));
                    out.push(NodeRef::AlterColumnAction(action));
                }
            },
            NodeRef::AlterColumnAction(action) => match action {
                AlterColumnAction::SetDefault(expr) => out.push(NodeRef::Expr(expr)),
                AlterColumnAction::SetDataType(data_type) => {
                    out.push(NodeRef::DataType(data_type));
                }
                _ => {}
            },
            NodeRef::Assignment(assignment) => {
                out.push(NodeRef::Ident(&assignment.id));
                out.push(NodeRef::Expr(&assignment.value));
            }
            NodeRef::InsertSource(source) => match source {
                InsertSource::Values(rows) => {
                    out.extend(rows.iter().flatten().map(NodeRef::Expr));
                }
                InsertSource::Subquery(query) => out.push(NodeRef::Query(query)),
            },
        }
        out
    }
}
