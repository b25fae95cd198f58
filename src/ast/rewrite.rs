//! In-place editing: depth-first traversal with a cursor that can replace
//! the current node, delete it from its parent list, or insert siblings
//! around it.
//!
//! List edits adjust the iteration step as part of the contract: a deleted
//! node's successor (now at the same index) is visited next, and inserted
//! nodes are never visited by the traversal that created them.

use crate::error::Error;

use super::node::{AsNode, Node, NodeKind, NodeMut, NodeRef};
use super::*;

/// What the traversal should do next, as told by a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    /// Prune: do not descend into children (and skip the post callback)
    Skip,
    /// Stop the whole traversal; edits made so far are kept
    Abort,
}

/// The editing handle passed to [apply] callbacks.
///
/// Mutations are recorded on the cursor and applied by the walker once the
/// callback returns; a replacement node must belong to the same category
/// as the slot, and delete/insert require a list slot.
pub struct Cursor<'a> {
    node: NodeMut<'a>,
    parent: Option<NodeKind>,
    name: &'static str,
    index: Option<usize>,
    action: Action,
}

#[derive(Default)]
struct Action {
    replace: Option<Node>,
    delete: bool,
    insert_before: Vec<Node>,
    insert_after: Vec<Node>,
}

impl<'a> Cursor<'a> {
    /// The node under the cursor.
    pub fn node(&self) -> NodeRef<'_> {
        self.node.reborrow()
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    /// The category of the parent node, or `None` at the root.
    pub fn parent(&self) -> Option<NodeKind> {
        self.parent
    }

    /// The field name of the slot within the parent.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The position within the parent list, or `None` for a scalar slot.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Replace the current node. The replacement must be of the slot's
    /// category.
    pub fn replace(&mut self, node: impl Into<Node>) {
        self.action.replace = Some(node.into());
    }

    /// Remove the current node from its parent list; the element that
    /// shifts into this index is visited next.
    pub fn delete(&mut self) {
        self.action.delete = true;
    }

    /// Insert a node before the current one; it is not revisited by this
    /// traversal.
    pub fn insert_before(&mut self, node: impl Into<Node>) {
        self.action.insert_before.push(node.into());
    }

    /// Insert a node after the current one; the traversal steps over it.
    pub fn insert_after(&mut self, node: impl Into<Node>) {
        self.action.insert_after.push(node.into());
    }
}

enum Break {
    Abort,
    Fail(Error),
}

/// Apply `pre` and `post` to every node under `root`, depth first. `pre`
/// runs before a node's children, `post` after them; [Flow::Skip] from
/// `pre` prunes both. Edits requested through the cursor are applied in
/// place. [Flow::Abort] ends the traversal early without error; a
/// mistyped replacement or a list edit in a scalar slot fails.
pub fn apply<T, Pre, Post>(root: &mut T, mut pre: Pre, mut post: Post) -> Result<(), Error>
where
    T: AsNode,
    Pre: FnMut(&mut Cursor) -> Flow,
    Post: FnMut(&mut Cursor) -> Flow,
{
    let mut walker = Walker {
        pre: &mut pre,
        post: &mut post,
    };
    match walker.slot(None, "", root) {
        Ok(()) | Err(Break::Abort) => Ok(()),
        Err(Break::Fail(error)) => Err(error),
    }
}

struct Walker<'f> {
    pre: &'f mut dyn FnMut(&mut Cursor) -> Flow,
    post: &'f mut dyn FnMut(&mut Cursor) -> Flow,
}

impl Walker<'_> {
    /// Visit a scalar slot.
    fn slot<T: AsNode>(
        &mut self,
        parent: Option<NodeKind>,
        name: &'static str,
        node: &mut T,
    ) -> Result<(), Break> {
        let (flow, action) = {
            let mut cursor = Cursor {
                node: node.as_node_mut(),
                parent,
                name,
                index: None,
                action: Action::default(),
            };
            let flow = (self.pre)(&mut cursor);
            (flow, cursor.action)
        };
        Self::apply_scalar_action(action, node, name)?;
        match flow {
            Flow::Abort => return Err(Break::Abort),
            Flow::Skip => return Ok(()),
            Flow::Continue => {}
        }
        walk_children(node.as_node_mut(), self)?;
        let (flow, action) = {
            let mut cursor = Cursor {
                node: node.as_node_mut(),
                parent,
                name,
                index: None,
                action: Action::default(),
            };
            let flow = (self.post)(&mut cursor);
            (flow, cursor.action)
        };
        Self::apply_scalar_action(action, node, name)?;
        if flow == Flow::Abort {
            return Err(Break::Abort);
        }
        Ok(())
    }

    fn apply_scalar_action<T: AsNode>(
        action: Action,
        node: &mut T,
        name: &'static str,
    ) -> Result<(), Break> {
        if action.delete || !action.insert_before.is_empty() || !action.insert_after.is_empty() {
            return Err(Break::Fail(Error::simple(format!(
                "cursor edits at slot {name:?} require a list context"
            ))));
        }
        if let Some(new) = action.replace {
            *node = Self::convert::<T>(new, name)?;
        }
        Ok(())
    }

    fn convert<T: AsNode>(node: Node, name: &'static str) -> Result<T, Break> {
        let kind = node.kind();
        T::from_node(node).map_err(|_| {
            Break::Fail(Error::simple(format!(
                "cannot put a {kind} node into the {} slot {name:?}",
                T::KIND
            )))
        })
    }

    /// Visit a list slot, applying edits with the step adjustments the
    /// cursor contract promises.
    fn list<T: AsNode>(
        &mut self,
        parent: NodeKind,
        name: &'static str,
        items: &mut Vec<T>,
    ) -> Result<(), Break> {
        let mut index = 0;
        while index < items.len() {
            let mut pending_after: Vec<Node> = Vec::new();

            let (flow, action) = {
                let mut cursor = Cursor {
                    node: items[index].as_node_mut(),
                    parent: Some(parent),
                    name,
                    index: Some(index),
                    action: Action::default(),
                };
                let flow = (self.pre)(&mut cursor);
                (flow, cursor.action)
            };
            let mut deleted =
                Self::apply_list_action(action, items, &mut index, &mut pending_after, name)?;

            if !deleted {
                match flow {
                    Flow::Abort => return Err(Break::Abort),
                    Flow::Skip => {}
                    Flow::Continue => {
                        walk_children(items[index].as_node_mut(), self)?;
                        let (flow, action) = {
                            let mut cursor = Cursor {
                                node: items[index].as_node_mut(),
                                parent: Some(parent),
                                name,
                                index: Some(index),
                                action: Action::default(),
                            };
                            let flow = (self.post)(&mut cursor);
                            (flow, cursor.action)
                        };
                        deleted = Self::apply_list_action(
                            action,
                            items,
                            &mut index,
                            &mut pending_after,
                            name,
                        )?;
                        if flow == Flow::Abort {
                            return Err(Break::Abort);
                        }
                    }
                }
            }

            if !deleted {
                index += 1;
            }
            // Inserted-after nodes land behind the (possibly removed)
            // current element and are stepped over.
            for node in pending_after {
                items.insert(index, Self::convert::<T>(node, name)?);
                index += 1;
            }
        }
        Ok(())
    }

    /// Apply one callback's recorded edits to the list. Inserts before the
    /// current element shift the index so nothing is revisited; a delete
    /// reports back so the caller keeps the index in place.
    fn apply_list_action<T: AsNode>(
        action: Action,
        items: &mut Vec<T>,
        index: &mut usize,
        pending_after: &mut Vec<Node>,
        name: &'static str,
    ) -> Result<bool, Break> {
        for node in action.insert_before {
            items.insert(*index, Self::convert::<T>(node, name)?);
            *index += 1;
        }
        if let Some(new) = action.replace {
            items[*index] = Self::convert::<T>(new, name)?;
        }
        pending_after.extend(action.insert_after);
        if action.delete {
            items.remove(*index);
            return Ok(true);
        }
        Ok(false)
    }
}

/// Walk the children of one node through the walker. Slot names and order
/// mirror [NodeRef::children].
fn walk_children(node: NodeMut<'_>, w: &mut Walker<'_>) -> Result<(), Break> {
    use NodeKind as K;
    match node {
        NodeMut::File(file) => {
            w.list(K::File, "stmts", &mut file.stmts)?;
        }
        NodeMut::Statement(stmt) => match &mut stmt.kind {
            StatementKind::Query(query) => {
                w.slot(Some(K::Statement), "query", &mut **query)?;
            }
            StatementKind::Insert(insert) => {
                w.slot(Some(K::Statement), "table_name", &mut insert.table_name)?;
                w.list(K::Statement, "columns", &mut insert.columns)?;
                w.slot(Some(K::Statement), "source", &mut insert.source)?;
                w.list(
                    K::Statement,
                    "on_duplicate_update",
                    &mut insert.on_duplicate_update,
                )?;
            }
            StatementKind::Update(update) => {
                w.slot(Some(K::Statement), "table_name", &mut update.table_name)?;
                w.list(K::Statement, "assignments", &mut update.assignments)?;
                if let Some(selection) = &mut update.selection {
                    w.slot(Some(K::Statement), "selection", selection)?;
                }
            }
            StatementKind::Delete(delete) => {
                w.slot(Some(K::Statement), "table_name", &mut delete.table_name)?;
                if let Some(selection) = &mut delete.selection {
                    w.slot(Some(K::Statement), "selection", selection)?;
                }
            }
            StatementKind::CreateTable(create) => {
                w.slot(Some(K::Statement), "name", &mut create.name)?;
                w.list(K::Statement, "elements", &mut create.elements)?;
            }
            StatementKind::CreateView(create) => {
                w.slot(Some(K::Statement), "name", &mut create.name)?;
                w.slot(Some(K::Statement), "query", &mut *create.query)?;
            }
            StatementKind::CreateIndex(create) => {
                if let Some(name) = &mut create.name {
                    w.slot(Some(K::Statement), "name", name)?;
                }
                w.slot(Some(K::Statement), "table_name", &mut create.table_name)?;
                if let Some(method) = &mut create.method {
                    w.slot(Some(K::Statement), "method", method)?;
                }
                w.list(K::Statement, "columns", &mut create.columns)?;
                if let Some(selection) = &mut create.selection {
                    w.slot(Some(K::Statement), "selection", selection)?;
                }
            }
            StatementKind::DropTable(drop) => {
                w.list(K::Statement, "names", &mut drop.names)?;
            }
            StatementKind::DropIndex(drop) => {
                w.list(K::Statement, "names", &mut drop.names)?;
            }
            StatementKind::AlterTable(alter) => {
                w.slot(Some(K::Statement), "name", &mut alter.name)?;
                w.slot(Some(K::Statement), "action", &mut alter.action)?;
            }
            StatementKind::Explain(inner) => {
                w.slot(Some(K::Statement), "statement", &mut **inner)?;
            }
        },
        NodeMut::Query(query) => {
            w.list(K::Query, "ctes", &mut query.ctes)?;
            w.slot(Some(K::Query), "body", &mut query.body)?;
            w.list(K::Query, "order_by", &mut query.order_by)?;
            if let Some(limit) = &mut query.limit {
                w.slot(Some(K::Query), "limit", limit)?;
            }
        }
        NodeMut::Cte(cte) => {
            w.slot(Some(K::Cte), "name", &mut cte.name)?;
            w.slot(Some(K::Cte), "query", &mut *cte.query)?;
        }
        NodeMut::SetExpr(body) => match body {
            SetExpr::Select(select) => w.slot(Some(K::SetExpr), "select", &mut **select)?,
            SetExpr::Query(query) => w.slot(Some(K::SetExpr), "query", &mut **query)?,
            SetExpr::SetOperation { left, right, .. } => {
                w.slot(Some(K::SetExpr), "left", &mut **left)?;
                w.slot(Some(K::SetExpr), "right", &mut **right)?;
            }
        },
        NodeMut::Select(select) => {
            w.list(K::Select, "projection", &mut select.projection)?;
            w.list(K::Select, "from", &mut select.from)?;
            if let Some(selection) = &mut select.selection {
                w.slot(Some(K::Select), "selection", selection)?;
            }
            w.list(K::Select, "group_by", &mut select.group_by)?;
            if let Some(having) = &mut select.having {
                w.slot(Some(K::Select), "having", having)?;
            }
        }
        NodeMut::SelectItem(item) => match item {
            SelectItem::UnnamedExpr(expr) => w.slot(Some(K::SelectItem), "expr", expr)?,
            SelectItem::ExprWithAlias { expr, alias } => {
                w.slot(Some(K::SelectItem), "expr", expr)?;
                w.slot(Some(K::SelectItem), "alias", alias)?;
            }
            SelectItem::QualifiedWildcard(idents) => {
                w.list(K::SelectItem, "idents", idents)?;
            }
            SelectItem::Wildcard => {}
        },
        NodeMut::TableReference(reference) => match reference {
            TableReference::Table(table) => {
                w.slot(Some(K::TableReference), "name", &mut table.name)?;
                if let Some(alias) = &mut table.alias {
                    w.slot(Some(K::TableReference), "alias", alias)?;
                }
                w.list(K::TableReference, "args", &mut table.args)?;
                w.list(K::TableReference, "with_hints", &mut table.with_hints)?;
            }
            TableReference::Derived(derived) => {
                w.slot(Some(K::TableReference), "subquery", &mut *derived.subquery)?;
                if let Some(alias) = &mut derived.alias {
                    w.slot(Some(K::TableReference), "alias", alias)?;
                }
            }
            TableReference::QualifiedJoin(join) => {
                w.slot(Some(K::TableReference), "left", &mut *join.left)?;
                w.slot(Some(K::TableReference), "join_type", &mut join.join_type)?;
                w.slot(Some(K::TableReference), "right", &mut *join.right)?;
                if let Some(spec) = &mut join.spec {
                    w.slot(Some(K::TableReference), "spec", spec)?;
                }
            }
            TableReference::NaturalJoin(join) => {
                w.slot(Some(K::TableReference), "left", &mut *join.left)?;
                w.slot(Some(K::TableReference), "join_type", &mut join.join_type)?;
                w.slot(Some(K::TableReference), "right", &mut *join.right)?;
            }
            TableReference::CrossJoin(join) => {
                w.slot(Some(K::TableReference), "reference", &mut *join.reference)?;
                w.slot(Some(K::TableReference), "factor", &mut *join.factor)?;
            }
        },
        NodeMut::JoinType(_) => {}
        NodeMut::JoinSpec(spec) => match spec {
            JoinSpec::On(expr) => w.slot(Some(K::JoinSpec), "expr", expr)?,
            JoinSpec::Using(idents) => w.list(K::JoinSpec, "idents", idents)?,
        },
        NodeMut::OrderByExpr(order_by) => {
            w.slot(Some(K::OrderByExpr), "expr", &mut order_by.expr)?;
        }
        NodeMut::Limit(limit) => {
            if let Some(quantity) = &mut limit.quantity {
                w.slot(Some(K::Limit), "quantity", &mut **quantity)?;
            }
            if let Some(offset) = &mut limit.offset {
                w.slot(Some(K::Limit), "offset", &mut **offset)?;
            }
        }
        NodeMut::Expr(expr) => match &mut expr.kind {
            ExprKind::Ident(ident) => w.slot(Some(K::Expr), "ident", ident)?,
            ExprKind::CompoundIdent(idents) | ExprKind::QualifiedWildcard(idents) => {
                w.list(K::Expr, "idents", idents)?;
            }
            ExprKind::Wildcard => {}
            ExprKind::Value(value) => w.slot(Some(K::Expr), "value", value)?,
            ExprKind::BinaryOp { left, right, .. } => {
                w.slot(Some(K::Expr), "left", &mut **left)?;
                w.slot(Some(K::Expr), "right", &mut **right)?;
            }
            ExprKind::UnaryOp { expr, .. } | ExprKind::Nested(expr) => {
                w.slot(Some(K::Expr), "expr", &mut **expr)?;
            }
            ExprKind::IsNull { expr, .. } => w.slot(Some(K::Expr), "expr", &mut **expr)?,
            ExprKind::InList { expr, list, .. } => {
                w.slot(Some(K::Expr), "expr", &mut **expr)?;
                w.list(K::Expr, "list", list)?;
            }
            ExprKind::InSubquery { expr, subquery, .. } => {
                w.slot(Some(K::Expr), "expr", &mut **expr)?;
                w.slot(Some(K::Expr), "subquery", &mut **subquery)?;
            }
            ExprKind::Between {
                expr, low, high, ..
            } => {
                w.slot(Some(K::Expr), "expr", &mut **expr)?;
                w.slot(Some(K::Expr), "low", &mut **low)?;
                w.slot(Some(K::Expr), "high", &mut **high)?;
            }
            ExprKind::Cast { expr, data_type } => {
                w.slot(Some(K::Expr), "expr", &mut **expr)?;
                w.slot(Some(K::Expr), "data_type", data_type)?;
            }
            ExprKind::Function(function) => {
                w.slot(Some(K::Expr), "name", &mut function.name)?;
                w.list(K::Expr, "args", &mut function.args)?;
                if let Some(over) = &mut function.over {
                    w.slot(Some(K::Expr), "over", over)?;
                }
            }
            ExprKind::Case(case) => {
                if let Some(operand) = &mut case.operand {
                    w.slot(Some(K::Expr), "operand", &mut **operand)?;
                }
                w.list(K::Expr, "conditions", &mut case.conditions)?;
                w.list(K::Expr, "results", &mut case.results)?;
                if let Some(else_result) = &mut case.else_result {
                    w.slot(Some(K::Expr), "else_result", &mut **else_result)?;
                }
            }
            ExprKind::Exists { query, .. } | ExprKind::Subquery(query) => {
                w.slot(Some(K::Expr), "query", &mut **query)?;
            }
        },
        NodeMut::Value(_) => {}
        NodeMut::WindowSpec(spec) => {
            w.list(K::WindowSpec, "partition_by", &mut spec.partition_by)?;
            w.list(K::WindowSpec, "order_by", &mut spec.order_by)?;
            if let Some(frame) = &mut spec.window_frame {
                w.slot(Some(K::WindowSpec), "window_frame", frame)?;
            }
        }
        NodeMut::WindowFrame(_) => {}
        NodeMut::Ident(_) => {}
        NodeMut::ObjectName(name) => {
            w.list(K::ObjectName, "idents", &mut name.0)?;
        }
        NodeMut::DataType(data_type) => match data_type {
            DataType::Array(inner) => w.slot(Some(K::DataType), "inner", &mut **inner)?,
            DataType::Custom(name) => w.slot(Some(K::DataType), "name", name)?,
            _ => {}
        },
        NodeMut::TableElement(element) => match element {
            TableElement::Column(column) => {
                w.slot(Some(K::TableElement), "column", column)?;
            }
            TableElement::Constraint(constraint) => {
                w.slot(Some(K::TableElement), "constraint", constraint)?;
            }
        },
        NodeMut::ColumnDef(column) => {
            w.slot(Some(K::ColumnDef), "name", &mut column.name)?;
            w.slot(Some(K::ColumnDef), "data_type", &mut column.data_type)?;
            if let Some(default) = &mut column.default {
                w.slot(Some(K::ColumnDef), "default", default)?;
            }
            w.list(K::ColumnDef, "constraints", &mut column.constraints)?;
        }
        NodeMut::ColumnConstraint(constraint) => {
            if let Some(name) = &mut constraint.name {
                w.slot(Some(K::ColumnConstraint), "name", name)?;
            }
            match &mut constraint.spec {
                ColumnConstraintSpec::References { table, columns } => {
                    w.slot(Some(K::ColumnConstraint), "table", table)?;
                    w.list(K::ColumnConstraint, "columns", columns)?;
                }
                ColumnConstraintSpec::Check(expr) => {
                    w.slot(Some(K::ColumnConstraint), "expr", expr)?;
                }
                _ => {}
            }
        }
        NodeMut::TableConstraint(constraint) => {
            if let Some(name) = &mut constraint.name {
                w.slot(Some(K::TableConstraint), "name", name)?;
            }
            match &mut constraint.spec {
                TableConstraintSpec::Unique { columns, .. } => {
                    w.list(K::TableConstraint, "columns", columns)?;
                }
                TableConstraintSpec::ForeignKey {
                    columns,
                    table,
                    referred_columns,
                } => {
                    w.list(K::TableConstraint, "columns", columns)?;
                    w.slot(Some(K::TableConstraint), "table", table)?;
                    w.list(K::TableConstraint, "referred_columns", referred_columns)?;
                }
                TableConstraintSpec::Check(expr) => {
                    w.slot(Some(K::TableConstraint), "expr", expr)?;
                }
            }
        }
        NodeMut::AlterTableAction(action) => match action {
            AlterTableAction::AddColumn(column) => {
                w.slot(Some(K::AlterTableAction), "column", column)?;
            }
            AlterTableAction::AddConstraint(constraint) => {
                w.slot(Some(K::AlterTableAction), "constraint", constraint)?;
            }
            AlterTableAction::DropConstraint { name, .. }
            | AlterTableAction::DropColumn { name, .. } => {
                w.slot(Some(K::AlterTableAction), "name", name)?;
            }
            AlterTableAction::AlterColumn { column, action } => {
                w.slot(Some(K::AlterTableAction), "column", column)?;
                w.slot(Some(K::AlterTableAction), "action", action)?;
            }
        },
        NodeMut::AlterColumnAction(action) => match action {
            AlterColumnAction::SetDefault(expr) => {
                w.slot(Some(K::AlterColumnAction), "expr", expr)?;
            }
            AlterColumnAction::SetDataType(data_type) => {
                w.slot(Some(K::AlterColumnAction), "data_type", data_type)?;
            }
            _ => {}
        },
        NodeMut::Assignment(assignment) => {
            w.slot(Some(K::Assignment), "id", &mut assignment.id)?;
            w.slot(Some(K::Assignment), "value", &mut assignment.value)?;
        }
        NodeMut::InsertSource(source) => match source {
            InsertSource::Values(rows) => {
                for row in rows {
                    w.list(K::InsertSource, "values", row)?;
                }
            }
            InsertSource::Subquery(query) => {
                w.slot(Some(K::InsertSource), "query", &mut **query)?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::visitor::inspect;
    use crate::dialect::GenericDialect;
    use crate::parser::Parser;

    fn parse(sql: &str) -> Statement {
        Parser::new(sql, &GenericDialect)
            .unwrap()
            .parse_statement()
            .unwrap()
    }

    #[test]
    fn test_replace_ident() {
        let mut stmt = parse("SELECT a FROM old_table WHERE a = 1");
        apply(
            &mut stmt,
            |cursor| {
                if let NodeRef::Ident(ident) = cursor.node() {
                    if ident.value == "old_table" {
                        cursor.replace(Ident::new("new_table"));
                    }
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        assert_eq!(stmt.to_sql(), "SELECT a FROM new_table WHERE a = 1");
    }

    #[test]
    fn test_delete_select_item() {
        let mut stmt = parse("SELECT a, b, c FROM t");
        let mut visited = Vec::new();
        apply(
            &mut stmt,
            |cursor| {
                if let NodeRef::SelectItem(item) = cursor.node() {
                    visited.push(item.to_string());
                    if item.to_string() == "b" {
                        cursor.delete();
                    }
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        assert_eq!(stmt.to_sql(), "SELECT a, c FROM t");
        // The element shifted into the deleted slot is still visited.
        assert_eq!(visited, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_before_and_after_are_not_revisited() {
        let mut stmt = parse("SELECT b FROM t");
        let mut visits = 0;
        apply(
            &mut stmt,
            |cursor| {
                if let NodeRef::SelectItem(_) = cursor.node() {
                    visits += 1;
                    if cursor.index() == Some(0) {
                        cursor.insert_before(SelectItem::UnnamedExpr(Expr::new(
                            ExprKind::Ident(Ident::new("a")),
                        )));
                        cursor.insert_after(SelectItem::UnnamedExpr(Expr::new(
                            ExprKind::Ident(Ident::new("c")),
                        )));
                    }
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        assert_eq!(stmt.to_sql(), "SELECT a, b, c FROM t");
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_cursor_context() {
        let stmt = &mut parse("SELECT a FROM t");
        let mut seen = Vec::new();
        apply(
            stmt,
            |cursor| {
                if matches!(cursor.node(), NodeRef::SelectItem(_)) {
                    seen.push((cursor.parent(), cursor.name(), cursor.index()));
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        assert_eq!(seen, vec![(Some(NodeKind::Select), "projection", Some(0))]);
    }

    #[test]
    fn test_delete_in_scalar_slot_fails() {
        let mut stmt = parse("SELECT a FROM t WHERE b = 1");
        let result = apply(
            &mut stmt,
            |cursor| {
                if cursor.name() == "selection" {
                    cursor.delete();
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        );
        assert!(result
            .unwrap_err()
            .reason
            .message()
            .contains("list context"));
    }

    #[test]
    fn test_mistyped_replacement_fails() {
        let mut stmt = parse("SELECT a FROM t");
        let result = apply(
            &mut stmt,
            |cursor| {
                if let NodeRef::Ident(_) = cursor.node() {
                    cursor.replace(Value::Null);
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        );
        assert!(result.unwrap_err().reason.message().contains("cannot put"));
    }

    #[test]
    fn test_abort_stops_without_error() {
        let mut stmt = parse("SELECT a, b FROM t");
        let mut visits = 0;
        apply(
            &mut stmt,
            |cursor| {
                if matches!(cursor.node(), NodeRef::SelectItem(_)) {
                    visits += 1;
                    return Flow::Abort;
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_skip_prunes_children_and_post() {
        let mut stmt = parse("SELECT a FROM t WHERE b IN (SELECT c FROM u)");
        let mut post_queries = 0;
        apply(
            &mut stmt,
            |cursor| {
                if matches!(cursor.node(), NodeRef::Query(_)) {
                    return Flow::Skip;
                }
                Flow::Continue
            },
            |cursor| {
                if matches!(cursor.node(), NodeRef::Query(_)) {
                    post_queries += 1;
                }
                Flow::Continue
            },
        )
        .unwrap();
        assert_eq!(post_queries, 0);
    }

    #[test]
    fn test_edit_then_reparse_agrees() {
        // Editing the parsed tree and re-rendering gives SQL that parses to
        // the same tree as editing the reparsed AST.
        let mut stmt = parse("SELECT a, b FROM t");
        apply(
            &mut stmt,
            |cursor| {
                if let NodeRef::SelectItem(item) = cursor.node() {
                    if item.to_string() == "a" {
                        cursor.replace(SelectItem::UnnamedExpr(Expr::new(ExprKind::Ident(
                            Ident::new("renamed"),
                        ))));
                    }
                }
                Flow::Continue
            },
            |_| Flow::Continue,
        )
        .unwrap();
        let rerendered = stmt.to_sql();
        assert_eq!(rerendered, "SELECT renamed, b FROM t");
        let reparsed = parse(&rerendered);
        let mut names = Vec::new();
        inspect(&reparsed, &mut |node| {
            if let NodeRef::Ident(ident) = node {
                names.push(ident.value.clone());
            }
            true
        });
        assert_eq!(names, vec!["renamed", "b", "t"]);
    }
}
