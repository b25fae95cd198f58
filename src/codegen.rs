//! Canonical SQL rendering for every AST node.
//!
//! Rendering is the other half of the [crate::ast::AstNode] contract: any
//! tree produced by the parser re-parses, from this output, to a
//! structurally identical tree. Keywords are uppercased, list elements are
//! joined with `", "`, optional clauses are emitted only when present, and
//! identifiers keep their original quoting.

use itertools::Itertools;
use std::fmt::{self, Display, Formatter, Write};

use crate::ast::*;

/// Like `slice.join(", ")`, for anything that renders.
fn comma_separated<T: Display>(items: &[T]) -> String {
    items.iter().join(", ")
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.quote_style {
            None => f.write_str(&self.value),
            Some('[') => write!(f, "[{}]", self.value),
            Some(quote) => write!(f, "{quote}{}{quote}", self.value),
        }
    }
}

impl Display for ObjectName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Long(n) => write!(f, "{n}"),
            Value::Double(n) => {
                // Keep the decimal point so the lexeme stays a double.
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Value::SingleQuotedString(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::NationalStringLiteral(s) => write!(f, "N'{}'", s.replace('\'', "''")),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Date(s) => write!(f, "DATE '{}'", s.replace('\'', "''")),
            Value::Time(s) => write!(f, "TIME '{}'", s.replace('\'', "''")),
            Value::Timestamp(s) => write!(f, "TIMESTAMP '{}'", s.replace('\'', "''")),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn with_len(f: &mut Formatter<'_>, name: &str, len: &Option<u64>) -> fmt::Result {
            f.write_str(name)?;
            if let Some(len) = len {
                write!(f, "({len})")?;
            }
            Ok(())
        }
        match self {
            DataType::Boolean => f.write_str("BOOLEAN"),
            DataType::SmallInt => f.write_str("SMALLINT"),
            DataType::Int => f.write_str("INT"),
            DataType::BigInt => f.write_str("BIGINT"),
            DataType::Real => f.write_str("REAL"),
            DataType::Float(size) => with_len(f, "FLOAT", size),
            DataType::Double => f.write_str("DOUBLE PRECISION"),
            DataType::Decimal(precision, scale) => match (precision, scale) {
                (Some(precision), Some(scale)) => write!(f, "NUMERIC({precision}, {scale})"),
                (Some(precision), None) => write!(f, "NUMERIC({precision})"),
                _ => f.write_str("NUMERIC"),
            },
            DataType::Char(size) => with_len(f, "CHAR", size),
            DataType::Varchar(size) => with_len(f, "CHARACTER VARYING", size),
            DataType::Uuid => f.write_str("UUID"),
            DataType::Date => f.write_str("DATE"),
            DataType::Time { with_time_zone } => {
                f.write_str(if *with_time_zone { "TIME WITH TIME ZONE" } else { "TIME" })
            }
            DataType::Timestamp { with_time_zone } => f.write_str(if *with_time_zone {
                "TIMESTAMP WITH TIME ZONE"
            } else {
                "TIMESTAMP"
            }),
            DataType::Regclass => f.write_str("REGCLASS"),
            DataType::Text => f.write_str("TEXT"),
            DataType::Bytea => f.write_str("BYTEA"),
            DataType::Array(inner) => write!(f, "{inner}[]"),
            DataType::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl Display for ExprKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use ExprKind::*;
        match self {
            Ident(ident) => write!(f, "{ident}"),
            CompoundIdent(idents) => write!(f, "{}", idents.iter().join(".")),
            Wildcard => f.write_str("*"),
            QualifiedWildcard(idents) => write!(f, "{}.*", idents.iter().join(".")),
            Value(value) => write!(f, "{value}"),
            BinaryOp { left, op, right } => write!(f, "{left} {op} {right}"),
            UnaryOp { op, expr } => write!(f, "{op} {expr}"),
            IsNull { expr, negated } => {
                write!(f, "{expr} IS {}NULL", if *negated { "NOT " } else { "" })
            }
            InList {
                expr,
                list,
                negated,
            } => write!(
                f,
                "{expr} {}IN ({})",
                if *negated { "NOT " } else { "" },
                comma_separated(list)
            ),
            InSubquery {
                expr,
                subquery,
                negated,
            } => write!(
                f,
                "{expr} {}IN ({subquery})",
                if *negated { "NOT " } else { "" }
            ),
            Between {
                expr,
                negated,
                low,
                high,
            } => write!(
                f,
                "{expr} {}BETWEEN {low} AND {high}",
                if *negated { "NOT " } else { "" }
            ),
            Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Nested(expr) => write!(f, "({expr})"),
            Function(function) => write!(f, "{function}"),
            Case(case) => write!(f, "{case}"),
            Exists { negated, query } => {
                write!(f, "{}EXISTS ({query})", if *negated { "NOT " } else { "" })
            }
            Subquery(query) => write!(f, "({query})"),
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, comma_separated(&self.args))?;
        if let Some(over) = &self.over {
            write!(f, " OVER ({over})")?;
        }
        Ok(())
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {operand}")?;
        }
        for (condition, result) in self.conditions.iter().zip(&self.results) {
            write!(f, " WHEN {condition} THEN {result}")?;
        }
        if let Some(else_result) = &self.else_result {
            write!(f, " ELSE {else_result}")?;
        }
        f.write_str(" END")
    }
}

impl Display for WindowSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut clauses = vec![];
        if !self.partition_by.is_empty() {
            clauses.push(format!("PARTITION BY {}", comma_separated(&self.partition_by)));
        }
        if !self.order_by.is_empty() {
            clauses.push(format!("ORDER BY {}", comma_separated(&self.order_by)));
        }
        if let Some(window_frame) = &self.window_frame {
            clauses.push(window_frame.to_string());
        }
        f.write_str(&clauses.join(" "))
    }
}

impl Display for WindowFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.end_bound {
            Some(end_bound) => write!(
                f,
                "{} BETWEEN {} AND {end_bound}",
                self.units, self.start_bound
            ),
            None => write!(f, "{} {}", self.units, self.start_bound),
        }
    }
}

impl Display for WindowFrameBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WindowFrameBound::CurrentRow => f.write_str("CURRENT ROW"),
            WindowFrameBound::Preceding(None) => f.write_str("UNBOUNDED PRECEDING"),
            WindowFrameBound::Following(None) => f.write_str("UNBOUNDED FOLLOWING"),
            WindowFrameBound::Preceding(Some(n)) => write!(f, "{n} PRECEDING"),
            WindowFrameBound::Following(Some(n)) => write!(f, "{n} FOLLOWING"),
        }
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.ctes.is_empty() {
            write!(f, "WITH {} ", comma_separated(&self.ctes))?;
        }
        write!(f, "{}", self.body)?;
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", comma_separated(&self.order_by))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " {limit}")?;
        }
        Ok(())
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut clauses = vec![];
        match &self.quantity {
            Some(quantity) => clauses.push(format!("LIMIT {quantity}")),
            None if self.all => clauses.push("LIMIT ALL".to_string()),
            None => {}
        }
        if let Some(offset) = &self.offset {
            clauses.push(format!("OFFSET {offset}"));
        }
        f.write_str(&clauses.join(" "))
    }
}

impl Display for Cte {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS ({})", self.name, self.query)
    }
}

impl Display for SetExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SetExpr::Select(select) => write!(f, "{select}"),
            SetExpr::Query(query) => write!(f, "({query})"),
            SetExpr::SetOperation {
                op,
                all,
                left,
                right,
            } => write!(
                f,
                "{left} {op}{} {right}",
                if *all { " ALL" } else { "" }
            ),
        }
    }
}

impl Display for Select {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SELECT {}{}",
            if self.distinct { "DISTINCT " } else { "" },
            comma_separated(&self.projection)
        )?;
        if !self.from.is_empty() {
            write!(f, " FROM {}", comma_separated(&self.from))?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", comma_separated(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        Ok(())
    }
}

impl Display for SelectItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::UnnamedExpr(expr) => write!(f, "{expr}"),
            SelectItem::ExprWithAlias { expr, alias } => write!(f, "{expr} AS {alias}"),
            SelectItem::QualifiedWildcard(idents) => write!(f, "{}.*", idents.iter().join(".")),
            SelectItem::Wildcard => f.write_str("*"),
        }
    }
}

impl Display for TableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableReference::Table(table) => write!(f, "{table}"),
            TableReference::Derived(derived) => write!(f, "{derived}"),
            TableReference::QualifiedJoin(join) => write!(f, "{join}"),
            TableReference::NaturalJoin(join) => write!(f, "{join}"),
            TableReference::CrossJoin(join) => write!(f, "{join}"),
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "({})", comma_separated(&self.args))?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        if !self.with_hints.is_empty() {
            write!(f, " WITH ({})", comma_separated(&self.with_hints))?;
        }
        Ok(())
    }
}

impl Display for Derived {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.lateral {
            f.write_str("LATERAL ")?;
        }
        write!(f, "({})", self.subquery)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl Display for QualifiedJoin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.join_type == JoinType::Implicit {
            return write!(f, "{}, {}", self.left, self.right);
        }
        write!(f, "{} {} JOIN {}", self.left, self.join_type, self.right)?;
        if let Some(spec) = &self.spec {
            write!(f, " {spec}")?;
        }
        Ok(())
    }
}

impl Display for NaturalJoin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.join_type {
            JoinType::Inner => write!(f, "{} NATURAL JOIN {}", self.left, self.right),
            join_type => write!(f, "{} NATURAL {join_type} JOIN {}", self.left, self.right),
        }
    }
}

impl Display for CrossJoin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} CROSS JOIN {}", self.reference, self.factor)
    }
}

impl Display for JoinSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JoinSpec::On(expr) => write!(f, "ON {expr}"),
            JoinSpec::Using(idents) => write!(f, "USING ({})", comma_separated(idents)),
        }
    }
}

impl Display for OrderByExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.asc {
            Some(true) => f.write_str(" ASC"),
            Some(false) => f.write_str(" DESC"),
            None => Ok(()),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)
    }
}

impl Display for StatementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Query(query) => write!(f, "{query}"),
            StatementKind::Insert(insert) => write!(f, "{insert}"),
            StatementKind::Update(update) => write!(f, "{update}"),
            StatementKind::Delete(delete) => write!(f, "{delete}"),
            StatementKind::CreateTable(create) => write!(f, "{create}"),
            StatementKind::CreateView(create) => write!(f, "{create}"),
            StatementKind::CreateIndex(create) => write!(f, "{create}"),
            StatementKind::DropTable(drop) => write!(f, "{drop}"),
            StatementKind::DropIndex(drop) => write!(f, "{drop}"),
            StatementKind::AlterTable(alter) => write!(f, "{alter}"),
            StatementKind::Explain(stmt) => write!(f, "EXPLAIN {stmt}"),
        }
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table_name)?;
        if !self.columns.is_empty() {
            write!(f, " ({})", comma_separated(&self.columns))?;
        }
        write!(f, " {}", self.source)?;
        if !self.on_duplicate_update.is_empty() {
            write!(
                f,
                " ON DUPLICATE KEY UPDATE {}",
                comma_separated(&self.on_duplicate_update)
            )?;
        }
        Ok(())
    }
}

impl Display for InsertSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InsertSource::Values(rows) => {
                f.write_str("VALUES ")?;
                let mut first = true;
                for row in rows {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "({})", comma_separated(row))?;
                }
                Ok(())
            }
            InsertSource::Subquery(query) => write!(f, "{query}"),
        }
    }
}

impl Display for Update {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {} SET {}",
            self.table_name,
            comma_separated(&self.assignments)
        )?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        Ok(())
    }
}

impl Display for Delete {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table_name)?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        Ok(())
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.id, self.value)
    }
}

impl Display for CreateTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE TABLE {} ({})",
            self.name,
            comma_separated(&self.elements)
        )
    }
}

impl Display for TableElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableElement::Column(column) => write!(f, "{column}"),
            TableElement::Constraint(constraint) => write!(f, "{constraint}"),
        }
    }
}

impl Display for ColumnDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        for constraint in &self.constraints {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}

impl Display for ColumnConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "CONSTRAINT {name} ")?;
        }
        write!(f, "{}", self.spec)
    }
}

impl Display for ColumnConstraintSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ColumnConstraintSpec::NotNull => f.write_str("NOT NULL"),
            ColumnConstraintSpec::Unique => f.write_str("UNIQUE"),
            ColumnConstraintSpec::PrimaryKey => f.write_str("PRIMARY KEY"),
            ColumnConstraintSpec::References { table, columns } => {
                write!(f, "REFERENCES {table}")?;
                if !columns.is_empty() {
                    write!(f, " ({})", comma_separated(columns))?;
                }
                Ok(())
            }
            ColumnConstraintSpec::Check(expr) => write!(f, "CHECK ({expr})"),
        }
    }
}

impl Display for TableConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "CONSTRAINT {name} ")?;
        }
        write!(f, "{}", self.spec)
    }
}

impl Display for TableConstraintSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableConstraintSpec::Unique {
                columns,
                is_primary,
            } => write!(
                f,
                "{} ({})",
                if *is_primary { "PRIMARY KEY" } else { "UNIQUE" },
                comma_separated(columns)
            ),
            TableConstraintSpec::ForeignKey {
                columns,
                table,
                referred_columns,
            } => write!(
                f,
                "FOREIGN KEY ({}) REFERENCES {table} ({})",
                comma_separated(columns),
                comma_separated(referred_columns)
            ),
            TableConstraintSpec::Check(expr) => write!(f, "CHECK ({expr})"),
        }
    }
}

impl Display for CreateView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE {}VIEW {} AS {}",
            if self.materialized { "MATERIALIZED " } else { "" },
            self.name,
            self.query
        )
    }
}

impl Display for CreateIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE {}INDEX", if self.unique { "UNIQUE " } else { "" })?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        write!(f, " ON {}", self.table_name)?;
        if let Some(method) = &self.method {
            write!(f, " USING {method}")?;
        }
        write!(f, " ({})", comma_separated(&self.columns))?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        Ok(())
    }
}

impl Display for DropTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DROP TABLE {}{}{}",
            if self.if_exists { "IF EXISTS " } else { "" },
            comma_separated(&self.names),
            if self.cascade { " CASCADE" } else { "" },
        )
    }
}

impl Display for DropIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DROP INDEX {}", comma_separated(&self.names))
    }
}

impl Display for AlterTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} {}", self.name, self.action)
    }
}

impl Display for AlterTableAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AlterTableAction::AddColumn(column) => write!(f, "ADD COLUMN {column}"),
            AlterTableAction::AddConstraint(constraint) => write!(f, "ADD {constraint}"),
            AlterTableAction::DropConstraint { name, cascade } => write!(
                f,
                "DROP CONSTRAINT {name}{}",
                if *cascade { " CASCADE" } else { "" }
            ),
            AlterTableAction::DropColumn { name, cascade } => write!(
                f,
                "DROP COLUMN {name}{}",
                if *cascade { " CASCADE" } else { "" }
            ),
            AlterTableAction::AlterColumn { column, action } => {
                write!(f, "ALTER COLUMN {column} {action}")
            }
        }
    }
}

impl Display for AlterColumnAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AlterColumnAction::SetDefault(expr) => write!(f, "SET DEFAULT {expr}"),
            AlterColumnAction::DropDefault => f.write_str("DROP DEFAULT"),
            AlterColumnAction::SetNotNull => f.write_str("SET NOT NULL"),
            AlterColumnAction::DropNotNull => f.write_str("DROP NOT NULL"),
            AlterColumnAction::SetDataType(data_type) => write!(f, "TYPE {data_type}"),
        }
    }
}

impl Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{stmt};")?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn ident(value: &str) -> Expr {
        Expr::new(ExprKind::Ident(Ident::new(value)))
    }

    #[test]
    fn test_value_rendering() {
        assert_snapshot!(Value::Long(42).to_string(), @"42");
        assert_snapshot!(Value::Double(1.0).to_string(), @"1.0");
        assert_snapshot!(Value::Double(1.25).to_string(), @"1.25");
        assert_snapshot!(Value::SingleQuotedString("it's".to_string()).to_string(), @"'it''s'");
        assert_snapshot!(Value::Null.to_string(), @"NULL");
        assert_snapshot!(Value::Date("2023-01-02".to_string()).to_string(), @"DATE '2023-01-02'");
    }

    #[test]
    fn test_ident_quoting() {
        assert_snapshot!(Ident::new("foo").to_string(), @"foo");
        assert_snapshot!(Ident::with_quote('"', "foo bar").to_string(), @r###""foo bar""###);
        assert_snapshot!(Ident::with_quote('`', "foo").to_string(), @"`foo`");
        assert_snapshot!(Ident::with_quote('[', "foo").to_string(), @"[foo]");
    }

    #[test]
    fn test_expr_rendering() {
        let expr = Expr::new(ExprKind::BinaryOp {
            left: Box::new(Expr::new(ExprKind::CompoundIdent(vec![
                Ident::new("t"),
                Ident::new("col"),
            ]))),
            op: BinaryOperator::NotEq,
            right: Box::new(Expr::new(ExprKind::Value(Value::Long(1)))),
        });
        assert_snapshot!(expr.to_sql(), @"t.col <> 1");

        let case = Expr::new(ExprKind::Case(Case {
            operand: None,
            conditions: vec![Expr::new(ExprKind::IsNull {
                expr: Box::new(ident("a")),
                negated: false,
            })],
            results: vec![Expr::new(ExprKind::Value(Value::Long(0)))],
            else_result: Some(Box::new(ident("a"))),
        }));
        assert_snapshot!(case.to_sql(), @"CASE WHEN a IS NULL THEN 0 ELSE a END");
    }

    #[test]
    fn test_window_frame_rendering() {
        let frame = WindowFrame {
            units: WindowFrameUnits::Rows,
            start_bound: WindowFrameBound::Preceding(Some(5)),
            end_bound: Some(WindowFrameBound::CurrentRow),
        };
        assert_snapshot!(frame.to_string(), @"ROWS BETWEEN 5 PRECEDING AND CURRENT ROW");

        let frame = WindowFrame {
            units: WindowFrameUnits::Range,
            start_bound: WindowFrameBound::Preceding(None),
            end_bound: None,
        };
        assert_snapshot!(frame.to_string(), @"RANGE UNBOUNDED PRECEDING");
    }

    #[test]
    fn test_data_type_rendering() {
        assert_snapshot!(DataType::Varchar(Some(255)).to_string(), @"CHARACTER VARYING(255)");
        assert_snapshot!(DataType::Decimal(Some(10), Some(2)).to_string(), @"NUMERIC(10, 2)");
        assert_snapshot!(DataType::Double.to_string(), @"DOUBLE PRECISION");
        assert_snapshot!(
            DataType::Array(Box::new(DataType::Text)).to_string(),
            @"TEXT[]"
        );
        assert_snapshot!(
            DataType::Timestamp { with_time_zone: true }.to_string(),
            @"TIMESTAMP WITH TIME ZONE"
        );
    }
}
