//! Cross-module tests: the round-trip laws and end-to-end statement
//! scenarios. Module-local behaviour is tested next to each module.

use serde::Serialize;
use similar_asserts::assert_eq;

use crate::ast::*;
use crate::dialect::{GenericDialect, PostgreSqlDialect};
use crate::parser::Parser;

fn parse(sql: &str) -> Statement {
    Parser::new(sql, &GenericDialect)
        .unwrap_or_else(|e| panic!("tokenizing {sql:?}: {e:#}"))
        .parse_statement()
        .unwrap_or_else(|e| panic!("parsing {sql:?}: {e:#}"))
}

/// Structural equality, ignoring spans: serde skips every span field, so
/// the serialized trees are equal exactly when the trees agree modulo
/// positions.
#[track_caller]
fn assert_ast_eq<T: Serialize>(left: &T, right: &T, context: &str) {
    let left = serde_json::to_value(left).unwrap();
    let right = serde_json::to_value(right).unwrap();
    assert_eq!(left, right, "{context}");
}

/// `parse(render(parse(s)))` equals `parse(s)` modulo spans, and rendering
/// is idempotent as a string.
#[track_caller]
fn assert_round_trips(sql: &str) {
    let first = parse(sql);
    let rendered = first.to_sql();
    let second = parse(&rendered);
    assert_ast_eq(&first, &second, sql);
    assert_eq!(rendered, second.to_sql(), "rendering is not idempotent for {sql:?}");
}

#[test]
fn test_round_trip_corpus() {
    let corpus = [
        "SELECT 1",
        "SELECT DISTINCT a, b AS c FROM t",
        "SELECT * from test_table",
        "SELECT a FROM t WHERE x = 'test' AND y <> 3 OR NOT z",
        "SELECT a FROM t WHERE x != 1",
        "SELECT a FROM t WHERE n BETWEEN 1 AND 10",
        "SELECT a FROM t WHERE n NOT IN (1, 2, 3)",
        "SELECT a FROM t WHERE s LIKE 'a%' AND s NOT LIKE '_b'",
        "SELECT a FROM t WHERE b IS NULL OR c IS NOT NULL",
        "SELECT CASE WHEN a = 1 THEN 'one' ELSE 'many' END FROM t",
        "SELECT CASE a WHEN 1 THEN 'one' WHEN 2 THEN 'two' END FROM t",
        "SELECT CAST(a AS BIGINT), b::NUMERIC(10, 2) FROM t",
        "SELECT N'national' FROM t",
        "SELECT DATE '2023-01-02', 1.5, -7 FROM t",
        "SELECT COUNT(*), COUNT(t.id) FROM t GROUP BY kind HAVING COUNT(*) > 1",
        "SELECT SUM(x) OVER (PARTITION BY g ORDER BY o ROWS UNBOUNDED PRECEDING) FROM t",
        "SELECT a FROM t1, t2 WHERE t1.id = t2.id",
        "SELECT a FROM t1 INNER JOIN t2 ON t1.id = t2.id",
        "SELECT a FROM t1 LEFT JOIN t2 USING (id, kind)",
        "SELECT a FROM t1 NATURAL FULL OUTER JOIN t2",
        "SELECT a FROM t1 CROSS JOIN t2",
        "SELECT a FROM (SELECT b FROM u) AS sub",
        "SELECT a FROM s.t AS x WHERE x.b = 1",
        "SELECT \"quoted col\" FROM \"quoted table\"",
        "SELECT a FROM t ORDER BY a ASC, b DESC LIMIT 5 OFFSET 10",
        "SELECT a FROM t LIMIT ALL OFFSET 3",
        "WITH r AS (SELECT a FROM t) SELECT * FROM r",
        "SELECT 1 UNION ALL SELECT 2 EXCEPT SELECT 3 INTERSECT SELECT 4",
        "SELECT 1 UNION (SELECT 2 ORDER BY b)",
        "SELECT a FROM t WHERE EXISTS (SELECT 1 FROM u WHERE u.id = t.id)",
        "SELECT a FROM t WHERE NOT EXISTS (SELECT 1 FROM u)",
        "SELECT a FROM t WHERE k IN (SELECT k FROM v)",
        "INSERT INTO t VALUES (1, 'a'), (2, 'b')",
        "INSERT INTO t (a, b) SELECT a, b FROM s",
        "INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = a + 1",
        "UPDATE t SET a = 1, b = 'x' WHERE id = 2",
        "DELETE FROM t WHERE id = 2",
        "CREATE TABLE t (a INT NOT NULL, b TEXT DEFAULT 'x', PRIMARY KEY (a))",
        "CREATE TABLE t (a INT CONSTRAINT pos CHECK (a > 0) REFERENCES u (id))",
        "CREATE TABLE t (ids UUID[] NOT NULL, at TIMESTAMP WITH TIME ZONE)",
        "CREATE VIEW v AS SELECT a FROM t",
        "CREATE MATERIALIZED VIEW v AS SELECT a FROM t",
        "CREATE UNIQUE INDEX i ON t USING gin (a) WHERE a > 0",
        "DROP TABLE IF EXISTS t1, t2 CASCADE",
        "DROP INDEX i",
        "ALTER TABLE t ADD COLUMN c NUMERIC",
        "ALTER TABLE t ALTER COLUMN c SET NOT NULL",
        "EXPLAIN SELECT a FROM t",
    ];
    for sql in corpus {
        assert_round_trips(sql);
    }
}

#[test]
fn test_round_trip_under_postgres_dialect() {
    let sql = "SELECT \"a$b\" FROM t WHERE v = 'x'";
    let first = Parser::new(sql, &PostgreSqlDialect)
        .unwrap()
        .parse_statement()
        .unwrap();
    let second = Parser::new(&first.to_sql(), &PostgreSqlDialect)
        .unwrap()
        .parse_statement()
        .unwrap();
    assert_ast_eq(&first, &second, sql);
}

#[test]
fn test_wildcard_projection_over_single_table() {
    let stmt = parse("SELECT * from test_table");
    let query = stmt.kind.as_query().unwrap();
    let select = query.body.as_select().unwrap();

    assert_eq!(select.projection, vec![SelectItem::Wildcard]);
    let TableReference::Table(table) = &select.from[0] else {
        panic!("expected a plain table");
    };
    assert_eq!(table.name.to_string(), "test_table");
    assert_eq!(select.from.len(), 1);
}

#[test]
fn test_where_compares_compound_ident_to_string() {
    let stmt = parse("SELECT test FROM test_table WHERE test_table.column1 = 'test'");
    let query = stmt.kind.as_query().unwrap();
    let select = query.body.as_select().unwrap();

    let ExprKind::BinaryOp { left, op, right } = &select.selection.as_ref().unwrap().kind else {
        panic!("expected a binary comparison");
    };
    assert_eq!(*op, BinaryOperator::Eq);
    let ExprKind::CompoundIdent(idents) = &left.kind else {
        panic!("expected a compound identifier");
    };
    assert_eq!(
        idents.iter().map(|i| i.value.as_str()).collect::<Vec<_>>(),
        vec!["test_table", "column1"]
    );
    assert_eq!(
        right.kind,
        ExprKind::Value(Value::SingleQuotedString("test".to_string()))
    );
}

#[test]
fn test_left_join_with_aliased_count() {
    let stmt = parse(
        "SELECT COUNT(t1.id) AS c FROM test_table AS t1 \
         LEFT JOIN test_table2 AS t2 ON t1.id = t2.test_table_id",
    );
    let query = stmt.kind.as_query().unwrap();
    let select = query.body.as_select().unwrap();

    let SelectItem::ExprWithAlias { expr, alias } = &select.projection[0] else {
        panic!("expected an aliased projection");
    };
    assert_eq!(alias.value, "c");
    let ExprKind::Function(function) = &expr.kind else {
        panic!("expected a function call");
    };
    assert_eq!(function.name.to_string(), "COUNT");
    assert!(matches!(&function.args[0].kind, ExprKind::CompoundIdent(ids) if ids.len() == 2));

    let TableReference::QualifiedJoin(join) = &select.from[0] else {
        panic!("expected a qualified join");
    };
    assert_eq!(join.join_type, JoinType::Left);
    assert!(matches!(
        join.left.as_ref(),
        TableReference::Table(t) if t.alias.as_ref().unwrap().value == "t1"
    ));
    let Some(JoinSpec::On(on)) = &join.spec else {
        panic!("expected an ON specification");
    };
    assert!(matches!(
        &on.kind,
        ExprKind::BinaryOp {
            op: BinaryOperator::Eq,
            ..
        }
    ));
}

#[test]
fn test_cte_with_in_subquery() {
    let stmt = parse(
        "WITH regional_sales AS (\
           SELECT region, SUM(amount) AS total_sales FROM orders GROUP BY region) \
         SELECT product, SUM(quantity) AS product_units \
         FROM orders \
         WHERE region IN (SELECT region FROM top_regions) \
         GROUP BY region, product",
    );
    let query = stmt.kind.as_query().unwrap();
    assert_eq!(query.ctes.len(), 1);
    assert_eq!(query.ctes[0].name.value, "regional_sales");

    let select = query.body.as_select().unwrap();
    let ExprKind::InSubquery {
        subquery, negated, ..
    } = &select.selection.as_ref().unwrap().kind
    else {
        panic!("expected IN (subquery)");
    };
    assert!(!negated);
    assert!(subquery.body.as_select().is_some());
    assert_eq!(select.group_by.len(), 2);
}

#[test]
fn test_create_table_column_constraints() {
    let stmt = parse(
        "CREATE TABLE persons (\
           person_id UUID PRIMARY KEY NOT NULL, \
           first_name varchar(255) UNIQUE, \
           last_name character varying(255) NOT NULL, \
           created_at timestamp DEFAULT CURRENT_TIMESTAMP NOT NULL)",
    );
    let create = stmt.kind.as_create_table().unwrap();
    assert_eq!(create.elements.len(), 4);

    let specs: Vec<Vec<&ColumnConstraintSpec>> = create
        .elements
        .iter()
        .map(|element| {
            let TableElement::Column(column) = element else {
                panic!("expected only column definitions");
            };
            column.constraints.iter().map(|c| &c.spec).collect()
        })
        .collect();

    assert_eq!(
        specs[0],
        vec![
            &ColumnConstraintSpec::PrimaryKey,
            &ColumnConstraintSpec::NotNull
        ]
    );
    assert_eq!(specs[1], vec![&ColumnConstraintSpec::Unique]);
    assert_eq!(specs[2], vec![&ColumnConstraintSpec::NotNull]);
    assert_eq!(specs[3], vec![&ColumnConstraintSpec::NotNull]);

    let TableElement::Column(created_at) = &create.elements[3] else {
        panic!("expected a column");
    };
    assert!(matches!(
        &created_at.default.as_ref().unwrap().kind,
        ExprKind::Ident(ident) if ident.value == "CURRENT_TIMESTAMP"
    ));
    let TableElement::Column(first_name) = &create.elements[1] else {
        panic!("expected a column");
    };
    assert_eq!(first_name.data_type, DataType::Varchar(Some(255)));
}

#[test]
fn test_negated_exists_with_nested_and() {
    let stmt = parse(
        "SELECT * FROM user WHERE NOT EXISTS (\
           SELECT * FROM user_sub \
           WHERE user.id = user_sub.id AND user_sub.job = 'job')",
    );
    let query = stmt.kind.as_query().unwrap();
    let select = query.body.as_select().unwrap();

    let ExprKind::Exists { negated, query } = &select.selection.as_ref().unwrap().kind else {
        panic!("expected EXISTS");
    };
    assert!(negated);

    let inner = query.body.as_select().unwrap();
    let ExprKind::BinaryOp { left, op, right } = &inner.selection.as_ref().unwrap().kind else {
        panic!("expected AND at the top of the sub-query's WHERE");
    };
    assert_eq!(*op, BinaryOperator::And);
    assert!(matches!(
        &left.kind,
        ExprKind::BinaryOp {
            op: BinaryOperator::Eq,
            ..
        }
    ));
    assert!(matches!(
        &right.kind,
        ExprKind::BinaryOp {
            op: BinaryOperator::Eq,
            ..
        }
    ));
}

#[test]
fn test_hand_built_tree_matches_parsed() {
    let parsed = parse("SELECT * from test_table");
    let built = Statement::new(StatementKind::Query(Box::new(Query {
        ctes: vec![],
        body: SetExpr::Select(Box::new(Select {
            distinct: false,
            projection: vec![SelectItem::Wildcard],
            from: vec![TableReference::Table(Table {
                name: ObjectName::new("test_table"),
                alias: None,
                args: vec![],
                with_hints: vec![],
                span: None,
            })],
            selection: None,
            group_by: vec![],
            having: None,
            span: None,
        })),
        order_by: vec![],
        limit: None,
        span: None,
    })));
    assert_ast_eq(&built, &parsed, "hand-built tree");
}

#[test]
fn test_statement_spans_cover_source() {
    use crate::error::Pos;
    let stmt = parse("SELECT a FROM t");
    let span = stmt.span().unwrap();
    assert_eq!(span.start, Pos::new(1, 0));
    assert_eq!(span.end, Pos::new(1, 15));
}

#[test]
fn test_json_round_trip() {
    let stmts = crate::parse_sql("SELECT a FROM t; DELETE FROM t WHERE a = 1", &GenericDialect)
        .unwrap();
    let json = crate::json_of_statements(&stmts).unwrap();
    let back = crate::statements_of_json(&json).unwrap();
    assert_ast_eq(&stmts, &back, "json round trip");
}

#[test]
fn test_error_is_positioned_and_composed() {
    let err = crate::parse_sql("SELECT a FROM t WHERE , 1", &GenericDialect).unwrap_err();
    let message = &err.inner[0];
    assert!(message.span.is_some());
    // The composed display carries the annotated source excerpt.
    assert!(message.display.is_some());
    assert!(message.reason.contains("expected"));
}

#[test]
fn test_file_rendering_terminates_statements() {
    let file = crate::parse_file("SELECT 1;\nSELECT 2", &GenericDialect).unwrap();
    assert_eq!(file.to_sql(), "SELECT 1;\nSELECT 2;\n");
}
