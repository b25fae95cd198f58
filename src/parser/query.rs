//! Query productions: WITH, the set-expression body, SELECT and the FROM
//! clause with its join grammar.

use anyhow::Context;

use crate::ast::*;
use crate::error::Result;
use crate::keywords;

use super::{Parser, TokenKind};

/// Set operators climb with their own two-level table: INTERSECT binds
/// tighter than UNION and EXCEPT.
const PREC_UNION_EXCEPT: u8 = 10;
const PREC_INTERSECT: u8 = 20;

impl Parser {
    /// A complete query: `[WITH ctes] body [ORDER BY ...] [LIMIT ...]`.
    pub fn parse_query(&mut self) -> Result<Query> {
        let start = self.peek_start();
        let ctes = if self.parse_keyword(keywords::WITH) {
            self.parse_comma_separated(Parser::parse_cte)
                .context("parsing WITH list")?
        } else {
            Vec::new()
        };
        let body = self.parse_query_body(0)?;
        let order_by = if self.parse_keywords(&[keywords::ORDER, keywords::BY]) {
            self.parse_comma_separated(Parser::parse_order_by_expr)
                .context("parsing ORDER BY")?
        } else {
            Vec::new()
        };
        let limit = self.parse_limit().context("parsing LIMIT clause")?;
        Ok(Query {
            ctes,
            body,
            order_by,
            limit,
            span: self.span_from(start),
        })
    }

    /// `name AS (query)`
    fn parse_cte(&mut self) -> Result<Cte> {
        let name = self.parse_identifier()?;
        self.expect_keyword(keywords::AS)?;
        let query = self.parse_parenthesized_query()?;
        Ok(Cte {
            name,
            query: Box::new(query),
        })
    }

    /// The body of a query, folding `UNION`/`EXCEPT`/`INTERSECT` chains
    /// into a left-leaning tree.
    fn parse_query_body(&mut self, precedence: u8) -> Result<SetExpr> {
        let mut body = if self.peek_is_keyword(keywords::SELECT) {
            SetExpr::Select(Box::new(self.parse_select()?))
        } else if self.consume_token(&TokenKind::LParen) {
            let query = self.parse_query()?;
            self.expect_token(&TokenKind::RParen)?;
            SetExpr::Query(Box::new(query))
        } else {
            let found = self.peek_token().clone();
            return self.expected("SELECT or a parenthesised query", &found);
        };

        loop {
            let (op, next_precedence) = if self.peek_is_keyword(keywords::UNION) {
                (SetOperator::Union, PREC_UNION_EXCEPT)
            } else if self.peek_is_keyword(keywords::EXCEPT) {
                (SetOperator::Except, PREC_UNION_EXCEPT)
            } else if self.peek_is_keyword(keywords::INTERSECT) {
                (SetOperator::Intersect, PREC_INTERSECT)
            } else {
                break;
            };
            if next_precedence <= precedence {
                break;
            }
            self.next_token();
            let all = self.parse_keyword(keywords::ALL);
            let right = self.parse_query_body(next_precedence)?;
            body = SetExpr::SetOperation {
                op,
                all,
                left: Box::new(body),
                right: Box::new(right),
            };
        }
        Ok(body)
    }

    /// One SELECT clause group, after looking at the `SELECT` keyword.
    fn parse_select(&mut self) -> Result<Select> {
        let start = self.peek_start();
        self.expect_keyword(keywords::SELECT)?;
        let distinct = self.parse_keyword(keywords::DISTINCT);
        let projection = self
            .parse_comma_separated(Parser::parse_select_item)
            .context("parsing projection")?;
        let from = if self.parse_keyword(keywords::FROM) {
            self.parse_table_references().context("parsing FROM clause")?
        } else {
            Vec::new()
        };
        let selection = if self.parse_keyword(keywords::WHERE) {
            Some(self.parse_expr().context("parsing WHERE clause")?)
        } else {
            None
        };
        let group_by = if self.parse_keywords(&[keywords::GROUP, keywords::BY]) {
            self.parse_comma_separated(Parser::parse_expr)
                .context("parsing GROUP BY")?
        } else {
            Vec::new()
        };
        let having = if self.parse_keyword(keywords::HAVING) {
            Some(self.parse_expr().context("parsing HAVING clause")?)
        } else {
            None
        };
        Ok(Select {
            distinct,
            projection,
            from,
            selection,
            group_by,
            having,
            span: self.span_from(start),
        })
    }

    /// One projection element; wildcard expressions become the dedicated
    /// item variants.
    fn parse_select_item(&mut self) -> Result<SelectItem> {
        let expr = self.parse_expr()?;
        Ok(match expr.kind {
            ExprKind::Wildcard => SelectItem::Wildcard,
            ExprKind::QualifiedWildcard(idents) => SelectItem::QualifiedWildcard(idents),
            _ => match self.parse_optional_alias(keywords::RESERVED_FOR_COLUMN_ALIAS)? {
                Some(alias) => SelectItem::ExprWithAlias { expr, alias },
                None => SelectItem::UnnamedExpr(expr),
            },
        })
    }

    /// `expr [ASC | DESC]`
    pub(crate) fn parse_order_by_expr(&mut self) -> Result<OrderByExpr> {
        let expr = self.parse_expr()?;
        let asc = if self.parse_keyword(keywords::ASC) {
            Some(true)
        } else if self.parse_keyword(keywords::DESC) {
            Some(false)
        } else {
            None
        };
        Ok(OrderByExpr { expr, asc })
    }

    /// `LIMIT { ALL | n } [OFFSET n]`; absent entirely when there is no
    /// LIMIT keyword.
    fn parse_limit(&mut self) -> Result<Option<Limit>> {
        let start = self.peek_start();
        if !self.parse_keyword(keywords::LIMIT) {
            return Ok(None);
        }
        let (all, quantity) = if self.parse_keyword(keywords::ALL) {
            (true, None)
        } else {
            (false, Some(Box::new(self.parse_expr()?)))
        };
        let offset = if self.parse_keyword(keywords::OFFSET) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Some(Limit {
            all,
            quantity,
            offset,
            span: self.span_from(start),
        }))
    }

    /// The FROM clause: a single left-associative join tree. Comma-joined
    /// factors are normalised into implicit joins.
    pub(crate) fn parse_table_references(&mut self) -> Result<Vec<TableReference>> {
        Ok(vec![self.parse_table_reference()?])
    }

    fn parse_table_reference(&mut self) -> Result<TableReference> {
        let mut reference = self.parse_table_factor()?;
        loop {
            if self.consume_token(&TokenKind::Comma) {
                let right = self.parse_table_factor()?;
                reference = TableReference::QualifiedJoin(QualifiedJoin {
                    left: Box::new(reference),
                    join_type: JoinType::Implicit,
                    right: Box::new(right),
                    spec: None,
                });
            } else if self.parse_keyword(keywords::CROSS) {
                self.expect_keyword(keywords::JOIN)?;
                let factor = self.parse_table_factor()?;
                reference = TableReference::CrossJoin(CrossJoin {
                    reference: Box::new(reference),
                    factor: Box::new(factor),
                });
            } else if self.parse_keyword(keywords::NATURAL) {
                let join_type = self.parse_join_type()?;
                self.expect_keyword(keywords::JOIN)?;
                let right = self.parse_table_factor()?;
                reference = TableReference::NaturalJoin(NaturalJoin {
                    left: Box::new(reference),
                    join_type,
                    right: Box::new(right),
                });
            } else if self.peek_is_join_head() {
                let join_type = self.parse_join_type()?;
                self.expect_keyword(keywords::JOIN)?;
                let right = self.parse_table_factor()?;
                let spec = self.parse_join_spec().context("parsing join specification")?;
                reference = TableReference::QualifiedJoin(QualifiedJoin {
                    left: Box::new(reference),
                    join_type,
                    right: Box::new(right),
                    spec: Some(spec),
                });
            } else {
                return Ok(reference);
            }
        }
    }

    fn peek_is_join_head(&self) -> bool {
        self.peek_is_keyword(keywords::JOIN)
            || self.peek_is_keyword(keywords::INNER)
            || self.peek_is_keyword(keywords::LEFT)
            || self.peek_is_keyword(keywords::RIGHT)
            || self.peek_is_keyword(keywords::FULL)
    }

    /// The join type in front of `JOIN`; a bare `JOIN` is inner.
    fn parse_join_type(&mut self) -> Result<JoinType> {
        let join_type = if self.parse_keyword(keywords::INNER) {
            JoinType::Inner
        } else if self.parse_keyword(keywords::LEFT) {
            if self.parse_keyword(keywords::OUTER) {
                JoinType::LeftOuter
            } else {
                JoinType::Left
            }
        } else if self.parse_keyword(keywords::RIGHT) {
            if self.parse_keyword(keywords::OUTER) {
                JoinType::RightOuter
            } else {
                JoinType::Right
            }
        } else if self.parse_keyword(keywords::FULL) {
            if self.parse_keyword(keywords::OUTER) {
                JoinType::FullOuter
            } else {
                JoinType::Full
            }
        } else {
            JoinType::Inner
        };
        Ok(join_type)
    }

    /// `ON expr` or `USING (columns)`; required after a qualified join.
    fn parse_join_spec(&mut self) -> Result<JoinSpec> {
        if self.parse_keyword(keywords::ON) {
            Ok(JoinSpec::On(self.parse_expr()?))
        } else if self.parse_keyword(keywords::USING) {
            Ok(JoinSpec::Using(self.parse_parenthesized_column_list()?))
        } else {
            let found = self.peek_token().clone();
            self.expected("ON or USING", &found)
        }
    }

    /// A table factor: a named table (with optional table-function
    /// arguments and hints) or a `[LATERAL]` derived table.
    fn parse_table_factor(&mut self) -> Result<TableReference> {
        let start = self.peek_start();
        let lateral = self.parse_keyword(keywords::LATERAL);
        if self.consume_token(&TokenKind::LParen) {
            let subquery = self.parse_query()?;
            self.expect_token(&TokenKind::RParen)?;
            let alias = self.parse_optional_alias(keywords::RESERVED_FOR_TABLE_ALIAS)?;
            return Ok(TableReference::Derived(Derived {
                lateral,
                subquery: Box::new(subquery),
                alias,
                span: self.span_from(start),
            }));
        }
        if lateral {
            let found = self.peek_token().clone();
            return self.expected("a parenthesised sub-query after LATERAL", &found);
        }
        let name = self.parse_object_name()?;
        let args = if self.consume_token(&TokenKind::LParen) {
            let args = self.parse_comma_separated(Parser::parse_expr)?;
            self.expect_token(&TokenKind::RParen)?;
            args
        } else {
            Vec::new()
        };
        let alias = self.parse_optional_alias(keywords::RESERVED_FOR_TABLE_ALIAS)?;
        // MSSQL-style table hints: `WITH (NOLOCK, ...)`. A `WITH` that is
        // not followed by `(` belongs to an enclosing production.
        let mut with_hints = Vec::new();
        let checkpoint = self.checkpoint();
        if self.parse_keyword(keywords::WITH) {
            if self.consume_token(&TokenKind::LParen) {
                with_hints = self.parse_comma_separated(Parser::parse_expr)?;
                self.expect_token(&TokenKind::RParen)?;
            } else {
                self.reset(checkpoint);
            }
        }
        Ok(TableReference::Table(Table {
            name,
            alias,
            args,
            with_hints,
            span: self.span_from(start),
        }))
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use crate::ast::*;
    use crate::dialect::GenericDialect;
    use crate::parser::Parser;

    fn parse_query(sql: &str) -> Query {
        Parser::new(sql, &GenericDialect).unwrap().parse_query().unwrap()
    }

    fn roundtrip(sql: &str) -> String {
        parse_query(sql).to_string()
    }

    #[test]
    fn test_set_operation_precedence() {
        // INTERSECT binds tighter than UNION.
        let query = parse_query("SELECT a FROM x UNION SELECT b FROM y INTERSECT SELECT c FROM z");
        let SetExpr::SetOperation { op, right, .. } = &query.body else {
            panic!("expected a set operation");
        };
        assert_eq!(*op, SetOperator::Union);
        assert!(matches!(
            right.as_ref(),
            SetExpr::SetOperation {
                op: SetOperator::Intersect,
                ..
            }
        ));
    }

    #[test]
    fn test_union_all_folds_left() {
        let query = parse_query("SELECT 1 UNION ALL SELECT 2 UNION SELECT 3");
        let SetExpr::SetOperation { op, all, left, .. } = &query.body else {
            panic!("expected a set operation");
        };
        assert_eq!(*op, SetOperator::Union);
        assert!(!*all);
        assert!(matches!(
            left.as_ref(),
            SetExpr::SetOperation {
                op: SetOperator::Union,
                all: true,
                ..
            }
        ));
    }

    #[test]
    fn test_order_by_and_limit() {
        assert_snapshot!(
            roundtrip("SELECT a FROM t ORDER BY a DESC, b LIMIT 10 OFFSET 5"),
            @"SELECT a FROM t ORDER BY a DESC, b LIMIT 10 OFFSET 5"
        );
        assert_snapshot!(roundtrip("SELECT a FROM t LIMIT ALL"), @"SELECT a FROM t LIMIT ALL");
        assert_snapshot!(
            roundtrip("SELECT a FROM t LIMIT ALL OFFSET 2"),
            @"SELECT a FROM t LIMIT ALL OFFSET 2"
        );
    }

    #[test]
    fn test_comma_join_is_implicit() {
        let query = parse_query("SELECT * FROM a, b");
        let select = query.body.as_select().unwrap();
        let TableReference::QualifiedJoin(join) = &select.from[0] else {
            panic!("expected a join");
        };
        assert_eq!(join.join_type, JoinType::Implicit);
        assert!(join.spec.is_none());
        assert_snapshot!(roundtrip("SELECT * FROM a, b"), @"SELECT * FROM a, b");
    }

    #[test]
    fn test_join_variants() {
        assert_snapshot!(
            roundtrip("SELECT * FROM a JOIN b ON a.id = b.id"),
            @"SELECT * FROM a INNER JOIN b ON a.id = b.id"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM a LEFT OUTER JOIN b USING (id)"),
            @"SELECT * FROM a LEFT OUTER JOIN b USING (id)"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM a NATURAL JOIN b"),
            @"SELECT * FROM a NATURAL JOIN b"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM a NATURAL LEFT JOIN b"),
            @"SELECT * FROM a NATURAL LEFT JOIN b"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM a CROSS JOIN b"),
            @"SELECT * FROM a CROSS JOIN b"
        );
    }

    #[test]
    fn test_derived_table_and_lateral() {
        assert_snapshot!(
            roundtrip("SELECT * FROM (SELECT a FROM t) AS sub"),
            @"SELECT * FROM (SELECT a FROM t) AS sub"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM a CROSS JOIN LATERAL (SELECT * FROM b) AS sub"),
            @"SELECT * FROM a CROSS JOIN LATERAL (SELECT * FROM b) AS sub"
        );
    }

    #[test]
    fn test_alias_needs_as_for_reserved_words() {
        // `FROM` may not be an implicit column alias, so this parses as a
        // plain projection over table t.
        let query = parse_query("SELECT a FROM t");
        let select = query.body.as_select().unwrap();
        assert!(matches!(select.projection[0], SelectItem::UnnamedExpr(_)));

        let query = parse_query("SELECT a b FROM t");
        let select = query.body.as_select().unwrap();
        assert!(matches!(
            &select.projection[0],
            SelectItem::ExprWithAlias { alias, .. } if alias.value == "b"
        ));
    }

    #[test]
    fn test_table_hints_and_args() {
        assert_snapshot!(
            roundtrip("SELECT * FROM generate_series(1, 10) AS g"),
            @"SELECT * FROM generate_series(1, 10) AS g"
        );
        assert_snapshot!(
            roundtrip("SELECT * FROM t WITH (NOLOCK)"),
            @"SELECT * FROM t WITH (NOLOCK)"
        );
    }

    #[test]
    fn test_cte_roundtrip() {
        assert_snapshot!(
            roundtrip("WITH t AS (SELECT 1) SELECT * FROM t"),
            @"WITH t AS (SELECT 1) SELECT * FROM t"
        );
    }

    #[test]
    fn test_group_by_and_having() {
        assert_snapshot!(
            roundtrip("SELECT region, SUM(amount) FROM orders GROUP BY region HAVING SUM(amount) > 100"),
            @"SELECT region, SUM(amount) FROM orders GROUP BY region HAVING SUM(amount) > 100"
        );
    }
}
