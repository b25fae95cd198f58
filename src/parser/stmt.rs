//! Statement productions: dispatch on the leading keyword, DML, and the
//! CREATE/DROP/ALTER grammar with its constraints.

use anyhow::Context;

use crate::ast::*;
use crate::error::{Error, Reason, Result};
use crate::keywords;

use super::{Parser, TokenKind};

impl Parser {
    /// Dispatch on the first significant keyword of a statement.
    pub(crate) fn parse_statement_dispatch(&mut self) -> Result<Statement> {
        let start = self.peek_start();
        let token = self.peek_token();
        let (keyword, value) = match &token.kind {
            TokenKind::Keyword(word) if word.quote_style.is_none() => {
                (word.keyword.clone(), word.value.clone())
            }
            _ => {
                let found = token.clone();
                return self.expected("a statement keyword", &found);
            }
        };
        let kind = match keyword.as_str() {
            keywords::SELECT | keywords::WITH => {
                StatementKind::Query(Box::new(self.parse_query()?))
            }
            keywords::CREATE => {
                self.next_token();
                self.parse_create().context("parsing CREATE statement")?
            }
            keywords::INSERT => {
                self.next_token();
                self.parse_insert().context("parsing INSERT statement")?
            }
            keywords::UPDATE => {
                self.next_token();
                self.parse_update().context("parsing UPDATE statement")?
            }
            keywords::DELETE => {
                self.next_token();
                self.parse_delete().context("parsing DELETE statement")?
            }
            keywords::DROP => {
                self.next_token();
                self.parse_drop().context("parsing DROP statement")?
            }
            keywords::ALTER => {
                self.next_token();
                self.parse_alter_table().context("parsing ALTER TABLE statement")?
            }
            keywords::EXPLAIN => {
                self.next_token();
                StatementKind::Explain(Box::new(self.parse_statement()?))
            }
            _ => {
                return Err(Error::new(Reason::Unsupported {
                    what: format!("statement starting with {value}"),
                })
                .with_span(Some(token.span))
                .into());
            }
        };
        Ok(Statement {
            kind,
            span: self.span_from(start),
        })
    }

    /// After `CREATE`: a table, a (materialized) view, or a (unique) index.
    fn parse_create(&mut self) -> Result<StatementKind> {
        if self.parse_keyword(keywords::TABLE) {
            return self.parse_create_table();
        }
        if self.parse_keyword(keywords::MATERIALIZED) {
            self.expect_keyword(keywords::VIEW)?;
            return self.parse_create_view(true);
        }
        if self.parse_keyword(keywords::VIEW) {
            return self.parse_create_view(false);
        }
        if self.parse_keyword(keywords::UNIQUE) {
            self.expect_keyword(keywords::INDEX)?;
            return self.parse_create_index(true);
        }
        if self.parse_keyword(keywords::INDEX) {
            return self.parse_create_index(false);
        }
        let found = self.peek_token().clone();
        self.expected("TABLE, VIEW, MATERIALIZED VIEW or INDEX after CREATE", &found)
    }

    /// `CREATE TABLE name (element, ...)`
    fn parse_create_table(&mut self) -> Result<StatementKind> {
        let name = self.parse_object_name()?;
        self.expect_token(&TokenKind::LParen)?;
        let elements = self
            .parse_comma_separated(Parser::parse_table_element)
            .context("parsing table elements")?;
        self.expect_token(&TokenKind::RParen)?;
        Ok(StatementKind::CreateTable(CreateTable { name, elements }))
    }

    /// A CREATE TABLE element: a table constraint when it opens with a
    /// constraint keyword, a column definition otherwise.
    fn parse_table_element(&mut self) -> Result<TableElement> {
        let head = match &self.peek_token().kind {
            TokenKind::Keyword(word) if word.quote_style.is_none() => word.keyword.clone(),
            _ => String::new(),
        };
        match head.as_str() {
            keywords::CONSTRAINT
            | keywords::PRIMARY
            | keywords::UNIQUE
            | keywords::FOREIGN
            | keywords::CHECK => Ok(TableElement::Constraint(self.parse_table_constraint()?)),
            _ => Ok(TableElement::Column(self.parse_column_def()?)),
        }
    }

    /// `name type [DEFAULT expr] [column constraints...]`, constraints in
    /// any order.
    pub(crate) fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let start = self.peek_start();
        let name = self.parse_identifier().context("parsing column name")?;
        let data_type = self.parse_data_type().context("parsing column type")?;
        let mut default = None;
        let mut constraints = Vec::new();
        loop {
            if self.parse_keyword(keywords::DEFAULT) {
                // Safe at full precedence: constraint keywords are never
                // infix operators (`NOT` only continues IN/BETWEEN/LIKE).
                default = Some(self.parse_expr()?);
            } else if let Some(constraint) = self.parse_optional_column_constraint()? {
                constraints.push(constraint);
            } else {
                break;
            }
        }
        Ok(ColumnDef {
            name,
            data_type,
            default,
            constraints,
            span: self.span_from(start),
        })
    }

    /// One column constraint, optionally prefixed with `CONSTRAINT name`.
    fn parse_optional_column_constraint(&mut self) -> Result<Option<ColumnConstraint>> {
        let name = if self.parse_keyword(keywords::CONSTRAINT) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let spec = if self.parse_keywords(&[keywords::NOT, keywords::NULL]) {
            ColumnConstraintSpec::NotNull
        } else if self.parse_keyword(keywords::UNIQUE) {
            ColumnConstraintSpec::Unique
        } else if self.parse_keywords(&[keywords::PRIMARY, keywords::KEY]) {
            ColumnConstraintSpec::PrimaryKey
        } else if self.parse_keyword(keywords::REFERENCES) {
            let table = self.parse_object_name()?;
            let columns = if matches!(self.peek_token().kind, TokenKind::LParen) {
                self.parse_parenthesized_column_list()?
            } else {
                Vec::new()
            };
            ColumnConstraintSpec::References { table, columns }
        } else if self.parse_keyword(keywords::CHECK) {
            self.expect_token(&TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_token(&TokenKind::RParen)?;
            ColumnConstraintSpec::Check(expr)
        } else if name.is_some() {
            let found = self.peek_token().clone();
            return self.expected("a constraint after CONSTRAINT name", &found);
        } else {
            return Ok(None);
        };
        Ok(Some(ColumnConstraint { name, spec }))
    }

    /// A table-level constraint, optionally named.
    pub(crate) fn parse_table_constraint(&mut self) -> Result<TableConstraint> {
        let start = self.peek_start();
        let name = if self.parse_keyword(keywords::CONSTRAINT) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let spec = if self.parse_keywords(&[keywords::PRIMARY, keywords::KEY]) {
            TableConstraintSpec::Unique {
                columns: self.parse_parenthesized_column_list()?,
                is_primary: true,
            }
        } else if self.parse_keyword(keywords::UNIQUE) {
            TableConstraintSpec::Unique {
                columns: self.parse_parenthesized_column_list()?,
                is_primary: false,
            }
        } else if self.parse_keywords(&[keywords::FOREIGN, keywords::KEY]) {
            let columns = self.parse_parenthesized_column_list()?;
            self.expect_keyword(keywords::REFERENCES)?;
            let table = self.parse_object_name()?;
            let referred_columns = self.parse_parenthesized_column_list()?;
            TableConstraintSpec::ForeignKey {
                columns,
                table,
                referred_columns,
            }
        } else if self.parse_keyword(keywords::CHECK) {
            self.expect_token(&TokenKind::LParen)?;
            let expr = self.parse_expr()?;
            self.expect_token(&TokenKind::RParen)?;
            TableConstraintSpec::Check(expr)
        } else {
            let found = self.peek_token().clone();
            return self.expected("PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK", &found);
        };
        Ok(TableConstraint {
            name,
            spec,
            span: self.span_from(start),
        })
    }

    /// `CREATE [MATERIALIZED] VIEW name AS query`
    fn parse_create_view(&mut self, materialized: bool) -> Result<StatementKind> {
        let name = self.parse_object_name()?;
        self.expect_keyword(keywords::AS)?;
        let query = self.parse_query()?;
        Ok(StatementKind::CreateView(CreateView {
            name,
            materialized,
            query: Box::new(query),
        }))
    }

    /// `CREATE [UNIQUE] INDEX [name] ON table [USING method] (columns)
    /// [WHERE predicate]`
    fn parse_create_index(&mut self, unique: bool) -> Result<StatementKind> {
        let name = if self.peek_is_keyword(keywords::ON) {
            None
        } else {
            Some(self.parse_object_name()?)
        };
        self.expect_keyword(keywords::ON)?;
        let table_name = self.parse_object_name()?;
        let method = if self.parse_keyword(keywords::USING) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let columns = self.parse_parenthesized_column_list()?;
        let selection = if self.parse_keyword(keywords::WHERE) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StatementKind::CreateIndex(CreateIndex {
            name,
            table_name,
            unique,
            method,
            columns,
            selection,
        }))
    }

    /// `INSERT INTO name [(columns)] { VALUES ... | query }
    /// [ON DUPLICATE KEY UPDATE ...]`
    fn parse_insert(&mut self) -> Result<StatementKind> {
        self.expect_keyword(keywords::INTO)?;
        let table_name = self.parse_object_name()?;
        // A `(` may open either the column list or a parenthesised source
        // query; one token of look-ahead decides.
        let columns = if matches!(self.peek_token().kind, TokenKind::LParen)
            && !matches!(
                self.peek_nth(1).kind,
                TokenKind::Keyword(ref word)
                    if word.quote_style.is_none()
                        && (word.keyword == keywords::SELECT || word.keyword == keywords::WITH)
            ) {
            self.parse_parenthesized_column_list()
                .context("parsing insert columns")?
        } else {
            Vec::new()
        };
        let source = if self.parse_keyword(keywords::VALUES) {
            let rows = self
                .parse_comma_separated(|parser| {
                    parser.expect_token(&TokenKind::LParen)?;
                    let row = parser.parse_comma_separated(Parser::parse_expr)?;
                    parser.expect_token(&TokenKind::RParen)?;
                    Ok(row)
                })
                .context("parsing VALUES rows")?;
            InsertSource::Values(rows)
        } else {
            InsertSource::Subquery(Box::new(self.parse_query()?))
        };
        let on_duplicate_update = if self.parse_keywords(&[
            keywords::ON,
            keywords::DUPLICATE,
            keywords::KEY,
            keywords::UPDATE,
        ]) {
            self.parse_comma_separated(Parser::parse_assignment)
                .context("parsing ON DUPLICATE KEY UPDATE")?
        } else {
            Vec::new()
        };
        Ok(StatementKind::Insert(Insert {
            table_name,
            columns,
            source,
            on_duplicate_update,
        }))
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let id = self.parse_identifier()?;
        self.expect_token(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Assignment { id, value })
    }

    /// `UPDATE name SET assignments [WHERE expr]`
    fn parse_update(&mut self) -> Result<StatementKind> {
        let table_name = self.parse_object_name()?;
        self.expect_keyword(keywords::SET)?;
        let assignments = self
            .parse_comma_separated(Parser::parse_assignment)
            .context("parsing SET assignments")?;
        let selection = if self.parse_keyword(keywords::WHERE) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StatementKind::Update(Update {
            table_name,
            assignments,
            selection,
        }))
    }

    /// `DELETE FROM name [WHERE expr]`
    fn parse_delete(&mut self) -> Result<StatementKind> {
        self.expect_keyword(keywords::FROM)?;
        let table_name = self.parse_object_name()?;
        let selection = if self.parse_keyword(keywords::WHERE) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StatementKind::Delete(Delete {
            table_name,
            selection,
        }))
    }

    /// `DROP TABLE [IF EXISTS] names [CASCADE]` or `DROP INDEX names`
    fn parse_drop(&mut self) -> Result<StatementKind> {
        if self.parse_keyword(keywords::TABLE) {
            let if_exists = self.parse_keywords(&[keywords::IF, keywords::EXISTS]);
            let names = self.parse_comma_separated(Parser::parse_object_name)?;
            let cascade = self.parse_keyword(keywords::CASCADE);
            Ok(StatementKind::DropTable(DropTable {
                names,
                if_exists,
                cascade,
            }))
        } else if self.parse_keyword(keywords::INDEX) {
            let names = self.parse_comma_separated(Parser::parse_object_name)?;
            Ok(StatementKind::DropIndex(DropIndex { names }))
        } else {
            let found = self.peek_token().clone();
            self.expected("TABLE or INDEX after DROP", &found)
        }
    }

    /// `ALTER TABLE name action`
    fn parse_alter_table(&mut self) -> Result<StatementKind> {
        self.expect_keyword(keywords::TABLE)?;
        let name = self.parse_object_name()?;
        let action = if self.parse_keyword(keywords::ADD) {
            if self.parse_keyword(keywords::COLUMN) {
                AlterTableAction::AddColumn(self.parse_column_def()?)
            } else {
                AlterTableAction::AddConstraint(self.parse_table_constraint()?)
            }
        } else if self.parse_keyword(keywords::DROP) {
            if self.parse_keyword(keywords::CONSTRAINT) {
                let name = self.parse_identifier()?;
                let cascade = self.parse_keyword(keywords::CASCADE);
                AlterTableAction::DropConstraint { name, cascade }
            } else if self.parse_keyword(keywords::COLUMN) {
                let name = self.parse_identifier()?;
                let cascade = self.parse_keyword(keywords::CASCADE);
                AlterTableAction::DropColumn { name, cascade }
            } else {
                let found = self.peek_token().clone();
                return self.expected("CONSTRAINT or COLUMN after DROP", &found);
            }
        } else if self.parse_keyword(keywords::ALTER) {
            self.expect_keyword(keywords::COLUMN)?;
            let column = self.parse_identifier()?;
            let action = self.parse_alter_column_action()?;
            AlterTableAction::AlterColumn { column, action }
        } else {
            let found = self.peek_token().clone();
            return self.expected("ADD, DROP or ALTER after the table name", &found);
        };
        Ok(StatementKind::AlterTable(AlterTable { name, action }))
    }

    /// `{ SET DEFAULT expr | SET NOT NULL | DROP DEFAULT | DROP NOT NULL |
    /// TYPE datatype }`
    fn parse_alter_column_action(&mut self) -> Result<AlterColumnAction> {
        if self.parse_keyword(keywords::SET) {
            if self.parse_keyword(keywords::DEFAULT) {
                Ok(AlterColumnAction::SetDefault(self.parse_expr()?))
            } else if self.parse_keywords(&[keywords::NOT, keywords::NULL]) {
                Ok(AlterColumnAction::SetNotNull)
            } else {
                let found = self.peek_token().clone();
                self.expected("DEFAULT or NOT NULL after SET", &found)
            }
        } else if self.parse_keyword(keywords::DROP) {
            if self.parse_keyword(keywords::DEFAULT) {
                Ok(AlterColumnAction::DropDefault)
            } else if self.parse_keywords(&[keywords::NOT, keywords::NULL]) {
                Ok(AlterColumnAction::DropNotNull)
            } else {
                let found = self.peek_token().clone();
                self.expected("DEFAULT or NOT NULL after DROP", &found)
            }
        } else if self.parse_keyword(keywords::TYPE) {
            Ok(AlterColumnAction::SetDataType(self.parse_data_type()?))
        } else {
            let found = self.peek_token().clone();
            self.expected("SET, DROP or TYPE", &found)
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use crate::ast::*;
    use crate::dialect::GenericDialect;
    use crate::parser::Parser;

    fn parse(sql: &str) -> Statement {
        Parser::new(sql, &GenericDialect)
            .unwrap()
            .parse_statement()
            .unwrap()
    }

    fn roundtrip(sql: &str) -> String {
        parse(sql).to_string()
    }

    #[test]
    fn test_insert_values() {
        assert_snapshot!(
            roundtrip("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')"),
            @"INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y')"
        );
    }

    #[test]
    fn test_insert_from_query() {
        assert_snapshot!(
            roundtrip("INSERT INTO t SELECT a, b FROM s"),
            @"INSERT INTO t SELECT a, b FROM s"
        );
        // A parenthesised query must not be mistaken for a column list.
        assert_snapshot!(
            roundtrip("INSERT INTO t (SELECT a FROM s)"),
            @"INSERT INTO t (SELECT a FROM s)"
        );
    }

    #[test]
    fn test_insert_on_duplicate() {
        assert_snapshot!(
            roundtrip("INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2, b = 3"),
            @"INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2, b = 3"
        );
    }

    #[test]
    fn test_update_delete() {
        assert_snapshot!(
            roundtrip("UPDATE t SET a = 1, b = b + 1 WHERE id = 7"),
            @"UPDATE t SET a = 1, b = b + 1 WHERE id = 7"
        );
        assert_snapshot!(roundtrip("DELETE FROM t WHERE id = 7"), @"DELETE FROM t WHERE id = 7");
        assert_snapshot!(roundtrip("DELETE FROM t"), @"DELETE FROM t");
    }

    #[test]
    fn test_create_table_constraints() {
        let stmt = parse(
            "CREATE TABLE t (\
               id UUID PRIMARY KEY NOT NULL, \
               name varchar(20) CONSTRAINT name_unique UNIQUE, \
               other_id int REFERENCES other (id), \
               PRIMARY KEY (id, name), \
               CONSTRAINT positive CHECK (other_id > 0))",
        );
        let create = stmt.kind.as_create_table().unwrap();
        assert_eq!(create.elements.len(), 5);
        assert!(matches!(
            create.elements[3],
            TableElement::Constraint(TableConstraint {
                spec: TableConstraintSpec::Unique {
                    is_primary: true,
                    ..
                },
                ..
            })
        ));
        assert_snapshot!(
            stmt.to_sql(),
            @"CREATE TABLE t (id UUID PRIMARY KEY NOT NULL, name CHARACTER VARYING(20) CONSTRAINT name_unique UNIQUE, other_id INT REFERENCES other (id), PRIMARY KEY (id, name), CONSTRAINT positive CHECK (other_id > 0))"
        );
    }

    #[test]
    fn test_create_table_foreign_key() {
        assert_snapshot!(
            roundtrip("CREATE TABLE t (a int, FOREIGN KEY (a) REFERENCES s (b))"),
            @"CREATE TABLE t (a INT, FOREIGN KEY (a) REFERENCES s (b))"
        );
    }

    #[test]
    fn test_create_view() {
        assert_snapshot!(
            roundtrip("CREATE VIEW v AS SELECT a FROM t"),
            @"CREATE VIEW v AS SELECT a FROM t"
        );
        assert_snapshot!(
            roundtrip("CREATE MATERIALIZED VIEW v AS SELECT a FROM t"),
            @"CREATE MATERIALIZED VIEW v AS SELECT a FROM t"
        );
    }

    #[test]
    fn test_create_index() {
        assert_snapshot!(
            roundtrip("CREATE UNIQUE INDEX idx ON t USING btree (a, b) WHERE a > 0"),
            @"CREATE UNIQUE INDEX idx ON t USING btree (a, b) WHERE a > 0"
        );
        assert_snapshot!(roundtrip("CREATE INDEX ON t (a)"), @"CREATE INDEX ON t (a)");
    }

    #[test]
    fn test_drop() {
        assert_snapshot!(
            roundtrip("DROP TABLE IF EXISTS a, b CASCADE"),
            @"DROP TABLE IF EXISTS a, b CASCADE"
        );
        assert_snapshot!(roundtrip("DROP INDEX i1, i2"), @"DROP INDEX i1, i2");
    }

    #[test]
    fn test_alter_table() {
        assert_snapshot!(
            roundtrip("ALTER TABLE t ADD COLUMN c int NOT NULL"),
            @"ALTER TABLE t ADD COLUMN c INT NOT NULL"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t ADD CONSTRAINT u UNIQUE (a)"),
            @"ALTER TABLE t ADD CONSTRAINT u UNIQUE (a)"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t DROP CONSTRAINT u CASCADE"),
            @"ALTER TABLE t DROP CONSTRAINT u CASCADE"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t DROP COLUMN c"),
            @"ALTER TABLE t DROP COLUMN c"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t ALTER COLUMN c SET DEFAULT 0"),
            @"ALTER TABLE t ALTER COLUMN c SET DEFAULT 0"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t ALTER COLUMN c DROP NOT NULL"),
            @"ALTER TABLE t ALTER COLUMN c DROP NOT NULL"
        );
        assert_snapshot!(
            roundtrip("ALTER TABLE t ALTER COLUMN c TYPE bigint"),
            @"ALTER TABLE t ALTER COLUMN c TYPE BIGINT"
        );
    }

    #[test]
    fn test_explain() {
        let stmt = parse("EXPLAIN SELECT 1");
        assert!(matches!(stmt.kind, StatementKind::Explain(_)));
        assert_snapshot!(stmt.to_sql(), @"EXPLAIN SELECT 1");
    }

    #[test]
    fn test_unsupported_statement() {
        let err = Parser::new("GRANT ALL ON t TO u", &GenericDialect)
            .unwrap()
            .parse_statement()
            .unwrap_err();
        assert!(format!("{err:#}").contains("not supported"));
    }
}
