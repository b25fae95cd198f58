//! Expression productions: the prefix and infix halves of the precedence
//! climber, plus data types.

use anyhow::Context;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::keywords;

use super::{Parser, TokenKind, PREC_CMP, PREC_PLUS_MINUS, PREC_UNARY_NOT};

impl Parser {
    /// An expression head: literal, unary operator, CASE, CAST, EXISTS,
    /// parenthesised expression or sub-query, `*`, or an identifier chain
    /// that may turn into a compound name, qualified wildcard or function
    /// call.
    pub(crate) fn parse_prefix(&mut self) -> Result<Expr> {
        let start = self.peek_start();
        let token = self.next_token();
        let kind = match token.kind {
            TokenKind::Keyword(word) if word.quote_style.is_none() => {
                match word.keyword.as_str() {
                    keywords::TRUE => ExprKind::Value(Value::Boolean(true)),
                    keywords::FALSE => ExprKind::Value(Value::Boolean(false)),
                    keywords::NULL => ExprKind::Value(Value::Null),
                    keywords::CASE => self.parse_case().context("parsing CASE expression")?,
                    keywords::CAST => self.parse_cast().context("parsing CAST expression")?,
                    keywords::EXISTS => ExprKind::Exists {
                        negated: false,
                        query: Box::new(self.parse_parenthesized_query()?),
                    },
                    keywords::NOT => {
                        if self.parse_keyword(keywords::EXISTS) {
                            ExprKind::Exists {
                                negated: true,
                                query: Box::new(self.parse_parenthesized_query()?),
                            }
                        } else {
                            ExprKind::UnaryOp {
                                op: UnaryOperator::Not,
                                expr: Box::new(self.parse_subexpr(PREC_UNARY_NOT)?),
                            }
                        }
                    }
                    keywords::DATE | keywords::TIME | keywords::TIMESTAMP
                        if matches!(
                            self.peek_token().kind,
                            TokenKind::SingleQuotedString(_)
                        ) =>
                    {
                        let value = match self.next_token().kind {
                            TokenKind::SingleQuotedString(s) => s,
                            _ => unreachable!("peeked a single-quoted string"),
                        };
                        ExprKind::Value(match word.keyword.as_str() {
                            keywords::DATE => Value::Date(value),
                            keywords::TIME => Value::Time(value),
                            _ => Value::Timestamp(value),
                        })
                    }
                    _ => self.parse_word_expr(word, token.span)?,
                }
            }
            // A quoted word is always an identifier chain head.
            TokenKind::Keyword(word) => self.parse_word_expr(word, token.span)?,
            TokenKind::Number(lexeme) => {
                let value = if lexeme.contains('.') {
                    lexeme
                        .parse::<f64>()
                        .map(Value::Double)
                        .map_err(|_| Error::simple(format!("invalid number {lexeme:?}")))
                } else {
                    lexeme
                        .parse::<i64>()
                        .map(Value::Long)
                        .map_err(|_| Error::simple(format!("invalid number {lexeme:?}")))
                };
                ExprKind::Value(value.map_err(|e| e.with_span(Some(token.span)))?)
            }
            TokenKind::SingleQuotedString(s) => ExprKind::Value(Value::SingleQuotedString(s)),
            TokenKind::NationalStringLiteral(s) => {
                ExprKind::Value(Value::NationalStringLiteral(s))
            }
            TokenKind::Plus => ExprKind::UnaryOp {
                op: UnaryOperator::Plus,
                expr: Box::new(self.parse_subexpr(PREC_PLUS_MINUS)?),
            },
            TokenKind::Minus => ExprKind::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(self.parse_subexpr(PREC_PLUS_MINUS)?),
            },
            TokenKind::Mult => ExprKind::Wildcard,
            TokenKind::LParen => {
                let kind = if self.peek_is_keyword(keywords::SELECT)
                    || self.peek_is_keyword(keywords::WITH)
                {
                    ExprKind::Subquery(Box::new(self.parse_query()?))
                } else {
                    ExprKind::Nested(Box::new(self.parse_expr()?))
                };
                self.expect_token(&TokenKind::RParen)?;
                kind
            }
            other => {
                let token = super::Token {
                    kind: other,
                    span: token.span,
                };
                return self.expected("an expression", &token);
            }
        };
        Ok(Expr {
            kind,
            span: self.span_from(start),
        })
    }

    /// Continue an expression after `left` with the infix operator that
    /// carries `precedence`.
    pub(crate) fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr> {
        let start = left.span().map(|s| s.start).unwrap_or_else(|| self.peek_start());
        let token = self.next_token();

        let op = match &token.kind {
            TokenKind::Plus => Some(BinaryOperator::Plus),
            TokenKind::Minus => Some(BinaryOperator::Minus),
            TokenKind::Mult => Some(BinaryOperator::Multiply),
            TokenKind::Div => Some(BinaryOperator::Divide),
            TokenKind::Mod => Some(BinaryOperator::Modulus),
            TokenKind::Eq => Some(BinaryOperator::Eq),
            TokenKind::Neq => Some(BinaryOperator::NotEq),
            TokenKind::Gt => Some(BinaryOperator::Gt),
            TokenKind::Lt => Some(BinaryOperator::Lt),
            TokenKind::GtEq => Some(BinaryOperator::GtEq),
            TokenKind::LtEq => Some(BinaryOperator::LtEq),
            TokenKind::Keyword(word) if word.quote_style.is_none() => {
                match word.keyword.as_str() {
                    keywords::AND => Some(BinaryOperator::And),
                    keywords::OR => Some(BinaryOperator::Or),
                    keywords::LIKE => Some(BinaryOperator::Like),
                    _ => None,
                }
            }
            _ => None,
        };

        let kind = if let Some(op) = op {
            ExprKind::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(self.parse_subexpr(precedence)?),
            }
        } else {
            match &token.kind {
                TokenKind::DoubleColon => ExprKind::Cast {
                    expr: Box::new(left),
                    data_type: self.parse_data_type()?,
                },
                TokenKind::Keyword(word) if word.quote_style.is_none() => {
                    match word.keyword.as_str() {
                        keywords::IS => {
                            if self.parse_keyword(keywords::NULL) {
                                ExprKind::IsNull {
                                    expr: Box::new(left),
                                    negated: false,
                                }
                            } else if self.parse_keywords(&[keywords::NOT, keywords::NULL]) {
                                ExprKind::IsNull {
                                    expr: Box::new(left),
                                    negated: true,
                                }
                            } else {
                                let found = self.peek_token().clone();
                                return self.expected("NULL or NOT NULL after IS", &found);
                            }
                        }
                        keywords::IN => self.parse_in(left, false)?,
                        keywords::BETWEEN => self.parse_between(left, false)?,
                        keywords::NOT => {
                            if self.parse_keyword(keywords::IN) {
                                self.parse_in(left, true)?
                            } else if self.parse_keyword(keywords::BETWEEN) {
                                self.parse_between(left, true)?
                            } else if self.parse_keyword(keywords::LIKE) {
                                ExprKind::BinaryOp {
                                    left: Box::new(left),
                                    op: BinaryOperator::NotLike,
                                    right: Box::new(self.parse_subexpr(precedence)?),
                                }
                            } else {
                                let found = self.peek_token().clone();
                                return self.expected("IN, BETWEEN or LIKE after NOT", &found);
                            }
                        }
                        _ => return self.expected("an infix operator", &token),
                    }
                }
                _ => return self.expected("an infix operator", &token),
            }
        };
        Ok(Expr {
            kind,
            span: self.span_from(start),
        })
    }

    /// `[NOT] IN (list)` or `[NOT] IN (subquery)`, after `IN` was consumed.
    fn parse_in(&mut self, expr: Expr, negated: bool) -> Result<ExprKind> {
        self.expect_token(&TokenKind::LParen)?;
        let kind = if self.peek_is_keyword(keywords::SELECT) || self.peek_is_keyword(keywords::WITH)
        {
            ExprKind::InSubquery {
                expr: Box::new(expr),
                subquery: Box::new(self.parse_query()?),
                negated,
            }
        } else {
            ExprKind::InList {
                expr: Box::new(expr),
                list: self
                    .parse_comma_separated(Parser::parse_expr)
                    .context("parsing IN list")?,
                negated,
            }
        };
        self.expect_token(&TokenKind::RParen)?;
        Ok(kind)
    }

    /// `[NOT] BETWEEN low AND high`, after `BETWEEN` was consumed. The
    /// bounds bind at comparison precedence, so the `AND` stays ours.
    fn parse_between(&mut self, expr: Expr, negated: bool) -> Result<ExprKind> {
        let low = self.parse_subexpr(PREC_CMP)?;
        self.expect_keyword(keywords::AND)?;
        let high = self.parse_subexpr(PREC_CMP)?;
        Ok(ExprKind::Between {
            expr: Box::new(expr),
            negated,
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`, after `CASE`.
    fn parse_case(&mut self) -> Result<ExprKind> {
        let operand = if self.peek_is_keyword(keywords::WHEN) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let mut conditions = Vec::new();
        let mut results = Vec::new();
        while self.parse_keyword(keywords::WHEN) {
            conditions.push(self.parse_expr()?);
            self.expect_keyword(keywords::THEN)?;
            results.push(self.parse_expr()?);
        }
        if conditions.is_empty() {
            let found = self.peek_token().clone();
            return self.expected("WHEN", &found);
        }
        let else_result = if self.parse_keyword(keywords::ELSE) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_keyword(keywords::END)?;
        Ok(ExprKind::Case(Case {
            operand,
            conditions,
            results,
            else_result,
        }))
    }

    /// `CAST(expr AS type)`, after `CAST`.
    fn parse_cast(&mut self) -> Result<ExprKind> {
        self.expect_token(&TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect_keyword(keywords::AS)?;
        let data_type = self.parse_data_type()?;
        self.expect_token(&TokenKind::RParen)?;
        Ok(ExprKind::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// `(query)`
    pub(crate) fn parse_parenthesized_query(&mut self) -> Result<Query> {
        self.expect_token(&TokenKind::LParen)?;
        let query = self.parse_query()?;
        self.expect_token(&TokenKind::RParen)?;
        Ok(query)
    }

    /// An expression that started with a word: a plain identifier, a
    /// `.`-separated compound, a qualified wildcard `a.b.*`, or a function
    /// call when a `(` follows.
    fn parse_word_expr(&mut self, word: super::Word, span: crate::error::Span) -> Result<ExprKind> {
        let start = span.start;
        let mut idents = vec![Ident {
            value: word.value,
            quote_style: word.quote_style,
            span: Some(span),
        }];
        let mut wildcard = false;
        while self.consume_token(&TokenKind::Period) {
            let token = self.next_token();
            match token.kind {
                TokenKind::Keyword(word) => idents.push(Ident {
                    value: word.value,
                    quote_style: word.quote_style,
                    span: Some(token.span),
                }),
                TokenKind::Mult => {
                    wildcard = true;
                    break;
                }
                _ => return self.expected("an identifier or * after '.'", &token),
            }
        }
        if wildcard {
            return Ok(ExprKind::QualifiedWildcard(idents));
        }
        if self.consume_token(&TokenKind::LParen) {
            let args = if self.consume_token(&TokenKind::RParen) {
                Vec::new()
            } else {
                let args = self
                    .parse_comma_separated(Parser::parse_expr)
                    .context("parsing function arguments")?;
                self.expect_token(&TokenKind::RParen)?;
                args
            };
            let over = if self.parse_keyword(keywords::OVER) {
                self.expect_token(&TokenKind::LParen)?;
                let spec = self.parse_window_spec()?;
                self.expect_token(&TokenKind::RParen)?;
                Some(spec)
            } else {
                None
            };
            return Ok(ExprKind::Function(Function {
                name: ObjectName(idents),
                args,
                over,
                span: self.span_from(start),
            }));
        }
        if idents.len() == 1 {
            Ok(ExprKind::Ident(idents.remove(0)))
        } else {
            Ok(ExprKind::CompoundIdent(idents))
        }
    }

    /// The inside of `OVER (...)`: partitioning, ordering and the optional
    /// frame.
    fn parse_window_spec(&mut self) -> Result<WindowSpec> {
        let partition_by = if self.parse_keywords(&[keywords::PARTITION, keywords::BY]) {
            self.parse_comma_separated(Parser::parse_expr)?
        } else {
            Vec::new()
        };
        let order_by = if self.parse_keywords(&[keywords::ORDER, keywords::BY]) {
            self.parse_comma_separated(Parser::parse_order_by_expr)?
        } else {
            Vec::new()
        };
        let window_frame = self.parse_window_frame().context("parsing window frame")?;
        Ok(WindowSpec {
            partition_by,
            order_by,
            window_frame,
        })
    }

    fn parse_window_frame(&mut self) -> Result<Option<WindowFrame>> {
        let units = match self.parse_one_of_keywords(&[
            keywords::ROWS,
            keywords::RANGE,
            keywords::GROUPS,
        ]) {
            Some(keywords::ROWS) => WindowFrameUnits::Rows,
            Some(keywords::RANGE) => WindowFrameUnits::Range,
            Some(keywords::GROUPS) => WindowFrameUnits::Groups,
            _ => return Ok(None),
        };
        let (start_bound, end_bound) = if self.parse_keyword(keywords::BETWEEN) {
            let start_bound = self.parse_window_frame_bound()?;
            self.expect_keyword(keywords::AND)?;
            (start_bound, Some(self.parse_window_frame_bound()?))
        } else {
            (self.parse_window_frame_bound()?, None)
        };
        Ok(Some(WindowFrame {
            units,
            start_bound,
            end_bound,
        }))
    }

    /// `CURRENT ROW`, `UNBOUNDED PRECEDING/FOLLOWING` or `<n>
    /// PRECEDING/FOLLOWING`; a negative bound is rejected here.
    fn parse_window_frame_bound(&mut self) -> Result<WindowFrameBound> {
        if self.parse_keywords(&[keywords::CURRENT, keywords::ROW]) {
            return Ok(WindowFrameBound::CurrentRow);
        }
        let rows = if self.parse_keyword(keywords::UNBOUNDED) {
            None
        } else {
            let token = self.peek_token().clone();
            if matches!(token.kind, TokenKind::Minus) {
                return Err(Error::simple("window frame bound cannot be negative")
                    .with_span(Some(token.span))
                    .into());
            }
            Some(self.parse_literal_u64()?)
        };
        if self.parse_keyword(keywords::PRECEDING) {
            Ok(WindowFrameBound::Preceding(rows))
        } else if self.parse_keyword(keywords::FOLLOWING) {
            Ok(WindowFrameBound::Following(rows))
        } else {
            let found = self.peek_token().clone();
            self.expected("PRECEDING or FOLLOWING", &found)
        }
    }

    /// An unsigned integer literal, e.g. a precision or a frame bound.
    pub(crate) fn parse_literal_u64(&mut self) -> Result<u64> {
        let token = self.next_token();
        match &token.kind {
            TokenKind::Number(lexeme) => lexeme.parse::<u64>().map_err(|_| {
                anyhow::Error::from(
                    Error::simple(format!("invalid unsigned number {lexeme:?}"))
                        .with_span(Some(token.span)),
                )
            }),
            _ => self.expected("an unsigned number", &token),
        }
    }

    /// A data type name, with any `[]` suffixes applied.
    pub fn parse_data_type(&mut self) -> Result<DataType> {
        let token = self.next_token();
        let mut data_type = match &token.kind {
            TokenKind::Keyword(word) if word.quote_style.is_none() => {
                match word.keyword.as_str() {
                    keywords::BOOLEAN => DataType::Boolean,
                    keywords::SMALLINT => DataType::SmallInt,
                    keywords::INT | keywords::INTEGER => DataType::Int,
                    keywords::BIGINT => DataType::BigInt,
                    keywords::REAL => DataType::Real,
                    keywords::FLOAT => DataType::Float(self.parse_optional_precision()?),
                    keywords::DOUBLE => {
                        self.parse_keyword(keywords::PRECISION);
                        DataType::Double
                    }
                    keywords::NUMERIC | keywords::DECIMAL | keywords::DEC => {
                        let (precision, scale) = self.parse_optional_precision_scale()?;
                        DataType::Decimal(precision, scale)
                    }
                    keywords::CHAR | keywords::CHARACTER => {
                        if self.parse_keyword(keywords::VARYING) {
                            DataType::Varchar(self.parse_optional_precision()?)
                        } else {
                            DataType::Char(self.parse_optional_precision()?)
                        }
                    }
                    keywords::VARCHAR => DataType::Varchar(self.parse_optional_precision()?),
                    keywords::DATE => DataType::Date,
                    keywords::TIME => DataType::Time {
                        with_time_zone: self.parse_timezone_suffix()?,
                    },
                    keywords::TIMESTAMP => DataType::Timestamp {
                        with_time_zone: self.parse_timezone_suffix()?,
                    },
                    keywords::UUID => DataType::Uuid,
                    keywords::REGCLASS => DataType::Regclass,
                    keywords::TEXT => DataType::Text,
                    keywords::BYTEA => DataType::Bytea,
                    _ => self.parse_custom_type(word.clone(), token.span)?,
                }
            }
            TokenKind::Keyword(word) => self.parse_custom_type(word.clone(), token.span)?,
            _ => return self.expected("a data type name", &token),
        };
        while self.consume_token(&TokenKind::LBracket) {
            self.expect_token(&TokenKind::RBracket)?;
            data_type = DataType::Array(Box::new(data_type));
        }
        Ok(data_type)
    }

    /// Any other (possibly dotted) name is preserved as a custom type.
    fn parse_custom_type(
        &mut self,
        word: super::Word,
        span: crate::error::Span,
    ) -> Result<DataType> {
        let mut idents = vec![Ident {
            value: word.value,
            quote_style: word.quote_style,
            span: Some(span),
        }];
        while self.consume_token(&TokenKind::Period) {
            idents.push(self.parse_identifier()?);
        }
        Ok(DataType::Custom(ObjectName(idents)))
    }

    /// `[WITH TIME ZONE | WITHOUT TIME ZONE]`
    fn parse_timezone_suffix(&mut self) -> Result<bool> {
        if self.parse_keyword(keywords::WITH) {
            self.expect_keyword(keywords::TIME)?;
            self.expect_keyword(keywords::ZONE)?;
            Ok(true)
        } else if self.parse_keyword(keywords::WITHOUT) {
            self.expect_keyword(keywords::TIME)?;
            self.expect_keyword(keywords::ZONE)?;
            Ok(false)
        } else {
            Ok(false)
        }
    }

    fn parse_optional_precision(&mut self) -> Result<Option<u64>> {
        if self.consume_token(&TokenKind::LParen) {
            let precision = self.parse_literal_u64()?;
            self.expect_token(&TokenKind::RParen)?;
            Ok(Some(precision))
        } else {
            Ok(None)
        }
    }

    fn parse_optional_precision_scale(&mut self) -> Result<(Option<u64>, Option<u64>)> {
        if self.consume_token(&TokenKind::LParen) {
            let precision = self.parse_literal_u64()?;
            let scale = if self.consume_token(&TokenKind::Comma) {
                Some(self.parse_literal_u64()?)
            } else {
                None
            };
            self.expect_token(&TokenKind::RParen)?;
            Ok((Some(precision), scale))
        } else {
            Ok((None, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use crate::dialect::GenericDialect;
    use crate::parser::Parser;

    fn parse_expr(sql: &str) -> crate::ast::Expr {
        Parser::new(sql, &GenericDialect).unwrap().parse_expr().unwrap()
    }

    fn roundtrip(sql: &str) -> String {
        parse_expr(sql).to_string()
    }

    #[test]
    fn test_precedence_shapes() {
        assert_snapshot!(roundtrip("1 + 2 * 3"), @"1 + 2 * 3");
        assert_snapshot!(roundtrip("a OR b AND c = d"), @"a OR b AND c = d");
        assert_snapshot!(roundtrip("NOT a = b"), @"NOT a = b");
        // Unary minus binds tighter than multiplication's right operand.
        assert_snapshot!(roundtrip("-a * b"), @"- a * b");
    }

    #[test]
    fn test_left_associativity() {
        use crate::ast::{BinaryOperator, ExprKind};
        let expr = parse_expr("1 - 2 - 3");
        let ExprKind::BinaryOp { left, op, .. } = &expr.kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(*op, BinaryOperator::Minus);
        assert!(matches!(
            &left.kind,
            ExprKind::BinaryOp {
                op: BinaryOperator::Minus,
                ..
            }
        ));
    }

    #[test]
    fn test_not_variants() {
        assert_snapshot!(roundtrip("a NOT IN (1, 2)"), @"a NOT IN (1, 2)");
        assert_snapshot!(roundtrip("a NOT BETWEEN 1 AND 2"), @"a NOT BETWEEN 1 AND 2");
        assert_snapshot!(roundtrip("a NOT LIKE 'x%'"), @"a NOT LIKE 'x%'");
        assert_snapshot!(roundtrip("a IS NOT NULL"), @"a IS NOT NULL");
    }

    #[test]
    fn test_between_keeps_its_and() {
        assert_snapshot!(
            roundtrip("a BETWEEN 1 AND 2 AND b"),
            @"a BETWEEN 1 AND 2 AND b"
        );
        let expr = parse_expr("a BETWEEN 1 AND 2 AND b");
        assert!(matches!(
            &expr.kind,
            crate::ast::ExprKind::BinaryOp {
                op: crate::ast::BinaryOperator::And,
                ..
            }
        ));
    }

    #[test]
    fn test_postgres_cast() {
        assert_snapshot!(roundtrip("a::int"), @"CAST(a AS INT)");
        assert_snapshot!(roundtrip("CAST(a AS CHARACTER VARYING(10))"), @"CAST(a AS CHARACTER VARYING(10))");
    }

    #[test]
    fn test_typed_literals() {
        assert_snapshot!(roundtrip("DATE '2023-01-02'"), @"DATE '2023-01-02'");
        assert_snapshot!(roundtrip("TIMESTAMP '2023-01-02 03:04:05'"), @"TIMESTAMP '2023-01-02 03:04:05'");
    }

    #[test]
    fn test_function_with_window() {
        assert_snapshot!(
            roundtrip("row_number() OVER (PARTITION BY a ORDER BY b DESC ROWS BETWEEN 1 PRECEDING AND CURRENT ROW)"),
            @"row_number() OVER (PARTITION BY a ORDER BY b DESC ROWS BETWEEN 1 PRECEDING AND CURRENT ROW)"
        );
    }

    #[test]
    fn test_negative_frame_bound_is_rejected() {
        let result = Parser::new("f() OVER (ROWS -1 PRECEDING)", &GenericDialect)
            .unwrap()
            .parse_expr();
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains("cannot be negative"), "{err}");
    }

    #[test]
    fn test_data_types() {
        let mut p = Parser::new("double precision", &GenericDialect).unwrap();
        assert_eq!(p.parse_data_type().unwrap(), crate::ast::DataType::Double);

        let mut p = Parser::new("text[]", &GenericDialect).unwrap();
        assert_eq!(
            p.parse_data_type().unwrap(),
            crate::ast::DataType::Array(Box::new(crate::ast::DataType::Text))
        );

        let mut p = Parser::new("geography(point)", &GenericDialect).unwrap();
        // Unknown names are preserved as custom types; trailing parens are
        // left for the caller.
        assert!(matches!(
            p.parse_data_type().unwrap(),
            crate::ast::DataType::Custom(_)
        ));
    }
}
