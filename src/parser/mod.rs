//! The parser: token stream to statement ASTs.
//!
//! Statement and clause grammar is plain recursive descent; expressions are
//! parsed by precedence climbing over the table below. The parser consumes
//! the token stream produced by [Lexer] eagerly at construction and never
//! backtracks except through explicit checkpoints.

pub use self::lexer::{Lexer, Token, TokenKind, Whitespace, Word};

mod expr;
mod lexer;
mod query;
mod stmt;

use anyhow::Context;

use crate::ast::{Comment, Expr, File, Ident, ObjectName, Statement};
use crate::comments::group_comments;
use crate::dialect::Dialect;
use crate::error::{Error, Pos, Reason, Result, Span};
use crate::keywords;

/// Expression precedences, ascending. `NOT` is the prefix precedence; the
/// infix `NOT IN`/`NOT BETWEEN`/`NOT LIKE` bind at comparison level.
pub(crate) const PREC_OR: u8 = 5;
pub(crate) const PREC_AND: u8 = 10;
pub(crate) const PREC_UNARY_NOT: u8 = 15;
pub(crate) const PREC_IS: u8 = 17;
pub(crate) const PREC_CMP: u8 = 20;
pub(crate) const PREC_PLUS_MINUS: u8 = 30;
pub(crate) const PREC_MUL_DIV_MOD: u8 = 40;
pub(crate) const PREC_CAST: u8 = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Retain comment tokens in the parsed [File] instead of dropping them
    /// as whitespace.
    pub parse_comments: bool,
}

pub struct Parser {
    tokens: Vec<Token>,
    /// Index of the next unconsumed token
    index: usize,
    options: ParserOptions,
    /// Comment tokens seen so far, in source order (only when retaining)
    comments: Vec<Comment>,
    /// Highest token index whose comment was already recorded
    recorded_comments_up_to: usize,
    /// Span of the last significant token consumed
    last_span: Span,
}

impl Parser {
    /// Tokenize `sql` under `dialect` and return a parser over the result,
    /// or the lexer's error.
    pub fn new(sql: &str, dialect: &dyn Dialect) -> Result<Self> {
        Parser::new_with_options(sql, dialect, ParserOptions::default())
    }

    pub fn new_with_options(
        sql: &str,
        dialect: &dyn Dialect,
        options: ParserOptions,
    ) -> Result<Self> {
        let tokens = Lexer::new(sql, dialect)
            .tokenize()
            .context("tokenizing SQL")?;
        log::debug!("parsing {} tokens", tokens.len());
        Ok(Parser {
            tokens,
            index: 0,
            options,
            comments: Vec::new(),
            recorded_comments_up_to: 0,
            last_span: Span::default(),
        })
    }

    /// Parse statements until end of input, consuming interleaved
    /// semicolons (consecutive semicolons are empty statements and are
    /// skipped).
    pub fn parse_sql(&mut self) -> Result<Vec<Statement>> {
        let mut stmts = Vec::new();
        loop {
            while self.consume_token(&TokenKind::Semicolon) {}
            if matches!(self.peek_token().kind, TokenKind::Eof) {
                break;
            }
            stmts.push(self.parse_statement()?);
            let next = self.peek_token();
            if !matches!(next.kind, TokenKind::Semicolon | TokenKind::Eof) {
                let next = next.clone();
                return Err(Error::new(Reason::Unexpected {
                    found: format!("{} after a statement", next.kind),
                })
                .with_help("statements must be separated by semicolons")
                .with_span(Some(next.span))
                .into());
            }
        }
        Ok(stmts)
    }

    /// Parse a whole source into a [File]. With
    /// [ParserOptions::parse_comments] the file keeps its comment groups,
    /// ready for [crate::comments::CommentMap].
    pub fn parse_file(&mut self) -> Result<File> {
        let stmts = self.parse_sql()?;
        // Walk over any trailing trivia so final comments get recorded.
        self.next_token();
        let comments = group_comments(std::mem::take(&mut self.comments));
        Ok(File { stmts, comments })
    }

    /// Parse exactly one statement; a trailing semicolon is not consumed.
    pub fn parse_statement(&mut self) -> Result<Statement> {
        self.parse_statement_dispatch()
    }

    /// Parse a single expression, for callers embedding SQL fragments.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_subexpr(0)
    }

    /// Precedence climbing: parse a prefix, then fold infix operators while
    /// they bind tighter than `precedence`.
    pub(crate) fn parse_subexpr(&mut self, precedence: u8) -> Result<Expr> {
        let mut expr = self.parse_prefix()?;
        loop {
            let next_precedence = self.get_next_precedence();
            if next_precedence <= precedence {
                break;
            }
            expr = self.parse_infix(expr, next_precedence)?;
        }
        Ok(expr)
    }

    /// The binding power of the next token when used as an infix operator;
    /// zero for anything that cannot continue an expression.
    pub(crate) fn get_next_precedence(&self) -> u8 {
        use TokenKind::*;
        let token = self.peek_token();
        match &token.kind {
            Keyword(word) if word.quote_style.is_none() => match word.keyword.as_str() {
                keywords::OR => PREC_OR,
                keywords::AND => PREC_AND,
                keywords::IS => PREC_IS,
                keywords::IN | keywords::BETWEEN | keywords::LIKE => PREC_CMP,
                keywords::NOT => match self.peek_nth_keyword(1).as_deref() {
                    Some(keywords::IN | keywords::BETWEEN | keywords::LIKE) => PREC_CMP,
                    _ => 0,
                },
                _ => 0,
            },
            Eq | Neq | Lt | Gt | LtEq | GtEq => PREC_CMP,
            Plus | Minus => PREC_PLUS_MINUS,
            Mult | Div | Mod => PREC_MUL_DIV_MOD,
            DoubleColon => PREC_CAST,
            _ => 0,
        }
    }

    // --- token navigation -------------------------------------------------

    fn is_trivia(kind: &TokenKind) -> bool {
        matches!(kind, TokenKind::Whitespace(_) | TokenKind::Comment(_))
    }

    /// The next significant token, without consuming it.
    pub(crate) fn peek_token(&self) -> &Token {
        self.peek_nth(0)
    }

    /// The n-th significant token ahead (0 = the next one).
    pub(crate) fn peek_nth(&self, mut n: usize) -> &Token {
        let mut index = self.index;
        loop {
            let token = &self.tokens[index.min(self.tokens.len() - 1)];
            if matches!(token.kind, TokenKind::Eof) {
                return token;
            }
            if !Self::is_trivia(&token.kind) {
                if n == 0 {
                    return token;
                }
                n -= 1;
            }
            index += 1;
        }
    }

    fn peek_nth_keyword(&self, n: usize) -> Option<String> {
        match &self.peek_nth(n).kind {
            TokenKind::Keyword(word) if word.quote_style.is_none() => Some(word.keyword.clone()),
            _ => None,
        }
    }

    /// Consume and return the next significant token, recording retained
    /// comments along the way. At end of input, keeps returning the
    /// sentinel.
    pub(crate) fn next_token(&mut self) -> Token {
        loop {
            let token = self.tokens[self.index.min(self.tokens.len() - 1)].clone();
            match &token.kind {
                TokenKind::Eof => return token,
                TokenKind::Comment(text) => {
                    if self.options.parse_comments && self.index >= self.recorded_comments_up_to {
                        self.comments.push(Comment {
                            text: text.clone(),
                            span: Some(token.span),
                        });
                        self.recorded_comments_up_to = self.index + 1;
                    }
                    self.index += 1;
                }
                TokenKind::Whitespace(_) => {
                    self.index += 1;
                }
                _ => {
                    self.index += 1;
                    self.last_span = token.span;
                    return token;
                }
            }
        }
    }

    /// A rewind point for productions that need bounded look-ahead.
    pub(crate) fn checkpoint(&self) -> usize {
        self.index
    }

    pub(crate) fn reset(&mut self, checkpoint: usize) {
        self.index = checkpoint;
    }

    // --- matching helpers -------------------------------------------------

    /// Report what was found where something else was expected.
    pub(crate) fn expected<T>(&self, expected: &str, found: &Token) -> Result<T> {
        Err(Error::new(Reason::Expected {
            who: None,
            expected: expected.to_string(),
            found: format!("{}", found.kind),
        })
        .with_span(Some(found.span))
        .into())
    }

    /// Consume the next token if it is the unquoted keyword `expected`.
    pub(crate) fn parse_keyword(&mut self, expected: &str) -> bool {
        if self.peek_is_keyword(expected) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume a whole keyword sequence, or nothing at all.
    pub(crate) fn parse_keywords(&mut self, expected: &[&str]) -> bool {
        let checkpoint = self.checkpoint();
        for keyword in expected {
            if !self.parse_keyword(keyword) {
                self.reset(checkpoint);
                return false;
            }
        }
        true
    }

    /// Consume the next token if it is one of `candidates`; returns the
    /// matched keyword.
    pub(crate) fn parse_one_of_keywords(&mut self, candidates: &[&'static str]) -> Option<&'static str> {
        for &candidate in candidates {
            if self.parse_keyword(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    pub(crate) fn expect_keyword(&mut self, expected: &str) -> Result<Token> {
        if !self.peek_is_keyword(expected) {
            let found = self.peek_token().clone();
            return self.expected(&format!("keyword {expected}"), &found);
        }
        Ok(self.next_token())
    }

    pub(crate) fn peek_is_keyword(&self, expected: &str) -> bool {
        matches!(
            &self.peek_token().kind,
            TokenKind::Keyword(word) if word.quote_style.is_none() && word.keyword == expected
        )
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn consume_token(&mut self, expected: &TokenKind) -> bool {
        if &self.peek_token().kind == expected {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_token(&mut self, expected: &TokenKind) -> Result<Token> {
        if &self.peek_token().kind == expected {
            Ok(self.next_token())
        } else {
            let found = self.peek_token().clone();
            self.expected(&format!("{expected}"), &found)
        }
    }

    /// Parse a comma-separated list of whatever `f` parses.
    pub(crate) fn parse_comma_separated<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Parser) -> Result<T>,
    {
        let mut values = Vec::new();
        loop {
            values.push(f(self)?);
            if !self.consume_token(&TokenKind::Comma) {
                return Ok(values);
            }
        }
    }

    /// Any word, quoted or not, as an identifier.
    pub(crate) fn parse_identifier(&mut self) -> Result<Ident> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Keyword(word) => Ok(Ident {
                value: word.value,
                quote_style: word.quote_style,
                span: Some(token.span),
            }),
            _ => self.expected("an identifier", &token),
        }
    }

    /// A possibly dotted name, e.g. `db.schema.table`.
    pub(crate) fn parse_object_name(&mut self) -> Result<ObjectName> {
        let mut idents = vec![self.parse_identifier()?];
        while self.consume_token(&TokenKind::Period) {
            idents.push(self.parse_identifier()?);
        }
        Ok(ObjectName(idents))
    }

    /// `(column, column, ...)`
    pub(crate) fn parse_parenthesized_column_list(&mut self) -> Result<Vec<Ident>> {
        self.expect_token(&TokenKind::LParen)?;
        let columns = self.parse_comma_separated(Parser::parse_identifier)?;
        self.expect_token(&TokenKind::RParen)?;
        Ok(columns)
    }

    /// An alias after an expression or table factor: `AS ident`, or a bare
    /// word that is not reserved in this context.
    pub(crate) fn parse_optional_alias(&mut self, reserved: &[&str]) -> Result<Option<Ident>> {
        if self.parse_keyword(keywords::AS) {
            return Ok(Some(self.parse_identifier()?));
        }
        let is_alias = match &self.peek_token().kind {
            TokenKind::Keyword(word) => {
                word.quote_style.is_some() || !reserved.contains(&word.keyword.as_str())
            }
            _ => false,
        };
        if is_alias {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    // --- span helpers -----------------------------------------------------

    /// Start position of the next significant token.
    pub(crate) fn peek_start(&self) -> Pos {
        self.peek_token().span.start
    }

    /// The span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Pos) -> Option<Span> {
        Some(Span::new(start, self.last_span.end))
    }
}
