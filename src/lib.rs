//! A SQL front-end: lexing, parsing, rendering and rewriting.
//!
//! Source text flows through the pipeline below; every AST node renders
//! itself back to canonical SQL, so there is a round-trip path from source
//! to tree to source.
//!
//! ```ascii
//!        SQL text
//!           │
//!   (lexer) │  dialect-aware scan
//!           ▼
//!      token stream
//!           │
//!  (parser) │  recursive descent + precedence climbing
//!           ▼
//!     statement AST ──────► JSON
//!           │      ◄──────
//!           │
//!  to_sql() │  inspect / apply rewrite in between
//!           ▼
//!        SQL text
//! ```
//!
//! The [parse_sql], [parse_file] and [parse_expr] wrappers cover the
//! common cases; construct a [Parser] directly for more control.

pub mod ast;
#[cfg(feature = "cli")]
mod cli;
mod codegen;
pub mod comments;
pub mod dialect;
mod error;
pub mod keywords;
pub mod parser;
#[cfg(test)]
mod test;

#[cfg(feature = "cli")]
pub use cli::Cli;
pub use error::{Error, ErrorMessage, ErrorMessages, Pos, Reason, Span, WithErrorInfo};
pub use parser::{Parser, ParserOptions};

use ast::{DataType, Expr, File, Statement};
use dialect::Dialect;

/// Parse a complete source into its statements.
pub fn parse_sql(sql: &str, dialect: &dyn Dialect) -> Result<Vec<Statement>, ErrorMessages> {
    Parser::new(sql, dialect)
        .and_then(|mut parser| parser.parse_sql())
        .map_err(error::downcast)
        .map_err(|e| e.composed("", sql, false))
}

/// Parse exactly one statement; a trailing semicolon is not consumed.
pub fn parse_statement(sql: &str, dialect: &dyn Dialect) -> Result<Statement, ErrorMessages> {
    Parser::new(sql, dialect)
        .and_then(|mut parser| parser.parse_statement())
        .map_err(error::downcast)
        .map_err(|e| e.composed("", sql, false))
}

/// Parse a complete source into a [File], retaining comments for
/// [comments::CommentMap].
pub fn parse_file(sql: &str, dialect: &dyn Dialect) -> Result<File, ErrorMessages> {
    let options = ParserOptions {
        parse_comments: true,
    };
    Parser::new_with_options(sql, dialect, options)
        .and_then(|mut parser| parser.parse_file())
        .map_err(error::downcast)
        .map_err(|e| e.composed("", sql, false))
}

/// Parse a single expression, for callers embedding SQL fragments.
pub fn parse_expr(sql: &str, dialect: &dyn Dialect) -> Result<Expr, ErrorMessages> {
    Parser::new(sql, dialect)
        .and_then(|mut parser| parser.parse_expr())
        .map_err(error::downcast)
        .map_err(|e| e.composed("", sql, false))
}

/// Parse a single data type name.
pub fn parse_data_type(sql: &str, dialect: &dyn Dialect) -> Result<DataType, ErrorMessages> {
    Parser::new(sql, dialect)
        .and_then(|mut parser| parser.parse_data_type())
        .map_err(error::downcast)
        .map_err(|e| e.composed("", sql, false))
}

/// JSON serialization
pub fn json_of_statements(stmts: &[Statement]) -> Result<String, ErrorMessages> {
    serde_json::to_string(stmts).map_err(|e| error::downcast(anyhow::anyhow!(e)))
}

/// JSON deserialization
pub fn statements_of_json(json: &str) -> Result<Vec<Statement>, ErrorMessages> {
    serde_json::from_str(json).map_err(|e| error::downcast(anyhow::anyhow!(e)))
}
