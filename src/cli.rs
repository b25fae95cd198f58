use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ast::AstNode;
use crate::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect};

/// Parses SQL and dumps the syntax tree.
#[derive(clap::Parser)]
#[command(name = env!("CARGO_PKG_NAME"), about, version)]
pub struct Cli {
    /// Read SQL from this file instead of stdin
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Output representation
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,

    /// Lexical dialect to scan with
    #[arg(long, value_enum, default_value_t = DialectName::Generic)]
    dialect: DialectName,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Format {
    Yaml,
    Debug,
    Sql,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DialectName {
    Generic,
    Postgres,
    Mysql,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let source = self.read_input()?;
        let dialect: &dyn Dialect = match self.dialect {
            DialectName::Generic => &GenericDialect,
            DialectName::Postgres => &PostgreSqlDialect,
            DialectName::Mysql => &MySqlDialect,
        };

        let stmts = crate::parse_sql(&source, dialect)?;

        let out = match self.format {
            Format::Yaml => serde_yaml::to_string(&stmts)?,
            Format::Debug => format!("{stmts:#?}\n"),
            Format::Sql => {
                let mut out = String::new();
                for stmt in &stmts {
                    out.push_str(&stmt.to_sql());
                    out.push_str(";\n");
                }
                out
            }
        };
        print!("{out}");
        Ok(())
    }

    fn read_input(&self) -> Result<String> {
        match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            None => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading stdin")?;
                Ok(buffer)
            }
        }
    }
}
