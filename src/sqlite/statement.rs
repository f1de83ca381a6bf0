//! SQL Statement Recogniser
//!
//! The command line accepts three query shapes, all over a single table:
//!
//! - `SELECT * FROM t`
//! - `SELECT COUNT(*) FROM t`
//! - `SELECT a, b FROM t`
//!
//! Anything else is rejected. There is no WHERE, ORDER BY or join support.
//!
//! # Example
//! ```
//! use sqlite_reader::sqlite::statement::{Selection, Statement};
//!
//! let stmt = Statement::parse("SELECT COUNT(*) FROM apples").unwrap();
//! assert_eq!(stmt.from_table, "apples");
//! assert_eq!(stmt.selection, Selection::Count);
//! ```

use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

static SELECT_PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// The `SELECT <selection> FROM <table>` pattern, compiled on first use
fn select_pattern() -> Result<&'static Regex> {
    SELECT_PATTERN
        .get_or_init(|| {
            Regex::new(
                r#"(?is)^\s*SELECT\s+(?P<selection>.+?)\s+FROM\s+(?P<table>"[^"]+"|`[^`]+`|\[[^\]]+\]|\w+)\s*;?\s*$"#,
            )
        })
        .as_ref()
        .map_err(|e| anyhow!("Invalid statement pattern: {}", e))
}

/// What the statement selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `*`
    All,
    /// `COUNT(*)`
    Count,
    /// A list of column names
    Columns(Vec<String>),
}

/// Represents a parsed SQL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub selection: Selection,
    /// The table name to select from
    pub from_table: String,
}

impl Statement {
    /// Parses a SQL string into a Statement struct
    pub fn parse(sql: &str) -> Result<Self> {
        let captures = select_pattern()?
            .captures(sql)
            .ok_or_else(|| anyhow!("Unsupported statement: {}", sql))?;

        let selection = captures["selection"].trim();
        let selection = if selection == "*" {
            Selection::All
        } else if selection.replace(char::is_whitespace, "").eq_ignore_ascii_case("count(*)") {
            Selection::Count
        } else {
            let columns: Vec<String> = selection
                .split(',')
                .map(|column| unquote(column.trim()).to_string())
                .collect();
            if columns.iter().any(|column| column.is_empty()) {
                return Err(anyhow!("Empty column in selection: {}", selection));
            }
            Selection::Columns(columns)
        };

        Ok(Statement {
            selection,
            from_table: unquote(&captures["table"]).to_string(),
        })
    }
}

fn unquote(name: &str) -> &str {
    name.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_compiled_once() -> Result<()> {
        Statement::parse("SELECT * FROM a")?;
        Statement::parse("SELECT * FROM b")?;
        assert!(std::ptr::eq(select_pattern()?, select_pattern()?));
        Ok(())
    }

    #[test]
    fn test_parse_simple_count() -> Result<()> {
        let stmt = Statement::parse("SELECT COUNT(*) FROM apples")?;
        assert_eq!(stmt.from_table, "apples");
        assert_eq!(stmt.selection, Selection::Count);

        let stmt = Statement::parse("select count( * ) from apples;")?;
        assert_eq!(stmt.selection, Selection::Count);
        Ok(())
    }

    #[test]
    fn test_parse_star_and_columns() -> Result<()> {
        let stmt = Statement::parse("SELECT * FROM \"my table\"")?;
        assert_eq!(stmt.selection, Selection::All);
        assert_eq!(stmt.from_table, "my table");

        let stmt = Statement::parse("SELECT name, color FROM apples")?;
        assert_eq!(
            stmt.selection,
            Selection::Columns(vec!["name".to_string(), "color".to_string()])
        );
        Ok(())
    }

    #[test]
    fn test_rejects_other_statements() {
        assert!(Statement::parse("DELETE FROM apples").is_err());
        assert!(Statement::parse("SELECT FROM apples").is_err());
        assert!(Statement::parse("SELECT a,,b FROM apples").is_err());
    }
}
