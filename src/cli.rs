use clap::Parser;
use std::{fmt::Display, path::PathBuf};

/// Dot-commands understood by the CLI
#[derive(Debug, Clone, PartialEq)]
pub enum MetaCommand {
    DbInfo,
    Tables,
}

/// What to run against the database
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Meta(MetaCommand),
    Sql(String),
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ".dbinfo" => Ok(Command::Meta(MetaCommand::DbInfo)),
            ".tables" => Ok(Command::Meta(MetaCommand::Tables)),
            cmd if cmd.starts_with('.') => Err(format!("Unknown command: {}", cmd)),
            "" => Err("Empty command".to_string()),
            sql => Ok(Command::Sql(sql.to_string())),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Meta(MetaCommand::DbInfo) => write!(f, ".dbinfo"),
            Command::Meta(MetaCommand::Tables) => write!(f, ".tables"),
            Command::Sql(sql) => write!(f, "{}", sql),
        }
    }
}

/// Read-only SQLite database file reader
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to the database file
    pub file: PathBuf,
    /// `.dbinfo`, `.tables` or a `SELECT ... FROM table` statement
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let args = Args::try_parse_from(["sqlite-reader", "sample.db", ".tables"]).unwrap();
        assert_eq!(args.file, PathBuf::from("sample.db"));
        assert_eq!(args.command, Command::Meta(MetaCommand::Tables));

        let args =
            Args::try_parse_from(["sqlite-reader", "sample.db", "SELECT * FROM apples"]).unwrap();
        assert_eq!(args.command, Command::Sql("SELECT * FROM apples".to_string()));
    }

    #[test]
    fn test_unknown_dot_command() {
        assert!(Args::try_parse_from(["sqlite-reader", "sample.db", ".schema"]).is_err());
        assert!(Args::try_parse_from(["sqlite-reader", "sample.db"]).is_err());
    }
}
