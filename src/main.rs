use anyhow::{anyhow, bail, Result};
use clap::Parser;
use itertools::Itertools;
use sqlite_reader::sqlite::statement::{Selection, Statement};
use sqlite_reader::sqlite::ROWID_COLUMN;
use sqlite_reader::{QueryResult, QueryStatus, SQLiteDatabase, SqlValue};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = cli::Args::parse();
    run(args)
}

pub fn run(args: cli::Args) -> Result<()> {
    let db = SQLiteDatabase::open(&args.file)?;
    info!("Running {} against {}", args.command, db.path().display());

    match args.command {
        cli::Command::Meta(meta) => match meta {
            cli::MetaCommand::DbInfo => {
                let info = db.info()?;
                println!("database page size: {}", info.page_size());
                println!("number of tables: {}", info.num_tables());
            }
            cli::MetaCommand::Tables => {
                let tables = db.list_tables()?;
                println!("{}", tables.join(" "));
            }
        },
        cli::Command::Sql(sql) => {
            let statement = Statement::parse(&sql)?;
            info!("Statement: {:?}", statement);
            let result = db.query_table(&statement.from_table)?;
            check_status(&result, &statement.from_table)?;

            match statement.selection {
                Selection::Count => println!("{}", result.rows.len()),
                Selection::All => print_rows(&result, &result.columns)?,
                Selection::Columns(columns) => print_rows(&result, &columns)?,
            }
        }
    }
    Ok(())
}

fn check_status(result: &QueryResult, table: &str) -> Result<()> {
    match &result.status {
        QueryStatus::Ok => Ok(()),
        QueryStatus::NotFound => bail!("no such table: {}", table),
        QueryStatus::UnsupportedPageType(page_type) => bail!(
            "table {} spans more than one page (root page type {:#04x})",
            table,
            page_type
        ),
        QueryStatus::Malformed(reason) => bail!("table {} is malformed: {}", table, reason),
    }
}

fn print_rows(result: &QueryResult, columns: &[String]) -> Result<()> {
    if let Some(missing) = columns
        .iter()
        .find(|c| c.as_str() != ROWID_COLUMN && !result.columns.contains(*c))
    {
        return Err(anyhow!("no such column: {}", missing));
    }

    for row in &result.rows {
        let line = columns
            .iter()
            .map(|column| row.get(column).unwrap_or(&SqlValue::Null))
            .join("|");
        println!("{}", line);
    }
    Ok(())
}
