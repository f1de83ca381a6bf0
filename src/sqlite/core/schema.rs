use tracing::debug;

/// One `type = 'table'` row of the schema table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    /// Object kind; always "table" for rows the resolver keeps
    pub kind: String,
    pub name: String,
    pub tbl_name: String,
    pub root_page: u32,
    pub sql: String,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        extract_column_names(&self.sql)
    }
}

/// Pulls column names out of a `CREATE TABLE name (col type, ...)` statement.
///
/// This is a best-effort scan, not a parser: the text between the first `(`
/// and the last `)` is split on commas and the first word of each piece is
/// taken, minus any quoting. Commas inside types like `DECIMAL(10,2)` and
/// table constraints such as `PRIMARY KEY (a, b)` produce bogus names. A
/// piece with no words, as in `(a,,b)`, becomes an empty name.
pub fn extract_column_names(sql: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (sql.find('('), sql.rfind(')')) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }

    let body = &sql[start + 1..end];
    if body.trim().is_empty() {
        return Vec::new();
    }

    // An empty piece still takes a position so later names line up with values.
    let columns: Vec<String> = body
        .split(',')
        .map(|definition| definition.split_whitespace().next().unwrap_or(""))
        .map(|name| {
            name.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'))
                .to_string()
        })
        .collect();

    debug!("Columns for {:?}: {:?}", sql, columns);
    columns
}
