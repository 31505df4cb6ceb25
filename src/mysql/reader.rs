// ABOUTME: Source-side table discovery over a live MySQL connection
// ABOUTME: Runs SHOW TABLES and reads the Tables_in_<db> column of each row

use anyhow::{bail, Context, Result};
use mysql_async::{prelude::*, Conn, Row};

/// Column label MySQL gives the single column of `SHOW TABLES`
pub fn show_tables_column(db_name: &str) -> String {
    format!("Tables_in_{}", db_name)
}

/// List all tables in the connected database.
///
/// Tables are returned in the order the server reports them.
///
/// # Examples
///
/// ```no_run
/// # use mysqldump_migrator::mysql::reader::list_tables;
/// # async fn example() -> anyhow::Result<()> {
/// let pool = mysql_async::Pool::new("mysql://root@localhost:3306/shop");
/// let mut conn = pool.get_conn().await?;
/// let tables = list_tables(&mut conn, "shop").await?;
/// println!("Found {} tables", tables.len());
/// # Ok(())
/// # }
/// ```
pub async fn list_tables(conn: &mut Conn, db_name: &str) -> Result<Vec<String>> {
    tracing::info!("Listing tables from database '{}'", db_name);

    let rows: Vec<Row> = conn
        .query("SHOW TABLES")
        .await
        .with_context(|| format!("Failed to list tables from database '{}'", db_name))?;

    let column = show_tables_column(db_name);
    let tables = rows
        .into_iter()
        .map(|row| table_name_from_row(row, &column))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Found {} table(s) in database '{}'", tables.len(), db_name);

    Ok(tables)
}

/// Read the table name out of one `SHOW TABLES` row.
///
/// Servers with `lower_case_table_names` can report a label whose case differs
/// from the configured database name; the first column is used then.
fn table_name_from_row(mut row: Row, column: &str) -> Result<String> {
    let value = match row.take_opt::<String, _>(column) {
        Some(value) => value,
        None => {
            tracing::debug!("Column '{}' not in SHOW TABLES row, using first column", column);
            match row.take_opt::<String, _>(0usize) {
                Some(value) => value,
                None => bail!("SHOW TABLES returned a row without a table name"),
            }
        }
    };

    value.context("SHOW TABLES returned a table name that is not valid text")
}
