use std::io::Write;

use log::{debug, info};
use rusqlite::{Connection, params_from_iter};

use crate::error::{LoadError, Result};
use crate::sql_generator::{generate_create_table, generate_insert, generate_truncate};
use crate::table::Table;
use crate::utils::timestamp;
use crate::{InsertMode, LoadConfig, LoadMode};

const MAIN_SCHEMA: &str = "main";

// bound on placeholders per multi-row insert, under sqlite's historical variable limit.
const MAX_BULK_PARAMS: usize = 999;

/// the three side effects a load can have on the target database.
pub trait Database {
    fn create_table(&self, schema: &str, table_name: &str, columns: &[String]) -> Result<()>;
    fn truncate(&self, schema: &str, table_name: &str) -> Result<()>;
    /// appends every row of `table`, returning the number written.
    fn append(&self, schema: &str, table_name: &str, table: &Table) -> Result<usize>;
}

/// what to do to the target table, taken from the load configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub schema: String,
    pub table_name: String,
    pub load_mode: LoadMode,
    pub create_table: bool,
}

impl From<&LoadConfig> for WritePlan {
    fn from(config: &LoadConfig) -> Self {
        WritePlan {
            schema: config.schema.clone(),
            table_name: config.table_name.clone(),
            load_mode: config.load_mode,
            create_table: config.create_table,
        }
    }
}

/// runs create (optional), truncate (optional) and append, in that order,
/// stopping at the first failure. earlier steps are not undone.
pub fn write_table<D: Database, W: Write>(
    db: &D,
    plan: &WritePlan,
    table: &Table,
    out: &mut W,
) -> Result<usize> {
    let schema = plan.schema.as_str();
    let name = plan.table_name.as_str();

    if plan.create_table {
        writeln!(out, "{} -->Create table = {}.{}", timestamp(), schema, name)?;
        db.create_table(schema, name, table.columns())?;
    }

    if plan.load_mode == LoadMode::Truncate {
        writeln!(out, "{} -->truncate table = {}.{}", timestamp(), schema, name)?;
        db.truncate(schema, name)?;
    }

    let written = db.append(schema, name, table)?;
    writeln!(out, "{} -->Loaded table = {}.{}", timestamp(), schema, name)?;
    Ok(written)
}

/// a sqlite database addressed by a path or `file:` uri.
///
/// every operation opens its own connection and drops it when the operation
/// returns, on success or error.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    path: String,
    insert_mode: InsertMode,
}

impl SqliteDatabase {
    /// checks that the connection string opens before any statement runs.
    pub fn open(conn_str: &str, insert_mode: InsertMode) -> Result<Self> {
        let path = conn_str.strip_prefix("sqlite://").unwrap_or(conn_str).to_string();
        let db = SqliteDatabase { path, insert_mode };
        drop(db.connect()?);
        Ok(db)
    }

    /// every operation runs on a fresh connection, so only the `main` database
    /// of the connection string is reachable; `temp` and attached schemas are not.
    pub fn check_schema(schema: &str) -> Result<()> {
        if schema.eq_ignore_ascii_case(MAIN_SCHEMA) {
            Ok(())
        } else {
            Err(LoadError::UnsupportedSchema(schema.to_string()))
        }
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    fn append_bulk(&self, schema: &str, table_name: &str, table: &Table) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let rows_per_stmt = (MAX_BULK_PARAMS / table.columns().len().max(1)).max(1);

        for chunk in table.rows().chunks(rows_per_stmt) {
            let sql = generate_insert(schema, table_name, table.columns(), chunk.len());
            let mut stmt = tx.prepare_cached(&sql)?;
            stmt.execute(params_from_iter(chunk.iter().flatten().map(String::as_str).map(cell)))?;
        }
        tx.commit()?;
        Ok(table.len())
    }

    fn append_rows(&self, schema: &str, table_name: &str, table: &Table) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&generate_insert(schema, table_name, table.columns(), 1))?;
            for row in table.rows() {
                stmt.execute(params_from_iter(row.iter().map(String::as_str).map(cell)))?;
            }
        }
        tx.commit()?;
        Ok(table.len())
    }
}

impl Database for SqliteDatabase {
    fn create_table(&self, schema: &str, table_name: &str, columns: &[String]) -> Result<()> {
        let sql = generate_create_table(schema, table_name, columns);
        debug!("{}", sql);
        self.connect()?.execute(&sql, [])?;
        Ok(())
    }

    fn truncate(&self, schema: &str, table_name: &str) -> Result<()> {
        let sql = generate_truncate(schema, table_name);
        debug!("{}", sql);
        let removed = self.connect()?.execute(&sql, [])?;
        info!("removed {} rows from {}.{}", removed, schema, table_name);
        Ok(())
    }

    fn append(&self, schema: &str, table_name: &str, table: &Table) -> Result<usize> {
        if table.is_empty() {
            return Ok(0);
        }
        let written = match self.insert_mode {
            InsertMode::Bulk => self.append_bulk(schema, table_name, table)?,
            InsertMode::RowByRow => self.append_rows(schema, table_name, table)?,
        };
        info!("appended {} rows to {}.{}", written, schema, table_name);
        Ok(written)
    }
}

// empty fields are stored as null.
fn cell(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail_truncate: bool,
    }

    impl Database for Recorder {
        fn create_table(&self, _: &str, _: &str, columns: &[String]) -> Result<()> {
            self.calls.borrow_mut().push(format!("create:{}", columns.len()));
            Ok(())
        }

        fn truncate(&self, _: &str, _: &str) -> Result<()> {
            self.calls.borrow_mut().push("truncate".to_string());
            if self.fail_truncate {
                return Err(LoadError::Database(rusqlite::Error::InvalidQuery));
            }
            Ok(())
        }

        fn append(&self, _: &str, _: &str, table: &Table) -> Result<usize> {
            self.calls.borrow_mut().push("append".to_string());
            Ok(table.len())
        }
    }

    fn plan(load_mode: LoadMode, create_table: bool) -> WritePlan {
        WritePlan {
            schema: "main".to_string(),
            table_name: "t".to_string(),
            load_mode,
            create_table,
        }
    }

    fn table() -> Table {
        let mut t = Table::new(vec!["a".to_string(), "b".to_string()]);
        t.push_row(vec!["1".to_string(), "".to_string()]).unwrap();
        t
    }

    #[test]
    fn test_create_truncate_append_order() {
        let db = Recorder::default();
        let mut out = Vec::new();
        let written = write_table(&db, &plan(LoadMode::Truncate, true), &table(), &mut out).unwrap();
        assert_eq!(written, 1);
        assert_eq!(*db.calls.borrow(), vec!["create:2", "truncate", "append"]);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("-->Create table = main.t"));
        assert!(lines[1].ends_with("-->truncate table = main.t"));
        assert!(lines[2].ends_with("-->Loaded table = main.t"));
    }

    #[test]
    fn test_append_only_issues_single_call() {
        let db = Recorder::default();
        let mut out = Vec::new();
        write_table(&db, &plan(LoadMode::Append, false), &table(), &mut out).unwrap();
        assert_eq!(*db.calls.borrow(), vec!["append"]);
    }

    #[test]
    fn test_failed_truncate_stops_before_append() {
        let db = Recorder {
            fail_truncate: true,
            ..Default::default()
        };
        let mut out = Vec::new();
        let result = write_table(&db, &plan(LoadMode::Truncate, true), &table(), &mut out);
        assert!(result.is_err());
        assert_eq!(*db.calls.borrow(), vec!["create:2", "truncate"]);
    }

    #[test]
    fn test_check_schema_accepts_only_main() {
        assert!(SqliteDatabase::check_schema("main").is_ok());
        assert!(SqliteDatabase::check_schema("MAIN").is_ok());
        assert!(matches!(
            SqliteDatabase::check_schema("temp"),
            Err(LoadError::UnsupportedSchema(s)) if s == "temp"
        ));
        assert!(SqliteDatabase::check_schema("dbo").is_err());
    }

    #[test]
    fn test_cell_maps_empty_to_null() {
        assert_eq!(cell(""), None);
        assert_eq!(cell("x"), Some("x"));
    }
}
