use std::io::Write;

use log::{debug, info};

mod config;
mod error;
mod loader;
mod sql_generator;
mod table;
mod utils;
mod writer;

pub use config::{Cli, Delimiter, HeaderMode, InsertMode, LoadConfig, LoadMode, usage, valid_arity};
pub use error::{LoadError, Result};
pub use loader::{load_file, read_table};
pub use sql_generator::{generate_create_table, generate_insert, generate_truncate};
pub use table::{FILENAME_COLUMN, LOAD_DATETIME_COLUMN, Table};
pub use utils::{sanitize_header, timestamp};
pub use writer::{Database, SqliteDatabase, WritePlan, write_table};

/// runs one load from raw command line arguments (program name first), writing
/// the usage text or the progress lines to `out`.
///
/// a wrong argument count prints usage and returns `Ok` without touching the
/// file or the database.
pub fn run<W: Write>(args: &[String], out: &mut W) -> Result<()> {
    let prg_name = args.first().map_or("file2table", String::as_str);
    if !valid_arity(args.len().saturating_sub(1)) {
        write!(out, "{}", usage(prg_name))?;
        return Ok(());
    }

    let config = LoadConfig::parse_from(args)?;
    SqliteDatabase::check_schema(&config.schema)?;
    writeln!(out)?;
    for line in config.echo_lines() {
        writeln!(out, "{}", line)?;
    }
    writeln!(out)?;

    writeln!(out, "{} -->Load file = {} into table structure", timestamp(), config.filename.display())?;
    let table = load_file(&config.filename, &config.delimiter, config.header, config.columns.as_deref())?;
    if let Some(record) = table.record(0) {
        debug!("first record: {:?}", record);
    }

    writeln!(out, "{} -->Load table structure into table = {}", timestamp(), config.table_name)?;
    let db = SqliteDatabase::open(&config.db_conn_str, config.insert_mode)?;
    let written = write_table(&db, &WritePlan::from(&config), &table, out)?;
    info!("load of {} finished, {} rows written", config.filename.display(), written);
    Ok(())
}
