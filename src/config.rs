use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// positional arguments after the program name: nine required, one optional.
pub const REQUIRED_ARGS: usize = 9;
pub const MAX_ARGS: usize = 10;

/// field separator of the input file. `TAB` on the command line maps to `\t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Literal(String),
}

impl Delimiter {
    pub fn as_str(&self) -> &str {
        match self {
            Delimiter::Tab => "\t",
            Delimiter::Literal(s) => s,
        }
    }

    /// the delimiter as a single byte, when the csv reader can use it directly.
    pub fn as_byte(&self) -> Option<u8> {
        match self.as_str().as_bytes() {
            [b] => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Delimiter {
    fn from(token: &str) -> Self {
        if token == "TAB" {
            Delimiter::Tab
        } else {
            Delimiter::Literal(token.to_string())
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Tab => f.write_str("TAB"),
            Delimiter::Literal(s) => f.write_str(s),
        }
    }
}

fn parse_delimiter(token: &str) -> Result<Delimiter, String> {
    if token.is_empty() {
        return Err("delimiter must not be empty".to_string());
    }
    Ok(Delimiter::from(token))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderMode {
    #[value(name = "yes")]
    Present,
    #[value(name = "no")]
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoadMode {
    Truncate,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InsertMode {
    #[value(name = "yes")]
    Bulk,
    #[value(name = "no")]
    RowByRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    Yes,
    No,
}

// value names back to the words typed on the command line, for the echo lines.
macro_rules! display_as_value {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.to_possible_value() {
                    Some(v) => f.write_str(v.get_name()),
                    None => write!(f, "{:?}", self),
                }
            }
        }
    )*};
}

display_as_value!(HeaderMode, LoadMode, InsertMode, Toggle);

#[derive(Parser, Debug)]
#[command(name = "file2table", about = "Load a delimited file into a database table")]
pub struct Cli {
    /// Full path of file to load
    pub filename: PathBuf,
    /// Column delimiter in file, TAB for a tab character
    #[arg(value_parser = parse_delimiter, allow_hyphen_values = true)]
    pub delimiter: Delimiter,
    /// Whether the file has a header record of columns
    #[arg(value_enum)]
    pub header: HeaderMode,
    /// Load type
    #[arg(value_enum)]
    pub load_type: LoadMode,
    /// Database schema name
    pub schema: String,
    /// Database table name
    pub table_name: String,
    /// Database connection string
    pub db_conn_str: String,
    /// Whether to use bulk insert
    #[arg(value_enum)]
    pub bulk_insert: InsertMode,
    /// Whether to create the database table
    #[arg(value_enum)]
    pub create_table: Toggle,
    /// Comma separated column list, used when the file has no header record
    pub columns: Option<String>,
}

/// everything one load needs, validated once at the command line boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub filename: PathBuf,
    pub delimiter: Delimiter,
    pub header: HeaderMode,
    pub load_mode: LoadMode,
    pub schema: String,
    pub table_name: String,
    pub db_conn_str: String,
    pub insert_mode: InsertMode,
    pub create_table: bool,
    pub columns: Option<Vec<String>>,
}

impl From<Cli> for LoadConfig {
    fn from(cli: Cli) -> Self {
        LoadConfig {
            filename: cli.filename,
            delimiter: cli.delimiter,
            header: cli.header,
            load_mode: cli.load_type,
            schema: cli.schema,
            table_name: cli.table_name,
            db_conn_str: cli.db_conn_str,
            insert_mode: cli.bulk_insert,
            create_table: cli.create_table == Toggle::Yes,
            columns: cli
                .columns
                .map(|c| c.split(',').map(str::to_string).collect()),
        }
    }
}

impl LoadConfig {
    /// parses raw arguments (program name first). every token after the program
    /// name is a value, so a delimiter, path or connection string may be `--` or
    /// start with `-`.
    pub fn parse_from(args: &[String]) -> Result<Self, clap::Error> {
        let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 1);
        argv.extend(args.first().map(String::as_str));
        argv.push("--");
        argv.extend(args.iter().skip(1).map(String::as_str));
        Ok(LoadConfig::from(Cli::try_parse_from(argv)?))
    }

    /// labeled lines echoing every parsed value, in argument order.
    pub fn echo_lines(&self) -> Vec<String> {
        let yes_no = |b: bool| if b { Toggle::Yes } else { Toggle::No };
        let mut lines = vec![
            format!("filename     = {}", self.filename.display()),
            format!("delimiter    = {}", self.delimiter),
            format!("header       = {}", self.header),
            format!("load_type    = {}", self.load_mode),
            format!("schema       = {}", self.schema),
            format!("table_name   = {}", self.table_name),
            format!("db_conn_str  = {}", self.db_conn_str),
            format!("bulk_insert  = {}", self.insert_mode),
            format!("create_table = {}", yes_no(self.create_table)),
        ];
        if let Some(columns) = &self.columns {
            lines.push(format!("columns      = {}", columns.join(",")));
        }
        lines
    }
}

/// true when `positional` (arguments after the program name) is a count the driver accepts.
pub fn valid_arity(positional: usize) -> bool {
    positional == REQUIRED_ARGS || positional == MAX_ARGS
}

pub fn usage(prg_name: &str) -> String {
    let conn = "/data/warehouse.db";
    format!(
        "
Usage: {prg} filename delimiter header loadType schema tablename dbConnStr bulkinsert createTable [columns]

  filename    - Full path of file to load
  delimiter   - Column delimiter in file (TAB for a tab character)
  header      - Indicate (yes or no) whether the file has a header record of columns
  loadType    - Indicates (truncate or append) the load type
  schema      - Database schema name
  tablename   - Database table name
  dbConnStr   - Database connection string
  bulkinsert  - Indicates (yes or no) whether to use bulk insert (faster load)
  createTable - Indicates (yes or no) whether to create the database table
  columns     - Optional list of comma delimited columns, i.e. if no header record is in the file

Examples:
{prg} theFile.csv , yes truncate main theTable {conn} yes no
{prg} theFileNoHeader.csv , no append main theTable {conn} yes no col1,col2,col3
",
        prg = prg_name,
        conn = conn,
    )
}
