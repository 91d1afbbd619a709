use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("input file {0} is empty")]
    EmptyInput(String),

    #[error("header is 'no' but no column list was supplied")]
    MissingColumns,

    #[error("line {line}: expected {expected} fields, found {found}")]
    Shape {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("schema {0} is not reachable; sqlite loads go to the main database")]
    UnsupportedSchema(String),

    #[error("row has {found} values but the table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;
