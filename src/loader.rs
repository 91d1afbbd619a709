use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, info};

use crate::error::{LoadError, Result};
use crate::table::{FILENAME_COLUMN, LOAD_DATETIME_COLUMN, Table};
use crate::utils::{sanitize_header, timestamp};
use crate::{Delimiter, HeaderMode};

/// reads a delimited file into a `Table` and appends the `Filename` and
/// `LoadDateTime` metadata columns.
///
/// with a header the column names come from the sanitized first line and that
/// line is skipped as data; without one `columns` must name every field.
pub fn load_file(
    path: &Path,
    delimiter: &Delimiter,
    header: HeaderMode,
    columns: Option<&[String]>,
) -> Result<Table> {
    let (names, has_header) = match header {
        HeaderMode::Present => (read_header(path, delimiter)?, true),
        HeaderMode::Absent => (columns.ok_or(LoadError::MissingColumns)?.to_vec(), false),
    };
    debug!("columns for {}: {:?}", path.display(), names);

    let file = File::open(path)?;
    let mut table = read_table(BufReader::new(file), delimiter, names, has_header)?;

    table.push_constant_column(FILENAME_COLUMN, &path.display().to_string());
    table.push_constant_column(LOAD_DATETIME_COLUMN, &timestamp());
    info!("read {} rows from {}", table.len(), path.display());
    Ok(table)
}

// blank lines before the header are skipped, as the csv reader skips them.
fn read_header(path: &Path, delimiter: &Delimiter) -> Result<Vec<String>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(LoadError::EmptyInput(path.display().to_string()));
        }
        if !is_blank(&line) {
            return Ok(sanitize_header(&line, delimiter));
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).is_empty()
}

/// parses delimited records from `reader` into a table named by `columns`.
///
/// every record must have exactly `columns.len()` fields. when `skip_header` is
/// set the first record is dropped.
pub fn read_table<R: Read>(
    reader: R,
    delimiter: &Delimiter,
    columns: Vec<String>,
    skip_header: bool,
) -> Result<Table> {
    let mut table = Table::new(columns);
    match delimiter.as_byte() {
        Some(byte) => read_csv(reader, byte, &mut table, skip_header)?,
        None => read_split(reader, delimiter.as_str(), &mut table, skip_header)?,
    }
    Ok(table)
}

fn read_csv<R: Read>(reader: R, delimiter: u8, table: &mut Table, skip_header: bool) -> Result<()> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(skip_header)
        .flexible(true)
        .from_reader(reader);
    let expected = table.columns().len();

    for result in rdr.records() {
        let record = result?;
        if record.len() != expected {
            return Err(LoadError::Shape {
                line: record.position().map_or(0, |p| p.line()),
                expected,
                found: record.len(),
            });
        }
        table.push_row(record.iter().map(str::to_string).collect())?;
    }
    Ok(())
}

// multi-byte delimiters are outside what the csv reader supports; fields are
// split on the literal delimiter with no quoting.
fn read_split<R: Read>(reader: R, delimiter: &str, table: &mut Table, skip_header: bool) -> Result<()> {
    let expected = table.columns().len();
    let mut header_pending = skip_header;

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if is_blank(&line) {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }
        let line = line.trim_end_matches('\r');
        let fields: Vec<String> = line.split(delimiter).map(str::to_string).collect();
        if fields.len() != expected {
            return Err(LoadError::Shape {
                line: idx as u64 + 1,
                expected,
                found: fields.len(),
            });
        }
        table.push_row(fields)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_read_table_skips_header_record() {
        let data = "a,b\n1,2\n3,4\n";
        let table = read_table(Cursor::new(data), &Delimiter::from(","), names(&["a", "b"]), true).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["1", "2"]);
    }

    #[test]
    fn test_read_table_without_header_keeps_first_row() {
        let data = "1,2\n3,4";
        let table = read_table(Cursor::new(data), &Delimiter::from(","), names(&["a", "b"]), false).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "a"), Some("1"));
    }

    #[test]
    fn test_read_table_honours_quotes() {
        let data = "name|note\n\"Smith|Jones\"|\"said \"\"hi\"\"\"\n";
        let table = read_table(Cursor::new(data), &Delimiter::from("|"), names(&["name", "note"]), true).unwrap();
        assert_eq!(table.value(0, "name"), Some("Smith|Jones"));
        assert_eq!(table.value(0, "note"), Some("said \"hi\""));
    }

    #[test]
    fn test_read_table_shape_mismatch() {
        let data = "1,2,3\n4,5,6";
        let err = read_table(Cursor::new(data), &Delimiter::from(","), names(&["a", "b"]), false).unwrap_err();
        assert!(matches!(err, LoadError::Shape { line: 1, expected: 2, found: 3 }));
    }

    #[test]
    fn test_read_table_short_row_fails_whole_load() {
        let data = "a,b\n1,2\n3\n";
        let err = read_table(Cursor::new(data), &Delimiter::from(","), names(&["a", "b"]), true).unwrap_err();
        assert!(matches!(err, LoadError::Shape { line: 3, expected: 2, found: 1 }));
    }

    #[test]
    fn test_read_table_multi_char_delimiter() {
        let data = "a::b\r\n1::2\r\n\r\n3::4\r\n";
        let table = read_table(Cursor::new(data), &Delimiter::from("::"), names(&["a", "b"]), true).unwrap();
        assert_eq!(table.rows(), &[names(&["1", "2"]), names(&["3", "4"])]);
    }

    #[test]
    fn test_read_table_multi_char_shape_reports_line() {
        let data = "1::2\n3::4::5\n";
        let err = read_table(Cursor::new(data), &Delimiter::from("::"), names(&["a", "b"]), false).unwrap_err();
        assert!(matches!(err, LoadError::Shape { line: 2, expected: 2, found: 3 }));
    }

    #[test]
    fn test_read_table_multi_char_skips_leading_blank_lines() {
        let data = "\n\r\na::b\n1::2\n";
        let table = read_table(Cursor::new(data), &Delimiter::from("::"), names(&["a", "b"]), true).unwrap();
        assert_eq!(table.rows(), &[names(&["1", "2"])]);
    }

    #[test]
    fn test_load_file_header_after_blank_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        for (file, delim) in [("lead.csv", ","), ("lead.txt", "~~")] {
            let path = dir.path().join(file);
            let body = format!("\n\nx{d}y\n1{d}2\n", d = delim);
            std::fs::write(&path, body).unwrap();
            let table = load_file(&path, &Delimiter::from(delim), HeaderMode::Present, None).unwrap();
            assert_eq!(table.columns()[..2], ["x", "y"]);
            assert_eq!(table.rows().len(), 1);
            assert_eq!(table.rows()[0][..2], ["1", "2"]);
        }
    }

    #[test]
    fn test_load_file_only_blank_lines_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.csv");
        std::fs::write(&path, "\n\r\n").unwrap();
        let err = load_file(&path, &Delimiter::from(","), HeaderMode::Present, None).unwrap_err();
        assert!(matches!(err, LoadError::EmptyInput(_)));
    }

    #[test]
    fn test_read_table_tab() {
        let data = "x\ty\n1\t2\n";
        let table = read_table(Cursor::new(data), &Delimiter::Tab, names(&["x", "y"]), true).unwrap();
        assert_eq!(table.value(0, "y"), Some("2"));
    }

    #[test]
    fn test_load_file_missing_path_is_io_error() {
        let err = load_file(
            Path::new("/definitely/not/here.csv"),
            &Delimiter::from(","),
            HeaderMode::Present,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_file_without_header_needs_columns() {
        let err = load_file(Path::new("unused.csv"), &Delimiter::from(","), HeaderMode::Absent, None).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns));
    }
}
