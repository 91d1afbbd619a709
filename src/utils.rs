use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;

use crate::Delimiter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static NON_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]+").expect("static regex is valid"));

/// current local time as `yyyy-mm-dd hh:mm:ss`.
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// splits a raw header line on the delimiter and strips every non-alphanumeric
/// character from each token.
///
/// names are not deduplicated: `"a b",ab` yields `["ab", "ab"]`, and a token made
/// only of punctuation yields an empty name.
pub fn sanitize_header(line: &str, delimiter: &Delimiter) -> Vec<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    line.split(delimiter.as_str())
        .map(|token| NON_IDENTIFIER.replace_all(token, "").into_owned())
        .collect()
}
