/// every created column gets this type; values are loaded as text regardless of shape.
pub const COLUMN_TYPE: &str = "VARCHAR(8000)";

/// quotes an identifier, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn qualified_name(schema: &str, table_name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table_name))
}

/// generates a `create table` statement with one varchar column per name, in order.
pub fn generate_create_table(schema: &str, table_name: &str, columns: &[String]) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", qualified_name(schema, table_name));

    let defs: Vec<String> = columns
        .iter()
        .map(|col| format!("  {} {}", quote_ident(col), COLUMN_TYPE))
        .collect();

    sql.push_str(&defs.join(",\n"));
    sql.push_str("\n);");

    sql
}

/// sqlite has no `truncate`; an unqualified delete empties the table and keeps its definition.
pub fn generate_truncate(schema: &str, table_name: &str) -> String {
    format!("DELETE FROM {};", qualified_name(schema, table_name))
}

/// generates an `insert` with `rows` parenthesized groups of positional placeholders.
pub fn generate_insert(schema: &str, table_name: &str, columns: &[String], rows: usize) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let group = format!("({})", vec!["?"; columns.len()].join(", "));
    let values = vec![group.as_str(); rows.max(1)].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {};",
        qualified_name(schema, table_name),
        names.join(", "),
        values
    )
}
