//! SQL text for the four entity operations.
//!
//! Pure functions of metadata; none of them touches a connection.

use crate::mapping::metadata::EntityMetadata;
use crate::mapping::params::ParamMap;

/// `SELECT * FROM <table>`
pub fn select_all(metadata: &EntityMetadata) -> String {
    format!("SELECT * FROM {}", metadata.table)
}

/// `SELECT * FROM <table> WHERE <id> = :<id>`
pub fn select_by_id(metadata: &EntityMetadata) -> String {
    let id = metadata.identifier.column;
    format!("SELECT * FROM {} WHERE {id} = :{id}", metadata.table)
}

/// `INSERT INTO <table> (<columns>) VALUES (<placeholders>) RETURNING <id>`
///
/// Lists the persistable columns present in `params`, in declaration order.
/// The identifier column and names unknown to the metadata are never listed,
/// so the database always assigns the identifier, and the stored identifier
/// comes back as the single returned column. With no columns left the
/// statement is `INSERT INTO <table> DEFAULT VALUES RETURNING <id>`.
pub fn insert(metadata: &EntityMetadata, params: &ParamMap) -> String {
    let columns: Vec<&str> = metadata
        .persistable
        .iter()
        .map(|field| field.column)
        .filter(|column| params.contains_key(column))
        .collect();

    let id = metadata.identifier.column;
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES RETURNING {id}", metadata.table);
    }

    let placeholders: Vec<String> = columns.iter().map(|column| format!(":{column}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {id}",
        metadata.table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `DELETE FROM <table> WHERE <id> = :<id>`
pub fn delete_by_id(metadata: &EntityMetadata) -> String {
    let id = metadata.identifier.column;
    format!("DELETE FROM {} WHERE {id} = :{id}", metadata.table)
}
