use crate::database::manager::DatabaseError;
use crate::filter::{is_valid_identifier, SqlParam};

/// `SET` clause and its values for an `UPDATE` touching only some columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// e.g. `"first_name"=$1, "age"=$2`
    pub set_cols: String,
    pub values: Vec<SqlParam>,
}

impl PartialUpdate {
    /// Placeholder for the first parameter after the `SET` values (used by `WHERE`)
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }
}

/// Build the `SET` clause for a sparse update.
///
/// `data` holds `(field, value)` pairs in API naming; `js_to_sql` maps API
/// field names to column names, and unmapped fields are used as-is.
pub fn sql_for_partial_update(
    data: Vec<(&str, SqlParam)>,
    js_to_sql: &[(&str, &str)],
) -> Result<PartialUpdate, DatabaseError> {
    if data.is_empty() {
        return Err(DatabaseError::BadRequest("No data".to_string()));
    }

    let mut cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.into_iter().enumerate() {
        let column = js_to_sql
            .iter()
            .find(|(js, _)| *js == field)
            .map(|(_, sql)| *sql)
            .unwrap_or(field);
        if !is_valid_identifier(column) {
            return Err(DatabaseError::BadRequest(format!("Invalid field: {}", field)));
        }
        // {firstName: 'Aliya', age: 32} => ['"first_name"=$1', '"age"=$2']
        cols.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value);
    }

    Ok(PartialUpdate { set_cols: cols.join(", "), values })
}
