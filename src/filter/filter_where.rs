use super::error::FilterError;
use super::types::{is_valid_identifier, SqlParam, SqlResult};

/// Builds a `WHERE` clause from optional search criteria, numbering
/// positional parameters as conditions are added.
#[derive(Debug, Default)]
pub struct FilterWhere {
    conditions: Vec<String>,
    param_values: Vec<SqlParam>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match.
    pub fn ilike(&mut self, column: &str, needle: &str) -> Result<&mut Self, FilterError> {
        let column = Self::quote(column)?;
        let pattern = format!("%{}%", escape_like(needle));
        let param = self.param(SqlParam::from(pattern));
        self.conditions.push(format!("{} ILIKE {}", column, param));
        Ok(self)
    }

    pub fn eq(&mut self, column: &str, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.compare(column, "=", value.into())
    }

    pub fn gte(&mut self, column: &str, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.compare(column, ">=", value.into())
    }

    pub fn lte(&mut self, column: &str, value: impl Into<SqlParam>) -> Result<&mut Self, FilterError> {
        self.compare(column, "<=", value.into())
    }

    /// Adds a fixed condition with no parameters. Callers pass literals only.
    pub fn raw(&mut self, condition: &'static str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn build(self) -> SqlResult {
        let query = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        SqlResult { query, params: self.param_values }
    }

    fn compare(&mut self, column: &str, op: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        let column = Self::quote(column)?;
        let param = self.param(value);
        self.conditions.push(format!("{} {} {}", column, op, param));
        Ok(self)
    }

    fn quote(column: &str) -> Result<String, FilterError> {
        if !is_valid_identifier(column) {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        Ok(format!("\"{}\"", column))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
