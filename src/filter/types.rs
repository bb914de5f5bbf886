use rust_decimal::Decimal;

/// A typed positional parameter.
///
/// NULLs keep their SQL type so they can be assigned to nullable columns of
/// any kind (`"num_employees"=$1` with `$1 = NULL::int4`).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    Int(Option<i32>),
    Numeric(Option<Decimal>),
    Bool(bool),
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(Some(value))
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(Some(value.to_string()))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Int(Some(value))
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(value: Option<i32>) -> Self {
        SqlParam::Int(value)
    }
}

impl From<Decimal> for SqlParam {
    fn from(value: Decimal) -> Self {
        SqlParam::Numeric(Some(value))
    }
}

impl From<Option<Decimal>> for SqlParam {
    fn from(value: Option<Decimal>) -> Self {
        SqlParam::Numeric(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        SqlParam::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Identifiers are interpolated into SQL text, so only plain names are allowed.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
