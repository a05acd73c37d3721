use serde_json::{Map, Value};

pub type JsonRow = Map<String, Value>;

/// Keeps the JSON objects, anything else is not a row.
pub fn into_rows(values: Vec<Value>) -> Vec<JsonRow> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect()
}

/// Keeps the rows whose `key` column holds something other than `null` or the string `"null"`.
pub fn filter_null_values(rows: Vec<JsonRow>, key: &str) -> Vec<JsonRow> {
    rows.into_iter()
        .filter(|row| match row.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => s != "null",
            Some(_) => true,
        })
        .collect()
}
