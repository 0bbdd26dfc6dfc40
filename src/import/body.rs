//! Postman body descriptor interpretation

use serde_json::Value;

use super::{is_disabled, scalar_string};
use crate::error::ItemError;

/// Collapses a Postman `body` descriptor into a single body string
///
/// `raw` is used verbatim; `formdata` and `urlencoded` become `k=v&k=v`
/// over their enabled entries. Any other mode falls back to `raw`.
pub fn interpret_body(body: &Value) -> Result<Option<String>, ItemError> {
    let Some(obj) = body.as_object() else {
        return Err(ItemError::NotAnObject("body"));
    };

    let mode = obj.get("mode").and_then(Value::as_str).unwrap_or("");
    match mode {
        "formdata" | "urlencoded" => match obj.get(mode) {
            Some(entries) => join_fields(entries, mode).map(Some),
            None => Ok(None),
        },
        _ => Ok(obj.get("raw").and_then(scalar_string)),
    }
}

fn join_fields(entries: &Value, mode: &str) -> Result<String, ItemError> {
    let field = if mode == "formdata" {
        "body.formdata"
    } else {
        "body.urlencoded"
    };
    let Some(entries) = entries.as_array() else {
        return Err(ItemError::InvalidField {
            field,
            expected: "an array",
        });
    };

    let pairs: Vec<String> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter(|entry| !is_disabled(entry))
        .filter_map(|entry| {
            // file parts carry `src` instead of `value` and have no textual form
            let key = entry.get("key").and_then(scalar_string)?;
            let value = entry.get("value").and_then(scalar_string)?;
            Some(format!("{}={}", key, value))
        })
        .collect();

    Ok(pairs.join("&"))
}
