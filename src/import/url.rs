//! Postman URL reconstruction

use serde_json::{Map, Value};

use super::{is_disabled, scalar_string};
use crate::constants::DEFAULT_PROTOCOL;
use crate::error::ItemError;

/// Builds the full URL for a Postman `url` field
///
/// A plain string is returned as is. A structured object returns its `raw`
/// when present, otherwise the URL is rebuilt from
/// `protocol`/`host`/`port`/`path`/`query`.
pub fn build_url(url: &Value) -> Result<String, ItemError> {
    match url {
        Value::String(raw) => Ok(raw.clone()),
        Value::Object(obj) => match obj.get("raw") {
            Some(raw) => scalar_string(raw).ok_or(ItemError::InvalidField {
                field: "url.raw",
                expected: "a string",
            }),
            None => rebuild(obj),
        },
        _ => Err(ItemError::InvalidField {
            field: "url",
            expected: "a string or an object",
        }),
    }
}

fn rebuild(obj: &Map<String, Value>) -> Result<String, ItemError> {
    let mut url = String::new();

    match obj.get("protocol") {
        Some(protocol) => url.push_str(&scalar_string(protocol).ok_or(ItemError::InvalidField {
            field: "url.protocol",
            expected: "a string",
        })?),
        None => url.push_str(DEFAULT_PROTOCOL),
    }
    url.push_str("://");

    if let Some(host) = obj.get("host") {
        url.push_str(&join_host(host)?);
    }

    if let Some(port) = obj.get("port") {
        let port = scalar_string(port).ok_or(ItemError::InvalidField {
            field: "url.port",
            expected: "a string or number",
        })?;
        url.push(':');
        url.push_str(&port);
    }

    if let Some(path) = obj.get("path") {
        url.push_str(&join_path(path)?);
    }

    if let Some(query) = obj.get("query") {
        let pairs = enabled_pairs(query, "url.query")?;
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
    }

    Ok(url)
}

fn join_host(host: &Value) -> Result<String, ItemError> {
    let invalid = ItemError::InvalidField {
        field: "url.host",
        expected: "a string or an array of strings",
    };
    match host {
        Value::Array(parts) => {
            let parts = parts
                .iter()
                .map(scalar_string)
                .collect::<Option<Vec<_>>>()
                .ok_or(invalid)?;
            Ok(parts.join("."))
        }
        other => scalar_string(other).ok_or(invalid),
    }
}

fn join_path(path: &Value) -> Result<String, ItemError> {
    let invalid = ItemError::InvalidField {
        field: "url.path",
        expected: "a string or an array of segments",
    };
    match path {
        Value::Array(segments) => {
            let mut joined = String::new();
            for segment in segments {
                joined.push('/');
                joined.push_str(&path_segment(segment).ok_or(invalid.clone())?);
            }
            Ok(joined)
        }
        other => {
            let path = scalar_string(other).ok_or(invalid)?;
            if path.starts_with('/') {
                Ok(path)
            } else {
                Ok(format!("/{}", path))
            }
        }
    }
}

/// A path segment is usually a string; v2.1 also allows `{ "value": ... }`
pub(crate) fn path_segment(segment: &Value) -> Option<String> {
    match segment {
        Value::Object(obj) => obj.get("value").and_then(scalar_string),
        other => scalar_string(other),
    }
}

/// `key=value` strings for every entry without `disabled: true`, in array order
pub(crate) fn enabled_pairs(entries: &Value, field: &'static str) -> Result<Vec<String>, ItemError> {
    enabled_entries(entries, field).map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    })
}

/// `(key, value)` for every entry without `disabled: true`; a missing key or value reads as ""
pub(crate) fn enabled_entries(
    entries: &Value,
    field: &'static str,
) -> Result<Vec<(String, String)>, ItemError> {
    let Some(entries) = entries.as_array() else {
        return Err(ItemError::InvalidField {
            field,
            expected: "an array",
        });
    };

    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            return Err(ItemError::InvalidField {
                field,
                expected: "an array of objects",
            });
        };
        if is_disabled(obj) {
            continue;
        }
        let key = obj.get("key").and_then(scalar_string).unwrap_or_default();
        let value = obj.get("value").and_then(scalar_string).unwrap_or_default();
        pairs.push((key, value));
    }
    Ok(pairs)
}
