//! Postman Collection v2.x flattening

use serde_json::{Map, Value};

use super::detector::is_postman_collection;
use super::url::{enabled_entries, path_segment};
use super::{build_url, description_text, fields, interpret_body, scalar_string};
use super::{DocumentFormat, ImportOutcome, ItemFailure};
use crate::constants::{DEFAULT_FOLDER_NAME, DEFAULT_METHOD, DEFAULT_REQUEST_NAME, FOLDER_SEPARATOR};
use crate::error::{ImportError, ItemError};
use crate::models::RequestEntity;
use crate::report::SharedReporter;

/// Walks a Postman `item` tree depth-first and emits one entity per leaf request
///
/// Traversal uses an explicit stack so arbitrarily deep folder nesting
/// cannot overflow the call stack. A broken item is recorded in
/// [`ImportOutcome::failures`] and its siblings are still visited.
pub struct PostmanTreeFlattener {
    reporter: SharedReporter,
}

/// Pending node plus the folder path of its parent
struct Frame<'a> {
    node: &'a Value,
    folder_path: String,
    location: String,
}

enum Visited<'a> {
    Folder {
        children: &'a [Value],
        folder_path: String,
    },
    Request(Box<RequestEntity>),
}

impl PostmanTreeFlattener {
    pub fn new(reporter: SharedReporter) -> Self {
        PostmanTreeFlattener { reporter }
    }

    pub fn flatten(&self, doc: &Value) -> Result<ImportOutcome, ImportError> {
        if !is_postman_collection(doc) {
            return Err(ImportError::Format(
                "Invalid Postman collection format. Missing required 'info' or 'item' fields.".to_string(),
            ));
        }

        let collection_name = doc
            .get("info")
            .and_then(|info| info.get("name"))
            .and_then(scalar_string)
            .unwrap_or_else(|| "Unknown Collection".to_string());
        self.reporter
            .info(&format!("Parsing collection: {}", collection_name));

        let mut outcome = ImportOutcome::new(DocumentFormat::PostmanCollection);
        let Some(items) = doc.get("item").and_then(Value::as_array) else {
            self.reporter.error("Top-level `item` is not an array; nothing to import");
            return Ok(outcome);
        };

        let mut stack = Vec::new();
        push_children(&mut stack, items, "", "item");

        while let Some(frame) = stack.pop() {
            match self.visit(&frame) {
                Ok(Visited::Folder {
                    children,
                    folder_path,
                }) => {
                    self.reporter
                        .info(&format!("Processing folder: {}", folder_path));
                    let prefix = format!("{}.item", frame.location);
                    push_children(&mut stack, children, &folder_path, &prefix);
                }
                Ok(Visited::Request(request)) => {
                    self.reporter.info(&format!(
                        "Parsed request: {} {}",
                        request.method(),
                        request.endpoint()
                    ));
                    outcome.requests.push(*request);
                }
                Err(error) => {
                    let name = frame.node.get("name").and_then(scalar_string);
                    self.reporter.error(&format!(
                        "Skipping {} ({}): {}",
                        frame.location,
                        name.as_deref().unwrap_or("unnamed"),
                        error
                    ));
                    outcome.failures.push(ItemFailure {
                        location: frame.location,
                        name,
                        error,
                    });
                }
            }
        }

        self.reporter.info(&format!(
            "Successfully parsed {} requests from collection",
            outcome.requests.len()
        ));
        Ok(outcome)
    }

    fn visit<'a>(&self, frame: &Frame<'a>) -> Result<Visited<'a>, ItemError> {
        let Some(item) = frame.node.as_object() else {
            return Err(ItemError::NotAnObject("item"));
        };

        if let Some(children) = item.get("item") {
            let Some(children) = children.as_array() else {
                return Err(ItemError::InvalidField {
                    field: "item",
                    expected: "an array",
                });
            };
            let folder_name = item
                .get("name")
                .and_then(scalar_string)
                .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());
            let folder_path = if frame.folder_path.is_empty() {
                folder_name
            } else {
                format!("{}{}{}", frame.folder_path, FOLDER_SEPARATOR, folder_name)
            };
            return Ok(Visited::Folder {
                children: children.as_slice(),
                folder_path,
            });
        }

        if let Some(request) = item.get("request") {
            let entity = self.build_request(item, request, &frame.folder_path)?;
            return Ok(Visited::Request(Box::new(entity)));
        }

        Err(ItemError::InvalidShape)
    }

    fn build_request(
        &self,
        item: &Map<String, Value>,
        request: &Value,
        folder_path: &str,
    ) -> Result<RequestEntity, ItemError> {
        let name = item
            .get("name")
            .and_then(scalar_string)
            .unwrap_or_else(|| DEFAULT_REQUEST_NAME.to_string());

        // v2.1 allows `"request": "https://..."` as shorthand for a GET
        let req = match request {
            Value::String(url) => {
                if url.is_empty() {
                    return Err(ItemError::MissingUrl);
                }
                let mut entity = RequestEntity::new(name, DEFAULT_METHOD, url.clone());
                entity.set_folder_path(folder_path);
                if let Some(description) = item.get("description").and_then(description_text) {
                    entity.description = Some(description);
                }
                extract_path_variables(None, &mut entity);
                fields::merge_query_string(url, &mut entity.query_parameters);
                return Ok(entity);
            }
            Value::Object(req) => req,
            _ => return Err(ItemError::NotAnObject("request")),
        };

        let method = match req.get("method") {
            Some(method) => scalar_string(method).ok_or(ItemError::InvalidField {
                field: "request.method",
                expected: "a string",
            })?,
            None => DEFAULT_METHOD.to_string(),
        };

        let url_value = req.get("url").ok_or(ItemError::MissingUrl)?;
        let url = build_url(url_value)?;
        if url.is_empty() {
            return Err(ItemError::MissingUrl);
        }

        let mut entity = RequestEntity::new(name, &method, url);
        entity.set_folder_path(folder_path);

        entity.description = item
            .get("description")
            .or_else(|| req.get("description"))
            .and_then(description_text);

        if let Some(headers) = req.get("header") {
            self.extract_headers(headers, &mut entity);
        }

        self.extract_query_parameters(url_value, &mut entity);
        extract_path_variables(Some(url_value), &mut entity);

        match req.get("body") {
            None | Some(Value::Null) => {}
            Some(body) => match interpret_body(body) {
                Ok(body) => entity.body = body,
                Err(err) => self
                    .reporter
                    .error(&format!("Error parsing body of '{}': {}", entity.name(), err)),
            },
        }

        Ok(entity)
    }

    /// Copies enabled headers; malformed entries are reported and skipped
    fn extract_headers(&self, headers: &Value, entity: &mut RequestEntity) {
        match headers {
            Value::Array(entries) => {
                for entry in entries {
                    let Some(header) = entry.as_object() else {
                        self.reporter
                            .error(&format!("Error parsing header of '{}': not an object", entity.name()));
                        continue;
                    };
                    if super::is_disabled(header) {
                        continue;
                    }
                    let key = header.get("key").and_then(scalar_string);
                    let value = header.get("value").and_then(scalar_string);
                    if let (Some(key), Some(value)) = (key, value) {
                        entity.set_header(key, value);
                    }
                }
            }
            // older exports store headers as one "Key: Value" per line
            Value::String(block) => {
                for line in block.lines() {
                    if let Some((key, value)) = line.split_once(':') {
                        let key = key.trim();
                        if !key.is_empty() {
                            entity.set_header(key, value.trim());
                        }
                    }
                }
            }
            _ => self
                .reporter
                .error(&format!("Error parsing headers of '{}': unsupported shape", entity.name())),
        }
    }

    /// Structured `url.query` entries first, then any literal `?k=v` in the final URL
    fn extract_query_parameters(&self, url_value: &Value, entity: &mut RequestEntity) {
        if let Some(query) = url_value.get("query") {
            match enabled_entries(query, "url.query") {
                Ok(pairs) => {
                    for (key, value) in pairs {
                        if !key.is_empty() {
                            entity.query_parameters.insert(key, value);
                        }
                    }
                }
                Err(err) => self.reporter.error(&format!(
                    "Error parsing query parameters of '{}': {}",
                    entity.name(),
                    err
                )),
            }
        }

        let url = entity.url().to_string();
        fields::merge_query_string(&url, &mut entity.query_parameters);
    }
}

fn push_children<'a>(stack: &mut Vec<Frame<'a>>, children: &'a [Value], folder_path: &str, prefix: &str) {
    // reversed so the first child is popped first
    for (index, node) in children.iter().enumerate().rev() {
        stack.push(Frame {
            node,
            folder_path: folder_path.to_string(),
            location: format!("{}[{}]", prefix, index),
        });
    }
}

/// Template segments from the structured `url.path`, or from the URL string otherwise
fn extract_path_variables(url_value: Option<&Value>, entity: &mut RequestEntity) {
    let structured = url_value
        .and_then(|url| url.get("path"))
        .and_then(Value::as_array);

    match structured {
        Some(segments) => {
            let segments: Vec<String> = segments.iter().filter_map(path_segment).collect();
            fields::collect_path_variables(segments.iter().map(String::as_str), &mut entity.path_variables);
        }
        None => {
            let url = entity.url().to_string();
            fields::collect_path_variables(fields::url_path_segments(&url), &mut entity.path_variables);
        }
    }
}
