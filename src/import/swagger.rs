//! Swagger v2 / OpenAPI v3 path expansion

use serde_json::{Map, Value};

use super::{fields, scalar_string, DocumentFormat, ImportOutcome, ItemFailure};
use crate::constants::{
    DEFAULT_SWAGGER_HOST, DEFAULT_SWAGGER_SCHEME, FALLBACK_BASE_URL, SWAGGER_FOLDER, SWAGGER_METHODS,
};
use crate::error::ItemError;
use crate::models::RequestEntity;
use crate::report::SharedReporter;

/// Produces one entity per (path, method) pair of a Swagger/OpenAPI document
pub struct SwaggerPathExpander {
    reporter: SharedReporter,
}

/// A parameter that survives into the entity
#[derive(Debug, PartialEq)]
struct OperationParam {
    name: String,
    location: String,
}

impl SwaggerPathExpander {
    pub fn new(reporter: SharedReporter) -> Self {
        SwaggerPathExpander { reporter }
    }

    pub fn expand(&self, doc: &Value) -> ImportOutcome {
        let mut outcome = ImportOutcome::new(DocumentFormat::SwaggerOpenApi);
        let base_url = resolve_base_url(doc);

        let title = doc
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(scalar_string)
            .unwrap_or_else(|| "Untitled API".to_string());
        self.reporter
            .info(&format!("Parsing API spec: {} (base URL {})", title, base_url));

        let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
            self.reporter.error("Spec has no `paths` object; nothing to import");
            return outcome;
        };

        for (path, path_item) in paths {
            let Some(path_item) = path_item.as_object() else {
                self.record_failure(&mut outcome, format!("paths.{}", path), ItemError::NotAnObject("path item"));
                continue;
            };
            let shared_params = path_item.get("parameters").and_then(Value::as_array);

            for method in SWAGGER_METHODS {
                let Some(operation) = path_item.get(method) else {
                    continue;
                };
                let location = format!("paths.{}.{}", path, method);
                let Some(operation) = operation.as_object() else {
                    self.record_failure(&mut outcome, location, ItemError::NotAnObject("operation"));
                    continue;
                };

                let entity = build_operation(doc, &base_url, path, method, operation, shared_params);
                self.reporter.info(&format!(
                    "Parsed operation: {} {}",
                    entity.method(),
                    entity.endpoint()
                ));
                outcome.requests.push(entity);
            }
        }

        self.reporter.info(&format!(
            "Successfully parsed {} requests from spec",
            outcome.requests.len()
        ));
        outcome
    }

    fn record_failure(&self, outcome: &mut ImportOutcome, location: String, error: ItemError) {
        self.reporter
            .error(&format!("Skipping {}: {}", location, error));
        outcome.failures.push(ItemFailure {
            location,
            name: None,
            error,
        });
    }
}

fn build_operation(
    doc: &Value,
    base_url: &str,
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    shared_params: Option<&Vec<Value>>,
) -> RequestEntity {
    let text = |key: &str| operation.get(key).and_then(Value::as_str).map(String::from);

    let name = text("operationId")
        .or_else(|| text("summary"))
        .unwrap_or_else(|| format!("{} {}", method.to_uppercase(), path));
    let url = format!("{}{}", base_url, path);

    let mut entity = RequestEntity::new(name, method, url);
    entity.set_folder_path(SWAGGER_FOLDER);

    if let Some(description) = text("description").or_else(|| text("summary")) {
        entity.notes = description.clone();
        entity.description = Some(description);
    }

    for param in collect_params(doc, operation, shared_params) {
        let placeholder = format!("{{{{{}}}}}", param.name);
        match param.location.as_str() {
            "header" => entity.set_header(param.name, placeholder),
            "query" => {
                entity.query_parameters.insert(param.name, placeholder);
            }
            _ => {}
        }
    }

    let url = entity.url().to_string();
    fields::merge_query_string(&url, &mut entity.query_parameters);
    fields::collect_path_variables(fields::url_path_segments(&url), &mut entity.path_variables);

    entity
}

/// Operation parameters followed by path-level ones it does not override
fn collect_params(
    doc: &Value,
    operation: &Map<String, Value>,
    shared_params: Option<&Vec<Value>>,
) -> Vec<OperationParam> {
    let mut params: Vec<OperationParam> = operation
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|p| parse_param(doc, p))
        .collect();

    for shared in shared_params.into_iter().flatten() {
        if let Some(param) = parse_param(doc, shared) {
            if !params.contains(&param) {
                params.push(param);
            }
        }
    }

    params
}

fn parse_param(doc: &Value, param: &Value) -> Option<OperationParam> {
    let param = resolve_ref(doc, param);
    let name = param.get("name")?.as_str()?.to_string();
    let location = param.get("in")?.as_str()?.to_string();
    Some(OperationParam { name, location })
}

/// Follows a local `$ref` such as `#/components/parameters/Limit`
fn resolve_ref<'a>(doc: &'a Value, value: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| doc.pointer(pointer))
        .unwrap_or(value)
}

/// Base URL prepended to every path
///
/// First `servers[].url` (OpenAPI 3), else `scheme://host` + `basePath`
/// (Swagger 2) with `http`/`localhost`/"" defaults. Anything of the wrong
/// type falls back to `http://localhost`.
pub fn resolve_base_url(doc: &Value) -> String {
    try_base_url(doc).unwrap_or_else(|| FALLBACK_BASE_URL.to_string())
}

fn try_base_url(doc: &Value) -> Option<String> {
    if let Some(servers) = doc.get("servers") {
        if let Some(server) = servers.as_array()?.first() {
            let url = server.get("url")?.as_str()?;
            return Some(substitute_server_variables(url, server.get("variables")));
        }
    }

    let scheme = match doc.get("schemes") {
        Some(schemes) => match schemes.as_array()?.first() {
            Some(first) => first.as_str()?,
            None => DEFAULT_SWAGGER_SCHEME,
        },
        None => DEFAULT_SWAGGER_SCHEME,
    };
    let host = match doc.get("host") {
        Some(host) => host.as_str()?,
        None => DEFAULT_SWAGGER_HOST,
    };
    let base_path = match doc.get("basePath") {
        Some(base_path) => base_path.as_str()?,
        None => "",
    };

    Some(format!("{}://{}{}", scheme, host, base_path))
}

/// Replaces `{name}` in a server URL with the variable's `default`
fn substitute_server_variables(url: &str, variables: Option<&Value>) -> String {
    let Some(variables) = variables.and_then(Value::as_object) else {
        return url.to_string();
    };
    let mut url = url.to_string();
    for (name, variable) in variables {
        if let Some(default) = variable.get("default").and_then(scalar_string) {
            url = url.replace(&format!("{{{}}}", name), &default);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use serde_json::json;
    use std::sync::Arc;

    fn expand(doc: &Value) -> ImportOutcome {
        SwaggerPathExpander::new(Arc::new(NullReporter)).expand(doc)
    }

    #[test]
    fn test_expand_methods_per_path() {
        let doc = json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://petstore.io/v1"}, {"url": "https://other"}],
            "paths": {"/pets": {
                "post": {"operationId": "createPet"},
                "get": {"summary": "List pets"},
                "parameters": [],
                "x-extension": {}
            }}
        });
        let outcome = expand(&doc);
        assert_eq!(outcome.requests.len(), 2);
        assert_eq!(outcome.requests[0].method(), "GET");
        assert_eq!(outcome.requests[0].name(), "List pets");
        assert_eq!(outcome.requests[1].method(), "POST");
        assert_eq!(outcome.requests[1].name(), "createPet");
        for req in &outcome.requests {
            assert_eq!(req.url(), "https://petstore.io/v1/pets");
            assert_eq!(req.folder_path(), "Swagger API");
        }
    }

    #[test]
    fn test_name_falls_back_to_method_and_path() {
        let doc = json!({"openapi": "3.0.0", "paths": {"/health": {"head": {}}}});
        let outcome = expand(&doc);
        assert_eq!(outcome.requests[0].name(), "HEAD /health");
    }

    #[test]
    fn test_path_without_methods_yields_nothing() {
        let doc = json!({"openapi": "3.0.0", "paths": {"/empty": {"summary": "nothing"}, "/x": {"get": {}}}});
        let outcome = expand(&doc);
        assert_eq!(outcome.requests.len(), 1);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_swagger2_base_url() {
        let doc = json!({
            "swagger": "2.0", "info": {},
            "schemes": ["https", "http"], "host": "api.example.com", "basePath": "/v2",
            "paths": {}
        });
        assert_eq!(resolve_base_url(&doc), "https://api.example.com/v2");

        let defaults = json!({"swagger": "2.0", "info": {}, "paths": {}});
        assert_eq!(resolve_base_url(&defaults), "http://localhost");

        let host_only = json!({"swagger": "2.0", "host": "h:8080"});
        assert_eq!(resolve_base_url(&host_only), "http://h:8080");
    }

    #[test]
    fn test_malformed_base_url_falls_back() {
        assert_eq!(resolve_base_url(&json!({"servers": "nope"})), "http://localhost");
        assert_eq!(resolve_base_url(&json!({"host": 12, "basePath": "/x"})), "http://localhost");
        assert_eq!(resolve_base_url(&json!({"servers": [{"description": "no url"}]})), "http://localhost");
    }

    #[test]
    fn test_server_variables() {
        let doc = json!({"servers": [{
            "url": "https://{region}.api.io/{version}",
            "variables": {"region": {"default": "eu"}, "version": {"default": "v3"}}
        }]});
        assert_eq!(resolve_base_url(&doc), "https://eu.api.io/v3");
    }

    #[test]
    fn test_url_is_plain_concatenation() {
        let doc = json!({"openapi": "3.0.0", "servers": [{"url": "https://h/api/"}], "paths": {"/a": {"get": {}}}});
        assert_eq!(expand(&doc).requests[0].url(), "https://h/api//a");
    }

    #[test]
    fn test_parameters_become_placeholders() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {"parameters": {"Limit": {"name": "limit", "in": "query"}}},
            "paths": {"/items/{id}": {
                "parameters": [
                    {"name": "X-Tenant", "in": "header"},
                    {"name": "id", "in": "path"}
                ],
                "get": {
                    "description": "Fetch one item",
                    "summary": "Get item",
                    "parameters": [
                        {"name": "X-Request-Id", "in": "header"},
                        {"name": "fields", "in": "query"},
                        {"$ref": "#/components/parameters/Limit"},
                        {"name": "session", "in": "cookie"}
                    ]
                }
            }}
        });
        let req = &expand(&doc).requests[0];
        assert_eq!(req.headers.get("X-Request-Id").map(String::as_str), Some("{{X-Request-Id}}"));
        assert_eq!(req.headers.get("X-Tenant").map(String::as_str), Some("{{X-Tenant}}"));
        assert_eq!(req.query_parameters.get("fields").map(String::as_str), Some("{{fields}}"));
        assert_eq!(req.query_parameters.get("limit").map(String::as_str), Some("{{limit}}"));
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.query_parameters.len(), 2);
        assert_eq!(req.description.as_deref(), Some("Fetch one item"));
        assert_eq!(req.notes, "Fetch one item");
        assert_eq!(req.name(), "Get item");
    }

    #[test]
    fn test_non_object_operation_is_recorded() {
        let doc = json!({"openapi": "3.0.0", "paths": {
            "/a": {"get": "oops", "post": {}},
            "/b": []
        }});
        let outcome = expand(&doc);
        assert_eq!(outcome.requests.len(), 1);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].location, "paths./a.get");
        assert_eq!(outcome.failures[1].error, ItemError::NotAnObject("path item"));
    }
}
