use std::sync::Arc;

use importman::{
    BulkTransformEngine, DocumentFormat, FindReplace, HeaderUpsert, ImportError, ImportSource, Importer,
    MemoryReporter, NullReporter, TransformError, TransformSpec, TransformTarget,
};

const COLLECTION: &str = r#"{
  "info": {"name": "Store", "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"},
  "item": [
    {"name": "Health", "request": {"method": "GET", "url": "https://store.dev/health"}},
    {"name": "Orders", "item": [
      {"name": "List orders", "request": {
        "method": "get",
        "header": [{"key": "Authorization", "value": "Bearer {{token}}"}],
        "url": {
          "protocol": "https",
          "host": ["store", "dev"],
          "path": ["orders"],
          "query": [{"key": "status", "value": "open"}, {"key": "debug", "value": "1", "disabled": true}]
        }
      }},
      {"name": "Admin", "item": [
        {"name": "Delete order", "request": {
          "method": "DELETE",
          "url": {"raw": "https://store.dev/orders/{{orderId}}", "path": ["orders", "{{orderId}}"]}
        }}
      ]},
      {"name": "no shape"}
    ]},
    {"name": "Login", "request": {
      "method": "POST",
      "url": "https://store.dev/login",
      "body": {"mode": "formdata", "formdata": [
        {"key": "user", "value": "alice"},
        {"key": "otp", "value": "000000", "disabled": true}
      ]}
    }}
  ]
}"#;

const SPEC: &str = r#"{
  "swagger": "2.0",
  "info": {"title": "Pets"},
  "host": "pets.dev",
  "basePath": "/v1",
  "schemes": ["https"],
  "paths": {
    "/pets": {
      "get": {"operationId": "listPets", "parameters": [{"name": "limit", "in": "query"}]},
      "post": {"summary": "Create pet", "parameters": [{"name": "X-Trace", "in": "header"}]}
    }
  }
}"#;

#[test]
fn test_postman_collection_end_to_end() {
    let reporter = Arc::new(MemoryReporter::new());
    let outcome = Importer::new(reporter.clone()).import_text(COLLECTION).unwrap();

    assert_eq!(outcome.format, DocumentFormat::PostmanCollection);
    let names: Vec<&str> = outcome.requests.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Health", "List orders", "Delete order", "Login"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].location, "item[1].item[2]");

    let list = &outcome.requests[1];
    assert_eq!(list.method(), "GET");
    assert_eq!(list.url(), "https://store.dev/orders?status=open");
    assert_eq!(list.folder_path(), "Orders");
    assert!(!list.query_parameters.contains_key("debug"));

    let delete = &outcome.requests[2];
    assert_eq!(delete.folder_path(), "Orders → Admin");
    assert_eq!(delete.endpoint(), "/orders/{var}");
    assert_eq!(delete.path_variables.get("orderId").map(String::as_str), Some("{{orderId}}"));

    assert_eq!(outcome.requests[3].body.as_deref(), Some("user=alice"));
    assert_eq!(reporter.errors().len(), 1);
}

#[test]
fn test_swagger_end_to_end() {
    let outcome = Importer::new(Arc::new(NullReporter)).import_text(SPEC).unwrap();
    assert_eq!(outcome.format, DocumentFormat::SwaggerOpenApi);
    assert_eq!(outcome.requests.len(), 2);

    let get = &outcome.requests[0];
    assert_eq!(get.method(), "GET");
    assert_eq!(get.name(), "listPets");
    assert_eq!(get.url(), "https://pets.dev/v1/pets");
    assert_eq!(get.query_parameters.get("limit").map(String::as_str), Some("{{limit}}"));

    let post = &outcome.requests[1];
    assert_eq!(post.method(), "POST");
    assert_eq!(post.headers.get("X-Trace").map(String::as_str), Some("{{X-Trace}}"));
    assert_eq!(post.folder_path(), "Swagger API");
}

#[test]
fn test_batch_then_transform() {
    let importer = Importer::new(Arc::new(NullReporter)).with_source_prefix(true);
    let mut batch = importer.import_sources(vec![
        ImportSource::json("store.json", COLLECTION),
        ImportSource::json("broken.json", "{"),
        ImportSource::json("pets.json", SPEC),
    ]);
    assert_eq!(batch.successful_documents(), 2);
    assert!(matches!(batch.documents[1].result, Err(ImportError::Syntax(_))));
    assert_eq!(batch.requests.len(), 6);
    assert_eq!(batch.requests[2].folder_path(), "store/Orders → Admin");
    assert_eq!(batch.requests[4].folder_path(), "pets/Swagger API");

    let spec = TransformSpec {
        find_replace: Some(FindReplace {
            pattern: "store.dev".to_string(),
            replacement: "staging.store.dev".to_string(),
            is_regex: false,
            targets: [TransformTarget::Url].into_iter().collect(),
        }),
        header: Some(HeaderUpsert {
            name: "X-Env".to_string(),
            value: "staging".to_string(),
        }),
    };
    let engine = BulkTransformEngine::new(Arc::new(NullReporter));
    let selection = [0, 1, 4];

    let preview = engine.preview_selected(&spec, &batch.requests, &selection).unwrap();
    let applied = engine.apply_selected(&spec, &mut batch.requests, &selection).unwrap();
    assert_eq!(preview, applied);
    assert_eq!(applied.affected_indices(), vec![0, 1, 4]);
    assert!(applied.changes[0].fields.url);
    assert!(!applied.changes[2].fields.url);

    assert_eq!(batch.requests[0].url(), "https://staging.store.dev/health");
    assert_eq!(batch.requests[4].headers.get("X-Env").map(String::as_str), Some("staging"));
    assert_eq!(batch.requests[2].url(), "https://store.dev/orders/{{orderId}}");
    assert!(!batch.requests[2].headers.contains_key("X-Env"));
}

#[test]
fn test_transform_error_signals() {
    let mut requests = Importer::new(Arc::new(NullReporter))
        .import_text(COLLECTION)
        .unwrap()
        .requests;
    let engine = BulkTransformEngine::new(Arc::new(NullReporter));

    let bad = TransformSpec {
        find_replace: Some(FindReplace {
            pattern: "[unclosed".to_string(),
            replacement: String::new(),
            is_regex: true,
            targets: TransformTarget::ALL.into_iter().collect(),
        }),
        header: None,
    };
    assert!(matches!(engine.apply(&bad, &mut requests), Err(TransformError::InvalidPattern(_))));
    assert!(matches!(
        engine.apply(&TransformSpec::default(), &mut requests),
        Err(TransformError::NoOperation)
    ));
}
