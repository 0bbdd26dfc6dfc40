//! # importman
//!
//! Normalizes API description documents into one flat list of requests that
//! can be inspected, edited in bulk, and replayed elsewhere.
//!
//! ## Features
//! - Postman Collection v2.x (nested folders, structured URLs, body modes)
//! - Swagger v2 / OpenAPI v3 (JSON or YAML)
//! - Per-item error isolation: one broken item never sinks a document
//! - Batch import with partial success across documents
//! - Bulk find/replace and header upsert with preview/apply parity
//! - cURL and raw HTTP rendering
//!
//! ## Architecture
//! - `import` - format detection, Postman flattening, Swagger expansion
//! - `models` - the canonical `RequestEntity`
//! - `transform` - bulk edits over a selection of entities
//! - `report` - diagnostic sink injected into the engines

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod report;
pub mod transform;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImportError, ItemError, TransformError};
pub use export::{to_curl, to_raw_http};
pub use import::{
    detect_format, BatchOutcome, DocumentFormat, ImportOutcome, ImportSource, Importer, ItemFailure,
    PostmanTreeFlattener, SwaggerPathExpander,
};
pub use models::{Collection, RequestEntity, VulnerabilityStatus};
pub use report::{MemoryReporter, NullReporter, Reporter, SharedReporter, TracingReporter};
pub use transform::{
    BulkTransformEngine, FieldChanges, FindReplace, HeaderUpsert, TransformReport, TransformSpec, TransformTarget,
};
