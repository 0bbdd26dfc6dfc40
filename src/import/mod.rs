//! Document import - turns Postman collections and Swagger/OpenAPI specs into request entities

pub mod body;
pub mod detector;
pub mod fields;
pub mod postman;
pub mod swagger;
pub mod url;

pub use body::interpret_body;
pub use detector::{detect_format, DocumentFormat};
pub use postman::PostmanTreeFlattener;
pub use swagger::SwaggerPathExpander;
pub use url::build_url;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::SOURCE_SEPARATOR;
use crate::error::{ImportError, ItemError};
use crate::models::Collection;
use crate::report::SharedReporter;

/// An item that was skipped while importing an otherwise valid document
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFailure {
    /// Where the item sits, e.g. `item[2].item[0]` or `paths./pets.get`
    pub location: String,
    /// Item name, when one could be read
    pub name: Option<String>,
    pub error: ItemError,
}

/// Requests produced from one document plus the items that had to be skipped
#[derive(Clone, Debug)]
pub struct ImportOutcome {
    pub format: DocumentFormat,
    pub requests: Collection,
    pub failures: Vec<ItemFailure>,
}

impl ImportOutcome {
    pub fn new(format: DocumentFormat) -> Self {
        ImportOutcome {
            format,
            requests: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Text syntax of a source document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceSyntax {
    Json,
    Yaml,
}

/// A named document waiting to be imported
#[derive(Clone, Debug)]
pub struct ImportSource {
    /// File name or other label; its stem prefixes folder paths in batch imports
    pub name: String,
    pub text: String,
    pub syntax: SourceSyntax,
}

impl ImportSource {
    pub fn json(name: impl Into<String>, text: impl Into<String>) -> Self {
        ImportSource {
            name: name.into(),
            text: text.into(),
            syntax: SourceSyntax::Json,
        }
    }

    /// Reads a file, choosing YAML for `.yaml`/`.yml` and JSON otherwise
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(ImportSource {
            name,
            text,
            syntax: if is_yaml { SourceSyntax::Yaml } else { SourceSyntax::Json },
        })
    }

    /// Decodes the text into the JSON value model
    pub fn parse(&self) -> Result<Value, ImportError> {
        match self.syntax {
            SourceSyntax::Json => parse_document(&self.text),
            SourceSyntax::Yaml => Ok(serde_yaml::from_str(&self.text)?),
        }
    }
}

/// What happened to one document of a batch
#[derive(Debug)]
pub struct DocumentReport {
    pub source: String,
    pub result: Result<DocumentSummary, ImportError>,
}

/// Counters for a successfully imported document
#[derive(Clone, Debug)]
pub struct DocumentSummary {
    pub format: DocumentFormat,
    pub imported: usize,
    pub failures: Vec<ItemFailure>,
}

/// Combined result of importing several documents
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub requests: Collection,
    pub documents: Vec<DocumentReport>,
}

impl BatchOutcome {
    pub fn successful_documents(&self) -> usize {
        self.documents.iter().filter(|d| d.result.is_ok()).count()
    }

    /// True when there was at least one document and none imported
    pub fn all_failed(&self) -> bool {
        !self.documents.is_empty() && self.successful_documents() == 0
    }
}

/// Parses JSON text; syntax problems surface as [`ImportError::Syntax`]
///
/// Nesting depth is unbounded: the recursion limit is off and the stack
/// grows on demand, so deep folder trees reach the flattener intact.
pub fn parse_document(text: &str) -> Result<Value, ImportError> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Entry point tying format detection to the two importers
pub struct Importer {
    reporter: SharedReporter,
    prefix_source_name: bool,
}

impl Importer {
    pub fn new(reporter: SharedReporter) -> Self {
        Importer {
            reporter,
            prefix_source_name: false,
        }
    }

    /// Prefix each request's folder path with its source file stem in batch imports
    pub fn with_source_prefix(mut self, enabled: bool) -> Self {
        self.prefix_source_name = enabled;
        self
    }

    /// Imports one JSON document given as text
    pub fn import_text(&self, text: &str) -> Result<ImportOutcome, ImportError> {
        let doc = parse_document(text)?;
        self.import_value(&doc)
    }

    /// Imports an already decoded document
    pub fn import_value(&self, doc: &Value) -> Result<ImportOutcome, ImportError> {
        match detect_format(doc) {
            DocumentFormat::SwaggerOpenApi => {
                Ok(SwaggerPathExpander::new(self.reporter.clone()).expand(doc))
            }
            DocumentFormat::PostmanCollection => {
                PostmanTreeFlattener::new(self.reporter.clone()).flatten(doc)
            }
            DocumentFormat::Unrecognized => Err(ImportError::Format(
                "expected a Postman collection (`info` + `item`) or a Swagger/OpenAPI spec \
                 (`openapi`, or `swagger` + `info` + `paths`)"
                    .to_string(),
            )),
        }
    }

    /// Reads and imports a single file
    pub fn import_file(&self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let source = ImportSource::from_path(path)?;
        self.import_value(&source.parse()?)
    }

    /// Imports every file; unreadable or invalid files are reported, not fatal
    ///
    /// `documents` follows the order of `paths`.
    pub fn import_files(&self, paths: &[PathBuf]) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        for path in paths {
            match ImportSource::from_path(path) {
                Ok(source) => self.import_into(source, &mut batch),
                Err(err) => {
                    self.reporter.error(&err.to_string());
                    batch.documents.push(DocumentReport {
                        source: path.display().to_string(),
                        result: Err(err),
                    });
                }
            }
        }
        batch
    }

    /// Imports each source independently and concatenates the results in order
    pub fn import_sources(&self, sources: Vec<ImportSource>) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        for source in sources {
            self.import_into(source, &mut batch);
        }
        batch
    }

    fn import_into(&self, source: ImportSource, batch: &mut BatchOutcome) {
        let result = source.parse().and_then(|doc| self.import_value(&doc));
        match result {
            Ok(outcome) => {
                let mut requests = outcome.requests;
                if self.prefix_source_name {
                    let stem = source_stem(&source.name);
                    for request in &mut requests {
                        let folder = prefixed_folder(&stem, request.folder_path());
                        request.set_folder_path(folder);
                    }
                }
                self.reporter.info(&format!(
                    "Imported {} requests from {}",
                    requests.len(),
                    source.name
                ));
                batch.documents.push(DocumentReport {
                    source: source.name,
                    result: Ok(DocumentSummary {
                        format: outcome.format,
                        imported: requests.len(),
                        failures: outcome.failures,
                    }),
                });
                batch.requests.extend(requests);
            }
            Err(err) => {
                self.reporter
                    .error(&format!("Error importing {}: {}", source.name, err));
                batch.documents.push(DocumentReport {
                    source: source.name,
                    result: Err(err),
                });
            }
        }
    }
}

fn source_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

fn prefixed_folder(stem: &str, folder: &str) -> String {
    if folder.is_empty() {
        stem.to_string()
    } else {
        format!("{}{}{}", stem, SOURCE_SEPARATOR, folder)
    }
}

/// String form of a JSON scalar; `None` for null, arrays, and objects
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Postman's per-entry `disabled: true` flag
pub(crate) fn is_disabled(entry: &Map<String, Value>) -> bool {
    entry.get("disabled").and_then(Value::as_bool).unwrap_or(false)
}

/// Plain string or `{ "content": ... }` wrapper
pub(crate) fn description_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => obj.get("content").and_then(scalar_string),
        other => scalar_string(other),
    }
}
