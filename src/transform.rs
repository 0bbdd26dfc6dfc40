//! Bulk find/replace and header upsert over a selection of requests
//!
//! Preview and apply share [`CompiledTransform::plan`]: apply commits
//! exactly the edits a preview with the same inputs reports, so the two can
//! never disagree about which requests change.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;
use crate::models::RequestEntity;
use crate::report::SharedReporter;

/// Request field a find/replace may touch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformTarget {
    Url,
    Headers,
    Body,
}

impl TransformTarget {
    pub const ALL: [TransformTarget; 3] = [TransformTarget::Url, TransformTarget::Headers, TransformTarget::Body];

    pub fn as_str(&self) -> &str {
        match self {
            TransformTarget::Url => "url",
            TransformTarget::Headers => "headers",
            TransformTarget::Body => "body",
        }
    }
}

impl fmt::Display for TransformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "url" | "urls" => Ok(TransformTarget::Url),
            "header" | "headers" => Ok(TransformTarget::Headers),
            "body" => Ok(TransformTarget::Body),
            other => Err(format!("unknown target '{}' (expected url, headers or body)", other)),
        }
    }
}

/// Replace every match of `pattern` in the chosen fields
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindReplace {
    pub pattern: String,
    pub replacement: String,
    /// When false the pattern is matched literally
    pub is_regex: bool,
    pub targets: BTreeSet<TransformTarget>,
}

/// Set `name: value` on every selected request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderUpsert {
    pub name: String,
    pub value: String,
}

/// Operations to run; either part may be empty
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformSpec {
    pub find_replace: Option<FindReplace>,
    pub header: Option<HeaderUpsert>,
}

/// Which parts of one request a transform changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldChanges {
    pub url: bool,
    pub headers: bool,
    pub body: bool,
    pub header_upsert: bool,
}

impl FieldChanges {
    pub fn any(&self) -> bool {
        self.url || self.headers || self.body || self.header_upsert
    }

    /// Short labels such as `["url", "body"]`
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.url {
            labels.push("url");
        }
        if self.headers {
            labels.push("headers");
        }
        if self.body {
            labels.push("body");
        }
        if self.header_upsert {
            labels.push("header upsert");
        }
        labels
    }
}

/// One affected request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntityChange {
    /// Index into the slice (or collection, for the `_selected` variants)
    pub index: usize,
    pub method: String,
    pub name: String,
    pub fields: FieldChanges,
}

/// Result of a preview or apply
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransformReport {
    pub selected: usize,
    pub changes: Vec<EntityChange>,
}

impl TransformReport {
    pub fn affected_count(&self) -> usize {
        self.changes.len()
    }

    pub fn affected_indices(&self) -> Vec<usize> {
        self.changes.iter().map(|c| c.index).collect()
    }
}

/// Runs [`TransformSpec`]s over requests, reporting through the injected sink
pub struct BulkTransformEngine {
    reporter: SharedReporter,
}

impl BulkTransformEngine {
    pub fn new(reporter: SharedReporter) -> Self {
        BulkTransformEngine { reporter }
    }

    /// Reports what [`apply`](Self::apply) would change, without mutating anything
    pub fn preview(&self, spec: &TransformSpec, requests: &[RequestEntity]) -> Result<TransformReport, TransformError> {
        let compiled = self.compile(spec)?;
        let mut report = TransformReport {
            selected: requests.len(),
            changes: Vec::new(),
        };
        for (index, request) in requests.iter().enumerate() {
            let edit = compiled.plan(request);
            record(&mut report, index, request, edit.fields);
        }
        self.log_report("Preview", &report);
        Ok(report)
    }

    /// Mutates `requests` in place and reports what changed
    pub fn apply(&self, spec: &TransformSpec, requests: &mut [RequestEntity]) -> Result<TransformReport, TransformError> {
        let compiled = self.compile(spec)?;
        let mut report = TransformReport {
            selected: requests.len(),
            changes: Vec::new(),
        };
        for (index, request) in requests.iter_mut().enumerate() {
            let edit = compiled.plan(request);
            record(&mut report, index, request, edit.fields);
            edit.commit(request);
        }
        self.log_report("Applied", &report);
        Ok(report)
    }

    /// Like [`preview`](Self::preview) over `collection[i]` for each selected `i`
    ///
    /// Duplicate and out-of-range indices are ignored.
    pub fn preview_selected(
        &self,
        spec: &TransformSpec,
        collection: &[RequestEntity],
        selection: &[usize],
    ) -> Result<TransformReport, TransformError> {
        let compiled = self.compile(spec)?;
        let selection = normalize_selection(selection, collection.len());
        let mut report = TransformReport {
            selected: selection.len(),
            changes: Vec::new(),
        };
        for index in selection {
            let request = &collection[index];
            let edit = compiled.plan(request);
            record(&mut report, index, request, edit.fields);
        }
        self.log_report("Preview", &report);
        Ok(report)
    }

    /// Like [`apply`](Self::apply) over `collection[i]` for each selected `i`
    pub fn apply_selected(
        &self,
        spec: &TransformSpec,
        collection: &mut [RequestEntity],
        selection: &[usize],
    ) -> Result<TransformReport, TransformError> {
        let compiled = self.compile(spec)?;
        let selection = normalize_selection(selection, collection.len());
        let mut report = TransformReport {
            selected: selection.len(),
            changes: Vec::new(),
        };
        for index in selection {
            let request = &mut collection[index];
            let edit = compiled.plan(request);
            record(&mut report, index, request, edit.fields);
            edit.commit(request);
        }
        self.log_report("Applied", &report);
        Ok(report)
    }

    fn compile(&self, spec: &TransformSpec) -> Result<CompiledTransform, TransformError> {
        let result = CompiledTransform::compile(spec);
        if let Err(err) = &result {
            self.reporter.error(&err.to_string());
        }
        result
    }

    fn log_report(&self, action: &str, report: &TransformReport) {
        self.reporter.info(&format!(
            "{}: {} of {} selected requests affected",
            action,
            report.affected_count(),
            report.selected
        ));
    }
}

fn record(report: &mut TransformReport, index: usize, request: &RequestEntity, fields: FieldChanges) {
    if fields.any() {
        report.changes.push(EntityChange {
            index,
            method: request.method().to_string(),
            name: request.name().to_string(),
            fields,
        });
    }
}

fn normalize_selection(selection: &[usize], len: usize) -> Vec<usize> {
    selection
        .iter()
        .copied()
        .filter(|&i| i < len)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

struct CompiledFind {
    regex: Regex,
    replacement: String,
    expand_groups: bool,
    targets: BTreeSet<TransformTarget>,
}

impl CompiledFind {
    /// `Some(new)` only when the text actually changes
    fn replace(&self, text: &str) -> Option<String> {
        let replaced = if self.expand_groups {
            self.regex.replace_all(text, self.replacement.as_str())
        } else {
            self.regex.replace_all(text, NoExpand(&self.replacement))
        };
        match replaced {
            Cow::Borrowed(_) => None,
            Cow::Owned(new) if new == text => None,
            Cow::Owned(new) => Some(new),
        }
    }
}

/// A validated spec: at least one operation, pattern already compiled
struct CompiledTransform {
    find: Option<CompiledFind>,
    header: Option<(String, String)>,
}

impl CompiledTransform {
    fn compile(spec: &TransformSpec) -> Result<Self, TransformError> {
        let find = match &spec.find_replace {
            Some(fr) if !fr.pattern.trim().is_empty() && !fr.targets.is_empty() => {
                let pattern = fr.pattern.trim();
                let regex = if fr.is_regex {
                    Regex::new(pattern)?
                } else {
                    Regex::new(&regex::escape(pattern))?
                };
                Some(CompiledFind {
                    regex,
                    replacement: fr.replacement.clone(),
                    expand_groups: fr.is_regex,
                    targets: fr.targets.clone(),
                })
            }
            _ => None,
        };

        let header = spec
            .header
            .as_ref()
            .filter(|h| !h.name.trim().is_empty())
            .map(|h| (h.name.trim().to_string(), h.value.trim().to_string()));

        if find.is_none() && header.is_none() {
            return Err(TransformError::NoOperation);
        }
        Ok(CompiledTransform { find, header })
    }

    fn plan(&self, request: &RequestEntity) -> EntityEdit {
        let mut edit = EntityEdit::default();

        if let Some(find) = &self.find {
            if find.targets.contains(&TransformTarget::Url) {
                edit.url = find.replace(request.url());
                edit.fields.url = edit.url.is_some();
            }
            if find.targets.contains(&TransformTarget::Headers) {
                for (key, value) in &request.headers {
                    if let Some(new) = find.replace(value) {
                        edit.headers.push((key.clone(), new));
                    }
                }
                edit.fields.headers = !edit.headers.is_empty();
            }
            if find.targets.contains(&TransformTarget::Body) {
                if let Some(body) = &request.body {
                    edit.body = find.replace(body);
                    edit.fields.body = edit.body.is_some();
                }
            }
        }

        if let Some((name, value)) = &self.header {
            edit.upsert = Some((name.clone(), value.clone()));
            edit.fields.header_upsert = true;
        }

        edit
    }
}

/// Pending changes for one request
#[derive(Default)]
struct EntityEdit {
    url: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    upsert: Option<(String, String)>,
    fields: FieldChanges,
}

impl EntityEdit {
    /// Find/replace first, header upsert last
    fn commit(self, request: &mut RequestEntity) {
        if let Some(url) = self.url {
            request.set_url(url);
        }
        for (key, value) in self.headers {
            request.set_header(key, value);
        }
        if let Some(body) = self.body {
            request.body = Some(body);
        }
        if let Some((name, value)) = self.upsert {
            request.set_header(name, value);
        }
    }
}
