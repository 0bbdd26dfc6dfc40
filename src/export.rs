//! Text renderings of a request: complete URL, cURL, raw HTTP/1.1, summary

use crate::import::fields;
use crate::models::RequestEntity;

impl RequestEntity {
    /// `url` with its query string rebuilt from `query_parameters`
    pub fn complete_url(&self) -> String {
        if self.query_parameters.is_empty() {
            return self.url().to_string();
        }
        let base = self.url().split('?').next().unwrap_or_default();
        format!("{}?{}", base, self.formatted_query_parameters())
    }

    pub fn formatted_query_parameters(&self) -> String {
        self.query_parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn formatted_headers(&self) -> String {
        if self.headers.is_empty() {
            return "No headers".to_string();
        }
        self.headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Human readable block used by detail views
    pub fn detailed_summary(&self) -> String {
        let mut out = format!("=== {} ===\n\n", self.display_name());
        out.push_str(&format!("Method: {}\n", self.method()));
        out.push_str(&format!("URL: {}\n", self.complete_url()));
        out.push_str(&format!("Endpoint: {}\n", self.endpoint()));
        if !self.query_parameters.is_empty() {
            out.push_str(&format!("Query Params: {}\n", self.formatted_query_parameters()));
        }
        if !self.path_variables.is_empty() {
            let vars: Vec<&str> = self.path_variables.keys().map(String::as_str).collect();
            out.push_str(&format!("Path Variables: {}\n", vars.join(", ")));
        }
        if !self.folder_path().is_empty() {
            out.push_str(&format!("Folder: {}\n", self.folder_path()));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("Description: {}\n", description));
        }
        if !self.vulnerability_status.as_str().is_empty() {
            out.push_str(&format!("Status: {}\n", self.vulnerability_status.as_str()));
        }
        out.push_str(&format!("\nHeaders:\n{}\n", self.formatted_headers()));
        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            out.push_str(&format!("\nBody:\n{}\n", body));
        }
        if !self.notes.is_empty() {
            out.push_str(&format!("\nNotes:\n{}\n", self.notes));
        }
        out
    }
}

/// Format request as cURL command
pub fn to_curl(request: &RequestEntity) -> String {
    let mut parts = vec![format!("curl -X {}", request.method())];

    for (key, value) in &request.headers {
        parts.push(format!("-H '{}: {}'", key, value.replace('\'', "'\\''")));
    }

    if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
        parts.push(format!("-d '{}'", body.replace('\'', "'\\''")));
    }

    parts.push(format!("'{}'", request.complete_url()));

    parts.join(" \\\n  ")
}

/// Raw HTTP/1.1 request text ready to paste into a proxy or repeater
pub fn to_raw_http(request: &RequestEntity) -> String {
    let url = request.complete_url();
    let mut raw = format!("{} {} HTTP/1.1\r\n", request.method(), fields::request_target(&url));

    let host = fields::host_of(&url);
    if !host.is_empty() {
        raw.push_str(&format!("Host: {}\r\n", host));
    }

    for (key, value) in &request.headers {
        raw.push_str(&format!("{}: {}\r\n", key, value));
    }

    let body = request.body.as_deref().filter(|b| !b.is_empty());
    if let Some(body) = body {
        raw.push_str(&format!("Content-Length: {}\r\n", body.len()));
        let has_content_type = request
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            raw.push_str("Content-Type: application/json\r\n");
        }
    }

    raw.push_str("\r\n");
    if let Some(body) = body {
        raw.push_str(body);
    }
    raw
}
