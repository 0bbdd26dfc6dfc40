use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_METHOD, DEFAULT_REQUEST_NAME};
use crate::import::fields;

/// Manual triage verdict attached to a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilityStatus {
    #[default]
    Unknown,
    Safe,
    Vulnerable,
}

impl VulnerabilityStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VulnerabilityStatus::Unknown => "",
            VulnerabilityStatus::Safe => "Safe",
            VulnerabilityStatus::Vulnerable => "Vulnerable",
        }
    }
}

/// One imported request, normalized from any supported format
///
/// `endpoint` and `display_name` are derived from the other fields and are
/// only reachable through getters. Every setter that touches their inputs
/// goes through [`RequestEntity::rebuild_derived`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestEntity {
    name: String,
    method: String,
    url: String,
    endpoint: String,
    display_name: String,
    folder_path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub description: Option<String>,
    pub query_parameters: BTreeMap<String, String>,
    pub path_variables: BTreeMap<String, String>,
    pub notes: String,
    pub vulnerability_status: VulnerabilityStatus,
}

/// An ordered list of requests owned by the caller
pub type Collection = Vec<RequestEntity>;

impl RequestEntity {
    pub fn new(name: impl Into<String>, method: &str, url: impl Into<String>) -> Self {
        let mut entity = RequestEntity {
            name: normalize_name(name.into()),
            method: normalize_method(method),
            url: url.into(),
            endpoint: String::new(),
            display_name: String::new(),
            folder_path: String::new(),
            headers: BTreeMap::new(),
            body: None,
            description: None,
            query_parameters: BTreeMap::new(),
            path_variables: BTreeMap::new(),
            notes: String::new(),
            vulnerability_status: VulnerabilityStatus::Unknown,
        };
        entity.rebuild_derived();
        entity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path of `url` without host, query string, or `{{variable}}` names
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = normalize_name(name.into());
        self.rebuild_derived();
    }

    pub fn set_method(&mut self, method: &str) {
        self.method = normalize_method(method);
        self.rebuild_derived();
    }

    /// Replaces the URL and re-syncs what was derived from it
    ///
    /// Literal query pairs and `{{var}}` path segments that changed between
    /// the old and new URL are carried into `query_parameters` and
    /// `path_variables`; entries that never came from the URL are kept.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let old_url = std::mem::replace(&mut self.url, url.into());
        self.sync_url_parts(&old_url);
        self.rebuild_derived();
    }

    pub fn set_folder_path(&mut self, folder_path: impl Into<String>) {
        self.folder_path = folder_path.into();
        self.rebuild_derived();
    }

    /// Inserts or overwrites a header
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn mark_vulnerable(&mut self, vulnerable: bool) {
        self.vulnerability_status = if vulnerable {
            VulnerabilityStatus::Vulnerable
        } else {
            VulnerabilityStatus::Safe
        };
    }

    pub fn clear_vulnerability_status(&mut self) {
        self.vulnerability_status = VulnerabilityStatus::Unknown;
    }

    pub fn is_vulnerable(&self) -> bool {
        self.vulnerability_status == VulnerabilityStatus::Vulnerable
    }

    fn sync_url_parts(&mut self, old_url: &str) {
        let old_query = fields::query_pairs(old_url);
        let new_query = fields::query_pairs(&self.url);
        for (key, value) in &old_query {
            if !new_query.contains_key(key) && self.query_parameters.get(key) == Some(value) {
                self.query_parameters.remove(key);
            }
        }
        for (key, value) in new_query {
            if old_query.get(&key) != Some(&value) {
                self.query_parameters.insert(key, value);
            }
        }

        let mut old_vars = BTreeMap::new();
        fields::collect_path_variables(fields::url_path_segments(old_url), &mut old_vars);
        for key in old_vars.keys() {
            self.path_variables.remove(key);
        }
        fields::collect_path_variables(fields::url_path_segments(&self.url), &mut self.path_variables);
    }

    /// Recomputes `endpoint` and `display_name` from the current state
    fn rebuild_derived(&mut self) {
        self.endpoint = fields::endpoint_of(&self.url);
        self.display_name = compose_display_name(&self.method, &self.endpoint, &self.name, &self.folder_path);
    }
}

fn normalize_name(name: String) -> String {
    if name.is_empty() {
        DEFAULT_REQUEST_NAME.to_string()
    } else {
        name
    }
}

fn normalize_method(method: &str) -> String {
    let method = method.trim();
    if method.is_empty() {
        DEFAULT_METHOD.to_string()
    } else {
        method.to_uppercase()
    }
}

fn compose_display_name(method: &str, endpoint: &str, name: &str, folder_path: &str) -> String {
    let mut display = format!("{} {}", method, endpoint);
    if !name.is_empty() {
        display.push_str(" - ");
        display.push_str(name);
    }
    if !folder_path.is_empty() {
        display.push_str(" (");
        display.push_str(folder_path);
        display.push(')');
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_method_and_name() {
        let req = RequestEntity::new("", " post ", "https://api.example.com/users");
        assert_eq!(req.method(), "POST");
        assert_eq!(req.name(), "Unnamed Request");

        let req = RequestEntity::new("List", "", "https://api.example.com/users");
        assert_eq!(req.method(), "GET");
    }

    #[test]
    fn test_set_url_rebuilds_endpoint() {
        let mut req = RequestEntity::new("Get user", "get", "https://api.example.com/users/1");
        assert_eq!(req.endpoint(), "/users/1");

        req.set_url("{{baseUrl}}/v2/users/{{id}}?expand=true");
        assert_eq!(req.endpoint(), "/v2/users/{var}");
        assert_eq!(req.display_name(), "GET /v2/users/{var} - Get user");
    }

    #[test]
    fn test_set_url_resyncs_query_and_path_variables() {
        let mut req = RequestEntity::new("Get", "GET", "https://h/users/{{id}}?token=foo&page=1");
        req.query_parameters.insert("token".into(), "foo".into());
        req.query_parameters.insert("page".into(), "1".into());
        req.query_parameters.insert("limit".into(), "{{limit}}".into());
        req.path_variables.insert("id".into(), "{{id}}".into());

        req.set_url("https://h/accounts/{{accountId}}?token=bar");

        assert_eq!(req.query_parameters.get("token").map(String::as_str), Some("bar"));
        assert!(!req.query_parameters.contains_key("page"));
        assert_eq!(req.query_parameters.get("limit").map(String::as_str), Some("{{limit}}"));
        assert!(!req.path_variables.contains_key("id"));
        assert_eq!(req.path_variables.get("accountId").map(String::as_str), Some("{{accountId}}"));
    }

    #[test]
    fn test_set_url_keeps_structured_query_value_when_literal_unchanged() {
        let mut req = RequestEntity::new("x", "GET", "https://h/x?page=2");
        req.query_parameters.insert("page".into(), "1".into());

        req.set_url("https://other/x?page=2");
        assert_eq!(req.query_parameters.get("page").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_display_name_includes_folder() {
        let mut req = RequestEntity::new("Login", "POST", "https://x.io/auth/login");
        req.set_folder_path("Auth → Session");
        assert_eq!(req.display_name(), "POST /auth/login - Login (Auth → Session)");

        req.set_method("put");
        assert!(req.display_name().starts_with("PUT /auth/login"));
    }

    #[test]
    fn test_vulnerability_status_transitions() {
        let mut req = RequestEntity::new("a", "GET", "http://h/");
        assert_eq!(req.vulnerability_status, VulnerabilityStatus::Unknown);
        req.mark_vulnerable(true);
        assert!(req.is_vulnerable());
        req.mark_vulnerable(false);
        assert_eq!(req.vulnerability_status.as_str(), "Safe");
        req.clear_vulnerability_status();
        assert_eq!(req.vulnerability_status, VulnerabilityStatus::Unknown);
    }
}
