//! Derived-field extraction shared by the Postman and Swagger importers

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::constants::ENDPOINT_VAR_MARKER;

/// Path portion of a URL with protocol, host, and query removed and every
/// `{{token}}` collapsed to `{var}`
pub fn endpoint_of(url: &str) -> String {
    static TEMPLATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let template = TEMPLATE_REGEX.get_or_init(|| Regex::new(r"\{\{[^}]+\}\}").unwrap());

    let path = path_and_query(url);
    let path = match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    };
    template.replace_all(path, ENDPOINT_VAR_MARKER).into_owned()
}

/// Everything from the first `/` after the (optional) scheme; `/` when there is none
fn path_and_query(url: &str) -> &str {
    let rest = strip_scheme(url);
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}

/// Drops a leading `http://` or `https://`, ignoring case
pub fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        if url.len() >= scheme.len()
            && url.is_char_boundary(scheme.len())
            && url[..scheme.len()].eq_ignore_ascii_case(scheme)
        {
            return &url[scheme.len()..];
        }
    }
    url
}

/// Host (and port) portion of a URL, without the scheme
pub fn host_of(url: &str) -> &str {
    let rest = strip_scheme(url);
    let end = rest.find(|c| c == '/' || c == '?').unwrap_or(rest.len());
    &rest[..end]
}

/// Request target for an HTTP request line: path plus query, `/` at minimum
pub fn request_target(url: &str) -> String {
    let rest = strip_scheme(url);
    match (rest.find('/'), rest.find('?')) {
        (Some(slash), Some(query)) if query < slash => format!("/{}", &rest[query..]),
        (Some(slash), _) => rest[slash..].to_string(),
        (None, Some(query)) => format!("/{}", &rest[query..]),
        (None, None) => "/".to_string(),
    }
}

/// Literal `key=value` pairs after `?` in `url`; the first occurrence of a key wins
pub fn query_pairs(url: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    let Some((_, query)) = url.split_once('?') else {
        return pairs;
    };
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if !key.is_empty() {
                pairs
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }
    pairs
}

/// Merges literal `key=value` pairs found after `?` in `url` into `params`
///
/// Keys already present win, so structured query entries that were
/// inserted first take precedence.
pub fn merge_query_string(url: &str, params: &mut BTreeMap<String, String>) {
    for (key, value) in query_pairs(url) {
        params.entry(key).or_insert(value);
    }
}

/// Collects `{{name}}` template segments into `name -> {{name}}` entries
pub fn collect_path_variables<'a, I>(segments: I, vars: &mut BTreeMap<String, String>)
where
    I: IntoIterator<Item = &'a str>,
{
    for segment in segments {
        if let Some(name) = template_name(segment) {
            vars.insert(name.to_string(), segment.to_string());
        }
    }
}

/// Path segments of a URL string (host and query excluded)
pub fn url_path_segments(url: &str) -> Vec<&str> {
    let path = path_and_query(url);
    let path = path.split('?').next().unwrap_or(path);
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn template_name(segment: &str) -> Option<&str> {
    let start = segment.find("{{")? + 2;
    let len = segment[start..].find("}}")?;
    Some(&segment[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_host_and_query() {
        assert_eq!(endpoint_of("https://api.example.com/users?page=2"), "/users");
        assert_eq!(endpoint_of("HTTP://api.example.com/a/b"), "/a/b");
        assert_eq!(endpoint_of("api.example.com"), "/");
        assert_eq!(endpoint_of(""), "/");
    }

    #[test]
    fn test_endpoint_collapses_templates() {
        assert_eq!(endpoint_of("{{base}}/users/{{userId}}/posts"), "/users/{var}/posts");
    }

    #[test]
    fn test_merge_query_string_keeps_existing_keys() {
        let mut params = BTreeMap::new();
        params.insert("page".to_string(), "1".to_string());
        merge_query_string("https://h/x?page=9&limit=10&flag", &mut params);
        assert_eq!(params.get("page").map(String::as_str), Some("1"));
        assert_eq!(params.get("limit").map(String::as_str), Some("10"));
        assert!(!params.contains_key("flag"));
    }

    #[test]
    fn test_path_variables_from_segments() {
        let mut vars = BTreeMap::new();
        collect_path_variables(url_path_segments("{{base}}/users/{{id}}/x?y={{z}}"), &mut vars);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("id").map(String::as_str), Some("{{id}}"));
    }

    #[test]
    fn test_host_and_target() {
        assert_eq!(host_of("https://api.example.com:8443/v1?q=1"), "api.example.com:8443");
        assert_eq!(request_target("https://api.example.com/v1?q=1"), "/v1?q=1");
        assert_eq!(request_target("https://api.example.com"), "/");
        assert_eq!(request_target("https://api.example.com?next=/home"), "/?next=/home");
    }
}
