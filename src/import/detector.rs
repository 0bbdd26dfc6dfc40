//! Document format auto-detection

use serde_json::Value;

/// Shape of a decoded input document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    PostmanCollection,
    SwaggerOpenApi,
    Unrecognized,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentFormat::PostmanCollection => "Postman Collection",
            DocumentFormat::SwaggerOpenApi => "Swagger/OpenAPI",
            DocumentFormat::Unrecognized => "Unrecognized",
        }
    }
}

/// Classify a decoded document
pub fn detect_format(doc: &Value) -> DocumentFormat {
    // Swagger/OpenAPI first (a spec may also carry `info`)
    if is_swagger(doc) {
        return DocumentFormat::SwaggerOpenApi;
    }

    if is_postman_collection(doc) {
        return DocumentFormat::PostmanCollection;
    }

    DocumentFormat::Unrecognized
}

/// `openapi`, or `swagger` + `info` + `paths`
pub fn is_swagger(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return false;
    };
    obj.contains_key("openapi")
        || (obj.contains_key("swagger") && obj.contains_key("info") && obj.contains_key("paths"))
}

/// `info` + `item`
pub fn is_postman_collection(doc: &Value) -> bool {
    let Some(obj) = doc.as_object() else {
        return false;
    };
    obj.contains_key("info") && obj.contains_key("item")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_postman() {
        let doc = json!({"info": {"name": "c"}, "item": []});
        assert_eq!(detect_format(&doc), DocumentFormat::PostmanCollection);
    }

    #[test]
    fn test_detect_openapi() {
        assert_eq!(detect_format(&json!({"openapi": "3.0.0"})), DocumentFormat::SwaggerOpenApi);
        let swagger = json!({"swagger": "2.0", "info": {}, "paths": {}});
        assert_eq!(detect_format(&swagger), DocumentFormat::SwaggerOpenApi);
    }

    #[test]
    fn test_swagger_needs_all_three_keys() {
        let doc = json!({"swagger": "2.0", "paths": {}});
        assert_eq!(detect_format(&doc), DocumentFormat::Unrecognized);
    }

    #[test]
    fn test_swagger_wins_over_postman() {
        let doc = json!({"openapi": "3.1.0", "info": {}, "item": []});
        assert_eq!(detect_format(&doc), DocumentFormat::SwaggerOpenApi);
    }

    #[test]
    fn test_non_objects_are_unrecognized() {
        assert_eq!(detect_format(&json!([1, 2])), DocumentFormat::Unrecognized);
        assert_eq!(detect_format(&json!("info")), DocumentFormat::Unrecognized);
    }
}
