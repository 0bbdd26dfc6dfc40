//! Application constants
//!
//! Centralized location for magic strings and import defaults.

/// Separator placed between nested Postman folder names
pub const FOLDER_SEPARATOR: &str = " → ";

/// Separator between a source file stem and the folder path inside it
pub const SOURCE_SEPARATOR: &str = "/";

/// Name given to requests without one
pub const DEFAULT_REQUEST_NAME: &str = "Unnamed Request";

/// Name given to folders without one
pub const DEFAULT_FOLDER_NAME: &str = "Unnamed Folder";

/// Method used when a request does not declare one
pub const DEFAULT_METHOD: &str = "GET";

/// Protocol used when a structured Postman URL omits it
pub const DEFAULT_PROTOCOL: &str = "https";

/// Folder path assigned to every request expanded from a Swagger/OpenAPI document
pub const SWAGGER_FOLDER: &str = "Swagger API";

/// Base URL used when a Swagger document's servers/host cannot be resolved
pub const FALLBACK_BASE_URL: &str = "http://localhost";

/// Scheme used for Swagger 2 documents without `schemes`
pub const DEFAULT_SWAGGER_SCHEME: &str = "http";

/// Host used for Swagger 2 documents without `host`
pub const DEFAULT_SWAGGER_HOST: &str = "localhost";

/// Literal that replaces `{{token}}` templates in derived endpoints
pub const ENDPOINT_VAR_MARKER: &str = "{var}";

/// Operation keys recognised under a Swagger path item, in expansion order
pub const SWAGGER_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

/// Application name
pub const APP_NAME: &str = "importman";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
