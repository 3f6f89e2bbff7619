//! Tap configuration
//!
//! Settings are read from a JSON or YAML file, an inline JSON string, or the
//! environment, then validated before any stream touches the network.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::schema::SchemaWaivers;
use crate::types::{BackoffType, OptionStringExt, PropertyType, ReplicationMethod};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Origin of every REST resource
pub const DEFAULT_API_URL: &str = "https://api.planetscale.com/v1";

/// Published OpenAPI description of the REST API
pub const DEFAULT_OPENAPI_URL: &str = "https://api.planetscale.com/v1/openapi-spec";

/// Prefix for environment variables that fill missing settings
pub const ENV_PREFIX: &str = "TAP_PLANETSCALE_";

// ============================================================================
// Tap Config
// ============================================================================

/// Complete tap configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Service token ID, visible on the service token page
    #[serde(default)]
    pub service_token_id: String,

    /// Service token value
    #[serde(default)]
    pub service_token: String,

    /// Base URL for API requests
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where to fetch the OpenAPI document from
    #[serde(default = "default_openapi_url")]
    pub openapi_url: String,

    /// Local copy of the OpenAPI document (takes precedence over `openapi_url`)
    #[serde(default)]
    pub openapi_path: Option<PathBuf>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Accepted schema discrepancies (defaults to the known list)
    #[serde(default)]
    pub schema_waivers: Option<SchemaWaivers>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_openapi_url() -> String {
    DEFAULT_OPENAPI_URL.to_string()
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            service_token_id: String::new(),
            service_token: String::new(),
            api_url: default_api_url(),
            openapi_url: default_openapi_url(),
            openapi_path: None,
            user_agent: None,
            http: HttpConfig::default(),
            schema_waivers: None,
        }
    }
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("service_token_id", &self.service_token_id)
            .field("service_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("openapi_url", &self.openapi_url)
            .field("openapi_path", &self.openapi_path)
            .field("user_agent", &self.user_agent)
            .field("http", &self.http)
            .field("schema_waivers", &self.schema_waivers)
            .finish()
    }
}

impl TapConfig {
    /// Create a config from the two required secrets
    pub fn new(service_token_id: impl Into<String>, service_token: impl Into<String>) -> Self {
        Self {
            service_token_id: service_token_id.into(),
            service_token: service_token.into(),
            ..Default::default()
        }
    }

    /// Override the API base URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Read the OpenAPI document from a local file
    #[must_use]
    pub fn with_openapi_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.openapi_path = Some(path.into());
        self
    }

    /// Override the OpenAPI document URL
    #[must_use]
    pub fn with_openapi_url(mut self, url: impl Into<String>) -> Self {
        self.openapi_url = url.into();
        self
    }

    /// Parse a config from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("config must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a config from an inline JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Load a config file; `.yaml`/`.yml` files are read as YAML, anything else as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Fill missing secrets from `TAP_PLANETSCALE_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Fill missing secrets using the given variable lookup
    pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if self.service_token_id.trim().is_empty() {
            if let Some(v) = lookup(&format!("{ENV_PREFIX}SERVICE_TOKEN_ID")).none_if_empty() {
                self.service_token_id = v;
            }
        }
        if self.service_token.trim().is_empty() {
            if let Some(v) = lookup(&format!("{ENV_PREFIX}SERVICE_TOKEN")).none_if_empty() {
                self.service_token = v;
            }
        }
    }

    /// Check required settings and URL shapes
    pub fn validate(&self) -> Result<()> {
        if self.service_token_id.trim().is_empty() {
            return Err(Error::missing_field("service_token_id"));
        }
        if self.service_token.trim().is_empty() {
            return Err(Error::missing_field("service_token"));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;
        if self.openapi_path.is_none() {
            url::Url::parse(&self.openapi_url)
                .map_err(|e| Error::invalid_value("openapi_url", e.to_string()))?;
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Value of the `Authorization` header
    pub fn authorization_value(&self) -> String {
        format!("{}:{}", self.service_token_id, self.service_token)
    }

    /// Waivers in effect: the configured list, or the known defaults
    pub fn waivers(&self) -> SchemaWaivers {
        self.schema_waivers
            .clone()
            .unwrap_or_else(SchemaWaivers::known)
    }

    /// Build the HTTP client configuration for API requests
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: Some(self.api_url.clone()),
            timeout: Duration::from_secs(self.http.timeout_seconds),
            max_retries: self.http.max_retries,
            initial_backoff: Duration::from_millis(self.http.backoff.initial_ms),
            max_backoff: Duration::from_millis(self.http.backoff.max_ms),
            backoff_type: self.http.backoff.backoff_type,
            rate_limit: self
                .http
                .rate_limit
                .as_ref()
                .map(|limit| RateLimiterConfig::new(limit.requests_per_second, limit.burst_size)),
            default_headers: [("accept".to_string(), "application/json".to_string())].into(),
            user_agent: self
                .user_agent
                .clone()
                .none_if_empty()
                .unwrap_or_else(|| HttpClientConfig::default().user_agent),
        }
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Rate limiting configuration (disabled when absent)
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    60000
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per second limit
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    1
}

// ============================================================================
// Spec Config (for `spec` command)
// ============================================================================

/// Configuration specification for tap setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
}

impl SpecConfig {
    /// Names of required properties
    pub fn required(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render as a JSON schema `connectionSpecification`
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, p)| {
                let mut prop = json!({ "type": p.property_type });
                if let Some(desc) = &p.description {
                    prop["description"] = json!(desc);
                }
                if p.secret {
                    prop["secret"] = json!(true);
                    prop["writeOnly"] = json!(true);
                }
                if let Some(default) = &p.default {
                    prop["default"] = default.clone();
                }
                (name.clone(), prop)
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }
}

/// Configuration property definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,

    /// Property description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,

    /// Default value
    #[serde(default)]
    pub default: Option<Value>,
}

impl PropertyConfig {
    fn string(description: &str) -> Self {
        Self {
            property_type: PropertyType::String,
            description: Some(description.to_string()),
            ..Default::default()
        }
    }
}

/// Settings understood by the tap
pub fn config_spec() -> SpecConfig {
    let mut properties = BTreeMap::new();

    properties.insert(
        "service_token_id".to_string(),
        PropertyConfig {
            required: true,
            ..PropertyConfig::string("The service token ID, visible on the service token page")
        },
    );
    properties.insert(
        "service_token".to_string(),
        PropertyConfig {
            required: true,
            secret: true,
            ..PropertyConfig::string("The service token value")
        },
    );
    properties.insert(
        "api_url".to_string(),
        PropertyConfig {
            default: Some(json!(DEFAULT_API_URL)),
            ..PropertyConfig::string("Base URL of the PlanetScale API")
        },
    );
    properties.insert(
        "openapi_url".to_string(),
        PropertyConfig {
            default: Some(json!(DEFAULT_OPENAPI_URL)),
            ..PropertyConfig::string("URL of the OpenAPI document stream schemas are read from")
        },
    );
    properties.insert(
        "openapi_path".to_string(),
        PropertyConfig::string("Local OpenAPI document, used instead of openapi_url"),
    );
    properties.insert(
        "user_agent".to_string(),
        PropertyConfig::string("User agent sent with every request"),
    );
    properties.insert(
        "http".to_string(),
        PropertyConfig {
            property_type: PropertyType::Object,
            description: Some("Timeout, retry and rate limit settings".to_string()),
            ..Default::default()
        },
    );
    properties.insert(
        "schema_waivers".to_string(),
        PropertyConfig {
            property_type: PropertyType::Object,
            description: Some("Known schema discrepancies to report as waived".to_string()),
            ..Default::default()
        },
    );

    SpecConfig { properties }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Singer catalog: the streams a tap offers and which of them are selected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Load a catalog file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Names of the streams marked as selected
    pub fn selected_streams(&self) -> Vec<String> {
        self.streams
            .iter()
            .filter(|s| s.is_selected())
            .map(|s| s.tap_stream_id.clone())
            .collect()
    }

    /// Look a stream up by id
    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.tap_stream_id == tap_stream_id)
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream identifier
    pub tap_stream_id: String,

    /// Stream name
    pub stream: String,

    /// JSON schema of one record
    #[serde(default)]
    pub schema: Value,

    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Stream and property metadata
    #[serde(default)]
    pub metadata: Vec<CatalogMetadata>,
}

impl CatalogStream {
    /// Build a full-table catalog entry with root and property metadata
    pub fn new(name: &str, schema: Value, key_properties: &[&str]) -> Self {
        let keys: Vec<String> = key_properties.iter().map(|k| (*k).to_string()).collect();

        let mut metadata = vec![CatalogMetadata {
            breadcrumb: Vec::new(),
            metadata: json!({
                "inclusion": "available",
                "selected": true,
                "table-key-properties": keys,
                "forced-replication-method": ReplicationMethod::FullTable,
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        }];

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for name in properties.keys() {
                let inclusion = if keys.contains(name) {
                    "automatic"
                } else {
                    "available"
                };
                let mut entry = serde_json::Map::new();
                entry.insert("inclusion".to_string(), json!(inclusion));
                metadata.push(CatalogMetadata {
                    breadcrumb: vec!["properties".to_string(), name.clone()],
                    metadata: entry,
                });
            }
        }

        Self {
            tap_stream_id: name.to_string(),
            stream: name.to_string(),
            schema,
            key_properties: keys,
            metadata,
        }
    }

    /// Metadata of the stream itself (empty breadcrumb)
    pub fn root_metadata(&self) -> Option<&serde_json::Map<String, Value>> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    /// `selected`, falling back to `selected-by-default`, then false
    pub fn is_selected(&self) -> bool {
        self.root_metadata().is_some_and(metadata_selected)
    }

    /// Top-level properties left out of the output
    ///
    /// A property is dropped when its inclusion is `unsupported`, or when it
    /// is not `automatic` and its metadata says `selected: false`. Properties
    /// without metadata stay.
    pub fn deselected_properties(&self) -> Vec<String> {
        self.metadata
            .iter()
            .filter_map(|m| match m.breadcrumb.as_slice() {
                [kind, name] if kind == "properties" => Some((name, &m.metadata)),
                _ => None,
            })
            .filter(|(_, meta)| {
                match meta.get("inclusion").and_then(Value::as_str) {
                    Some("automatic") => false,
                    Some("unsupported") => true,
                    _ => meta.get("selected").and_then(Value::as_bool) == Some(false),
                }
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

fn metadata_selected(metadata: &serde_json::Map<String, Value>) -> bool {
    metadata
        .get("selected")
        .or_else(|| metadata.get("selected-by-default"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// One metadata entry, addressed by breadcrumb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Path to the described element; empty for the stream itself
    #[serde(default)]
    pub breadcrumb: Vec<String>,

    /// Metadata values
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = TapConfig::from_json_str(r#"{"service_token_id": "id", "service_token": "tok"}"#)
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.openapi_url, DEFAULT_OPENAPI_URL);
        assert!(config.openapi_path.is_none());
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.http.rate_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_secrets() {
        let config = TapConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "service_token_id"));

        let config = TapConfig::new("id", "   ");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "service_token"));
    }

    #[test]
    fn test_validate_bad_url() {
        let config = TapConfig::new("id", "tok").with_api_url("not a url");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_authorization_value() {
        let config = TapConfig::new("abc", "pscale_tkn_123");
        assert_eq!(config.authorization_value(), "abc:pscale_tkn_123");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TapConfig::new("abc", "super-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("abc"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_apply_env_fills_missing_only() {
        let mut config = TapConfig::new("from-file", "");
        config.apply_env_with(|key| match key {
            "TAP_PLANETSCALE_SERVICE_TOKEN_ID" => Some("from-env".to_string()),
            "TAP_PLANETSCALE_SERVICE_TOKEN" => Some("env-token".to_string()),
            _ => None,
        });
        assert_eq!(config.service_token_id, "from-file");
        assert_eq!(config.service_token, "env-token");
    }

    #[test]
    fn test_from_file_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        writeln!(f, r#"{{"service_token_id": "a", "service_token": "b"}}"#).unwrap();
        let config = TapConfig::from_file(&json_path).unwrap();
        assert_eq!(config.service_token_id, "a");

        let yaml_path = dir.path().join("config.yaml");
        std::fs::write(
            &yaml_path,
            "service_token_id: c\nservice_token: d\nhttp:\n  max_retries: 1\n",
        )
        .unwrap();
        let config = TapConfig::from_file(&yaml_path).unwrap();
        assert_eq!(config.service_token, "d");
        assert_eq!(config.http.max_retries, 1);

        let missing = TapConfig::from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(TapConfig::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_http_client_config() {
        let mut config = TapConfig::new("a", "b").with_api_url("http://localhost:1234");
        config.http.rate_limit = Some(RateLimitConfig {
            requests_per_second: 5,
            burst_size: 2,
        });
        let http = config.http_client_config();
        assert_eq!(http.base_url.as_deref(), Some("http://localhost:1234"));
        assert_eq!(
            http.default_headers.get("accept"),
            Some(&"application/json".to_string())
        );
        assert_eq!(http.rate_limit.map(|r| r.requests_per_second), Some(5));
    }

    #[test]
    fn test_config_spec() {
        let spec = config_spec();
        assert_eq!(spec.required(), vec!["service_token", "service_token_id"]);
        assert!(spec.properties["service_token"].secret);
        assert!(!spec.properties["service_token_id"].secret);

        let schema = spec.to_json_schema();
        assert_eq!(schema["properties"]["service_token"]["secret"], true);
        assert_eq!(schema["required"].as_array().unwrap().len(), 2);
    }
    #[test]
    fn test_catalog_stream_metadata() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "string"}, "name": {"type": "string"}}
        });
        let entry = CatalogStream::new("regions", schema, &["id"]);

        assert_eq!(entry.tap_stream_id, "regions");
        assert_eq!(entry.key_properties, vec!["id"]);
        assert!(entry.is_selected());

        let root = entry.root_metadata().unwrap();
        assert_eq!(root["inclusion"], "available");
        assert_eq!(root["forced-replication-method"], "FULL_TABLE");
        assert_eq!(root["table-key-properties"], json!(["id"]));

        let id_meta = entry
            .metadata
            .iter()
            .find(|m| m.breadcrumb == vec!["properties", "id"])
            .unwrap();
        assert_eq!(id_meta.metadata["inclusion"], "automatic");
        assert_eq!(entry.metadata.len(), 3);
    }

    #[test]
    fn test_catalog_selection() {
        let catalog: Catalog = serde_json::from_value(json!({
            "streams": [
                {
                    "tap_stream_id": "regions",
                    "stream": "regions",
                    "metadata": [{"breadcrumb": [], "metadata": {"selected": true}}]
                },
                {
                    "tap_stream_id": "organizations",
                    "stream": "organizations",
                    "metadata": [{"breadcrumb": [], "metadata": {"selected": false}}]
                },
                {
                    "tap_stream_id": "databases",
                    "stream": "databases",
                    "metadata": [{"breadcrumb": [], "metadata": {"selected-by-default": true}}]
                },
                {"tap_stream_id": "branches", "stream": "branches"}
            ]
        }))
        .unwrap();

        assert_eq!(catalog.selected_streams(), vec!["regions", "databases"]);
        assert!(catalog.get("branches").is_some());
        assert!(catalog.get("passwords").is_none());
    }

    #[test]
    fn test_deselected_properties() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"},
                "html_url": {"type": "string"},
                "state": {"type": "string"}
            }
        });
        let mut entry = CatalogStream::new("databases", schema, &["id"]);
        assert!(entry.deselected_properties().is_empty());

        for meta in &mut entry.metadata {
            match meta.breadcrumb.last().map(String::as_str) {
                // Key fields are always emitted
                Some("id" | "html_url") => {
                    meta.metadata.insert("selected".into(), json!(false));
                }
                Some("state") => {
                    meta.metadata.insert("inclusion".into(), json!("unsupported"));
                }
                _ => {}
            }
        }

        let mut dropped = entry.deselected_properties();
        dropped.sort();
        assert_eq!(dropped, vec!["html_url", "state"]);
        assert!(entry.is_selected());
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = Catalog {
            streams: vec![CatalogStream::new("regions", json!({}), &["id"])],
        };
        std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let loaded = Catalog::from_file(&path).unwrap();
        assert_eq!(loaded, catalog);
    }
}
