//! Auth configuration types

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// API key sent verbatim in a header
    ApiKey {
        /// Header carrying the key
        header_name: String,
        /// The API key value
        value: String,
    },
}

impl AuthConfig {
    /// API key sent verbatim in the `Authorization` header
    pub fn authorization_header(value: impl Into<String>) -> Self {
        Self::ApiKey {
            header_name: "Authorization".to_string(),
            value: value.into(),
        }
    }

    /// Whether requests carry credentials
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// Credentials never reach logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("value", &"<redacted>")
                .finish(),
        }
    }
}
