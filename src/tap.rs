//! The PlanetScale tap
//!
//! Ties configuration, the authenticated HTTP client, the OpenAPI document
//! and the stream registry together behind the Singer operations.

use crate::auth::AuthConfig;
use crate::config::{Catalog, CatalogStream, TapConfig};
use crate::engine::{SyncConfig, SyncEngine, SyncStats};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::output::MessageSink;
use crate::schema::{OpenApiSource, SchemaProvider};
use crate::streams::{registry, StreamDefinition};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Endpoint used to verify credentials
const CHECK_PATH: &str = "/organizations";

/// A configured tap
pub struct Tap {
    config: TapConfig,
    client: HttpClient,
    /// Unauthenticated client for the OpenAPI document, which may live on any host
    document_client: HttpClient,
    source: OnceCell<OpenApiSource>,
}

impl std::fmt::Debug for Tap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field("config", &self.config)
            .field("source_loaded", &self.source.initialized())
            .finish_non_exhaustive()
    }
}

impl Tap {
    /// Validate the configuration and build the API client
    ///
    /// Fails on missing credentials before anything touches the network.
    pub fn new(config: TapConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_auth(
            config.http_client_config(),
            AuthConfig::authorization_header(config.authorization_value()),
        )?;
        let document_client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self {
            config,
            client,
            document_client,
            source: OnceCell::new(),
        })
    }

    /// Use an already loaded OpenAPI document
    #[must_use]
    pub fn with_source(mut self, source: OpenApiSource) -> Self {
        self.source = OnceCell::new_with(Some(source));
        self
    }

    /// The validated configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// The OpenAPI document, loaded on first use
    pub async fn source(&self) -> Result<&OpenApiSource> {
        self.source
            .get_or_try_init(|| async {
                match &self.config.openapi_path {
                    Some(path) => OpenApiSource::from_file(path),
                    None => {
                        OpenApiSource::fetch(&self.config.openapi_url, &self.document_client).await
                    }
                }
            })
            .await
    }

    /// Enabled streams in registry order, or sorted by name
    pub fn discover_streams(&self, sorted: bool) -> Vec<StreamDefinition> {
        let mut streams: Vec<_> = registry().into_iter().filter(|d| d.enabled).collect();
        if sorted {
            streams.sort_by_key(|d| d.name);
        }
        streams
    }

    /// Singer catalog of the enabled streams with their resolved schemas
    pub async fn catalog(&self, sorted: bool) -> Result<Catalog> {
        let provider = SchemaProvider::new(self.source().await?);
        let streams = self
            .discover_streams(sorted)
            .iter()
            .map(|def| {
                let schema = provider.schema_for(def)?;
                Ok(CatalogStream::new(def.name, schema, def.primary_keys))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(streams = streams.len(), "Built catalog");
        Ok(Catalog { streams })
    }

    /// One authenticated request to confirm the credentials work
    pub async fn check(&self) -> Result<()> {
        let request = RequestConfig::new().query("per_page", "1");
        self.client
            .get_with_config(CHECK_PATH, request)
            .await
            .map_err(|e| Error::ConnectionCheck {
                message: e.to_string(),
            })?;
        info!("Connection check succeeded");
        Ok(())
    }

    /// Sync the selected streams (all enabled streams when `None`)
    pub async fn sync<S: MessageSink>(
        &self,
        selection: Option<Vec<String>>,
        sink: &mut S,
    ) -> Result<SyncStats> {
        let mut sync_config = SyncConfig::new();
        if let Some(selection) = selection {
            sync_config = sync_config.with_selected(selection);
        }
        self.run(sync_config, sink).await
    }

    /// Sync the streams a catalog selects, without its deselected properties
    pub async fn sync_catalog<S: MessageSink>(
        &self,
        catalog: &Catalog,
        sink: &mut S,
    ) -> Result<SyncStats> {
        let selected: Vec<&CatalogStream> =
            catalog.streams.iter().filter(|s| s.is_selected()).collect();
        if selected.is_empty() {
            return Err(Error::config("catalog selects no streams"));
        }

        let sync_config = selected.iter().fold(
            SyncConfig::new().with_selected(selected.iter().map(|s| s.tap_stream_id.as_str())),
            |config, stream| {
                config.with_excluded_properties(
                    stream.tap_stream_id.as_str(),
                    stream.deselected_properties(),
                )
            },
        );
        self.run(sync_config, sink).await
    }

    async fn run<S: MessageSink>(&self, sync_config: SyncConfig, sink: &mut S) -> Result<SyncStats> {
        let source = self.source().await?;
        SyncEngine::new(&self.client, source, self.discover_streams(false))
            .with_config(sync_config)
            .with_waivers(self.config.waivers())
            .run(sink)
            .await
    }
}
