//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{config_spec, Catalog, TapConfig};
use crate::error::{Result, ResultExt};
use crate::output::JsonLinesWriter;
use crate::streams::registry;
use crate::tap::Tap;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover { sorted } => self.discover(*sorted).await,
            Commands::Read { streams, catalog } => {
                self.read(streams.as_deref(), catalog.as_deref()).await
            }
            Commands::Streams => self.streams(),
        }
    }

    /// Load configuration: inline JSON, then file, then environment for missing secrets
    fn load_config(&self) -> Result<TapConfig> {
        let mut config = if let Some(json_str) = &self.cli.config_json {
            TapConfig::from_json_str(json_str)?
        } else if let Some(path) = &self.cli.config {
            TapConfig::from_file(path)?
        } else {
            TapConfig::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn tap(&self) -> Result<Tap> {
        Tap::new(self.load_config()?)
    }

    /// Show the configuration specification
    fn spec(&self) -> Result<()> {
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "documentationUrl": "https://api.planetscale.com/v1/openapi-spec",
                "connectionSpecification": config_spec().to_json_schema()
            }
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let tap = self.tap()?;

        match tap.check().await {
            Ok(()) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": "Connection successful"
                    }
                }));
                Ok(())
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": e.to_string()
                    }
                }));
                Err(e)
            }
        }
    }

    /// Print the catalog
    async fn discover(&self, sorted: bool) -> Result<()> {
        let tap = self.tap()?;
        let catalog = tap.catalog(sorted).await?;
        self.output_message(&serde_json::to_value(&catalog)?);
        Ok(())
    }

    /// Sync streams to stdout
    async fn read(&self, streams: Option<&str>, catalog: Option<&Path>) -> Result<()> {
        let tap = self.tap()?;
        let mut writer = JsonLinesWriter::stdout();

        let stats = match (streams, catalog) {
            (Some(list), _) => tap.sync(parse_stream_list(list), &mut writer).await?,
            (None, Some(path)) => {
                let catalog = Catalog::from_file(path)
                    .with_context(|| format!("Failed to load catalog {}", path.display()))?;
                tap.sync_catalog(&catalog, &mut writer).await?
            }
            (None, None) => tap.sync(None, &mut writer).await?,
        };

        info!(
            streams = stats.streams_synced,
            records = stats.records_synced,
            pages = stats.pages_fetched,
            discrepancies = stats.discrepancies,
            waived = stats.waived_discrepancies,
            duration_ms = stats.duration_ms,
            "Read finished"
        );
        Ok(())
    }

    /// List stream names without touching the network
    fn streams(&self) -> Result<()> {
        let streams: Vec<Value> = registry()
            .iter()
            .map(|d| {
                json!({
                    "name": d.name,
                    "parent": d.parent,
                    "primary_keys": d.primary_keys,
                    "enabled": d.enabled
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": streams
        }));
        Ok(())
    }

    /// Output a message in the configured format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Split a comma-separated stream list; blank entries are ignored, an empty list means all
fn parse_stream_list(list: &str) -> Option<Vec<String>> {
    let names: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    (!names.is_empty()).then_some(names)
}
