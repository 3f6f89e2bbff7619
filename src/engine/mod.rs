//! Execution engine module
//!
//! Walks the stream hierarchy and writes Singer messages.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs root streams and, depth first, their children
//! - `SyncConfig` - Which streams to emit and whether to validate
//! - `Message` - Singer `SCHEMA` and `RECORD` messages
//!
//! A child stream runs once per parent record, with the context its parent
//! derived from that record. Selecting a child implies running its
//! ancestors, whose records feed the child context but are not written.

mod types;

pub use types::{Message, SyncConfig, SyncStats};

use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::output::MessageSink;
use crate::pagination::{NextPage, PageNumberPaginator, PaginationState, Paginator};
use crate::schema::{OpenApiSource, RecordValidator, SchemaProvider, SchemaWaivers};
use crate::streams::StreamDefinition;
use crate::template;
use crate::types::{Context, JsonObject, JsonValue};
use futures::future::{FutureExt, LocalBoxFuture};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<'a> {
    /// HTTP client
    client: &'a HttpClient,
    /// Schema lookup for emitted streams
    provider: SchemaProvider<'a>,
    /// Definitions available to this run
    streams: Vec<StreamDefinition>,
    /// Accepted discrepancies
    waivers: SchemaWaivers,
    /// Record extraction
    decoder: JsonDecoder,
    /// Page walking
    paginator: PageNumberPaginator,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
    /// Validators of emitted streams, keyed by stream name
    validators: HashMap<&'static str, RecordValidator>,
}

impl<'a> SyncEngine<'a> {
    /// Create an engine over the given definitions
    pub fn new(
        client: &'a HttpClient,
        source: &'a OpenApiSource,
        streams: Vec<StreamDefinition>,
    ) -> Self {
        Self {
            client,
            provider: SchemaProvider::new(source),
            streams,
            waivers: SchemaWaivers::known(),
            decoder: JsonDecoder::new(),
            paginator: PageNumberPaginator::default(),
            config: SyncConfig::default(),
            stats: SyncStats::default(),
            validators: HashMap::new(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the accepted discrepancies
    #[must_use]
    pub fn with_waivers(mut self, waivers: SchemaWaivers) -> Self {
        self.waivers = waivers;
        self
    }

    /// Replace the paginator
    #[must_use]
    pub fn with_paginator(mut self, paginator: PageNumberPaginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Streams that must run: the selected ones and their ancestors, in definition order
    pub fn plan(&self) -> Result<Vec<StreamDefinition>> {
        let mut needed: Vec<&'static str> = Vec::new();

        for def in &self.streams {
            if !self.config.is_selected(def.name) {
                continue;
            }
            let mut current = Some(def.name);
            while let Some(name) = current {
                if needed.contains(&name) {
                    break;
                }
                needed.push(name);
                current = self.definition(name)?.parent;
            }
        }

        if let Some(selected) = &self.config.selected {
            if let Some(unknown) = selected
                .iter()
                .find(|name| !self.streams.iter().any(|d| d.name == name.as_str()))
            {
                return Err(Error::StreamNotFound {
                    stream: unknown.clone(),
                });
            }
        }

        Ok(self
            .streams
            .iter()
            .filter(|d| needed.contains(&d.name))
            .cloned()
            .collect())
    }

    /// Run every planned root stream and write its messages
    pub async fn run<S: MessageSink>(&mut self, sink: &mut S) -> Result<SyncStats> {
        let start = Instant::now();
        let plan = self.plan()?;

        // Schemas first, so a resolution failure aborts before any request
        for def in plan.iter().filter(|d| self.config.is_selected(d.name)) {
            let mut schema = self.provider.schema_for(def)?;
            self.config.prune_schema(def.name, &mut schema);
            if self.config.validate_records {
                let validator = RecordValidator::new(
                    def.name,
                    &schema,
                    def.primary_keys,
                    self.waivers.clone(),
                )?;
                self.validators.insert(def.name, validator);
            }
            sink.write(&Message::schema(def.name, schema, def.primary_keys))?;
        }

        for def in plan.iter().filter(|d| d.is_root()) {
            info!(stream = def.name, "Starting sync");
            self.sync_stream(def.clone(), &plan, Context::new(), sink)
                .await?;
        }

        sink.flush()?;
        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            records = self.stats.records_synced,
            pages = self.stats.pages_fetched,
            discrepancies = self.stats.discrepancies,
            waived = self.stats.waived_discrepancies,
            duration_ms = self.stats.duration_ms,
            "Sync complete"
        );

        Ok(self.stats.clone())
    }

    /// Run one stream invocation, expanding children per record
    fn sync_stream<'b, S: MessageSink>(
        &'b mut self,
        stream: StreamDefinition,
        plan: &'b [StreamDefinition],
        context: Context,
        sink: &'b mut S,
    ) -> LocalBoxFuture<'b, Result<()>> {
        async move {
            let children: Vec<&StreamDefinition> = plan
                .iter()
                .filter(|d| d.parent == Some(stream.name))
                .collect();
            let emit = self.config.is_selected(stream.name);
            let path = template::render(stream.path, &context)?;
            let mut state = PaginationState::new();
            let mut params = self.paginator.initial_params(&state);

            loop {
                let request = params
                    .drain()
                    .fold(RequestConfig::new(), |req, (key, value)| req.query(key, value));

                let response = self
                    .client
                    .request(stream.method.into(), &path, request)
                    .await?;
                let body = self.decoder.decode_raw(&response.text().await?)?;
                self.stats.add_page();

                let records = self.decoder.extract(&body)?;
                let count = records.len();
                debug!(
                    stream = stream.name,
                    path = %path,
                    page = state.page.unwrap_or(1),
                    records = count,
                    "Fetched page"
                );

                for record in records {
                    let Some(record) = stream.apply_post_process(record, &context)? else {
                        continue;
                    };

                    let child_context = if children.is_empty() {
                        None
                    } else {
                        Some(stream.child_context_for(&record, &context)?)
                    };

                    if emit {
                        let mut record = record;
                        self.config.prune_record(stream.name, &mut record);
                        self.check_record(stream.name, &record);
                        sink.write(&Message::record(stream.name, record))?;
                        self.stats.add_record(stream.name);
                    }

                    if let Some(child_context) = child_context {
                        for child in &children {
                            self.sync_stream((*child).clone(), plan, child_context.clone(), sink)
                                .await?;
                        }
                    }
                }

                match self.paginator.process_response(&body, count, &mut state) {
                    NextPage::Continue { query_params } => params = query_params,
                    NextPage::Done => break,
                }
            }

            self.stats.add_stream();
            Ok(())
        }
        .boxed_local()
    }

    /// Log and count the discrepancies of one record
    fn check_record(&mut self, stream: &str, record: &JsonObject) {
        let Some(validator) = self.validators.get(stream) else {
            return;
        };

        for discrepancy in validator.validate(&JsonValue::Object(record.clone())) {
            if discrepancy.waived {
                debug!(
                    stream,
                    kind = %discrepancy.kind,
                    field = %discrepancy.field,
                    "Waived schema discrepancy: {}",
                    discrepancy.message
                );
            } else {
                warn!(
                    stream,
                    kind = %discrepancy.kind,
                    field = %discrepancy.field,
                    "Schema discrepancy: {}",
                    discrepancy.message
                );
            }
            self.stats.add_discrepancy(discrepancy.waived);
        }
    }

    fn definition(&self, name: &str) -> Result<&StreamDefinition> {
        self.streams
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::StreamNotFound {
                stream: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests;
