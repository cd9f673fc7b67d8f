//! Querying client with automatic index selection
//!
//! Owns the table description provider, the per-table metadata cache and
//! the selection counters. Metadata for a table is fetched and parsed on the
//! first query against it and reused for the client's lifetime.

use std::sync::{Arc, RwLock};

use crate::config::{ClientConfig, ConfigResult};
use crate::context::QueryContext;
use crate::metadata::{
    parse_table_index_metadata, CacheLookup, Index, MetadataCache, MetadataError,
    MetadataResult, TableDescriptionProvider, TableIndexMetadata,
};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsSnapshot, SelectorMetrics};
use crate::selector::{Expression, IndexSelector, SelectionExplain, SelectionResult};

/// Index-selecting client
pub struct Client {
    provider: Arc<dyn TableDescriptionProvider>,
    config: RwLock<ClientConfig>,
    cache: MetadataCache,
    metrics: SelectorMetrics,
}

impl Client {
    /// Client with default configuration
    pub fn new(provider: impl TableDescriptionProvider + 'static) -> Self {
        Self::from_parts(Arc::new(provider), ClientConfig::default())
    }

    /// Client with explicit configuration, validated first
    pub fn with_config(
        provider: impl TableDescriptionProvider + 'static,
        config: ClientConfig,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(Arc::new(provider), config))
    }

    /// Client over a shared provider
    pub fn with_shared_provider(
        provider: Arc<dyn TableDescriptionProvider>,
        config: ClientConfig,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(provider, config))
    }

    fn from_parts(provider: Arc<dyn TableDescriptionProvider>, config: ClientConfig) -> Self {
        if let Some(severity) = config.log_severity {
            Logger::set_min_severity(severity);
        }
        Self {
            provider,
            config: RwLock::new(config),
            cache: MetadataCache::new(),
            metrics: SelectorMetrics::new(),
        }
    }

    /// Current configuration
    pub fn config(&self) -> ClientConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Changes the sparseness threshold for tables not parsed yet.
    /// Already-cached tables keep the threshold they were parsed with.
    pub fn set_sparseness_threshold(&self, threshold: f64) -> ConfigResult<()> {
        let mut candidate = self.config();
        candidate.sparseness_threshold = threshold;
        candidate.validate()?;
        match self.config.write() {
            Ok(mut config) => *config = candidate,
            Err(poisoned) => *poisoned.into_inner() = candidate,
        }
        Ok(())
    }

    /// Index metadata of a table, fetched through the provider on first use.
    ///
    /// Provider errors are returned unchanged and nothing is cached.
    pub async fn index_metadata(
        &self,
        ctx: &QueryContext,
        table_name: &str,
    ) -> MetadataResult<Arc<TableIndexMetadata>> {
        if let Some(metadata) = self.cache.get(table_name)? {
            self.metrics.increment_cache_hits();
            log_event_with_fields(Event::MetadataCacheHit, &[("table", table_name)]);
            return Ok(metadata);
        }

        self.metrics.increment_cache_misses();
        let request_id = ctx.request_id.to_string();
        log_event_with_fields(
            Event::MetadataCacheMiss,
            &[("table", table_name), ("request_id", &request_id)],
        );

        let result = self
            .cache
            .get_or_fetch(table_name, || self.fetch_and_parse(ctx, table_name))
            .await;

        match result {
            Ok((metadata, lookup)) => {
                if lookup == CacheLookup::Fetched {
                    let count = metadata.len().to_string();
                    log_event_with_fields(
                        Event::MetadataParsed,
                        &[("indexes", &count), ("table", table_name)],
                    );
                }
                Ok(metadata)
            }
            Err(err) => {
                log_event_with_fields(
                    Event::MetadataFetchFailed,
                    &[
                        ("code", err.code()),
                        ("request_id", &request_id),
                        ("table", table_name),
                    ],
                );
                Err(err)
            }
        }
    }

    async fn fetch_and_parse(
        &self,
        ctx: &QueryContext,
        table_name: &str,
    ) -> MetadataResult<TableIndexMetadata> {
        self.metrics.increment_provider_calls();
        log_event_with_fields(Event::MetadataFetchBegin, &[("table", table_name)]);

        let describe = self.provider.describe(ctx, table_name);
        let described = match ctx.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, describe)
                .await
                .unwrap_or_else(|_| Err(MetadataError::DeadlineExceeded(table_name.to_string()))),
            None => describe.await,
        };
        let description = described.map_err(|err| {
            self.metrics.increment_provider_failures();
            err
        })?;
        log_event_with_fields(Event::MetadataFetchComplete, &[("table", table_name)]);

        let threshold = self.config().sparseness_threshold;
        parse_table_index_metadata(table_name, &description, threshold)
    }

    /// Chooses the index that best serves `expr` on `table_name`
    pub async fn choose_index(
        &self,
        ctx: &QueryContext,
        table_name: &str,
        expr: &Expression,
    ) -> SelectionResult<Arc<Index>> {
        let metadata = self.index_metadata(ctx, table_name).await?;
        let result = IndexSelector::new(&metadata).choose(expr);

        match &result {
            Ok(index) => {
                self.metrics.increment_selections();
                log_event_with_fields(
                    Event::IndexSelected,
                    &[("index", &index.name), ("table", table_name)],
                );
            }
            Err(err) => {
                self.metrics.increment_rejections();
                let rejected = err.rejections().map_or(0, |r| r.len()).to_string();
                log_event_with_fields(
                    Event::IndexSelectionRejected,
                    &[("rejected", &rejected), ("table", table_name)],
                );
            }
        }

        result
    }

    /// Explain report for `expr` on `table_name`
    pub async fn explain(
        &self,
        ctx: &QueryContext,
        table_name: &str,
        expr: &Expression,
    ) -> SelectionResult<SelectionExplain> {
        let metadata = self.index_metadata(ctx, table_name).await?;
        let evaluation = IndexSelector::new(&metadata).evaluate(expr);
        Ok(SelectionExplain::from_evaluation(&evaluation, expr))
    }

    /// Tables whose metadata is cached, sorted
    pub fn cached_tables(&self) -> MetadataResult<Vec<String>> {
        self.cache.tables()
    }

    /// Counter snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
