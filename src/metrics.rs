//! Prometheus metric definitions.
//!
//! All metrics use the `figo_` prefix and live in an explicitly owned
//! registry: the refresh loop writes, the exposition server only reads.

use prometheus::{
    Counter, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder, proto::MetricFamily,
};
use std::sync::Arc;

/// Metric families exported on the scrape endpoint.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Summed transaction amount per account, type, and currency
    pub transaction_amount: GaugeVec,
    /// Current balance per account; absent until the first sync completes
    pub account_balance: GaugeVec,
    /// Whether background sync is enabled for an account (1.0 or 0.0)
    pub account_sync_enabled: GaugeVec,
    /// 0.0 for a healthy sync status, otherwise the negated status code
    pub account_sync_status_error: GaugeVec,
    /// Failed poll cycles
    pub scrape_errors_total: Counter,
    /// Wall-clock duration of one upstream poll cycle
    pub scrape_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance with all families registered.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transaction_amount = GaugeVec::new(
            Opts::new("figo_transaction_amount", "Transaction amount"),
            &["accountid", "type", "currency"],
        )?;
        registry.register(Box::new(transaction_amount.clone()))?;

        let account_balance = GaugeVec::new(
            Opts::new("figo_account_balance", "Account balance"),
            &["accountid", "name", "bankid", "type", "currency"],
        )?;
        registry.register(Box::new(account_balance.clone()))?;

        let account_sync_enabled = GaugeVec::new(
            Opts::new("figo_account_sync_enabled", "Account sync enabled"),
            &["accountid", "name", "bankid", "type"],
        )?;
        registry.register(Box::new(account_sync_enabled.clone()))?;

        let account_sync_status_error = GaugeVec::new(
            Opts::new(
                "figo_account_sync_status_error",
                "Negated sync status code, 0 when healthy",
            ),
            &["accountid", "name"],
        )?;
        registry.register(Box::new(account_sync_status_error.clone()))?;

        let scrape_errors_total = Counter::with_opts(Opts::new(
            "figo_scrape_errors_total",
            "Number of failed scrapes",
        ))?;
        registry.register(Box::new(scrape_errors_total.clone()))?;

        let scrape_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "figo_scrape_duration_seconds",
                "Duration of one full upstream poll",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            transaction_amount,
            account_balance,
            account_sync_enabled,
            account_sync_status_error,
            scrape_errors_total,
            scrape_duration_seconds,
        })
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Snapshot of the raw metric families, mainly for assertions in tests.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}
