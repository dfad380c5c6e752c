//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Transfers (outcomes, failures by kind, phase durations)
//! - Platform calls (retries)
//! - Discovery (runs, items added)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Transfers
// =============================================================================

/// Transfers finished, by outcome.
pub static TRANSFERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trendrelay_transfers_total", "Total transfer attempts"),
        &["outcome"], // "completed", "failed", "skipped"
    )
    .unwrap()
});

/// Failed transfers, by error kind.
pub static TRANSFER_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trendrelay_transfer_failures_total",
            "Failed transfers by error kind",
        ),
        &["phase", "kind"],
    )
    .unwrap()
});

/// Time spent in each transfer phase.
pub static PHASE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trendrelay_phase_duration_seconds",
            "Duration of acquisition and publication phases",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["phase"], // "acquiring", "publishing"
    )
    .unwrap()
});

// =============================================================================
// Platform calls
// =============================================================================

/// Retries of transient platform failures.
pub static PLATFORM_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trendrelay_platform_retries_total",
            "Retries of transient platform failures",
        ),
        &["operation"], // "resolve_asset", "publish"
    )
    .unwrap()
});

// =============================================================================
// Discovery
// =============================================================================

/// Trending fetches, by result.
pub static DISCOVERY_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trendrelay_discovery_runs_total", "Trending list fetches"),
        &["result"], // "success", or the error kind
    )
    .unwrap()
});

/// New items appended to the queue.
pub static ITEMS_DISCOVERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "trendrelay_items_discovered_total",
        "Items newly added to the transfer queue",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TRANSFERS_TOTAL.clone()),
        Box::new(TRANSFER_FAILURES.clone()),
        Box::new(PHASE_DURATION.clone()),
        Box::new(PLATFORM_RETRIES.clone()),
        Box::new(DISCOVERY_RUNS.clone()),
        Box::new(ITEMS_DISCOVERED.clone()),
    ]
}
