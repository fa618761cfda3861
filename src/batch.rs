use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use crate::cache::CacheStore;
use crate::client::{IcpClient, Lookup};
use crate::config::Config;
use crate::error::IcpError;
use crate::stats::BatchReport;
use crate::workbook::{FILING_NUMBER_LABEL, REGISTRANT_LABEL};
use crate::{domain, reconcile, success, workbook};

/// Runs one batch with the live ICP endpoint.
pub fn run_batch(config: &Config) -> Result<BatchReport> {
    let client = IcpClient::new(
        &config.host,
        &config.path,
        config.app_code.as_deref().unwrap_or_default(),
        config.timeout,
    )?;
    run_batch_with(config, client)
}

/// Runs one batch: extract, reconcile, then persist cache, success file and workbook.
///
/// Nothing is written when lookups are needed but no AppCode is configured.
pub fn run_batch_with<L: Lookup>(config: &Config, lookup: L) -> Result<BatchReport> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "batch", workbook = ?config.workbook, "Starting ICP batch");

    let mut rows = workbook::read_rows(&config.workbook)
        .with_context(|| format!("Failed to read workbook {:?}", config.workbook))?;
    let domains = domain::extract(&rows, &config.header_label);

    let mut cache = CacheStore::load(&config.cache)
        .with_context(|| format!("Failed to load cache {:?}", config.cache))?;

    let pending = reconcile::pending(&domains, &cache);
    info!(action = "plan", component = "batch", rows = domains.len(), pending = pending.len(), "Lookups planned");
    if !pending.is_empty() && config.app_code.is_none() {
        return Err(IcpError::MissingAppCode.into());
    }

    let outcome = reconcile::Reconciler::new(lookup, config.delay).reconcile(&domains, &mut cache);

    cache
        .save(&config.cache, &domains)
        .with_context(|| format!("Failed to write cache {:?}", config.cache))?;
    success::write_success(&config.success, &outcome.success)
        .with_context(|| format!("Failed to write success file {:?}", config.success))?;

    if let Some(columns) = workbook::writeback(
        &mut rows,
        &domains,
        &cache,
        (REGISTRANT_LABEL, FILING_NUMBER_LABEL),
    ) {
        workbook::save_columns(&config.workbook, &rows, columns)
            .with_context(|| format!("Failed to update workbook {:?}", config.workbook))?;
    }

    let elapsed_secs = total_start_time.elapsed().as_secs_f64();
    info!(
        action = "complete",
        component = "batch",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Batch completed successfully"
    );

    Ok(BatchReport {
        stats: outcome.stats,
        workbook: config.workbook.clone(),
        cache: config.cache.clone(),
        success: config.success.clone(),
        elapsed_secs,
    })
}

pub fn print_batch_report(report: &BatchReport) {
    let stats = &report.stats;

    println!("\n--- ICP Batch Summary ---");
    println!(
        "Rows: {} ({} unique domains)",
        crate::utils::format_number(stats.rows),
        crate::utils::format_number(stats.unique_domains)
    );
    println!(
        "Cache hits: {}",
        crate::utils::format_number(stats.cache_hits)
    );
    println!(
        "API calls: {} ({} failed)",
        crate::utils::format_number(stats.api_calls),
        crate::utils::format_number(stats.failed_calls)
    );
    println!(
        "Filings found: {}",
        crate::utils::format_number(stats.successes)
    );
    println!(
        "Elapsed: {}",
        crate::utils::format_seconds(report.elapsed_secs)
    );
    println!("Success file: {}", report.success.display());
    println!("Cache file: {}", report.cache.display());
    println!("Workbook: {}", report.workbook.display());
}
