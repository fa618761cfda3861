use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{IcpError, Result};
use crate::record::DomainRecord;
use crate::utils::write_csv_atomically;

const HEADER: [&str; 4] = ["domain", "status_code", "error_header", "body"];

#[derive(Debug, Deserialize)]
struct CacheRow {
    domain: String,
    status_code: String,
    #[serde(default)]
    error_header: String,
    #[serde(default)]
    body: String,
}

/// Lookup results keyed by domain, remembering insertion order.
#[derive(Debug, Default, Clone)]
pub struct CacheStore {
    records: HashMap<String, DomainRecord>,
    order: Vec<String>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache file. A missing file gives an empty store and
    /// malformed rows are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        let mut store = Self::new();

        if !path.exists() {
            info!(action = "load", component = "cache", file_path = ?path, "No cache file, starting empty");
            return Ok(store);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| IcpError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let mut skipped = 0usize;
        for (index, row) in reader.deserialize::<CacheRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(action = "parse", component = "cache", line, error = %e, "Skipping malformed cache row");
                    skipped += 1;
                    continue;
                }
            };

            let domain = row.domain.trim();
            if domain.is_empty() {
                warn!(action = "parse", component = "cache", line, "Skipping cache row without domain");
                skipped += 1;
                continue;
            }
            let Ok(status_code) = row.status_code.trim().parse::<i32>() else {
                warn!(action = "parse", component = "cache", line, status_code = %row.status_code, "Skipping cache row with invalid status code");
                skipped += 1;
                continue;
            };

            store.put(DomainRecord::new(domain, status_code, row.error_header, row.body));
        }

        info!(
            action = "loaded",
            component = "cache",
            file_path = ?path,
            record_count = store.len(),
            skipped,
            duration_ms = start_time.elapsed().as_millis(),
            "Loaded cache"
        );
        Ok(store)
    }

    pub fn get(&self, domain: &str) -> Option<&DomainRecord> {
        self.records.get(domain)
    }

    /// Inserts or replaces the record for its domain.
    pub fn put(&mut self, record: DomainRecord) {
        if !self.records.contains_key(&record.domain) {
            self.order.push(record.domain.clone());
        }
        self.records.insert(record.domain.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.order.iter().filter_map(|domain| self.records.get(domain))
    }

    /// Rewrites `path` with the records of `domains`, in that order.
    ///
    /// Each domain is written once; domains without a record are left out.
    pub fn save(&self, path: &Path, domains: &[String]) -> Result<usize> {
        let mut seen = HashSet::new();
        let rows: Vec<&DomainRecord> = domains
            .iter()
            .filter(|domain| seen.insert(*domain))
            .filter_map(|domain| self.get(domain))
            .collect();

        write_csv_atomically(path, |writer| {
            writer.write_record(HEADER)?;
            for record in &rows {
                writer.write_record([
                    record.domain.as_str(),
                    record.status_code.to_string().as_str(),
                    record.error_header.as_str(),
                    record.body.as_str(),
                ])?;
            }
            Ok(())
        })?;

        info!(action = "save", component = "cache", file_path = ?path, record_count = rows.len(), "Cache written");
        Ok(rows.len())
    }
}
