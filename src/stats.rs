use std::path::PathBuf;

use crate::record::SuccessRecord;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileStats {
    pub rows: usize,
    pub unique_domains: usize,
    pub cache_hits: usize,
    pub api_calls: usize,
    pub failed_calls: usize,
    pub successes: usize,
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub stats: ReconcileStats,
    pub success: Vec<SuccessRecord>,
}

#[derive(Debug)]
pub struct BatchReport {
    pub stats: ReconcileStats,
    pub workbook: PathBuf,
    pub cache: PathBuf,
    pub success: PathBuf,
    pub elapsed_secs: f64,
}
