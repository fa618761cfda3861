pub mod args;
pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod stats;
pub mod success;
pub mod utils;
pub mod workbook;

pub use args::Args;
pub use batch::{print_batch_report, run_batch, run_batch_with};
pub use cache::CacheStore;
pub use client::{IcpClient, Lookup};
pub use config::Config;
pub use error::IcpError;
pub use record::{DomainRecord, SuccessRecord};
pub use stats::{BatchReport, ReconcileStats};
