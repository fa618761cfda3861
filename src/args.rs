use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_WORKBOOK: &str = "domains.xlsx";
pub const DEFAULT_CACHE: &str = "icp_results.csv";
pub const DEFAULT_SUCCESS: &str = "icp_success.csv";
pub const DEFAULT_HOST: &str = "https://domainicp.market.alicloudapi.com";
pub const DEFAULT_PATH: &str = "/do";

#[derive(Parser, Debug)]
#[command(
    name = "icpbatch",
    about = "Batch ICP filing lookup with a cache-first strategy",
    version,
    long_about = None
)]
pub struct Args {
    /// Workbook to process
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    pub workbook: PathBuf,

    /// Cache file with every raw lookup response
    #[arg(long, default_value = DEFAULT_CACHE)]
    pub cache: PathBuf,

    /// Parsed success output
    #[arg(long, default_value = DEFAULT_SUCCESS)]
    pub success: PathBuf,

    /// API host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// API path
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// AppCode (falls back to appcode.txt)
    #[arg(long, env = "APP_CODE", hide_env_values = true)]
    pub appcode: Option<String>,

    /// Sleep between API calls (seconds)
    #[arg(long, default_value_t = 0.1)]
    pub sleep: f64,

    /// Request timeout (seconds)
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Header of the column holding the domains
    #[arg(long, default_value = crate::domain::DEFAULT_HEADER_LABEL)]
    pub header: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
