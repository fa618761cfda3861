use std::env;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::args::{Args, DEFAULT_CACHE, DEFAULT_SUCCESS, DEFAULT_WORKBOOK};
use crate::error::{IcpError, Result};

pub const APPCODE_FILE: &str = "appcode.txt";

/// Everything a batch run needs, resolved once up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub workbook: PathBuf,
    pub cache: PathBuf,
    pub success: PathBuf,
    pub host: String,
    pub path: String,
    pub app_code: Option<String>,
    pub delay: Duration,
    pub timeout: Duration,
    pub header_label: String,
}

impl Config {
    /// Resolves file locations and the AppCode from parsed arguments.
    ///
    /// The default workbook is also searched for next to the executable, and
    /// default cache/success names are placed beside the workbook.
    pub fn from_args(args: &Args) -> Result<Self> {
        let workbook = resolve_workbook(&args.workbook)?;
        let cache = beside_workbook(&args.cache, DEFAULT_CACHE, &workbook);
        let success = beside_workbook(&args.success, DEFAULT_SUCCESS, &workbook);

        let app_code = resolve_app_code(args.appcode.as_deref(), &search_dirs()).or_else(|| {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                prompt_app_code(stdin.lock(), io::stderr())
            } else {
                None
            }
        });
        if app_code.is_none() {
            warn!(action = "resolve", component = "config", "No AppCode found; only cached domains can be resolved");
        }

        let config = Self {
            workbook,
            cache,
            success,
            host: args.host.clone(),
            path: args.path.clone(),
            app_code,
            delay: Duration::try_from_secs_f64(args.sleep)
                .map_err(|_| IcpError::InvalidDelay(args.sleep))?,
            timeout: Duration::from_secs(args.timeout),
            header_label: args.header.clone(),
        };
        info!(
            action = "resolve",
            component = "config",
            workbook = ?config.workbook,
            cache = ?config.cache,
            success = ?config.success,
            host = %config.host,
            "Configuration resolved"
        );
        Ok(config)
    }
}

fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    dirs.extend(exe_dir());
    dirs
}

fn resolve_workbook(requested: &Path) -> Result<PathBuf> {
    if requested.exists() {
        return Ok(requested.to_path_buf());
    }

    if requested == Path::new(DEFAULT_WORKBOOK) {
        if let Some(candidate) = exe_dir().map(|dir| dir.join(DEFAULT_WORKBOOK)) {
            if candidate.exists() {
                info!(action = "resolve", component = "config", workbook = ?candidate, "Using workbook next to executable");
                return Ok(candidate);
            }
        }
    }

    Err(IcpError::WorkbookNotFound(requested.to_path_buf()))
}

fn beside_workbook(requested: &Path, default_name: &str, workbook: &Path) -> PathBuf {
    if requested == Path::new(default_name) {
        if let Some(parent) = workbook.parent() {
            return parent.join(default_name);
        }
    }
    requested.to_path_buf()
}

/// Explicit value first, then the first non-empty `appcode.txt` in `dirs`.
pub fn resolve_app_code(explicit: Option<&str>, dirs: &[PathBuf]) -> Option<String> {
    if let Some(code) = explicit.map(str::trim).filter(|c| !c.is_empty()) {
        return Some(code.to_string());
    }

    dirs.iter().find_map(|dir| {
        let file = dir.join(APPCODE_FILE);
        let code = fs::read_to_string(&file).ok()?;
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        info!(action = "resolve", component = "config", file_path = ?file, "AppCode read from file");
        Some(code.to_string())
    })
}

/// Asks for the AppCode interactively. Blank input or a read error gives `None`.
pub fn prompt_app_code<R: BufRead, W: Write>(mut input: R, mut output: W) -> Option<String> {
    write!(output, "请输入AppCode: ").ok()?;
    output.flush().ok()?;

    let mut line = String::new();
    input.read_line(&mut line).ok()?;
    let code = line.trim();
    (!code.is_empty()).then(|| code.to_string())
}
