use anyhow::Result;
use clap::Parser;

use icpbatch::utils::{setup_logging, validate_args};
use icpbatch::{print_batch_report, run_batch, Args, Config};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    let config = Config::from_args(&args)?;
    let report = run_batch(&config)?;
    print_batch_report(&report);
    Ok(())
}
