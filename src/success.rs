use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::record::SuccessRecord;
use crate::utils::write_csv_atomically;

/// Rewrites the success file in full. The header is written even when
/// there are no successes.
pub fn write_success(path: &Path, records: &[SuccessRecord]) -> Result<()> {
    write_csv_atomically(path, |writer| {
        if records.is_empty() {
            writer.write_record([
                "domain",
                "registrant_name",
                "filing_number",
                "site_name",
                "service",
                "status",
            ])?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        Ok(())
    })?;

    info!(action = "save", component = "success", file_path = ?path, record_count = records.len(), "Success file written");
    Ok(())
}
