use std::path::Path;
use tracing::info;

use crate::cache::CacheStore;
use crate::error::{IcpError, Result};

pub const REGISTRANT_LABEL: &str = "备案主体";
pub const FILING_NUMBER_LABEL: &str = "备案号";

/// Zero-based indexes of the two output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColumns {
    pub registrant: usize,
    pub filing_number: usize,
}

fn workbook_err(path: &Path) -> impl FnOnce(umya_spreadsheet::XlsxError) -> IcpError + '_ {
    move |source| IcpError::Workbook {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads the active worksheet as a grid of display strings, header first.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(IcpError::WorkbookNotFound(path.to_path_buf()));
    }
    let book = umya_spreadsheet::reader::xlsx::read(path).map_err(workbook_err(path))?;
    let sheet = book.get_active_sheet();
    let (max_col, max_row) = sheet.get_highest_column_and_row();

    let rows: Vec<Vec<String>> = (1..=max_row)
        .map(|row| (1..=max_col).map(|col| sheet.get_value((col, row))).collect())
        .collect();

    info!(action = "read", component = "workbook", file_path = ?path, rows = rows.len(), columns = max_col, "Read workbook");
    Ok(rows)
}

/// Fills the two output columns of `rows` from the cache.
///
/// A label already present in the header (from an earlier run) keeps its
/// column; a missing label is appended after the widest row. Data row `i`
/// is matched to `domains[i]`; rows without a successful record get empty
/// cells.
pub fn writeback(
    rows: &mut [Vec<String>],
    domains: &[String],
    cache: &CacheStore,
    labels: (&str, &str),
) -> Option<OutputColumns> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let (header, data) = rows.split_first_mut()?;

    let mut next_free = width;
    let mut column_for = |label: &str| {
        header.iter().position(|h| h == label).unwrap_or_else(|| {
            next_free += 1;
            next_free - 1
        })
    };
    let columns = OutputColumns {
        registrant: column_for(labels.0),
        filing_number: column_for(labels.1),
    };

    set_cell(header, columns.registrant, labels.0);
    set_cell(header, columns.filing_number, labels.1);

    let mut filled = 0usize;
    for (i, row) in data.iter_mut().enumerate() {
        let filing = domains
            .get(i)
            .and_then(|domain| cache.get(domain))
            .and_then(|record| record.filing())
            .unwrap_or_default();
        if !filing.icp_name.is_empty() || !filing.icp_num.is_empty() {
            filled += 1;
        }
        set_cell(row, columns.registrant, &filing.icp_name);
        set_cell(row, columns.filing_number, &filing.icp_num);
    }

    info!(
        action = "writeback",
        component = "workbook",
        registrant_column = columns.registrant,
        filing_number_column = columns.filing_number,
        filled,
        "Filled output columns"
    );
    Some(columns)
}

fn set_cell(row: &mut Vec<String>, index: usize, value: &str) {
    if row.len() <= index {
        row.resize(index + 1, String::new());
    }
    row[index] = value.to_string();
}

/// Writes the output columns of `rows` into the workbook at `path`.
///
/// Only those two columns are touched, so every other cell keeps its value
/// and formatting.
pub fn save_columns(path: &Path, rows: &[Vec<String>], columns: OutputColumns) -> Result<()> {
    let mut book = umya_spreadsheet::reader::xlsx::read(path).map_err(workbook_err(path))?;
    let sheet = book.get_active_sheet_mut();

    for (i, row) in rows.iter().enumerate() {
        let row_number = i as u32 + 1;
        for column in [columns.registrant, columns.filing_number] {
            let value = row.get(column).cloned().unwrap_or_default();
            sheet
                .get_cell_mut((column as u32 + 1, row_number))
                .set_value(value);
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path).map_err(workbook_err(path))?;
    info!(action = "save", component = "workbook", file_path = ?path, rows = rows.len(), "Workbook updated");
    Ok(())
}
