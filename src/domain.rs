use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

/// Default header of the domain-bearing column.
pub const DEFAULT_HEADER_LABEL: &str = "链接";

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[a-z0-9-]+\.)+[a-z]{2,}").expect("domain pattern is a valid regex")
});

/// Index of the column whose header equals `label`, falling back to the first column.
pub fn select_column(header: &[String], label: &str) -> usize {
    header.iter().position(|cell| cell == label).unwrap_or(0)
}

/// Pulls a lowercase domain out of free text such as a URL.
///
/// Text without anything domain-shaped is returned trimmed but otherwise
/// verbatim, so it can still be looked up (and fail predictably).
pub fn extract_domain(text: &str) -> String {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();

    DOMAIN_PATTERN
        .find(&lowered)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Extracts one domain per data row (every row after the header), in order.
///
/// Missing or blank cells produce an empty string so the output stays aligned
/// with the rows.
pub fn extract(rows: &[Vec<String>], header_label: &str) -> Vec<String> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let column = select_column(header, header_label);
    info!(
        action = "select",
        component = "domain_extraction",
        column,
        matched_label = header.get(column).is_some_and(|h| h == header_label),
        "Selected domain column"
    );

    let domains: Vec<String> = data
        .iter()
        .map(|row| row.get(column).map(|cell| extract_domain(cell)).unwrap_or_default())
        .collect();

    info!(
        action = "complete",
        component = "domain_extraction",
        row_count = domains.len(),
        "Domain extraction completed"
    );
    domains
}
