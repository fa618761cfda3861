use serde::Serialize;
use serde_json::Value;

/// HTTP status of an answered lookup that may carry a filing.
pub const STATUS_OK: i32 = 200;

/// Status recorded when the request never produced an HTTP response.
pub const STATUS_TRANSPORT_FAILURE: i32 = -1;

/// One lookup result for a domain, as stored in the cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub domain: String,
    pub status_code: i32,
    pub error_header: String,
    pub body: String,
    /// The endpoint answered with HTTP 200.
    pub transport_ok: bool,
    /// The body reports a resolved filing (`code == 1`).
    pub semantic_success: bool,
}

impl DomainRecord {
    pub fn new(
        domain: impl Into<String>,
        status_code: i32,
        error_header: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        Self {
            domain: domain.into(),
            status_code,
            error_header: error_header.into(),
            transport_ok: status_code == STATUS_OK,
            semantic_success: parse_filing(&body).is_some(),
            body,
        }
    }

    /// A failure that happened before any response arrived.
    pub fn transport_failure(domain: impl Into<String>, kind: &str, message: String) -> Self {
        Self::new(domain, STATUS_TRANSPORT_FAILURE, kind, message)
    }

    /// Trustworthy enough to reuse instead of asking the endpoint again.
    pub fn is_reusable(&self) -> bool {
        self.transport_ok && self.semantic_success
    }

    /// Filing details, present only for reusable records.
    pub fn filing(&self) -> Option<Filing> {
        if !self.is_reusable() {
            return None;
        }
        parse_filing(&self.body)
    }
}

/// The `data` object of a successful lookup body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filing {
    pub icp_name: String,
    pub icp_num: String,
    pub sitename: String,
    pub service: String,
    pub status: String,
}

/// Parses a response body, returning the filing when `code` is 1.
///
/// A success body without a `data` object yields an empty filing.
pub fn parse_filing(body: &str) -> Option<Filing> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    if object.get("code").and_then(Value::as_i64) != Some(1) {
        return None;
    }

    let data = object.get("data").cloned().unwrap_or(Value::Null);
    Some(Filing {
        icp_name: text_field(&data, "icp_name"),
        icp_num: text_field(&data, "icp_num"),
        sitename: text_field(&data, "sitename"),
        service: text_field(&data, "service"),
        status: text_field(&data, "status"),
    })
}

fn text_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// One row of the success file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessRecord {
    pub domain: String,
    pub registrant_name: String,
    pub filing_number: String,
    pub site_name: String,
    pub service: String,
    pub status: String,
}

impl SuccessRecord {
    pub fn from_record(record: &DomainRecord) -> Option<Self> {
        let filing = record.filing()?;
        Some(Self {
            domain: record.domain.clone(),
            registrant_name: filing.icp_name,
            filing_number: filing.icp_num,
            site_name: filing.sitename,
            service: filing.service,
            status: filing.status,
        })
    }
}
