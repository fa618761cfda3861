use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::error::Result;
use crate::record::DomainRecord;

/// Response header the gateway uses to explain rejected calls.
pub const ERROR_MESSAGE_HEADER: &str = "X-Ca-Error-Message";

/// A single-domain filing lookup. Failures come back as records, never as errors.
pub trait Lookup {
    fn fetch(&mut self, domain: &str) -> DomainRecord;
}

/// Blocking client for the ICP lookup endpoint.
pub struct IcpClient {
    client: Client,
    endpoint: String,
    app_code: String,
}

impl IcpClient {
    pub fn new(host: &str, path: &str, app_code: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", host.trim_end_matches('/'), path),
            app_code: app_code.to_string(),
        })
    }

    fn request(&self, domain: &str) -> std::result::Result<DomainRecord, (&'static str, String)> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| ("InvalidUrl", e.to_string()))?;
        url.query_pairs_mut().append_pair("domain", domain);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("APPCODE {}", self.app_code))
            .send()
            .map_err(|e| (error_kind(&e), e.to_string()))?;

        let status = response.status().as_u16();
        let error_header = response
            .headers()
            .get(ERROR_MESSAGE_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        let body = response
            .text()
            .map_err(|e| (error_kind(&e), e.to_string()))?;

        Ok(DomainRecord::new(domain, i32::from(status), error_header, body))
    }
}

impl Lookup for IcpClient {
    fn fetch(&mut self, domain: &str) -> DomainRecord {
        match self.request(domain) {
            Ok(record) => {
                info!(
                    action = "fetch",
                    component = "icp_client",
                    domain,
                    status_code = record.status_code,
                    success = record.is_reusable(),
                    "Lookup answered"
                );
                record
            }
            Err((kind, message)) => {
                warn!(action = "fetch", component = "icp_client", domain, error_kind = kind, error = %message, "Lookup failed");
                DomainRecord::transport_failure(domain, kind, message)
            }
        }
    }
}

fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectError"
    } else if e.is_body() || e.is_decode() {
        "BodyError"
    } else if e.is_request() {
        "RequestError"
    } else {
        "HttpError"
    }
}
