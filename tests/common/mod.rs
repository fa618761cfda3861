#![allow(dead_code)]

use std::path::Path;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const APP_CODE: &str = "test-appcode";
pub const API_PATH: &str = "/do";

/// Body the ICP endpoint returns for a resolved filing.
pub fn filing_body(domain: &str, name: &str, number: &str) -> serde_json::Value {
    serde_json::json!({
        "code": 1,
        "msg": "查询成功",
        "data": {
            "domain": domain,
            "icp_name": name,
            "icp_num": number,
            "sitename": format!("{name} 官网"),
            "service": "网站",
            "status": "正常"
        }
    })
}

/// Body the ICP endpoint returns when no filing exists.
pub fn no_filing_body() -> serde_json::Value {
    serde_json::json!({ "code": 0, "msg": "未查询到备案信息" })
}

/// Starts a mock ICP endpoint on `rt`. The blocking client must be used
/// from outside the runtime.
pub fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

/// Answers lookups for `domain` that carry the test AppCode.
pub fn mount_answer(rt: &Runtime, server: &MockServer, domain: &str, response: ResponseTemplate) {
    rt.block_on(
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(query_param("domain", domain))
            .and(header("Authorization", format!("APPCODE {APP_CODE}").as_str()))
            .respond_with(response)
            .mount(server),
    );
}

/// Number of lookups the mock endpoint has seen for `domain`.
pub fn requests_for(rt: &Runtime, server: &MockServer, domain: &str) -> usize {
    rt.block_on(server.received_requests())
        .unwrap_or_default()
        .iter()
        .filter(|req| {
            req.url
                .query_pairs()
                .any(|(key, value)| key == "domain" && value == domain)
        })
        .count()
}

/// Writes a single-sheet workbook with the given rows, header first.
pub fn write_workbook(path: &Path, rows: &[&[&str]]) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet
                .get_cell_mut((c as u32 + 1, r as u32 + 1))
                .set_value(value.to_string());
        }
    }
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}
