use crate::core::http::client::RawResponse;
use crate::core::http::parsing::{parse_body, ResponseBody};
use serde::Serialize;
use std::collections::BTreeMap;

/// Uniform representation of any forwarded HTTP response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
    /// Wall-clock milliseconds from send until the body was fully read
    pub response_time: u64,
    /// True for 2xx statuses
    pub ok: bool,
}

impl NormalizedResponse {
    pub fn from_raw(raw: RawResponse, response_time: u64) -> Self {
        let body = parse_body(header_value(&raw.headers, "content-type"), &raw.body);
        Self {
            status: raw.status_code,
            ok: is_success_status(raw.status_code),
            status_text: raw.status_text,
            headers: raw.headers,
            body,
            response_time,
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn header_value<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
