use axum::http::{HeaderMap, Method};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    FailedMethod,
    FailedRead,
    FailedConfig,
    FailedSignature,
    FailedParse,
    FailedProcessing,
    Success,
}

impl ProcessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::FailedMethod => "failed_method",
            ProcessStatus::FailedRead => "failed_read",
            ProcessStatus::FailedConfig => "failed_config",
            ProcessStatus::FailedSignature => "failed_signature",
            ProcessStatus::FailedParse => "failed_parse",
            ProcessStatus::FailedProcessing => "failed_processing",
            ProcessStatus::Success => "success",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failed_method" => Ok(ProcessStatus::FailedMethod),
            "failed_read" => Ok(ProcessStatus::FailedRead),
            "failed_config" => Ok(ProcessStatus::FailedConfig),
            "failed_signature" => Ok(ProcessStatus::FailedSignature),
            "failed_parse" => Ok(ProcessStatus::FailedParse),
            "failed_processing" => Ok(ProcessStatus::FailedProcessing),
            "success" => Ok(ProcessStatus::Success),
            other => Err(anyhow::anyhow!("unknown webhook process status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAuditEntry {
    pub id: Uuid,
    pub method: String,
    pub remote_address: String,
    pub content_type: Option<String>,
    pub signature_header: Option<String>,
    pub all_headers: BTreeMap<String, String>,
    #[serde(serialize_with = "lossy_utf8")]
    pub raw_body: Vec<u8>,
    pub process_status: ProcessStatus,
    pub error_message: Option<String>,
    pub matched_payment: bool,
    pub integration_id: Option<String>,
    pub notification_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Request facts gathered while a webhook is processed. Consumed exactly once
/// into a [`WebhookAuditEntry`] when the outcome is known.
#[derive(Debug)]
pub struct AuditDraft {
    method: String,
    remote_address: String,
    content_type: Option<String>,
    signature_header: Option<String>,
    all_headers: BTreeMap<String, String>,
    pub raw_body: Vec<u8>,
    pub integration_id: Option<String>,
    pub notification_type: Option<String>,
}

impl AuditDraft {
    pub fn from_request(
        method: &Method,
        remote_address: &str,
        headers: &HeaderMap,
        signature_header_name: &str,
    ) -> Self {
        Self {
            method: method.as_str().to_string(),
            remote_address: remote_address.to_string(),
            content_type: header_value(headers, axum::http::header::CONTENT_TYPE.as_str()),
            signature_header: header_value(headers, signature_header_name),
            all_headers: capture_headers(headers),
            raw_body: Vec::new(),
            integration_id: None,
            notification_type: None,
        }
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature_header.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn succeed(self, now: DateTime<Utc>) -> WebhookAuditEntry {
        self.finish(ProcessStatus::Success, None, true, now)
    }

    pub fn fail(
        self,
        status: ProcessStatus,
        error_message: String,
        now: DateTime<Utc>,
    ) -> WebhookAuditEntry {
        self.finish(status, Some(error_message), false, now)
    }

    fn finish(
        self,
        process_status: ProcessStatus,
        error_message: Option<String>,
        matched_payment: bool,
        now: DateTime<Utc>,
    ) -> WebhookAuditEntry {
        WebhookAuditEntry {
            id: Uuid::new_v4(),
            method: self.method,
            remote_address: self.remote_address,
            content_type: self.content_type,
            signature_header: self.signature_header,
            all_headers: self.all_headers,
            raw_body: self.raw_body,
            process_status,
            error_message,
            matched_payment,
            integration_id: self.integration_id,
            notification_type: self.notification_type,
            created_at: now,
        }
    }
}

/// Flattens headers into name -> value; a repeated header keeps its last value.
pub fn capture_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, value) in headers.iter() {
        out.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    out
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(name)
        .iter()
        .last()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn repeated_headers_keep_last_value() {
        let mut headers = HeaderMap::new();
        headers.append("x-trace", HeaderValue::from_static("first"));
        headers.append("x-trace", HeaderValue::from_static("second"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let captured = capture_headers(&headers);
        assert_eq!(captured.get("x-trace").map(String::as_str), Some("second"));
        assert_eq!(captured.len(), 2);
    }

    #[test]
    fn failed_entry_carries_error_and_is_unmatched() {
        let mut headers = HeaderMap::new();
        headers.insert("x-bold-signature", HeaderValue::from_static("abc"));
        let draft =
            AuditDraft::from_request(&Method::GET, "10.0.0.1", &headers, "x-bold-signature");
        assert_eq!(draft.signature(), Some("abc"));

        let entry = draft.fail(
            ProcessStatus::FailedMethod,
            "method GET not allowed".to_string(),
            Utc::now(),
        );
        assert_eq!(entry.process_status, ProcessStatus::FailedMethod);
        assert_eq!(entry.method, "GET");
        assert!(!entry.matched_payment);
        assert!(entry.error_message.is_some());
    }

    #[test]
    fn blank_signature_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-bold-signature", HeaderValue::from_static("  "));
        let draft =
            AuditDraft::from_request(&Method::POST, "10.0.0.1", &headers, "x-bold-signature");
        assert_eq!(draft.signature(), None);
    }
}
