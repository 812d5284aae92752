// src/recording/fingerprint.rs
//! Deterministic request fingerprinting
//!
//! A fingerprint is derived from the method, the URL with skip-listed query
//! parameters removed, and the body with skip-listed fields removed. Requests
//! that differ only in skipped fields (timestamps, nonces) share a mock.

use crate::interception::host::InterceptedRequest;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Length of the hash suffix used in mock file names
const HASH_LEN: usize = 8;

/// Upper bound on the readable folder name derived from host and path
const MAX_FOLDER_LEN: usize = 100;

/// Ephemeral description of an intercepted request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    pub post_body: Option<String>,
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            post_body: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_post_body(mut self, body: impl Into<String>) -> Self {
        self.post_body = Some(body.into());
        self
    }

    /// Capture the accessors of a host request
    pub fn from_request(request: &dyn InterceptedRequest) -> Self {
        Self {
            method: request.method(),
            url: request.url(),
            post_body: request.post_data(),
            headers: request.headers(),
        }
    }

    pub fn post_body_or_empty(&self) -> &str {
        self.post_body.as_deref().unwrap_or("")
    }
}

/// Stable identifier of a normalized request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    method: String,
    url: String,
    folder: String,
    digest: String,
}

impl Fingerprint {
    /// Uppercase request method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Normalized URL that went into the hash
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Readable folder derived from host and path
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Full hex SHA-256 digest
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Short hash used in the file name
    pub fn short_hash(&self) -> &str {
        &self.digest[..HASH_LEN]
    }

    /// `<method>-<hash8>`
    pub fn file_name(&self) -> String {
        format!("{}-{}", self.method.to_lowercase(), self.short_hash())
    }

    /// Path relative to the namespace directory
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.folder).join(self.file_name())
    }

    /// Key used by the pending-request tracker
    pub fn key(&self) -> String {
        format!("{}/{}", self.folder, self.file_name())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Compute the fingerprint of a request
///
/// Skip lists are tolerant: names absent from the request are ignored.
pub fn fingerprint(
    descriptor: &RequestDescriptor,
    skip_query_params: &[String],
    skip_post_params: &[String],
) -> Fingerprint {
    let method = descriptor.method.to_uppercase();
    let url = normalize_url(&descriptor.url, skip_query_params);
    let body = normalize_body(descriptor.post_body_or_empty(), skip_post_params);

    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(body.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    Fingerprint {
        folder: folder_name(&descriptor.url),
        method,
        url,
        digest,
    }
}

/// Drop the fragment and skip-listed query parameters
pub fn normalize_url(raw: &str, skip_query_params: &[String]) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    url.set_fragment(None);

    if !skip_query_params.is_empty() && url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !skip_query_params.iter().any(|skip| skip == key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    url.to_string()
}

/// Drop skip-listed fields from a JSON object or form-encoded body
pub fn normalize_body(body: &str, skip_post_params: &[String]) -> String {
    if skip_post_params.is_empty() || body.is_empty() {
        return body.to_string();
    }

    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let kept: BTreeMap<String, Value> = fields
            .into_iter()
            .filter(|(key, _)| !skip_post_params.contains(key))
            .collect();
        return serde_json::to_string(&kept).unwrap_or_else(|_| body.to_string());
    }

    if body.contains('=') {
        let kept = url::form_urlencoded::parse(body.as_bytes())
            .filter(|(key, _)| !skip_post_params.iter().any(|skip| skip == key));
        return url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish();
    }

    body.to_string()
}

/// Readable folder name: host without port, then path segments, joined by `-`
fn folder_name(raw: &str) -> String {
    let readable = match Url::parse(raw) {
        Ok(url) => {
            let mut parts: Vec<String> = Vec::new();
            if let Some(host) = url.host_str() {
                parts.push(host.to_string());
            }
            if let Some(segments) = url.path_segments() {
                parts.extend(segments.filter(|s| !s.is_empty()).map(str::to_string));
            }
            parts.join("-")
        }
        Err(_) => raw.to_string(),
    };

    let sanitized: String = readable
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FOLDER_LEN)
        .collect();

    let trimmed = sanitized.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
