//! Core data models for the header scanner

use crate::error::{HeaderSecError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::Method;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Which header check categories are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    pub recommended: bool,
    pub leak: bool,
    pub deprecated: bool,
}

impl Checks {
    /// Builds the check set from the `--rec`/`--leak`/`--depr` flags.
    /// When none of them is set every category is enabled.
    pub fn from_flags(recommended: bool, leak: bool, deprecated: bool) -> Self {
        if !recommended && !leak && !deprecated {
            return Self::all();
        }
        Self {
            recommended,
            leak,
            deprecated,
        }
    }

    pub fn all() -> Self {
        Self {
            recommended: true,
            leak: true,
            deprecated: true,
        }
    }
}

impl Default for Checks {
    fn default() -> Self {
        Self::all()
    }
}

/// Where JSON output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonSink {
    Stdout,
    File(PathBuf),
}

impl JsonSink {
    /// `-` selects stdout, anything else is a file path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            JsonSink::Stdout
        } else {
            JsonSink::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for JsonSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonSink::Stdout => write!(f, "stdout"),
            JsonSink::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How scan results are emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Annotated tree output, one block per target, printed as each target completes
    Console {
        /// Print the expected value under MISSING/DIFF entries
        show_recommended: bool,
        color: bool,
    },
    /// All results collected and written once as a JSON array
    Json(JsonSink),
    /// One JSON document per target, index-suffixed file names
    JsonPerTarget(JsonSink),
}

impl OutputMode {
    pub fn writes_json_to_stdout(&self) -> bool {
        matches!(
            self,
            OutputMode::Json(JsonSink::Stdout) | OutputMode::JsonPerTarget(JsonSink::Stdout)
        )
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Console {
            show_recommended: true,
            color: true,
        }
    }
}

/// Per-probe request settings, shared read-only by every worker
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// HTTP method for the first attempt
    pub method: Method,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    /// Extra request headers, set after cookie and user agent
    pub extra_headers: HashMap<String, String>,
    /// Replaces the port of every target when set
    pub port_override: Option<u16>,
    pub checks: Checks,
    pub output: OutputMode,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            method: Method::HEAD,
            cookie: None,
            user_agent: None,
            extra_headers: HashMap::new(),
            port_override: None,
            checks: Checks::all(),
            output: OutputMode::default(),
        }
    }
}

impl ScanRequest {
    /// Parses a target and applies the port override, keeping the host name
    pub fn target_url(&self, target: &str) -> Result<Url> {
        let mut url = Url::parse(target).map_err(|e| HeaderSecError::InvalidUrl {
            target: target.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(port) = self.port_override {
            url.set_port(Some(port))
                .map_err(|_| HeaderSecError::InvalidUrl {
                    target: target.to_string(),
                    reason: format!("cannot set port {port} on this URL"),
                })?;
        }

        Ok(url)
    }

    /// Builds the header set sent with every probe.
    /// Later entries replace earlier ones with the same name.
    pub fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, header_value(cookie)?);
        }
        if let Some(ua) = &self.user_agent {
            headers.insert(USER_AGENT, header_value(ua)?);
        }
        for (key, value) in &self.extra_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| HeaderSecError::InvalidHeader(format!("{key}: {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| HeaderSecError::InvalidHeader(format!("{value:?}: {e}")))
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Skip TLS certificate verification
    pub insecure: bool,
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            insecure: false,
            proxy: None,
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Deduplicated targets in first-occurrence order
    pub targets: Vec<String>,
    pub request: ScanRequest,
    pub transport: TransportConfig,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    pub banner: bool,
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            request: ScanRequest::default(),
            transport: TransportConfig::default(),
            concurrency: 20,
            banner: true,
            verbose: false,
        }
    }
}

/// Status of a recommended header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecStatus {
    Ok,
    Missing,
    Different,
}

impl fmt::Display for RecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecStatus::Ok => write!(f, "OK"),
            RecStatus::Missing => write!(f, "MISSING"),
            RecStatus::Different => write!(f, "DIFF"),
        }
    }
}

/// Outcome of checking one recommended header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedFinding {
    pub header: &'static str,
    pub status: RecStatus,
    /// Present only when the status is `different`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    #[serde(rename = "recommended")]
    pub expected: &'static str,
}

/// A header that discloses implementation details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeakFinding {
    pub header: &'static str,
    pub value: String,
}

/// A deprecated header found in the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedFinding {
    pub header: &'static str,
    /// `None` when the header has no successor
    pub replacement: Option<&'static str>,
}

/// Classified headers of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommended: Vec<RecommendedFinding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leaks: Vec<LeakFinding>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_deprecated_names"
    )]
    pub deprecated: Vec<DeprecatedFinding>,
    /// Categories that were checked, so renderers can tell "none found" from "not checked"
    #[serde(skip)]
    pub checks: Checks,
}

impl ScanResult {
    pub fn new(url: impl Into<String>, checks: Checks) -> Self {
        Self {
            url: url.into(),
            recommended: Vec::new(),
            leaks: Vec::new(),
            deprecated: Vec::new(),
            checks,
        }
    }

    /// Count of recommended headers with the given status
    pub fn count_by_status(&self, status: RecStatus) -> usize {
        self.recommended
            .iter()
            .filter(|f| f.status == status)
            .count()
    }
}

fn serialize_deprecated_names<S>(
    findings: &[DeprecatedFinding],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(findings.iter().map(|f| f.header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_check_flags_enables_all() {
        assert_eq!(Checks::from_flags(false, false, false), Checks::all());
        let only_leak = Checks::from_flags(false, true, false);
        assert!(!only_leak.recommended);
        assert!(only_leak.leak);
        assert!(!only_leak.deprecated);
    }

    #[test]
    fn test_port_override_keeps_host() {
        let request = ScanRequest {
            port_override: Some(8443),
            ..ScanRequest::default()
        };
        let url = request
            .target_url("https://example.com:443/login?next=1")
            .expect("valid url");
        assert_eq!(url.as_str(), "https://example.com:8443/login?next=1");
    }

    #[test]
    fn test_invalid_target_url() {
        let request = ScanRequest::default();
        let err = request.target_url("not a url").expect_err("should fail");
        assert!(matches!(err, HeaderSecError::InvalidUrl { .. }));
    }

    #[test]
    fn test_extra_headers_override_user_agent() {
        let mut extra = HashMap::new();
        extra.insert("user-agent".to_string(), "Custom/2.0".to_string());
        extra.insert("X-Api-Key".to_string(), "abc".to_string());
        let request = ScanRequest {
            cookie: Some("session=1".to_string()),
            user_agent: Some("Scanner/1.0".to_string()),
            extra_headers: extra,
            ..ScanRequest::default()
        };

        let headers = request.request_headers().expect("valid headers");
        assert_eq!(headers.get(USER_AGENT).map(|v| v.as_bytes()), Some(&b"Custom/2.0"[..]));
        assert_eq!(headers.get(COOKIE).map(|v| v.as_bytes()), Some(&b"session=1"[..]));
        assert_eq!(headers.get("x-api-key").map(|v| v.as_bytes()), Some(&b"abc"[..]));
        assert_eq!(headers.get_all(USER_AGENT).iter().count(), 1);
    }

    #[test]
    fn test_invalid_extra_header_name() {
        let mut extra = HashMap::new();
        extra.insert("Bad Header".to_string(), "x".to_string());
        let request = ScanRequest {
            extra_headers: extra,
            ..ScanRequest::default()
        };
        assert!(matches!(
            request.request_headers(),
            Err(HeaderSecError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_json_sink_from_arg() {
        assert_eq!(JsonSink::from_arg("-"), JsonSink::Stdout);
        assert_eq!(
            JsonSink::from_arg("out/report.json"),
            JsonSink::File(PathBuf::from("out/report.json"))
        );
    }
}
