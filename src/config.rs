//! Configuration management: TOML file, CLI overrides, and target lists

use crate::error::{HeaderSecError, Result};
use crate::models::{Checks, JsonSink, OutputMode, ScanConfig};
use reqwest::Method;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// File-based configuration structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    scan: Option<ScanSection>,
    request: Option<RequestSection>,
    headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScanSection {
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
    follow_redirects: Option<bool>,
    max_redirects: Option<usize>,
    insecure: Option<bool>,
    proxy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestSection {
    method: Option<String>,
    cookie: Option<String>,
    user_agent: Option<String>,
    port: Option<u16>,
}

/// Values taken from the command line; `None` leaves the file or default value in place
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub url: Option<String>,
    pub url_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub proxy: Option<String>,
    pub insecure: bool,
    pub method: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    /// Raw `-H` values, each in `K: V;K2: V2` form
    pub headers: Vec<String>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub rec: bool,
    pub leak: bool,
    pub depr: bool,
    pub no_recommended: bool,
    pub json: Option<String>,
    pub json_split: bool,
    pub no_banner: bool,
    pub no_color: bool,
    pub verbose: bool,
}

/// Parses an HTTP method name, rejecting anything that is not a valid token
pub fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.trim().as_bytes())
        .map_err(|_| HeaderSecError::ConfigError(format!("Invalid HTTP method: {raw:?}")))
}

/// Loads configuration from a TOML file on top of the defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path).map_err(HeaderSecError::IoError)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;
    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(concurrency) = scan.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = scan.timeout_secs {
            config.transport.timeout_secs = timeout;
        }
        if let Some(follow) = scan.follow_redirects {
            config.transport.follow_redirects = follow;
        }
        if let Some(max) = scan.max_redirects {
            config.transport.max_redirects = max;
        }
        if let Some(insecure) = scan.insecure {
            config.transport.insecure = insecure;
        }
        config.transport.proxy = scan.proxy.filter(|p| !p.is_empty());
    }

    if let Some(request) = file_config.request {
        if let Some(method) = request.method {
            config.request.method = parse_method(&method)?;
        }
        config.request.cookie = request.cookie.filter(|c| !c.is_empty());
        config.request.user_agent = request.user_agent.filter(|ua| !ua.is_empty());
        config.request.port_override = request.port.filter(|&p| p > 0);
    }

    if let Some(headers) = file_config.headers {
        config.request.extra_headers.extend(
            headers
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty()),
        );
    }

    Ok(config)
}

/// Parses extra headers in `K: V;K2: V2` form. Malformed pairs are skipped and
/// a repeated key keeps its last value.
pub fn parse_extra_headers(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Removes repeated targets, keeping the first occurrence of each
pub fn dedupe_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Merges the single URL and the URL file (blank lines skipped), then dedupes
pub fn collect_targets(single: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    let mut targets = Vec::new();

    if let Some(url) = single.map(str::trim).filter(|u| !u.is_empty()) {
        targets.push(url.to_string());
    }

    if let Some(path) = file {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeaderSecError::ConfigError(format!("Reading URL file {}: {e}", path.display()))
        })?;
        targets.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if targets.is_empty() {
        return Err(HeaderSecError::ConfigError(
            "You must specify either --url or --url-file".to_string(),
        ));
    }

    Ok(dedupe_urls(targets))
}

/// Merges CLI arguments into an existing ScanConfig and resolves the target list
pub fn merge_cli_args(config: &mut ScanConfig, cli: CliOverrides) -> Result<()> {
    config.targets = collect_targets(cli.url.as_deref(), cli.url_file.as_deref())?;

    if let Some(port) = cli.port {
        config.request.port_override = (port > 0).then_some(port);
    }
    if let Some(proxy) = cli.proxy.filter(|p| !p.is_empty()) {
        config.transport.proxy = Some(proxy);
    }
    if cli.insecure {
        config.transport.insecure = true;
    }
    if let Some(method) = cli.method {
        config.request.method = parse_method(&method)?;
    }
    if let Some(cookie) = cli.cookie.filter(|c| !c.is_empty()) {
        config.request.cookie = Some(cookie);
    }
    if let Some(ua) = cli.user_agent.filter(|ua| !ua.is_empty()) {
        config.request.user_agent = Some(ua);
    }
    for raw in &cli.headers {
        config.request.extra_headers.extend(parse_extra_headers(raw));
    }
    if let Some(follow) = cli.follow_redirects {
        config.transport.follow_redirects = follow;
    }
    if let Some(max) = cli.max_redirects {
        config.transport.max_redirects = max;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.transport.timeout_secs = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    config.request.checks = Checks::from_flags(cli.rec, cli.leak, cli.depr);
    config.request.output = match cli.json.filter(|j| !j.is_empty()) {
        Some(arg) if cli.json_split => OutputMode::JsonPerTarget(JsonSink::from_arg(&arg)),
        Some(arg) => OutputMode::Json(JsonSink::from_arg(&arg)),
        None => OutputMode::Console {
            show_recommended: !cli.no_recommended,
            color: !cli.no_color,
        },
    };
    config.banner = !cli.no_banner && !config.request.output.writes_json_to_stdout();
    config.verbose = cli.verbose;

    // surface bad header names or values before any request goes out
    config.request.request_headers()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dedupe_preserves_first_occurrence() {
        let urls = ["a", "b", "a", "c", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_urls(urls), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_extra_headers() {
        let headers = parse_extra_headers("X-Api-Key: abc; Authorization: Bearer a:b ;broken;: novalue; X-Api-Key: def");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-Api-Key"], "def");
        assert_eq!(headers["Authorization"], "Bearer a:b");
        assert!(parse_extra_headers("").is_empty());
    }

    #[test]
    fn test_collect_targets_merges_url_and_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "https://b.example\n\n  https://a.example  \nhttps://c.example")
            .expect("write");

        let targets = collect_targets(Some("https://a.example"), Some(file.path()))
            .expect("targets");
        assert_eq!(
            targets,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn test_no_targets_is_config_error() {
        assert!(matches!(
            collect_targets(None, None),
            Err(HeaderSecError::ConfigError(_))
        ));
        assert!(matches!(
            collect_targets(None, Some(Path::new("/nonexistent/urls.txt"))),
            Err(HeaderSecError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parse_config_file() {
        let config = parse_config(
            r#"
            [scan]
            concurrency = 5
            timeout_secs = 3
            follow_redirects = false

            [request]
            method = "GET"
            user_agent = "Audit/1.0"
            port = 8443

            [headers]
            "X-Team" = "blue"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.concurrency, 5);
        assert_eq!(config.transport.timeout_secs, 3);
        assert!(!config.transport.follow_redirects);
        assert_eq!(config.transport.max_redirects, 10);
        assert_eq!(config.request.method, Method::GET);
        assert_eq!(config.request.user_agent.as_deref(), Some("Audit/1.0"));
        assert_eq!(config.request.port_override, Some(8443));
        assert_eq!(config.request.extra_headers["X-Team"], "blue");
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        assert!(parse_config("[scan]\nthreads = 4\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = parse_config("[scan]\nconcurrency = 5\n").expect("valid config");
        let cli = CliOverrides {
            url: Some("https://example.com".to_string()),
            concurrency: Some(2),
            method: Some("GET".to_string()),
            headers: vec!["X-One: 1".to_string(), "X-Two: 2;X-One: 3".to_string()],
            leak: true,
            json: Some("-".to_string()),
            ..CliOverrides::default()
        };
        merge_cli_args(&mut config, cli).expect("merge");

        assert_eq!(config.targets, vec!["https://example.com"]);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.request.method, Method::GET);
        assert_eq!(config.request.extra_headers["X-One"], "3");
        assert_eq!(config.request.checks, Checks::from_flags(false, true, false));
        assert_eq!(config.request.output, OutputMode::Json(JsonSink::Stdout));
        assert!(!config.banner);
    }

    #[test]
    fn test_invalid_method_rejected() {
        let mut config = ScanConfig::default();
        let cli = CliOverrides {
            url: Some("https://example.com".to_string()),
            method: Some("GE T".to_string()),
            ..CliOverrides::default()
        };
        assert!(matches!(
            merge_cli_args(&mut config, cli),
            Err(HeaderSecError::ConfigError(_))
        ));
    }
}
