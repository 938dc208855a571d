//! Static header reference tables
//!
//! These are process-wide constants; classification only ever reads them.

/// Replacement marker for deprecated headers with no successor
pub const NO_REPLACEMENT: &str = "N/A";

/// Recommended security headers and their expected values, sorted by name
pub const RECOMMENDED_HEADERS: &[(&str, &str)] = &[
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Clear-Site-Data", r#""cache","cookies","storage""#),
    (
        "Content-Security-Policy",
        "default-src 'self'; form-action 'self'; base-uri 'self'; object-src 'none'; frame-ancestors 'none'; upgrade-insecure-requests",
    ),
    ("Cross-Origin-Embedder-Policy", "require-corp"),
    ("Cross-Origin-Opener-Policy", "same-origin"),
    ("Cross-Origin-Resource-Policy", "same-origin"),
    (
        "Permissions-Policy",
        "accelerometer=(), autoplay=(), camera=(), cross-origin-isolated=(), display-capture=(), encrypted-media=(), fullscreen=(), geolocation=(), gyroscope=(), keyboard-map=(), magnetometer=(), microphone=(), midi=(), payment=(), picture-in-picture=(), publickey-credentials-get=(), screen-wake-lock=(), sync-xhr=(self), usb=(), web-share=(), xr-spatial-tracking=(), clipboard-read=(), clipboard-write=(), gamepad=(), hid=(), idle-detection=(), interest-cohort=(), serial=(), unload=()",
    ),
    ("Referrer-Policy", "no-referrer"),
    ("Strict-Transport-Security", "max-age=31536000; includeSubDomains"),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Permitted-Cross-Domain-Policies", "none"),
];

/// Headers that reveal server software, frameworks, or internal topology
pub const LEAK_HEADERS: &[&str] = &[
    "$wsep",
    "Host-Header",
    "Server",
    "X-Powered-By",
    "X-Server-Powered-By",
    "X-Powered-CMS",
    "X-Generator",
    "X-Generated-By",
    "X-CMS",
    "X-Powered-By-Plesk",
    "X-Php-Version",
    "Powered-By",
    "X-Content-Encoded-By",
    "Product",
    "X-CF-Powered-By",
    "X-Framework",
    "Pega-Host",
    "X-AspNet-Version",
    "X-AspNetMvc-Version",
    "X-SourceFiles",
    "X-Redirect-By",
    "X-OWA-Version",
    "X-Umbraco-Version",
    "OracleCommerceCloud-Version",
    "X-BEServer",
    "X-DiagInfo",
    "X-FEServer",
    "X-CalculatedBETarget",
    "X-Cocoon-Version",
    "X-Jitsi-Release",
    "X-Joomla-Version",
    "X-Litespeed-Cache-Control",
    "X-LiteSpeed-Purge",
    "X-LiteSpeed-Tag",
    "X-LiteSpeed-Vary",
    "X-LiteSpeed-Cache",
    "X-Nextjs-Matched-Path",
    "X-Nextjs-Page",
    "X-Nextjs-Cache",
    "X-Nextjs-Redirect",
    "X-OneAgent-JS-Injection",
    "X-ruxit-JS-Agent",
    "X-dtHealthCheck",
    "X-dtAgentId",
    "X-dtInjectedServlet",
    "X-Kubernetes-PF-FlowSchema-UI",
    "X-Kubernetes-PF-PriorityLevel-UID",
    "X-B3-ParentSpanId",
    "X-B3-Sampled",
    "X-B3-SpanId",
    "X-B3-TraceId",
    "K-Proxy-Request",
    "X-Backside-Transport",
    "X-Varnish-Backend",
    "X-Varnish-Server",
    "X-Envoy-Upstream-Service-Time",
    "X-Envoy-Attempt-Count",
    "X-Envoy-External-Address",
    "X-Envoy-Internal",
    "X-Envoy-Original-Dst-Host",
    "X-Mod-Pagespeed",
    "X-Page-Speed",
    "Liferay-Portal",
    "SourceMap",
    "X-SourceMap",
    "X-Atmosphere-first-request",
    "X-Atmosphere-tracking-id",
    "X-Atmosphere-error",
];

/// Deprecated headers and the header that supersedes them, sorted by name
pub const DEPRECATED_HEADERS: &[(&str, &str)] = &[
    ("Expect-CT", NO_REPLACEMENT),
    ("Feature-Policy", "Permissions-Policy"),
    ("Pragma", "Cache-Control"),
    ("Public-Key-Pins", NO_REPLACEMENT),
    ("X-XSS-Protection", "Content-Security-Policy"),
];

/// Looks up the successor of a deprecated header
pub fn replacement_for(header: &str) -> Option<&'static str> {
    DEPRECATED_HEADERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(header))
        .and_then(|(_, replacement)| (*replacement != NO_REPLACEMENT).then_some(*replacement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderName;
    use std::collections::HashSet;

    #[test]
    fn test_tables_sorted_by_name() {
        assert!(RECOMMENDED_HEADERS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(DEPRECATED_HEADERS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_all_names_are_valid_header_names() {
        let names = RECOMMENDED_HEADERS
            .iter()
            .map(|(n, _)| *n)
            .chain(LEAK_HEADERS.iter().copied())
            .chain(DEPRECATED_HEADERS.iter().map(|(n, _)| *n));
        for name in names {
            assert!(
                HeaderName::from_bytes(name.as_bytes()).is_ok(),
                "invalid header name {name}"
            );
        }
    }

    #[test]
    fn test_leak_headers_unique() {
        let unique: HashSet<String> = LEAK_HEADERS.iter().map(|h| h.to_lowercase()).collect();
        assert_eq!(unique.len(), LEAK_HEADERS.len());
    }

    #[test]
    fn test_replacement_lookup() {
        assert_eq!(replacement_for("Pragma"), Some("Cache-Control"));
        assert_eq!(replacement_for("x-xss-protection"), Some("Content-Security-Policy"));
        assert_eq!(replacement_for("Expect-CT"), None);
        assert_eq!(replacement_for("Server"), None);
    }
}
