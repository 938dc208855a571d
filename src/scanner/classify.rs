//! Header classification against the reference tables

use crate::models::{
    Checks, DeprecatedFinding, LeakFinding, RecStatus, RecommendedFinding, ScanResult,
};
use crate::scanner::tables::{
    replacement_for, DEPRECATED_HEADERS, LEAK_HEADERS, RECOMMENDED_HEADERS,
};
use reqwest::header::HeaderMap;

/// Returns the trimmed value of the first `name` header, treating blank values as absent
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(name)?;
    let value = String::from_utf8_lossy(raw.as_bytes());
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn check_recommended(headers: &HeaderMap) -> Vec<RecommendedFinding> {
    RECOMMENDED_HEADERS
        .iter()
        .map(|&(header, expected)| {
            let (status, observed) = match header_value(headers, header) {
                None => (RecStatus::Missing, None),
                Some(v) if v.eq_ignore_ascii_case(expected) => (RecStatus::Ok, None),
                Some(v) => (RecStatus::Different, Some(v)),
            };
            RecommendedFinding {
                header,
                status,
                observed,
                expected,
            }
        })
        .collect()
}

fn check_leaks(headers: &HeaderMap) -> Vec<LeakFinding> {
    LEAK_HEADERS
        .iter()
        .filter_map(|&header| {
            header_value(headers, header).map(|value| LeakFinding { header, value })
        })
        .collect()
}

fn check_deprecated(headers: &HeaderMap) -> Vec<DeprecatedFinding> {
    DEPRECATED_HEADERS
        .iter()
        .filter(|(header, _)| header_value(headers, header).is_some())
        .map(|&(header, _)| DeprecatedFinding {
            header,
            replacement: replacement_for(header),
        })
        .collect()
}

/// Classifies a response's headers. Disabled categories stay empty.
pub fn classify(url: &str, headers: &HeaderMap, checks: Checks) -> ScanResult {
    let mut result = ScanResult::new(url, checks);

    if checks.recommended {
        result.recommended = check_recommended(headers);
    }
    if checks.leak {
        result.leaks = check_leaks(headers);
    }
    if checks.deprecated {
        result.deprecated = check_deprecated(headers);
    }

    result
}
