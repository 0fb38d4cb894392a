// src/utils/text.rs

//! Text and identifier normalization.

use std::sync::LazyLock;

use regex::Regex;

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)(?:v\d+)+$").expect("version suffix pattern"));

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce a wrapped paper identifier to its canonical, version-free form.
///
/// Accepts abstract/PDF URLs, `oai:arXiv.org:` and `arXiv:` prefixed forms,
/// and bare identifiers. Applying it twice gives the same result as once.
///
/// # Examples
/// ```
/// use paper_digest::utils::text::normalize_id;
///
/// assert_eq!(normalize_id("http://arxiv.org/abs/2405.00001v2"), "2405.00001");
/// assert_eq!(normalize_id("oai:arXiv.org:hep-th/9901001"), "hep-th/9901001");
/// ```
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let core = strip_wrapper(trimmed).trim_end_matches(".pdf");
    strip_version(core).to_string()
}

fn strip_wrapper(s: &str) -> &str {
    for marker in ["/abs/", "/pdf/"] {
        if let Some(idx) = s.rfind(marker) {
            return &s[idx + marker.len()..];
        }
    }
    if let Some(rest) = strip_prefix_ignore_case(s, "oai:arxiv.org:") {
        return rest;
    }
    if let Some(rest) = strip_prefix_ignore_case(s, "arxiv:") {
        return rest;
    }
    if s.contains("://") {
        return s.rsplit('/').next().unwrap_or(s);
    }
    s
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn strip_version(s: &str) -> &str {
    VERSION_SUFFIX
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map_or(s, |m| m.as_str())
}
