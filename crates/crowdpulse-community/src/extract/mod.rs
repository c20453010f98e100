//! Turns raw payloads into [`CanonicalPost`](crowdpulse_core::CanonicalPost)s.
//!
//! Extraction is total: a payload that matches nothing yields an empty
//! `Vec`, never an error. Individual malformed items are skipped.

pub(crate) mod eastmoney;
pub(crate) mod xueqiu;

use std::sync::LazyLock;

use regex::Regex;

/// Display titles derived from content are cut to this many characters.
pub(crate) const DERIVED_TITLE_CHARS: usize = 100;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static LEFTOVER_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[a-zA-Z][a-zA-Z0-9]*;").expect("valid entity regex"));
static PREFIXED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?(?:SH|SZ|BJ)(\d+)").expect("valid prefixed code regex"));
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit run regex"));

/// Strip markup, decode entities and collapse whitespace.
pub(crate) fn clean_text(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    let without_entities = LEFTOVER_ENTITY_RE.replace_all(&decoded, "");
    without_entities.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First [`DERIVED_TITLE_CHARS`] characters of `content`, with `...`
/// appended when anything was cut.
pub(crate) fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(DERIVED_TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Resolve `href` against `base` (scheme and host, no trailing slash).
pub(crate) fn absolutize_url(base: &str, href: &str) -> String {
    let href = href.trim();
    let base = base.trim_end_matches('/');
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Six-digit A-share codes mentioned in `text`, first-seen order, no duplicates.
///
/// Exchange-prefixed forms (`SH600519`, `$SZ000001`) are found first, then
/// bare six-digit runs. Longer digit runs are not codes, prefixed or not.
pub(crate) fn extract_stock_mentions(text: &str) -> Vec<String> {
    let prefixed = PREFIXED_CODE_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|digits| digits.len() == 6);
    let bare = DIGIT_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| run.len() == 6);

    let mut mentions: Vec<String> = Vec::new();
    for code in prefixed.chain(bare) {
        if !mentions.iter().any(|m| m == code) {
            mentions.push(code.to_string());
        }
    }
    mentions
}
