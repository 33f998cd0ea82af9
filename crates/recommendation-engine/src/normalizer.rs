//! Reference normalization.
//!
//! Turns whatever the user pasted (a link, a share blurb with a trailing
//! link, a bare domain, or plain product text) into a [`ProductReference`].
//! Never fails: degenerate input comes back as a degenerate reference.

use common::{ProductReference, SourcePlatform};

/// Search URL used when the input carries no link at all.
const SYNTHESIZED_SEARCH_URL: &str = "https://www.amazon.in/s?k=";

const SHARE_PREFIXES: &[&str] = &[
    "Limited-time deal:",
    "Deal of the Day:",
    "Amazon Deal:",
    "Flipkart Deal:",
    "Deal:",
];

/// Share text shorter than this is not a usable product title.
const MIN_SHARE_TITLE_LEN: usize = 20;

/// Slugs shorter than this are usually ids, not names.
const MIN_SLUG_TITLE_LEN: usize = 10;

/// Normalize raw user input into a canonical reference.
pub fn normalize(input: &str) -> ProductReference {
    let raw_text = input.trim().to_string();

    if let Some(url) = find_absolute_url(&raw_text) {
        return ProductReference {
            source_platform: SourcePlatform::from_url(&url),
            canonical_url: url,
            raw_text,
            is_synthesized: false,
        };
    }

    if let Some(fragment) = find_bare_domain(&raw_text) {
        let url = canonicalize(&format!("https://{fragment}"));
        return ProductReference {
            source_platform: SourcePlatform::from_url(&url),
            canonical_url: url,
            raw_text,
            is_synthesized: false,
        };
    }

    if raw_text.is_empty() {
        return ProductReference {
            canonical_url: raw_text.clone(),
            raw_text,
            source_platform: SourcePlatform::Unknown,
            is_synthesized: true,
        };
    }

    ProductReference {
        canonical_url: format!("{SYNTHESIZED_SEARCH_URL}{}", search_query(&raw_text)),
        raw_text,
        source_platform: SourcePlatform::Amazon,
        is_synthesized: true,
    }
}

/// Words joined with `+`, each percent-encoded.
pub fn search_query(text: &str) -> String {
    text.split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

fn trim_token(token: &str) -> &str {
    token
        .trim_start_matches(['(', '<', '[', '"', '\''])
        .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '>', ']', '"', '\''])
}

fn has_scheme(token: &str) -> bool {
    let lowered = token.to_ascii_lowercase();
    lowered.starts_with("https://") || lowered.starts_with("http://")
}

/// First absolute URL, preferring known marketplaces over anything else.
fn find_absolute_url(text: &str) -> Option<String> {
    let urls: Vec<&str> = text
        .split_whitespace()
        .map(trim_token)
        .filter(|token| has_scheme(token) && token.len() > "https://".len())
        .collect();

    urls.iter()
        .find(|url| SourcePlatform::from_url(url) != SourcePlatform::Unknown)
        .or_else(|| urls.first())
        .map(|url| canonicalize(url))
}

/// A token that looks like `host.tld[/path]` without a scheme. Dotted words
/// such as brand names only count when they carry a path, a `www.` prefix,
/// or a known marketplace host.
fn find_bare_domain(text: &str) -> Option<&str> {
    let candidates: Vec<&str> = text
        .split_whitespace()
        .map(trim_token)
        .filter(|token| looks_like_domain(token))
        .collect();

    candidates
        .iter()
        .find(|token| SourcePlatform::from_url(token) != SourcePlatform::Unknown)
        .or_else(|| candidates.first())
        .copied()
}

fn looks_like_domain(token: &str) -> bool {
    let host = token.split(['/', '?', '#']).next().unwrap_or_default();
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return false;
    }
    let valid_chars = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    let tld = labels[labels.len() - 1];
    let shaped =
        valid_chars && (2..=6).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic());
    shaped
        && (token.contains('/')
            || host.to_ascii_lowercase().starts_with("www.")
            || SourcePlatform::from_url(host) != SourcePlatform::Unknown)
}

/// Lowercase scheme and host, drop any fragment.
fn canonicalize(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    match without_fragment.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.find(['/', '?']) {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                host.to_ascii_lowercase(),
                path
            )
        }
        None => without_fragment.to_string(),
    }
}

/// Product title carried by a share blurb, with the link and promotional
/// prefix removed. `None` when what remains is too short to be a title.
pub fn clean_share_text(share_text: &str, url: &str) -> Option<String> {
    let mut cleaned = share_text.to_string();
    for token in share_text.split_whitespace() {
        let trimmed = trim_token(token);
        if has_scheme(trimmed) || (!url.is_empty() && trimmed == url) {
            cleaned = cleaned.replace(trimmed, "");
        }
    }
    let mut cleaned = cleaned.trim();

    for prefix in SHARE_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim();
            break;
        }
    }

    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (cleaned.chars().count() >= MIN_SHARE_TITLE_LEN).then_some(cleaned)
}

/// Product name embedded in a marketplace URL path: the segment before
/// `/dp/` on Amazon, or after `/p/` on Flipkart.
pub fn slug_title(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let parts: Vec<&str> = path.split('/').skip(1).collect();

    let slug = parts.iter().enumerate().find_map(|(i, part)| match *part {
        "dp" if i > 0 => Some(parts[i - 1]),
        "p" if i + 1 < parts.len() => Some(parts[i + 1]),
        _ => None,
    })?;

    (slug.len() > MIN_SLUG_TITLE_LEN).then(|| slug.replace('-', " ").trim().to_string())
}

/// Best product-name guess for prompting: share text, then the literal
/// text of a synthesized reference, then the URL slug.
pub fn title_hint(reference: &ProductReference, share_text: Option<&str>) -> Option<String> {
    if let Some(title) = share_text.and_then(|t| clean_share_text(t, &reference.canonical_url)) {
        return Some(title);
    }
    if reference.is_synthesized && !reference.raw_text.is_empty() {
        return Some(reference.raw_text.clone());
    }
    if let Some(title) = clean_share_text(&reference.raw_text, &reference.canonical_url) {
        return Some(title);
    }
    slug_title(&reference.canonical_url)
}
