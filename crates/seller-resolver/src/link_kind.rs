//! Direct-vs-search classification of marketplace links.
//!
//! Derived from the URL alone; whatever a service claims about a link is
//! ignored.

use common::LinkKind;

const SEARCH_PATHS: &[&str] = &["/s", "/search", "/sch"];
const SEARCH_PARAMS: &[&str] = &["k", "q", "keyword", "text", "searchterm"];
const DIRECT_MARKERS: &[&str] = &["/dp/", "/gp/product/", "/p/", "/product/", "/itm"];

/// Classify a link. Unrecognized shapes count as search pages.
pub fn classify(url: &str) -> LinkKind {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let (location, query) = without_scheme
        .split_once('?')
        .unwrap_or((without_scheme, ""));
    let path = location
        .find('/')
        .map(|idx| &location[idx..])
        .unwrap_or("/")
        .to_ascii_lowercase();

    let search_path = SEARCH_PATHS
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{p}/")));
    let search_param = query
        .split('&')
        .filter_map(|pair| pair.split('=').next())
        .any(|name| SEARCH_PARAMS.contains(&name.to_ascii_lowercase().as_str()));
    if search_path || search_param {
        return LinkKind::Search;
    }

    if DIRECT_MARKERS.iter().any(|m| path.contains(m)) {
        LinkKind::Direct
    } else {
        LinkKind::Search
    }
}
