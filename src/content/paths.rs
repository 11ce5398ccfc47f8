//! Site-path helpers shared by discovery, hydration and highlighting.
//!
//! Every candidate is reduced to an origin-relative absolute path (`/a/b.html`)
//! so that relative hrefs, absolute hrefs and full URLs compare equal.

use std::collections::HashSet;
use url::Url;

const PLACEHOLDER_ORIGIN: &str = "http://site.invalid/";

/// Resolve `href` against the site-rooted `base` and strip scheme, host,
/// query and fragment. Non-web schemes (`mailto:`, `javascript:`) yield `None`.
pub fn resolve_path(href: &str, base: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let origin = Url::parse(PLACEHOLDER_ORIGIN).ok()?;
    let base = origin.join(base).ok()?;
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.path().to_string()),
        _ => None,
    }
}

/// [`resolve_path`] against the site root.
pub fn normalize_path(href: &str) -> Option<String> {
    resolve_path(href, "/")
}

/// Directory form of a base: leading and trailing `/`.
pub fn dir_path(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// `path` lies strictly inside `dir` (a [`dir_path`]).
pub fn is_under(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir)
}

pub fn is_html(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".htm")
}

pub fn is_index_page(path: &str) -> bool {
    let name = file_name(path).to_ascii_lowercase();
    name == "index.html" || name == "index.htm"
}

/// Last path segment (`/a/b.html` → `b.html`); falls back to the last
/// non-empty segment for directory paths.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Last path segment without its extension (`/a/b.html` → `b`).
pub fn file_stem(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}

/// Drop empties and repeats, keeping first-seen order.
pub fn unique(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}
