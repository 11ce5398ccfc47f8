//! Metadata hydration: fetch a content page and pull out a best-effort
//! [`ContentItem`]. Any failure degrades to a filename-only record.

use rayon::prelude::*;
use scraper::{ElementRef, Html, Selector};

use crate::content::paths::{dir_path, file_name, file_stem, normalize_path};
use crate::content::ContentItem;
use crate::net::fetch::Fetcher;

const HEADING_SELECTORS: &[&str] = &["main h1", "article h1", "h1"];
const TAGGED_CONTENT: &str = "article[data-tags], main[data-tags]";

/// Hydrates paths below one content directory.
pub struct Hydrator<'a> {
    fetcher: &'a dyn Fetcher,
    base_dir: String,
    default_category: String,
}

impl<'a> Hydrator<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, base_dir: &str, default_category: &str) -> Self {
        Self {
            fetcher,
            base_dir: dir_path(base_dir),
            default_category: default_category.to_string(),
        }
    }

    /// Fetch and extract one record. Never fails.
    pub fn hydrate(&self, path: &str) -> ContentItem {
        let path = normalize_path(path).unwrap_or_else(|| path.to_string());
        match self.fetcher.fetch_text(&path) {
            Ok(body) => {
                let doc = Html::parse_document(&body);
                extract(&doc, &path, &self.base_dir, &self.default_category)
            }
            Err(e) => {
                log::debug!("hydrate {}: {}", path, e);
                self.minimal(path)
            }
        }
    }

    /// Hydrate a whole batch with unordered parallel fetches. Returns only
    /// once every item has resolved; output order matches `paths`.
    pub fn hydrate_all(&self, paths: &[String]) -> Vec<ContentItem> {
        paths.par_iter().map(|p| self.hydrate(p)).collect()
    }

    fn minimal(&self, path: String) -> ContentItem {
        ContentItem {
            title: file_stem(&path),
            path,
            date: String::new(),
            tags: Vec::new(),
            category: self.default_category.clone(),
        }
    }
}

/// Extract a record from an already parsed document.
pub fn extract(doc: &Html, path: &str, base_dir: &str, default_category: &str) -> ContentItem {
    let title = heading_title(doc)
        .or_else(|| select_first(doc, "title").and_then(|t| strip_site_suffix(&text_of(t))))
        .unwrap_or_else(|| file_stem(path));

    let date = select_first(doc, "time[datetime]")
        .and_then(|t| t.value().attr("datetime"))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| filename_date(path))
        .unwrap_or_default();

    let tags = select_first(doc, r#"meta[name="tags"]"#)
        .and_then(|m| m.value().attr("content"))
        .filter(|c| !c.trim().is_empty())
        .or_else(|| select_first(doc, TAGGED_CONTENT).and_then(|n| n.value().attr("data-tags")))
        .map(split_tags)
        .unwrap_or_default();

    let category = tags
        .first()
        .cloned()
        .or_else(|| category_from_path(path, &dir_path(base_dir)))
        .unwrap_or_else(|| default_category.to_string());

    ContentItem {
        path: path.to_string(),
        title,
        date,
        tags,
        category,
    }
}

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector).next()
}

/// `textContent` of an element, whitespace collapsed.
fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn heading_title(doc: &Html) -> Option<String> {
    HEADING_SELECTORS
        .iter()
        .filter_map(|css| select_first(doc, css))
        .map(text_of)
        .find(|t| !t.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"Foo Bar | Site"` → `"Foo Bar"`. Cuts at the last separator; a hyphen
/// only separates when surrounded by whitespace.
pub fn strip_site_suffix(title: &str) -> Option<String> {
    let title = collapse_whitespace(title);
    let chars: Vec<(usize, char)> = title.char_indices().collect();
    let cut = chars
        .iter()
        .enumerate()
        .rev()
        .find(|(i, (_, c))| match *c {
            '|' | '–' | '—' => true,
            '-' => {
                let before = i.checked_sub(1).map(|j| chars[j].1.is_whitespace());
                let after = chars.get(i + 1).map(|(_, c)| c.is_whitespace());
                before == Some(true) && after != Some(false)
            }
            _ => false,
        })
        .map(|(_, (at, _))| *at);

    let stripped = match cut {
        Some(at) => title[..at].trim(),
        None => title.trim(),
    };
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// `YYYY-MM-DD` at the start of the file name, followed by `-` or `.`.
pub fn filename_date(path: &str) -> Option<String> {
    let name = file_name(path);
    let bytes = name.as_bytes();
    if bytes.len() < 11 || !matches!(bytes[10], b'-' | b'.') {
        return None;
    }
    let shape_ok = bytes[..10]
        .iter()
        .enumerate()
        .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if shape_ok {
        Some(name[..10].to_string())
    } else {
        None
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// First directory below `base_dir` (`/w/posts/rust/x.html` → `rust`).
fn category_from_path(path: &str, base_dir: &str) -> Option<String> {
    let rest = path.strip_prefix(base_dir)?;
    let (segment, _) = rest.split_once('/')?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}
