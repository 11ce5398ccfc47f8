//! Content discovery: an ordered fallback chain of path sources.
//!
//! The chain commits to the first source that yields at least one path and
//! never merges results across sources. A source that fails (network, status
//! or parse) counts as empty, so [`Discovery::discover`] cannot fail.

use crate::config::NavConfig;
use crate::content::paths::{dir_path, is_html, is_index_page, is_under, normalize_path, resolve_path, unique};
use scraper::{Html, Selector};

use crate::dom::DomNode;
use crate::net::fetch::{FetchError, Fetcher};

/// Why a single source produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Fetch(FetchError),
    Parse(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Fetch(e) => write!(f, "network: {}", e),
            SourceError::Parse(msg) => write!(f, "parse: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<FetchError> for SourceError {
    fn from(e: FetchError) -> Self {
        SourceError::Fetch(e)
    }
}

/// One strategy in the chain. `base_dir` is always in directory form
/// (`/writeups/posts/`); returned paths need not be normalized or unique.
pub trait DiscoverySource: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>, SourceError>;
}

/// `<base_dir>/index.json`: a JSON array of paths.
pub struct ManifestSource {
    manifest_name: String,
}

impl ManifestSource {
    pub fn new(manifest_name: impl Into<String>) -> Self {
        Self {
            manifest_name: manifest_name.into(),
        }
    }
}

impl DiscoverySource for ManifestSource {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn attempt(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>, SourceError> {
        let body = fetcher.fetch_text(&format!("{}{}", base_dir, self.manifest_name))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        let entries = value
            .as_array()
            .ok_or_else(|| SourceError::Parse("manifest is not a JSON array".into()))?;

        Ok(entries
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(normalize_path)
            .filter(|p| is_under(p, base_dir) && is_html(p))
            .collect())
    }
}

/// Site-wide sitemap: `<loc>` entries under `base_dir`.
pub struct SitemapSource {
    sitemap_path: String,
}

impl SitemapSource {
    pub fn new(sitemap_path: impl Into<String>) -> Self {
        Self {
            sitemap_path: sitemap_path.into(),
        }
    }
}

impl DiscoverySource for SitemapSource {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn attempt(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>, SourceError> {
        let body = fetcher.fetch_text(&self.sitemap_path)?;
        let doc = Html::parse_document(&body);
        let loc = Selector::parse("loc").map_err(|e| SourceError::Parse(format!("{:?}", e)))?;

        Ok(doc
            .select(&loc)
            .filter_map(|n| normalize_path(n.text().collect::<String>().trim()))
            .filter(|p| is_under(p, base_dir) && is_html(p))
            .collect())
    }
}

/// `<base_dir>/index.html`: page links below the directory.
pub struct IndexPageSource {
    index_page: String,
}

impl IndexPageSource {
    pub fn new(index_page: impl Into<String>) -> Self {
        Self {
            index_page: index_page.into(),
        }
    }
}

impl DiscoverySource for IndexPageSource {
    fn name(&self) -> &'static str {
        "index-page"
    }

    fn attempt(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Result<Vec<String>, SourceError> {
        let page = format!("{}{}", base_dir, self.index_page);
        let body = fetcher.fetch_text(&page)?;

        Ok(page_hrefs(&body)
            .iter()
            .filter_map(|href| resolve_path(href, &page))
            .filter(|p| is_under(p, base_dir) && is_html(p) && !is_index_page(p))
            .collect())
    }
}

/// Anchors already present in the host document, captured when the source
/// is built so the chain can run off the UI thread.
pub struct DomAnchorSource {
    hrefs: Vec<String>,
}

impl DomAnchorSource {
    pub fn new(hrefs: Vec<String>) -> Self {
        Self { hrefs }
    }

    pub fn from_document(root: &DomNode) -> Self {
        Self::new(anchor_hrefs(root))
    }
}

impl DiscoverySource for DomAnchorSource {
    fn name(&self) -> &'static str {
        "dom-anchors"
    }

    fn attempt(&self, base_dir: &str, _fetcher: &dyn Fetcher) -> Result<Vec<String>, SourceError> {
        Ok(self
            .hrefs
            .iter()
            .filter_map(|h| normalize_path(h))
            .filter(|p| is_under(p, base_dir))
            .collect())
    }
}

/// Raw `href` values of every anchor under `root`, in document order.
pub fn anchor_hrefs(root: &DomNode) -> Vec<String> {
    root.find_all(DomNode::is_link)
        .iter()
        .filter_map(|p| root.attribute(p, "href"))
        .map(str::to_string)
        .collect()
}

/// Raw `href` values of every anchor in an HTML document, in document order.
pub fn page_hrefs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    doc.select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Outcome of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Discovered {
    /// Name of the committed source, if any source yielded paths.
    pub source: Option<&'static str>,
    pub paths: Vec<String>,
}

/// The ordered fallback chain.
pub struct Discovery {
    sources: Vec<Box<dyn DiscoverySource>>,
}

impl Discovery {
    pub fn new(sources: Vec<Box<dyn DiscoverySource>>) -> Self {
        Self { sources }
    }

    /// Manifest → sitemap → index page → host-document anchors.
    pub fn standard(config: &NavConfig, page_hrefs: Vec<String>) -> Self {
        Self::new(vec![
            Box::new(ManifestSource::new(config.manifest_name.clone())),
            Box::new(SitemapSource::new(config.sitemap_path.clone())),
            Box::new(IndexPageSource::new(config.index_page.clone())),
            Box::new(DomAnchorSource::new(page_hrefs)),
        ])
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Paths from the first non-empty source: normalized, deduplicated,
    /// in source order. Empty when every source is empty or failing.
    pub fn discover(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Vec<String> {
        self.discover_traced(base_dir, fetcher).paths
    }

    /// [`Discovery::discover`], also reporting which source was used.
    pub fn discover_traced(&self, base_dir: &str, fetcher: &dyn Fetcher) -> Discovered {
        let dir = dir_path(base_dir);
        for source in &self.sources {
            match source.attempt(&dir, fetcher) {
                Ok(paths) => {
                    let paths = unique(paths);
                    if paths.is_empty() {
                        log::debug!("discovery {}: {} empty", dir, source.name());
                        continue;
                    }
                    log::info!("discovery {}: {} paths from {}", dir, paths.len(), source.name());
                    return Discovered {
                        source: Some(source.name()),
                        paths,
                    };
                }
                Err(e) => {
                    log::debug!("discovery {}: {} unavailable ({})", dir, source.name(), e);
                }
            }
        }
        log::debug!("discovery {}: no source produced paths", dir);
        Discovered::default()
    }
}
