//! Non-HTTP fetchers: an in-memory site and a site rooted in a local directory.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use url::Url;

use super::fetch::{FetchError, Fetcher};

/// In-memory site: path → (status, body).
///
/// Unknown paths answer 404. Every call is counted so callers can check
/// which sources were consulted.
#[derive(Debug, Default)]
pub struct StaticSite {
    pages: HashMap<String, (u16, String)>,
    fetches: AtomicUsize,
    log: std::sync::Mutex<Vec<String>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `path`.
    pub fn page(mut self, path: &str, body: impl Into<String>) -> Self {
        self.pages.insert(path.to_string(), (200, body.into()));
        self
    }

    /// Answer `path` with `status` and an empty body.
    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.pages.insert(path.to_string(), (status, String::new()));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Paths requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Fetcher for StaticSite {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut log) = self.log.lock() {
            log.push(path.to_string());
        }
        match self.pages.get(path) {
            Some((status, body)) if (200..300).contains(status) => Ok(body.clone()),
            Some((status, _)) => Err(FetchError::status(path, *status)),
            None => Err(FetchError::status(path, 404)),
        }
    }
}

/// Site served from a local build directory (`/a/b.html` → `<root>/a/b.html`).
///
/// Paths are percent-decoded before touching the filesystem, so
/// `/my%20post.html` reads `my post.html`. Directory paths resolve to their
/// `index.html`. Paths escaping the root answer 404.
#[derive(Debug, Clone)]
pub struct LocalSite {
    root: PathBuf,
}

impl LocalSite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let clean = path.split(['?', '#']).next().unwrap_or("");
        let decoded = Url::parse("file:///").ok()?.join(clean).ok()?.to_file_path().ok()?;
        let mut out = self.root.clone();
        for component in Path::new(&decoded).components() {
            match component {
                Component::Normal(name) => out.push(name),
                Component::RootDir | Component::CurDir => {}
                _ => return None,
            }
        }
        if clean.ends_with('/') || out.is_dir() {
            out.push("index.html");
        }
        Some(out)
    }
}

impl Fetcher for LocalSite {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let Some(file) = self.resolve(path) else {
            return Err(FetchError::status(path, 404));
        };
        match std::fs::read(&file) {
            Ok(bytes) => String::from_utf8(bytes)
                .map_err(|e| FetchError::body(format!("{}: {}", file.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::status(path, 404))
            }
            Err(e) => Err(FetchError::network(format!("{}: {}", file.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::fetch::FetchErrorKind;

    #[test]
    fn static_site_statuses() {
        let site = StaticSite::new().page("/a.html", "A").status("/b.html", 500);
        assert_eq!(site.fetch_text("/a.html").unwrap(), "A");
        assert_eq!(site.fetch_text("/b.html").unwrap_err().kind, FetchErrorKind::Status(500));
        assert_eq!(site.fetch_text("/c.html").unwrap_err().kind, FetchErrorKind::Status(404));
        assert_eq!(site.fetch_count(), 3);
        assert_eq!(site.requested(), vec!["/a.html", "/b.html", "/c.html"]);
    }

    #[test]
    fn local_site_reads_files_and_directory_indexes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("blog/index.html"), "<h1>Blog</h1>").unwrap();
        std::fs::write(dir.path().join("about.html"), "about").unwrap();

        let site = LocalSite::new(dir.path());
        assert_eq!(site.fetch_text("/about.html").unwrap(), "about");
        assert_eq!(site.fetch_text("/blog/").unwrap(), "<h1>Blog</h1>");
        assert_eq!(site.fetch_text("/blog").unwrap(), "<h1>Blog</h1>");
        assert_eq!(
            site.fetch_text("/missing.html").unwrap_err().kind,
            FetchErrorKind::Status(404)
        );
        assert_eq!(
            site.fetch_text("/../etc/passwd").unwrap_err().kind,
            FetchErrorKind::Status(404)
        );
    }

    #[test]
    fn local_site_decodes_escaped_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("w/posts")).unwrap();
        std::fs::write(dir.path().join("w/posts/my post.html"), "spaced").unwrap();

        let site = LocalSite::new(dir.path());
        assert_eq!(site.fetch_text("/w/posts/my%20post.html").unwrap(), "spaced");
        assert_eq!(site.fetch_text("/w/posts/my post.html").unwrap(), "spaced");
        assert_eq!(
            site.fetch_text("/w/%2e%2e/%2e%2e/%2e%2e/etc/passwd").unwrap_err().kind,
            FetchErrorKind::Status(404)
        );
    }
}
