use std::sync::Arc;

use serde::Serialize;

use crate::config::NavConfig;
use crate::content::aggregate::{group_by_category, sort_items, CategoryGroup};
use crate::content::discovery::Discovery;
use crate::content::hydrate::Hydrator;
use crate::content::paths::dir_path;
use crate::content::ContentItem;
use crate::net::fetch::Fetcher;

/// Result of one Discover → Hydrate → Aggregate run.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub base_dir: String,
    /// Discovery source the run committed to; `None` when nothing was found.
    pub source: Option<&'static str>,
    /// Sorted newest first.
    pub items: Vec<ContentItem>,
    pub groups: Vec<CategoryGroup>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The content pipeline: Discover → Hydrate (parallel) → Sort → Group
pub struct ContentEngine {
    fetcher: Arc<dyn Fetcher>,
    config: NavConfig,
}

impl ContentEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: NavConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Candidate paths under `base_dir`. `page_hrefs` are the anchors of the
    /// host document, used only when every remote source comes up empty.
    pub fn discover(&self, base_dir: &str, page_hrefs: &[String]) -> Vec<String> {
        Discovery::standard(&self.config, page_hrefs.to_vec()).discover(base_dir, self.fetcher.as_ref())
    }

    pub fn hydrate(&self, path: &str, base_dir: &str) -> ContentItem {
        self.hydrator(base_dir).hydrate(path)
    }

    /// Hydrated items, newest first.
    pub fn list(&self, base_dir: &str, page_hrefs: &[String]) -> Vec<ContentItem> {
        self.listing(base_dir, page_hrefs).items
    }

    /// Full run. The whole hydration batch completes before sorting and
    /// grouping start.
    pub fn listing(&self, base_dir: &str, page_hrefs: &[String]) -> Listing {
        let dir = dir_path(base_dir);
        let found = Discovery::standard(&self.config, page_hrefs.to_vec())
            .discover_traced(&dir, self.fetcher.as_ref());

        let mut items = self.hydrator(&dir).hydrate_all(&found.paths);
        sort_items(&mut items);
        let groups = group_by_category(items.clone(), &self.config.default_category);

        Listing {
            base_dir: dir,
            source: found.source,
            items,
            groups,
        }
    }

    fn hydrator(&self, base_dir: &str) -> Hydrator<'_> {
        Hydrator::new(self.fetcher.as_ref(), base_dir, &self.config.default_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::site::{LocalSite, StaticSite};

    fn site() -> StaticSite {
        StaticSite::new()
            .page(
                "/writeups/posts/index.json",
                r#"["/writeups/posts/2025-01-10-old.html",
                    "/writeups/posts/2025-08-16-new.html",
                    "/writeups/posts/draft.html"]"#,
            )
            .page(
                "/writeups/posts/2025-01-10-old.html",
                r#"<head><meta name="tags" content="Security"></head><h1>Old</h1>"#,
            )
            .page(
                "/writeups/posts/2025-08-16-new.html",
                r#"<head><meta name="tags" content="Security, web"></head><h1>New</h1>"#,
            )
            .page("/writeups/posts/draft.html", "<h1>Draft</h1>")
    }

    #[test]
    fn listing_sorts_and_groups() {
        let engine = ContentEngine::new(Arc::new(site()), NavConfig::default());
        let listing = engine.listing("/writeups/posts/", &[]);

        assert_eq!(listing.source, Some("manifest"));
        let titles: Vec<_> = listing.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Draft"]);

        let cats: Vec<_> = listing.groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(cats, vec!["Security", "General"]);
        assert_eq!(listing.groups[0].items.len(), 2);
    }

    #[test]
    fn default_category_is_configurable() {
        let config = NavConfig::default().with_default_category("Misc");
        let engine = ContentEngine::new(Arc::new(site()), config);
        let listing = engine.listing("/writeups/posts/", &[]);
        let cats: Vec<_> = listing.groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(cats, vec!["Security", "Misc"]);
    }

    #[test]
    fn empty_site_gives_empty_listing() {
        let engine = ContentEngine::new(Arc::new(StaticSite::new()), NavConfig::default());
        let listing = engine.listing("/writeups/posts/", &[]);
        assert!(listing.is_empty());
        assert!(listing.groups.is_empty());
        assert_eq!(listing.source, None);
    }

    #[test]
    fn page_anchors_feed_the_last_fallback() {
        let site = StaticSite::new().page("/blog/hello.html", "<title>Hello – Blog</title>");
        let engine = ContentEngine::new(Arc::new(site), NavConfig::default());
        let items = engine.list("blog", &["/blog/hello.html".to_string()]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Hello");
        assert_eq!(engine.discover("/blog/", &[]), Vec::<String>::new());
    }

    #[test]
    fn manifest_paths_with_spaces_hydrate_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("w/posts")).unwrap();
        std::fs::write(dir.path().join("w/posts/index.json"), r#"["/w/posts/my post.html"]"#).unwrap();
        std::fs::write(
            dir.path().join("w/posts/my post.html"),
            "<title>Real Title | Site</title><h1>Real Title</h1>",
        )
        .unwrap();

        let engine = ContentEngine::new(Arc::new(LocalSite::new(dir.path())), NavConfig::default());
        let listing = engine.listing("/w/posts/", &[]);
        assert_eq!(listing.source, Some("manifest"));
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].title, "Real Title");
    }
}
