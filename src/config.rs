use std::time::Duration;

/// Fixed names and limits shared by discovery, hydration and the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    /// JSON manifest file name inside a content directory.
    pub manifest_name: String,
    /// Directory index page name.
    pub index_page: String,
    /// Site-wide sitemap document.
    pub sitemap_path: String,
    /// Navigation partial loaded into the panel container.
    pub panel_markup_path: String,
    /// Storage key for the panel-level collapse flag.
    pub collapsed_key: String,
    /// Storage key for the per-folder expand map.
    pub folders_key: String,
    pub default_category: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            manifest_name: "index.json".into(),
            index_page: "index.html".into(),
            sitemap_path: "/sitemap.xml".into(),
            panel_markup_path: "/components/sidebar.html".into(),
            collapsed_key: "sb-collapsed".into(),
            folders_key: "sb-folders".into(),
            default_category: "General".into(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("navtree/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl NavConfig {
    pub fn with_sitemap(mut self, path: impl Into<String>) -> Self {
        self.sitemap_path = path.into();
        self
    }

    pub fn with_panel_markup(mut self, path: impl Into<String>) -> Self {
        self.panel_markup_path = path.into();
        self
    }

    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = NavConfig::default()
            .with_sitemap("/map.xml")
            .with_default_category("Misc")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.sitemap_path, "/map.xml");
        assert_eq!(config.default_category, "Misc");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.folders_key, "sb-folders");
    }
}
