//! Loading the navigation partial into a panel container.

use crate::config::NavConfig;
use crate::dom::parser::parse_fragment;
use crate::dom::DomNode;
use crate::net::fetch::Fetcher;

const HEADING: &str = "<h3>Navigate</h3>";

const FALLBACK: &str = r#"<ul class="tree">
  <li><a href="/">Home</a></li>
  <li><a href="/about.html">About</a></li>
  <li><a href="/blog/">Blog</a></li>
  <li><a href="/status.html">Status (soon)</a></li>
</ul>"#;

/// Panel container (`<nav id="sb">`) holding the fetched partial, or a fixed
/// link list when the partial cannot be fetched. Never fails.
pub fn load_panel(fetcher: &dyn Fetcher, config: &NavConfig) -> DomNode {
    let body = match fetcher.fetch_text(&config.panel_markup_path) {
        Ok(html) => html,
        Err(e) => {
            log::warn!("panel markup {} unavailable ({}), using fallback", config.panel_markup_path, e);
            FALLBACK.to_string()
        }
    };
    panel_from_markup(&body)
}

/// Wrap a markup partial in a panel container.
pub fn panel_from_markup(html: &str) -> DomNode {
    let children = parse_fragment(&format!("{}{}", HEADING, html));
    DomNode::build("nav", &[("id", "sb")], children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::site::StaticSite;

    #[test]
    fn fetched_partial_gets_heading() {
        let site = StaticSite::new().page("/components/sidebar.html", r#"<ul class="tree"><li><a href="/x/">X</a></li></ul>"#);
        let panel = load_panel(&site, &NavConfig::default());
        assert_eq!(panel.attr("id"), Some("sb"));
        let heading = panel.find_first(|n| n.tag == "h3").and_then(|p| panel.at(&p));
        assert_eq!(heading.map(|h| h.collect_text()), Some("Navigate".into()));
        assert_eq!(panel.find_all(DomNode::is_link).len(), 1);
    }

    #[test]
    fn missing_partial_uses_fallback_links() {
        let site = StaticSite::new().status("/components/sidebar.html", 500);
        let panel = load_panel(&site, &NavConfig::default());
        let hrefs: Vec<_> = panel
            .find_all(DomNode::is_link)
            .iter()
            .filter_map(|p| panel.attribute(p, "href"))
            .map(str::to_string)
            .collect();
        assert_eq!(hrefs, vec!["/", "/about.html", "/blog/", "/status.html"]);
    }
}
