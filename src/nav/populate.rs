//! Auto-population of generated sections.
//!
//! A section is an element carrying `data-populate="<base dir>"`. Each
//! population cycle runs Discover → Hydrate → Aggregate for that directory
//! and is stamped with a generation token; only the newest token for a
//! section may write into the panel.

use std::collections::HashMap;

use crate::content::aggregate::CategoryGroup;
use crate::content::paths::dir_path;
use crate::content::ContentItem;
use crate::dom::DomNode;
use crate::engine::{ContentEngine, Listing};
use crate::nav::tree::{FOLDER_CLASS, KEY_ATTR, ROW_CLASS, START_OPEN_ATTR, TWISTY_CLASS};

pub const SECTION_ATTR: &str = "data-populate";

/// Per-section generation counters.
#[derive(Debug, Default)]
pub struct Generations {
    latest: HashMap<String, u64>,
    counter: u64,
}

impl Generations {
    /// Start a new cycle for `section`, invalidating any earlier one.
    pub fn begin(&mut self, section: &str) -> u64 {
        self.counter += 1;
        self.latest.insert(section.to_string(), self.counter);
        self.counter
    }

    pub fn is_current(&self, section: &str, generation: u64) -> bool {
        self.latest.get(section) == Some(&generation)
    }
}

/// Everything one cycle needs, detached from the panel so it can run on
/// another thread.
#[derive(Debug, Clone)]
pub struct PopulationJob {
    pub section: String,
    pub generation: u64,
    pub page_hrefs: Vec<String>,
}

impl PopulationJob {
    pub fn run(self, engine: &ContentEngine) -> PopulationResult {
        let listing = engine.listing(&self.section, &self.page_hrefs);
        PopulationResult {
            section: self.section,
            generation: self.generation,
            listing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PopulationResult {
    pub section: String,
    pub generation: u64,
    pub listing: Listing,
}

/// Normalized base directory of a section element.
pub fn section_dir(node: &DomNode) -> Option<String> {
    node.attr(SECTION_ATTR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(dir_path)
}

/// Markup for one populated section: a folder per category, a leaf per item.
pub fn build_section(section: &str, groups: &[CategoryGroup]) -> Vec<DomNode> {
    groups.iter().map(|g| category_folder(section, g)).collect()
}

fn category_folder(section: &str, group: &CategoryGroup) -> DomNode {
    let key = format!("{}#{}", section, group.category);
    let row = DomNode::build(
        "div",
        &[("class", ROW_CLASS), ("tabindex", "0")],
        vec![
            DomNode::build("button", &[("class", TWISTY_CLASS), ("type", "button")], vec![DomNode::text("▸")]),
            DomNode::build("span", &[("class", "label")], vec![DomNode::text(group.category.as_str())]),
        ],
    );
    let items = DomNode::build("ul", &[("class", "children")], group.items.iter().map(leaf).collect());
    DomNode::build(
        "li",
        &[
            ("class", FOLDER_CLASS),
            (KEY_ATTR, key.as_str()),
            (START_OPEN_ATTR, "false"),
            ("aria-expanded", "false"),
        ],
        vec![row, items],
    )
}

fn leaf(item: &ContentItem) -> DomNode {
    let mut row = vec![DomNode::build(
        "a",
        &[("href", item.path.as_str())],
        vec![DomNode::text(item.title.as_str())],
    )];
    if !item.date.is_empty() {
        row.push(DomNode::build(
            "time",
            &[("datetime", item.date.as_str())],
            vec![DomNode::text(item.date.as_str())],
        ));
    }
    let tags = item.tags.join(",");
    DomNode::build(
        "li",
        &[("class", "leaf"), ("data-tags", tags.as_str())],
        vec![DomNode::build("div", &[("class", ROW_CLASS)], row)],
    )
}

/// Swap the section's list children for `built`. The list is the section's
/// first direct `ul` child, created when missing.
pub fn replace_section_children(section: &mut DomNode, built: Vec<DomNode>) {
    match section
        .children
        .iter()
        .position(|c| c.is_element() && c.tag == "ul")
    {
        Some(i) => section.children[i].children = built,
        None => section
            .children
            .push(DomNode::build("ul", &[("class", "children")], built)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::tree::folders;

    fn item(path: &str, title: &str, date: &str, tags: &[&str]) -> ContentItem {
        ContentItem {
            path: path.into(),
            title: title.into(),
            date: date.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: tags.first().unwrap_or(&"General").to_string(),
        }
    }

    #[test]
    fn generations_invalidate_older_cycles() {
        let mut gens = Generations::default();
        let first = gens.begin("/w/");
        let other = gens.begin("/blog/");
        let second = gens.begin("/w/");
        assert!(!gens.is_current("/w/", first));
        assert!(gens.is_current("/w/", second));
        assert!(gens.is_current("/blog/", other));
        assert!(!gens.is_current("/nope/", 1));
    }

    #[test]
    fn built_section_has_category_folders() {
        let groups = vec![
            CategoryGroup {
                category: "Security".into(),
                items: vec![item("/w/a.html", "A", "2025-08-16", &["Security", "web"])],
            },
            CategoryGroup {
                category: "General".into(),
                items: vec![item("/w/b.html", "B", "", &[])],
            },
        ];
        let root = DomNode::document(build_section("/w/", &groups));
        let keys: Vec<_> = folders(&root).into_iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["/w/#Security", "/w/#General"]);

        let leaf_path = root
            .find_first(|n| n.has_class("leaf") && n.attr("data-tags") == Some("Security,web"))
            .unwrap();
        let leaf = root.at(&leaf_path).unwrap();
        let first_tag = |tag: &str| leaf.at(&leaf.find_first(|n| n.tag == tag).unwrap()).unwrap();
        assert_eq!(first_tag("a").attr("href"), Some("/w/a.html"));
        assert_eq!(first_tag("time").attr("datetime"), Some("2025-08-16"));
        assert_eq!(root.find_all(|n| n.tag == "time").len(), 1);
    }

    #[test]
    fn replaces_existing_list_or_appends_one() {
        let mut section = DomNode::build(
            "li",
            &[(SECTION_ATTR, "w")],
            vec![DomNode::build("ul", &[], vec![DomNode::text("loading…")])],
        );
        assert_eq!(section_dir(&section).as_deref(), Some("/w/"));
        replace_section_children(&mut section, vec![DomNode::build("li", &[], vec![])]);
        assert_eq!(section.children.len(), 1);
        assert_eq!(section.children[0].children[0].tag, "li");

        let mut bare = DomNode::build("div", &[(SECTION_ATTR, "/w/")], vec![]);
        replace_section_children(&mut bare, vec![]);
        assert_eq!(bare.children[0].tag, "ul");
    }
}
