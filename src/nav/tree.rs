//! Folder model over panel markup.
//!
//! A folder is any element with class `folder`. Its own row is the first
//! direct child with class `row`; the row may hold a `.twisty` toggle, a
//! label, and a link. `data-open="true"` declares the folder open by default
//! and `aria-expanded` reflects the current state.

use std::collections::HashMap;

use serde::Serialize;

use crate::content::paths::normalize_path;
use crate::dom::{DomNode, NodePath};

pub const FOLDER_CLASS: &str = "folder";
pub const ROW_CLASS: &str = "row";
pub const TWISTY_CLASS: &str = "twisty";
pub const START_OPEN_ATTR: &str = "data-open";
pub const KEY_ATTR: &str = "data-key";
pub const EXPANDED_ATTR: &str = "aria-expanded";

const GLYPH_EXPANDED: &str = "▾";
const GLYPH_COLLAPSED: &str = "▸";

/// A folder located in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: NodePath,
    /// Stable, content-derived identity used as the persistence key.
    pub key: String,
    pub start_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Leaf,
    Folder,
}

/// Read-only outline of the panel's navigation hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub expanded: bool,
    pub active: bool,
    pub children: Vec<TreeNode>,
}

pub fn is_folder(node: &DomNode) -> bool {
    node.is_element() && node.has_class(FOLDER_CLASS)
}

/// Index of the folder's own row among its children.
pub fn own_row(folder: &DomNode) -> Option<usize> {
    folder
        .children
        .iter()
        .position(|c| c.is_element() && c.has_class(ROW_CLASS))
}

/// Path (relative to the folder) of its toggle button.
pub fn twisty_path(folder: &DomNode) -> Option<NodePath> {
    if let Some(row) = own_row(folder) {
        if let Some(mut inner) = folder.children[row].find_first(|n| n.has_class(TWISTY_CLASS)) {
            inner.insert(0, row);
            return Some(inner);
        }
    }
    folder
        .children
        .iter()
        .position(|c| c.is_element() && c.has_class(TWISTY_CLASS))
        .map(|i| vec![i])
}

/// Visible label of a folder: its row text without the toggle glyph.
pub fn folder_label(folder: &DomNode) -> String {
    let Some(row) = own_row(folder) else {
        return String::new();
    };
    folder.children[row]
        .children
        .iter()
        .filter(|c| !c.has_class(TWISTY_CLASS))
        .map(|c| c.collect_text())
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn row_link(folder: &DomNode) -> Option<String> {
    let row = &folder.children[own_row(folder)?];
    let link = row.at(&row.find_first(DomNode::is_link)?)?;
    normalize_path(link.attr("href")?)
}

pub fn start_open(folder: &DomNode) -> bool {
    folder.attr(START_OPEN_ATTR) == Some("true")
}

pub fn is_expanded(folder: &DomNode) -> bool {
    folder.attr(EXPANDED_ATTR) == Some("true")
}

/// Reflect `expanded` on the folder element and its toggle glyph.
pub fn set_expanded(folder: &mut DomNode, expanded: bool) {
    folder.set_attr(EXPANDED_ATTR, if expanded { "true" } else { "false" });
    if let Some(path) = twisty_path(folder) {
        if let Some(twisty) = folder.at_mut(&path) {
            twisty.set_text(if expanded { GLYPH_EXPANDED } else { GLYPH_COLLAPSED });
        }
    }
}

/// Every folder under `root`, in document order.
///
/// Keys are `data-key` when present, else the normalized target of the link
/// in the folder's own row, else `label:` plus the chain of row labels from
/// the outermost folder down. A key already taken by an earlier folder gets
/// a `#n` suffix (`/a/`, `/a/#2`, ...).
pub fn folders(root: &DomNode) -> Vec<Folder> {
    let mut out = Vec::new();
    collect_folders(root, &mut Vec::new(), &mut Vec::new(), &mut out);

    let mut seen: HashMap<String, usize> = HashMap::new();
    for folder in &mut out {
        let count = seen.entry(folder.key.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            folder.key = format!("{}#{}", folder.key, count);
        }
    }
    out
}

fn collect_folders(node: &DomNode, current: &mut Vec<usize>, labels: &mut Vec<String>, out: &mut Vec<Folder>) {
    for (i, child) in node.children.iter().enumerate() {
        if !child.is_element() {
            continue;
        }
        current.push(i);
        if is_folder(child) {
            labels.push(folder_label(child));
            let key = child
                .attr(KEY_ATTR)
                .map(str::to_string)
                .or_else(|| row_link(child))
                .unwrap_or_else(|| format!("label:{}", labels.join("/")));
            out.push(Folder {
                path: current.clone(),
                key,
                start_open: start_open(child),
            });
            collect_folders(child, current, labels, out);
            labels.pop();
        } else {
            collect_folders(child, current, labels, out);
        }
        current.pop();
    }
}

/// Outline of folders and links under `root`.
pub fn outline(root: &DomNode) -> Vec<TreeNode> {
    let keys = folders(root);
    let mut out = Vec::new();
    outline_children(root, &mut Vec::new(), &keys, None, &mut out);
    out
}

fn outline_children(
    node: &DomNode,
    current: &mut Vec<usize>,
    keys: &[Folder],
    skip: Option<usize>,
    out: &mut Vec<TreeNode>,
) {
    for (i, child) in node.children.iter().enumerate() {
        if !child.is_element() || Some(i) == skip {
            continue;
        }
        current.push(i);
        if is_folder(child) {
            let id = keys
                .iter()
                .find(|f| f.path == *current)
                .map(|f| f.key.clone())
                .unwrap_or_default();
            let mut children = Vec::new();
            outline_children(child, current, keys, own_row(child), &mut children);
            out.push(TreeNode {
                id,
                kind: NodeKind::Folder,
                label: folder_label(child),
                expanded: is_expanded(child),
                active: child
                    .children
                    .get(own_row(child).unwrap_or(usize::MAX))
                    .map(|r| r.has_class("active"))
                    .unwrap_or(false),
                children,
            });
        } else if child.is_link() {
            out.push(TreeNode {
                id: child.attr("href").and_then(normalize_path).unwrap_or_default(),
                kind: NodeKind::Leaf,
                label: child.collect_text().split_whitespace().collect::<Vec<_>>().join(" "),
                expanded: false,
                active: child.has_class("active"),
                children: Vec::new(),
            });
        } else {
            outline_children(child, current, keys, None, out);
        }
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse_fragment;

    fn panel() -> DomNode {
        DomNode::document(parse_fragment(
            r#"<ul class="tree">
                <li><a href="/">Home</a></li>
                <li class="folder" data-open="true">
                  <div class="row"><button class="twisty">▸</button><a href="/writeups/">Writeups</a></div>
                  <ul>
                    <li class="folder"><div class="row"><button class="twisty">▸</button><span>Posts</span></div>
                      <ul><li><a href="/writeups/posts/a.html">A</a></li></ul>
                    </li>
                  </ul>
                </li>
                <li class="folder" data-key="tools"><div class="row"><span>Tools</span></div><ul></ul></li>
              </ul>"#,
        ))
    }

    #[test]
    fn folder_keys_are_content_derived() {
        let found = folders(&panel());
        let keys: Vec<_> = found.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["/writeups/", "label:Writeups/Posts", "tools"]);
        assert!(found[0].start_open);
        assert!(!found[1].start_open);
    }

    #[test]
    fn repeated_keys_are_numbered() {
        let root = DomNode::document(parse_fragment(
            r#"<ul>
                <li class="folder"><div class="row"><a href="/a/">A</a></div></li>
                <li class="folder"><div class="row"><a href="/a/index.html#top">A again</a></div></li>
                <li class="folder"><div class="row"><span>Misc</span></div></li>
                <li class="folder"><div class="row"><span>Misc</span></div></li>
                <li class="folder"><div class="row"><a href="/a/">A once more</a></div></li>
              </ul>"#,
        ));
        let keys: Vec<_> = folders(&root).into_iter().map(|f| f.key).collect();
        assert_eq!(
            keys,
            vec!["/a/", "/a/index.html", "label:Misc", "label:Misc#2", "/a/#2"]
        );
    }

    #[test]
    fn set_expanded_updates_aria_and_glyph() {
        let mut root = panel();
        let path = folders(&root)[0].path.clone();
        let folder = root.at_mut(&path).unwrap();

        set_expanded(folder, true);
        assert!(is_expanded(folder));
        let twisty = twisty_path(folder).unwrap();
        assert_eq!(folder.at(&twisty).unwrap().collect_text(), "▾");

        set_expanded(folder, false);
        assert_eq!(folder.attr("aria-expanded"), Some("false"));
        assert_eq!(folder.at(&twisty).unwrap().collect_text(), "▸");
    }

    #[test]
    fn folder_without_twisty_still_tracks_state() {
        let mut root = panel();
        let path = folders(&root)[2].path.clone();
        let folder = root.at_mut(&path).unwrap();
        assert!(twisty_path(folder).is_none());
        set_expanded(folder, true);
        assert!(is_expanded(folder));
    }

    #[test]
    fn outline_nests_folders_and_links() {
        let tree = outline(&panel());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].kind, NodeKind::Leaf);
        assert_eq!(tree[0].id, "/");
        assert_eq!(tree[1].kind, NodeKind::Folder);
        assert_eq!(tree[1].label, "Writeups");
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].id, "label:Writeups/Posts");
        assert_eq!(tree[1].children[0].children[0].id, "/writeups/posts/a.html");
        assert!(tree[2].children.is_empty());
    }
}
