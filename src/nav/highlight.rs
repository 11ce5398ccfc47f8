//! Active-path matching.
//!
//! Both the current location and each link target are normalized: a trailing
//! `index.html`/`index.htm` is dropped, then any trailing `/` except on the
//! root. An exact match always wins. Otherwise the link whose path is the
//! longest strict ancestor directory of the location wins, the first in
//! document order on ties.

use crate::content::paths::normalize_path;
use crate::dom::{DomNode, NodePath};
use crate::nav::tree::{is_folder, ROW_CLASS};

pub const ACTIVE_CLASS: &str = "active";

pub fn normalize_location(path: &str) -> String {
    let mut p = path.trim();
    for index in ["index.html", "index.htm"] {
        if let Some(stripped) = p.strip_suffix(index) {
            if stripped.ends_with('/') {
                p = stripped;
                break;
            }
        }
    }
    let p = if p.len() > 1 { p.trim_end_matches('/') } else { p };
    if p.is_empty() {
        "/".to_string()
    } else {
        p.to_string()
    }
}

fn is_ancestor(link: &str, current: &str) -> bool {
    if link == current {
        return false;
    }
    link == "/" || current.starts_with(&format!("{}/", link))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMatch {
    pub link: NodePath,
    /// Normalized link target.
    pub target: String,
    pub exact: bool,
}

/// Pick the link that represents `current_path` under `root`.
pub fn find_active(root: &DomNode, current_path: &str) -> Option<ActiveMatch> {
    let current = normalize_path(current_path)
        .map(|p| normalize_location(&p))
        .unwrap_or_else(|| normalize_location(current_path));

    let links: Vec<(NodePath, String)> = root
        .find_all(DomNode::is_link)
        .into_iter()
        .filter_map(|p| {
            let target = normalize_path(root.attribute(&p, "href")?)?;
            Some((p, normalize_location(&target)))
        })
        .collect();

    if let Some((link, target)) = links.iter().find(|(_, t)| *t == current) {
        return Some(ActiveMatch {
            link: link.clone(),
            target: target.clone(),
            exact: true,
        });
    }

    let mut best: Option<&(NodePath, String)> = None;
    for candidate in links.iter().filter(|(_, t)| is_ancestor(t, &current)) {
        if best.map(|(_, t)| candidate.1.len() > t.len()).unwrap_or(true) {
            best = Some(candidate);
        }
    }
    best.map(|(link, target)| ActiveMatch {
        link: link.clone(),
        target: target.clone(),
        exact: false,
    })
}

/// Remove every previous highlight under `root`.
pub fn clear_active(root: &mut DomNode) {
    for path in root.find_all(|n| n.has_class(ACTIVE_CLASS)) {
        if let Some(node) = root.at_mut(&path) {
            node.remove_class(ACTIVE_CLASS);
        }
    }
}

/// Highlight the link at `link` and its enclosing row.
pub fn mark_active(root: &mut DomNode, link: &[usize]) {
    if let Some(node) = root.at_mut(link) {
        node.add_class(ACTIVE_CLASS);
    }
    if let Some(row) = root.closest_ancestor(link, |n| n.has_class(ROW_CLASS)) {
        if let Some(node) = root.at_mut(&row) {
            node.add_class(ACTIVE_CLASS);
        }
    }
}

/// Folders enclosing `link`, innermost first.
pub fn enclosing_folders(root: &DomNode, link: &[usize]) -> Vec<NodePath> {
    (0..link.len())
        .rev()
        .map(|len| &link[..len])
        .filter(|prefix| root.at(prefix).map(is_folder).unwrap_or(false))
        .map(|prefix| prefix.to_vec())
        .collect()
}
