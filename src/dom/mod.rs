pub mod parser;
pub mod serialize;

use std::collections::HashMap;

/// Child-index path from a root node down to one of its descendants.
/// The empty path addresses the root itself; every prefix is an ancestor.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
}

/// In-memory document node.
///
/// Both fetched documents and the navigation panel are held in this form, so
/// discovery, hydration and tree-state logic run without a rendering
/// environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            tag: "#document".into(),
            attributes: HashMap::new(),
            text: String::new(),
            children,
            node_type: NodeType::Document,
        }
    }

    pub fn element(
        tag: impl Into<String>,
        attrs: HashMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    /// Element with attributes given as pairs, for building markup in code.
    pub fn build(tag: &str, attrs: &[(&str, &str)], children: Vec<DomNode>) -> Self {
        let attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::element(tag, attributes, children)
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Concatenated text of this subtree, like `textContent`.
    pub fn collect_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text_inner(&mut buf);
        buf
    }

    fn collect_text_inner(&self, buf: &mut String) {
        buf.push_str(&self.text);
        for child in &self.children {
            child.collect_text_inner(buf);
        }
    }

    /// An `<a>` carrying an `href`.
    pub fn is_link(&self) -> bool {
        self.is_element() && self.tag == "a" && self.attributes.contains_key("href")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        let Some(existing) = self.attr("class") else {
            return;
        };
        let kept: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let kept = kept.join(" ");
        if kept.is_empty() {
            self.attributes.remove("class");
        } else {
            self.set_attr("class", kept);
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, content: impl Into<String>) {
        self.children = vec![DomNode::text(content)];
    }

    pub fn at(&self, path: &[usize]) -> Option<&DomNode> {
        let mut current = self;
        for &idx in path {
            current = current.children.get(idx)?;
        }
        Some(current)
    }

    pub fn at_mut(&mut self, path: &[usize]) -> Option<&mut DomNode> {
        let mut current = self;
        for &idx in path {
            current = current.children.get_mut(idx)?;
        }
        Some(current)
    }

    /// Paths of every element in this subtree (root excluded) that satisfies
    /// `pred`, in document order.
    pub fn find_all<F>(&self, pred: F) -> Vec<NodePath>
    where
        F: Fn(&DomNode) -> bool,
    {
        let mut out = Vec::new();
        find_recursive(self, &pred, &mut Vec::new(), &mut out);
        out
    }

    /// Attribute of the node at `path`.
    pub fn attribute(&self, path: &[usize], name: &str) -> Option<&str> {
        self.at(path).and_then(|n| n.attr(name))
    }

    /// First element in document order satisfying `pred`.
    pub fn find_first<F>(&self, pred: F) -> Option<NodePath>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.find_all(pred).into_iter().next()
    }

    /// Nearest ancestor of the node at `path` (the node itself excluded)
    /// satisfying `pred`.
    pub fn closest_ancestor<F>(&self, path: &[usize], pred: F) -> Option<NodePath>
    where
        F: Fn(&DomNode) -> bool,
    {
        (0..path.len())
            .rev()
            .map(|len| &path[..len])
            .find(|prefix| self.at(prefix).map(|n| n.is_element() && pred(n)).unwrap_or(false))
            .map(|prefix| prefix.to_vec())
    }
}

fn find_recursive<F>(node: &DomNode, pred: &F, current: &mut Vec<usize>, out: &mut Vec<NodePath>)
where
    F: Fn(&DomNode) -> bool,
{
    for (i, child) in node.children.iter().enumerate() {
        current.push(i);
        if child.is_element() && pred(child) {
            out.push(current.clone());
        }
        find_recursive(child, pred, current, out);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DomNode {
        DomNode::build(
            "ul",
            &[("class", "tree")],
            vec![DomNode::build(
                "li",
                &[("class", "folder")],
                vec![DomNode::build(
                    "div",
                    &[("class", "row")],
                    vec![DomNode::build("a", &[("href", "/a/")], vec![DomNode::text("A")])],
                )],
            )],
        )
    }

    #[test]
    fn class_list_editing() {
        let mut node = DomNode::build("a", &[("class", "link")], vec![]);
        node.add_class("active");
        node.add_class("active");
        assert_eq!(node.attr("class"), Some("link active"));
        node.remove_class("link");
        assert_eq!(node.attr("class"), Some("active"));
        node.remove_class("active");
        assert!(node.attr("class").is_none());
    }

    #[test]
    fn paths_address_descendants() {
        let root = sample();
        let links = root.find_all(|n| n.tag == "a");
        assert_eq!(links, vec![vec![0, 0, 0]]);
        assert_eq!(root.at(&links[0]).map(|n| n.collect_text()), Some("A".into()));
        assert_eq!(root.find_all(DomNode::is_link), links);
        assert_eq!(root.attribute(&links[0], "href"), Some("/a/"));
    }

    #[test]
    fn text_is_concatenated_without_separators() {
        let heading = DomNode::build(
            "h1",
            &[],
            vec![
                DomNode::build("a", &[("href", "/x")], vec![DomNode::text("Intro")]),
                DomNode::text(": Rust"),
                DomNode::build("code", &[], vec![DomNode::text("fmt")]),
            ],
        );
        assert_eq!(heading.collect_text(), "Intro: Rustfmt");
    }

    #[test]
    fn closest_ancestor_skips_self() {
        let root = sample();
        let row = vec![0, 0];
        assert_eq!(root.closest_ancestor(&row, |n| n.has_class("folder")), Some(vec![0]));
        assert_eq!(root.closest_ancestor(&row, |n| n.has_class("row")), None);
    }
}
