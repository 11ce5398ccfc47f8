//! Markup output for in-memory trees.

use crate::dom::{DomNode, NodeType};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize a node (outer markup). Attributes are emitted in name order so
/// the output is stable across runs.
pub fn to_html(node: &DomNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &DomNode, out: &mut String) {
    match node.node_type {
        NodeType::Text => out.push_str(&escape(&node.text, false)),
        NodeType::Document => {
            for child in &node.children {
                write_node(child, out);
            }
        }
        NodeType::Element => {
            out.push('<');
            out.push_str(&node.tag);
            let mut attrs: Vec<_> = node.attributes.iter().collect();
            attrs.sort();
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&node.tag.as_str()) {
                return;
            }
            for child in &node.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_and_sorts_attributes() {
        let node = DomNode::build(
            "a",
            &[("title", "say \"hi\""), ("href", "/a?x=1&y=2")],
            vec![DomNode::text("<b>")],
        );
        assert_eq!(
            to_html(&node),
            r#"<a href="/a?x=1&amp;y=2" title="say &quot;hi&quot;">&lt;b&gt;</a>"#
        );
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let node = DomNode::build("p", &[], vec![DomNode::build("br", &[], vec![])]);
        assert_eq!(to_html(&node), "<p><br></p>");
    }
}
