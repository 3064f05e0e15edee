//! A local, deterministic content snapshot parsed from HTML.
//!
//! This stands in for a live rendering engine: it implements `ContentTree`
//! and a best-effort `VisibilityOracle` over inline styles and tag-default
//! display values. There is no layout model, so geometry-based visibility
//! (`bounding_box`) is unknown and off-screen content is not detected.

use hilite_core::{
    ContentTree, Error, MainContent, NodeId, NodeKind, Rect, Result, VisibilityOracle,
};
use std::collections::BTreeSet;

type Ref<'a> = ego_tree::NodeRef<'a, html_scraper::Node>;

#[derive(Debug, Clone, Default)]
struct InlineStyle {
    display: Option<String>,
    hidden_attr: bool,
    visibility_hidden: bool,
    transparent: bool,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: InlineStyle,
}

/// An immutable arena snapshot of one parsed HTML document.
#[derive(Debug, Clone)]
pub struct DomSnapshot {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl DomSnapshot {
    pub fn parse(html: &str) -> Self {
        let doc = html_scraper::Html::parse_document(html);
        let mut snap = DomSnapshot {
            nodes: Vec::new(),
            root: 0,
        };
        let root_ref = doc.tree.root().children().find(|c| c.value().is_element());
        match root_ref {
            Some(r) => {
                // The document element always maps; non-element top-level
                // nodes (doctype, comments) are skipped.
                snap.root = snap.add(r, None).unwrap_or(0);
            }
            None => {
                snap.nodes.push(NodeData {
                    kind: NodeKind::Element {
                        tag: "html".to_string(),
                        has_href: false,
                    },
                    parent: None,
                    children: Vec::new(),
                    style: InlineStyle::default(),
                });
            }
        }
        snap
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn add(&mut self, node: Ref<'_>, parent: Option<NodeId>) -> Option<NodeId> {
        let (kind, style) = if let Some(el) = node.value().as_element() {
            let tag = el.name().to_ascii_lowercase();
            let has_href = tag == "a" && el.attr("href").is_some();
            (NodeKind::Element { tag, has_href }, parse_style(el))
        } else if let Some(text) = node.value().as_text() {
            (NodeKind::Text(text.to_string()), InlineStyle::default())
        } else {
            return None;
        };

        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            style,
        });
        for child in node.children() {
            if let Some(child_id) = self.add(child, Some(id)) {
                self.nodes[id].children.push(child_id);
            }
        }
        Some(id)
    }

    fn data(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(node)
            .ok_or_else(|| Error::Extraction(format!("unknown node id {node}")))
    }
}

fn parse_style(el: &html_scraper::node::Element) -> InlineStyle {
    let mut style = InlineStyle {
        hidden_attr: el.attr("hidden").is_some(),
        ..InlineStyle::default()
    };
    let Some(attr) = el.attr("style") else {
        return style;
    };
    for decl in attr.split(';') {
        let mut parts = decl.splitn(2, ':');
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        match key.as_str() {
            "display" => style.display = Some(value),
            "visibility" if value == "hidden" || value == "collapse" => {
                style.visibility_hidden = true
            }
            "color" if value == "transparent" || value.replace(' ', "") == "rgba(0,0,0,0)" => {
                style.transparent = true
            }
            _ => {}
        }
    }
    style
}

/// Default display per tag, for documents that don't style it inline.
fn default_display(tag: &str) -> &'static str {
    match tag {
        "a" | "abbr" | "b" | "bdi" | "bdo" | "br" | "button" | "cite" | "code" | "data"
        | "dfn" | "em" | "i" | "img" | "input" | "kbd" | "label" | "mark" | "q" | "s"
        | "samp" | "select" | "small" | "span" | "strong" | "sub" | "sup" | "textarea"
        | "time" | "u" | "var" | "wbr" => "inline",
        "li" => "list-item",
        "table" => "table",
        "thead" | "tbody" | "tfoot" => "table-row-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "head" | "title" | "base" | "link" | "meta" | "script" | "style" | "template" => "none",
        _ => "block",
    }
}

impl ContentTree for DomSnapshot {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|d| d.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    fn kind(&self, node: NodeId) -> &NodeKind {
        static DETACHED: NodeKind = NodeKind::Element {
            tag: String::new(),
            has_href: false,
        };
        self.nodes.get(node).map(|d| &d.kind).unwrap_or(&DETACHED)
    }
}

impl VisibilityOracle for DomSnapshot {
    fn is_visible(&self, leaf: NodeId) -> Result<bool> {
        let data = self.data(leaf)?;
        if !matches!(data.kind, NodeKind::Text(_)) || data.parent.is_none() {
            return Ok(false);
        }
        let mut cur = data.parent;
        while let Some(n) = cur {
            let node = self.data(n)?;
            if node.style.visibility_hidden || node.style.transparent {
                return Ok(false);
            }
            if self.computed_display(n).as_deref() == Some("none") {
                return Ok(false);
            }
            cur = node.parent;
        }
        Ok(true)
    }

    fn computed_display(&self, node: NodeId) -> Option<String> {
        let data = self.nodes.get(node)?;
        let NodeKind::Element { tag, .. } = &data.kind else {
            return None;
        };
        if data.style.hidden_attr {
            return Some("none".to_string());
        }
        if let Some(display) = &data.style.display {
            return Some(display.clone());
        }
        Some(default_display(tag).to_string())
    }

    fn bounding_box(&self, _leaf: NodeId) -> Option<Rect> {
        None
    }
}

/// Fixed main-content membership, standing in for an external
/// readability-style extractor.
#[derive(Debug, Clone, Default)]
pub struct MainContentMembers {
    members: BTreeSet<NodeId>,
}

impl MainContentMembers {
    pub fn from_set(members: BTreeSet<NodeId>) -> Self {
        Self { members }
    }

    /// No main-content hint: only sentences with genuine ends qualify.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every node counts as main content.
    pub fn everything(tree: &DomSnapshot) -> Self {
        Self {
            members: (0..tree.node_count()).collect(),
        }
    }
}

impl MainContent for MainContentMembers {
    fn members(&self) -> Result<BTreeSet<NodeId>> {
        Ok(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::collect_leaves;
    use hilite_core::LeafContent;

    #[test]
    fn collects_visible_text_and_breaks_in_document_order() {
        let snap = DomSnapshot::parse(
            "<html><head><title>skip me</title></head>\
             <body><p>first</p><p>second<br>third</p></body></html>",
        );
        let leaves = collect_leaves(&snap, &snap);
        let rendered: Vec<String> = leaves
            .iter()
            .map(|l| match &l.content {
                LeafContent::Text(t) => t.clone(),
                LeafContent::Break => "<br>".to_string(),
            })
            .collect();
        assert_eq!(rendered, vec!["first", "second", "<br>", "third"]);
    }

    #[test]
    fn hidden_subtrees_are_not_visible() {
        let snap = DomSnapshot::parse(
            "<body><div style=\"display:none\"><p>secret</p></div>\
             <p style=\"visibility:hidden\">ghost</p><p>shown</p></body>",
        );
        let leaves = collect_leaves(&snap, &snap);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].text(), Some("shown"));
    }

    #[test]
    fn inline_display_overrides_the_default() {
        let snap = DomSnapshot::parse("<body><span id=x style=\"display:block\">t</span></body>");
        let leaves = collect_leaves(&snap, &snap);
        assert_eq!(leaves.len(), 1);
        let parent = snap.parent(leaves[0].node).expect("text has a parent");
        assert_eq!(snap.computed_display(parent).as_deref(), Some("block"));
    }

    #[test]
    fn whitespace_only_text_is_not_a_leaf() {
        let snap = DomSnapshot::parse("<body><p>  </p><p>real</p></body>");
        let leaves = collect_leaves(&snap, &snap);
        assert_eq!(leaves.len(), 1);
    }
}
