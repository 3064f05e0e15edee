//! Ancestry predicates over a content tree.
//!
//! All checks are bounded (either one level up or a fixed depth) so a
//! pathological tree cannot turn a per-leaf predicate into a full-tree walk.

use hilite_core::{display_breaks_line, ContentTree, NodeId, NodeKind, VisibilityOracle};

/// Element types carrying metadata rather than content.
pub const META_TAGS: [&str; 7] = ["head", "title", "base", "link", "meta", "script", "style"];

/// Element types holding user input; never highlighted.
pub const INPUT_TAGS: [&str; 2] = ["textarea", "input"];

pub fn is_break_element<T: ContentTree>(tree: &T, node: NodeId) -> bool {
    matches!(tree.kind(node), NodeKind::Element { tag, .. } if tag == "br")
}

/// The node itself if it is an element, otherwise its parent.
fn owning_element<T: ContentTree>(tree: &T, node: NodeId) -> Option<NodeId> {
    match tree.kind(node) {
        NodeKind::Element { .. } => Some(node),
        NodeKind::Text(_) => tree.parent(node),
    }
}

/// Whether `node` (or, for a text node, its parent — one level up only) is
/// one of `tags`.
pub fn in_tag_one_up<T: ContentTree>(tree: &T, node: NodeId, tags: &[&str]) -> bool {
    owning_element(tree, node)
        .and_then(|el| tree.kind(el).tag())
        .is_some_and(|tag| tags.contains(&tag))
}

/// Whether `node` has an ancestor (including itself) with `tag`, within
/// `depth` steps.
pub fn has_ancestor_tag<T: ContentTree>(
    tree: &T,
    node: NodeId,
    tag: &str,
    depth: usize,
) -> bool {
    let mut cur = Some(node);
    let mut steps = 0;
    while let Some(n) = cur {
        if steps > depth {
            return false;
        }
        if tree.kind(n).tag() == Some(tag) {
            return true;
        }
        cur = tree.parent(n);
        steps += 1;
    }
    false
}

/// Whether `node` sits under an anchor that carries an `href`, within
/// `depth` steps.
pub fn in_link<T: ContentTree>(tree: &T, node: NodeId, depth: usize) -> bool {
    let mut cur = Some(node);
    let mut steps = 0;
    while let Some(n) = cur {
        if steps > depth {
            return false;
        }
        if matches!(
            tree.kind(n),
            NodeKind::Element { tag, has_href } if tag == "a" && *has_href
        ) {
            return true;
        }
        cur = tree.parent(n);
        steps += 1;
    }
    false
}

/// Nearest ancestor (including `node` itself) that starts a new line: a
/// `<br>`, or an element whose effective display is neither `none` nor
/// `inline*`. Falls back to the root.
pub fn nearest_boundary<T: ContentTree, V: VisibilityOracle>(
    tree: &T,
    vis: &V,
    node: NodeId,
) -> NodeId {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if is_break_element(tree, n) {
            return n;
        }
        if matches!(tree.kind(n), NodeKind::Element { .. }) {
            if let Some(display) = vis.computed_display(n) {
                if display_breaks_line(&display) {
                    return n;
                }
            }
        }
        cur = tree.parent(n);
    }
    tree.root()
}
