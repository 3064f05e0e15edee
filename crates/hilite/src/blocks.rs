//! Leaf classification and block segmentation.
//!
//! The classifier walks the snapshot once, depth-first pre-order, and
//! yields text runs and break markers. The segmenter then groups leaves
//! into `TextBlock`s wherever their nearest line-breaking ancestor changes,
//! with one special rule: a single isolated `<br>` inside a paragraph does
//! not split it.

use crate::dom::{in_link, in_tag_one_up, is_break_element, nearest_boundary, META_TAGS};
use crate::sentence::sentences_for_block;
use hilite_core::{
    ContentTree, HighlightConfig, Leaf, LeafContent, NodeId, NodeKind, TextBlock,
    VisibilityOracle,
};
use std::collections::BTreeSet;

/// Ordered leaves of the snapshot: visible, non-metadata text runs plus
/// every `<br>`. An oracle error for a node excludes that node, it never
/// aborts the walk.
pub fn collect_leaves<T: ContentTree, V: VisibilityOracle>(tree: &T, vis: &V) -> Vec<Leaf> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        match tree.kind(node) {
            NodeKind::Text(text) => {
                if !in_tag_one_up(tree, node, &META_TAGS)
                    && !text.chars().all(char::is_whitespace)
                    && vis.is_visible(node).unwrap_or(false)
                {
                    out.push(Leaf {
                        node,
                        content: LeafContent::Text(text.clone()),
                    });
                }
            }
            NodeKind::Element { tag, .. } => {
                if tag == "br" {
                    out.push(Leaf {
                        node,
                        content: LeafContent::Break,
                    });
                }
            }
        }
        for &child in tree.children(node).iter().rev() {
            stack.push(child);
        }
    }
    out
}

/// Group leaves into non-blank `TextBlock`s, deriving sentences as we go.
pub fn segment_blocks<T: ContentTree, V: VisibilityOracle>(
    tree: &T,
    vis: &V,
    main_content: &BTreeSet<NodeId>,
    config: &HighlightConfig,
) -> Vec<TextBlock> {
    let leaves = collect_leaves(tree, vis);
    if leaves.is_empty() {
        return Vec::new();
    }

    let mut bounds: Vec<NodeId> = leaves
        .iter()
        .map(|l| nearest_boundary(tree, vis, l.node))
        .collect();

    let mut blocks = Vec::new();
    let mut current: Vec<Leaf> = Vec::new();
    if !is_break_element(tree, bounds[0]) {
        current.push(leaves[0].clone());
    }

    for i in 1..leaves.len() {
        // A lone break flanked by the same non-break boundary is absorbed
        // into the predecessor's block. The overwrite is deliberate: later
        // comparisons must see the merged boundary.
        let mut keep_break = false;
        if config.allow_single_break && leaves[i].is_break() {
            let break_before = is_break_element(tree, bounds[i - 1]);
            let break_after = i + 1 < bounds.len() && is_break_element(tree, bounds[i + 1]);
            let same_flanks = i + 1 < bounds.len() && bounds[i - 1] == bounds[i + 1];
            if !break_before && !break_after && same_flanks {
                keep_break = true;
                bounds[i] = bounds[i - 1];
            }
        }

        if bounds[i] != bounds[i - 1] && !current.is_empty() {
            push_block(
                tree,
                main_content,
                config,
                std::mem::take(&mut current),
                &mut blocks,
            );
        }
        if !is_break_element(tree, bounds[i]) || keep_break {
            current.push(leaves[i].clone());
        }
    }
    if !current.is_empty() {
        push_block(tree, main_content, config, current, &mut blocks);
    }
    blocks
}

fn push_block<T: ContentTree>(
    tree: &T,
    main_content: &BTreeSet<NodeId>,
    config: &HighlightConfig,
    leaves: Vec<Leaf>,
    blocks: &mut Vec<TextBlock>,
) {
    let block = build_block(tree, main_content, config, leaves);
    if !block.blank {
        blocks.push(block);
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

fn build_block<T: ContentTree>(
    tree: &T,
    main_content: &BTreeSet<NodeId>,
    config: &HighlightConfig,
    leaves: Vec<Leaf>,
) -> TextBlock {
    let mut text = String::new();
    for leaf in &leaves {
        match &leaf.content {
            LeafContent::Text(t) => text.push_str(&collapse_whitespace(t)),
            LeafContent::Break => text.push('\n'),
        }
    }
    let text = text.trim().to_string();
    let text_len = text.chars().count();
    let blank = text_len == 0;

    let mut link_chars = 0usize;
    for leaf in &leaves {
        if let Some(t) = leaf.text() {
            if in_link(tree, leaf.node, config.link_ancestor_depth) {
                link_chars += t.chars().count();
            }
        }
    }
    let link_density = if text_len > 0 {
        link_chars as f64 / text_len as f64
    } else {
        0.0
    };

    let is_main = leaves
        .first()
        .map(|l| main_content.contains(&l.node))
        .unwrap_or(false);
    let sentences = if blank {
        Vec::new()
    } else {
        sentences_for_block(tree, config, &leaves, is_main)
    };

    TextBlock {
        leaves,
        text,
        text_len,
        blank,
        link_density,
        main_content: is_main,
        sentences,
    }
}
