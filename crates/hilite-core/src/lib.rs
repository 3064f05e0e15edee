//! Snapshot-agnostic types and collaborator traits for `hilite`.
//!
//! This crate intentionally contains no IO and no segmentation logic. It
//! defines the data model the pipeline produces (blocks, sentences, scored
//! candidates), the traits the embedding application implements (content
//! tree, visibility oracle, main-content hint, stemmer), and the error
//! taxonomy. All offsets on these types are **character** offsets into leaf
//! text, never byte offsets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A collaborator (tree access, main-content extractor) failed. Fatal
    /// for the invocation; no partial selection is returned.
    #[error("extraction failed: {0}")]
    Extraction(String),
    /// The `(total_states, tier)` pair has no coverage ratio.
    #[error("unsupported highlight tier {tier} of {total_states} states")]
    UnsupportedTier { total_states: u32, tier: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Opaque index of a node inside a content snapshot.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Element {
        /// Lowercase tag name.
        tag: String,
        /// True for an anchor that actually carries an `href`.
        has_href: bool,
    },
    Text(String),
}

impl NodeKind {
    pub fn tag(&self) -> Option<&str> {
        match self {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(t) => Some(t.as_str()),
            NodeKind::Element { .. } => None,
        }
    }
}

/// Read-only access to one immutable snapshot of the content tree. The
/// pipeline borrows the snapshot for the whole run and never mutates it.
pub trait ContentTree {
    fn root(&self) -> NodeId;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn kind(&self, node: NodeId) -> &NodeKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rendering/visibility model of the host document.
///
/// `is_visible` may fail per node; the leaf classifier treats a failure as
/// not-visible rather than aborting the run.
pub trait VisibilityOracle {
    fn is_visible(&self, leaf: NodeId) -> Result<bool>;
    /// Effective CSS display of an element (`"block"`, `"inline"`, ...),
    /// `None` when unknown.
    fn computed_display(&self, node: NodeId) -> Option<String>;
    fn bounding_box(&self, leaf: NodeId) -> Option<Rect>;
}

/// The external readability-style extractor: which leaves belong to the
/// primary article. Invoked once per run; an error is fatal.
pub trait MainContent {
    fn members(&self) -> Result<BTreeSet<NodeId>>;
}

/// Pluggable stemming step of token normalization. Must be a pure function
/// of its input.
pub trait Stemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// A display value is a block boundary unless it is `none` or `inline*`.
pub fn display_breaks_line(display: &str) -> bool {
    display != "none" && !display.starts_with("inline")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafContent {
    /// A non-empty visible text run (owned copy of the snapshot text).
    Text(String),
    /// An explicit line-break marker (`<br>`).
    Break,
}

/// An indivisible unit from the content tree: a text run or a break marker.
/// Leaves are produced once per invocation and are immutable for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub node: NodeId,
    pub content: LeafContent,
}

impl Leaf {
    pub fn is_break(&self) -> bool {
        matches!(self.content, LeafContent::Break)
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            LeafContent::Text(t) => Some(t.as_str()),
            LeafContent::Break => None,
        }
    }
}

/// A maximal run of leaves sharing one layout segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub leaves: Vec<Leaf>,
    /// Whitespace-collapsed text (breaks rendered as newline), trimmed.
    pub text: String,
    /// Char count of `text`.
    pub text_len: usize,
    pub blank: bool,
    /// Fraction of leaf chars that sit under a hyperlink ancestor.
    pub link_density: f64,
    /// True iff the first leaf belongs to the main-content set.
    pub main_content: bool,
    pub sentences: Vec<Sentence>,
}

/// A scored unit of text within one block. `start` is a char offset into
/// the first leaf's text, `end` an inclusive char offset into the last
/// leaf's text; the leaf run never spans a break marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub nodes: Vec<NodeId>,
    pub start: usize,
    pub end: usize,
    /// Trimmed concatenation of the covered leaf slices.
    pub text: String,
    pub text_len: usize,
    pub word_count: usize,
    pub avg_word_len: f64,
    pub link_density: f64,
    /// True when the span ends on a genuine terminator rather than only
    /// because its block ended.
    pub has_end: bool,
    pub main_content: bool,
}

/// A unit that passed the candidate filter. Sentences are the normal case;
/// whole blocks are the exceptional one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    Sentence(Sentence),
    Block(TextBlock),
}

impl Candidate {
    pub fn text(&self) -> &str {
        match self {
            Candidate::Sentence(s) => &s.text,
            Candidate::Block(b) => &b.text,
        }
    }

    pub fn text_len(&self) -> usize {
        match self {
            Candidate::Sentence(s) => s.text_len,
            Candidate::Block(b) => b.text_len,
        }
    }

    pub fn as_sentence(&self) -> Option<&Sentence> {
        match self {
            Candidate::Sentence(s) => Some(s),
            Candidate::Block(_) => None,
        }
    }
}

/// A candidate chosen for highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    /// Position among *all* filtered candidates in document order. This is
    /// the only field allowed to drive final output order; the score is a
    /// transient sort key.
    pub index: usize,
    /// Importance tier, 1 (strongest) to `total_states - 1`.
    pub importance: Option<u32>,
}

/// The ordered picks of one invocation, tagged with its request token.
///
/// Tokens increase monotonically per `Highlighter`; a caller that observes
/// a newer token active after this run completes must discard these picks
/// instead of rendering them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub token: u64,
    pub picks: Vec<ScoredCandidate>,
}

/// Structural thresholds and debug switches for one pipeline instance.
///
/// These were ambient module globals in ancestral implementations; here
/// they are explicit constructor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Number of highlight intensity states the renderer supports,
    /// including the "off" state. Keys the coverage-ratio table.
    pub total_states: u32,
    /// Debug: accept every sentence and force importance 1.
    pub highlight_all: bool,
    /// Debug: additionally require the main-content flag on candidates.
    pub main_content_only: bool,
    /// Candidates need strictly more words than this.
    pub min_word_count: usize,
    /// Candidates need strictly more chars than this.
    pub min_chars: usize,
    /// Candidates need strictly fewer chars than this.
    pub max_chars: usize,
    pub max_avg_word_len: f64,
    pub max_link_density: f64,
    /// Ancestor depth checked for `code` containment.
    pub code_ancestor_depth: usize,
    /// Ancestor depth checked for hyperlink containment (link density).
    pub link_ancestor_depth: usize,
    /// Ancestor depth checked for `pre` containment (blank-line breaks).
    pub pre_ancestor_depth: usize,
    /// Keep a single isolated `<br>` inside one block instead of letting it
    /// split a paragraph.
    pub allow_single_break: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            total_states: 4,
            highlight_all: false,
            main_content_only: false,
            min_word_count: 3,
            min_chars: 15,
            max_chars: 1000,
            max_avg_word_len: 15.0,
            max_link_density: 0.75,
            code_ancestor_depth: 8,
            link_ancestor_depth: 8,
            pre_ancestor_depth: 5,
            allow_single_break: true,
        }
    }
}
