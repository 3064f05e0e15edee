//! Sentence segmentation and scoring for document highlighting.
//!
//! The pipeline turns one immutable content snapshot into an ordered set of
//! highlight picks:
//!
//! 1. [`blocks::collect_leaves`] walks the tree and classifies visible text
//!    runs and break markers.
//! 2. [`blocks::segment_blocks`] groups leaves into layout blocks and
//!    derives [`Sentence`] spans inside each one.
//! 3. [`filter::candidates`] keeps the sentences worth scoring.
//! 4. [`score::select`] ranks them by term frequency and picks a prefix
//!    that fits the requested tier's coverage budget.
//!
//! [`Highlighter`] ties the stages together and stamps each run with a
//! monotonically increasing request token, so a caller juggling overlapping
//! invocations can tell stale results from current ones. The snapshot
//! itself is borrowed per call; the `Highlighter` owns only configuration
//! and the term-normalization tables.

pub mod blocks;
pub mod dom;
pub mod filter;
pub mod nlp;
pub mod score;
pub mod sentence;
pub mod snapshot;
pub mod stem;

pub use hilite_core::{
    Candidate, ContentTree, Error, HighlightConfig, Leaf, LeafContent, MainContent, NodeId,
    NodeKind, Rect, Result, ScoredCandidate, Selection, Sentence, Stemmer, TextBlock,
    VisibilityOracle,
};
pub use snapshot::{DomSnapshot, MainContentMembers};

use crate::nlp::Nlp;
use crate::stem::EnglishStemmer;
use std::sync::atomic::{AtomicU64, Ordering};

/// One configured pipeline instance. Cheap to keep around and reuse across
/// snapshots; each `select` call is independent.
pub struct Highlighter {
    config: HighlightConfig,
    nlp: Nlp,
    requests: AtomicU64,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self::with_stemmer(config, Box::new(EnglishStemmer::new()))
    }

    pub fn with_stemmer(config: HighlightConfig, stemmer: Box<dyn Stemmer>) -> Self {
        Self {
            config,
            nlp: Nlp::new(stemmer),
            requests: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Run the full pipeline for one snapshot at the given tier.
    ///
    /// Tier 0 is the off state and yields an empty selection without
    /// touching the snapshot. A tier with no coverage ratio for the
    /// configured state count is [`Error::UnsupportedTier`]; a failing
    /// main-content extractor is [`Error::Extraction`]. Either way the
    /// request token is already spent, so stale earlier runs stay stale.
    pub fn select<T, V, M>(&self, tree: &T, vis: &V, main: &M, tier: u32) -> Result<Selection>
    where
        T: ContentTree,
        V: VisibilityOracle,
        M: MainContent,
    {
        let token = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if tier == 0 {
            return Ok(Selection {
                token,
                picks: Vec::new(),
            });
        }

        let members = main.members()?;
        let blocks = blocks::segment_blocks(tree, vis, &members, &self.config);
        let candidates = filter::candidates(tree, &self.config, &blocks);
        let picks = score::select(tree, vis, &self.nlp, &self.config, candidates, tier)?;
        Ok(Selection { token, picks })
    }

    /// Whether `selection` is still the newest run of this instance.
    pub fn is_current(&self, selection: &Selection) -> bool {
        self.requests.load(Ordering::SeqCst) == selection.token
    }

    /// Segmentation output only, for inspection and debug tooling.
    pub fn text_blocks<T, V, M>(&self, tree: &T, vis: &V, main: &M) -> Result<Vec<TextBlock>>
    where
        T: ContentTree,
        V: VisibilityOracle,
        M: MainContent,
    {
        let members = main.members()?;
        Ok(blocks::segment_blocks(tree, vis, &members, &self.config))
    }

    /// Filtered candidates in document order, before scoring.
    pub fn candidates<T, V, M>(&self, tree: &T, vis: &V, main: &M) -> Result<Vec<Candidate>>
    where
        T: ContentTree,
        V: VisibilityOracle,
        M: MainContent,
    {
        let blocks = self.text_blocks(tree, vis, main)?;
        Ok(filter::candidates(tree, &self.config, &blocks))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(HighlightConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    struct FailingMain;

    impl MainContent for FailingMain {
        fn members(&self) -> Result<BTreeSet<NodeId>> {
            Err(Error::Extraction("extractor offline".to_string()))
        }
    }

    fn article() -> DomSnapshot {
        DomSnapshot::parse(
            "<body><p>The tired old engine rumbled back to life after the long winter. \
             The engine had waited out the cold under a canvas tarp.</p>\
             <p>Every spring the village gathered to watch the engine run again.</p></body>",
        )
    }

    #[test]
    fn tokens_increase_per_invocation() {
        let hl = Highlighter::default();
        let snap = article();
        let main = MainContentMembers::everything(&snap);
        let first = hl.select(&snap, &snap, &main, 1).unwrap();
        let second = hl.select(&snap, &snap, &main, 1).unwrap();
        assert_eq!(first.token, 1);
        assert_eq!(second.token, 2);
        assert!(!hl.is_current(&first));
        assert!(hl.is_current(&second));
    }

    #[test]
    fn tier_zero_is_empty_without_extraction() {
        let hl = Highlighter::default();
        let snap = article();
        // Even a broken extractor is fine at tier 0.
        let selection = hl.select(&snap, &snap, &FailingMain, 0).unwrap();
        assert!(selection.picks.is_empty());
    }

    #[test]
    fn extraction_failure_is_fatal() {
        let hl = Highlighter::default();
        let snap = article();
        let err = hl.select(&snap, &snap, &FailingMain, 1).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn unsupported_tier_is_rejected() {
        let hl = Highlighter::default();
        let snap = article();
        let main = MainContentMembers::everything(&snap);
        let err = hl.select(&snap, &snap, &main, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedTier {
                total_states: 4,
                tier: 4
            }
        ));
    }

    #[test]
    fn repeat_runs_agree_on_picks() {
        let hl = Highlighter::default();
        let snap = article();
        let main = MainContentMembers::everything(&snap);
        let first = hl.select(&snap, &snap, &main, 2).unwrap();
        let second = hl.select(&snap, &snap, &main, 2).unwrap();
        assert_eq!(first.picks, second.picks);
        assert!(!first.picks.is_empty());
    }

    #[test]
    fn picks_come_back_in_document_order() {
        let hl = Highlighter::default();
        let snap = article();
        let main = MainContentMembers::everything(&snap);
        let selection = hl.select(&snap, &snap, &main, 3).unwrap();
        let indices: Vec<usize> = selection.picks.iter().map(|p| p.index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }
}
