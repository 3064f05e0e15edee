//! Term-frequency scoring and coverage-bounded selection.
//!
//! Scores are a transient sort key only: the returned picks are always in
//! document order (`ScoredCandidate::index` ascending), which the renderer
//! depends on.

use crate::dom::nearest_boundary;
use crate::nlp::Nlp;
use crate::sentence::trim_sentence_start;
use hilite_core::{
    Candidate, ContentTree, Error, HighlightConfig, Result, ScoredCandidate, VisibilityOracle,
};
use std::collections::BTreeMap;

/// Coverage ratio for a requested tier, keyed by the number of highlight
/// states the renderer supports (including "off").
pub fn coverage_ratio(total_states: u32, tier: u32) -> Option<f64> {
    match (total_states, tier) {
        (2, 1) => Some(0.25),
        (3, 1) => Some(0.15),
        (3, 2) => Some(0.30),
        (4, 1) => Some(0.10),
        (4, 2) => Some(0.20),
        (4, 3) => Some(0.40),
        _ => None,
    }
}

fn log2_weight(n: usize) -> f64 {
    (n as f64).log2() + 1.0
}

/// Score every candidate, pick a score-ordered prefix that fits the
/// requested tier's character budget, then restore document order and trim
/// leading whitespace at selection starts.
pub fn select<T: ContentTree, V: VisibilityOracle>(
    tree: &T,
    vis: &V,
    nlp: &Nlp,
    config: &HighlightConfig,
    candidates: Vec<Candidate>,
    tier: u32,
) -> Result<Vec<ScoredCandidate>> {
    let ratio = if config.highlight_all {
        1.0
    } else {
        coverage_ratio(config.total_states, tier).ok_or(Error::UnsupportedTier {
            total_states: config.total_states,
            tier,
        })?
    };

    let term_counts: Vec<BTreeMap<String, usize>> = candidates
        .iter()
        .map(|c| nlp.token_counts(c.text()))
        .collect();

    // Term-sentence-frequency: in how many candidates each term occurs.
    let mut tsf: BTreeMap<&str, usize> = BTreeMap::new();
    for counts in &term_counts {
        for term in counts.keys() {
            *tsf.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .zip(&term_counts)
        .enumerate()
        .map(|(index, (candidate, counts))| {
            let raw: f64 = counts
                .iter()
                .map(|(term, &count)| {
                    count as f64 * log2_weight(tsf.get(term.as_str()).copied().unwrap_or(1))
                })
                .sum();
            let size: usize = counts.values().sum();
            // Long sentences pick up weight above just by being long;
            // discount by total term occurrences. Zero terms means zero
            // score, not a division by log2(0).
            let score = if size > 0 { raw / log2_weight(size) } else { 0.0 };
            ScoredCandidate {
                candidate,
                score,
                index,
                importance: None,
            }
        })
        .collect();

    // Navigational pages: if nothing in the whole candidate pool is a
    // sentence with a genuine end, suppress the selection entirely.
    let have_sentence_end = scored
        .iter()
        .any(|s| s.candidate.as_sentence().is_some_and(|x| x.has_end));
    if !have_sentence_end {
        return Ok(Vec::new());
    }

    let mut by_score = scored;
    by_score.sort_by(|a, b| b.score.total_cmp(&a.score));

    let total_chars: usize = by_score.iter().map(|s| s.candidate.text_len()).sum();
    let budget = ratio * total_chars as f64;

    let mut picks = Vec::new();
    let mut covered = 0usize;
    for mut scored in by_score {
        if config.highlight_all {
            scored.importance = Some(1);
        } else {
            for t in 1..config.total_states {
                if let Some(r) = coverage_ratio(config.total_states, t) {
                    if covered as f64 <= r * total_chars as f64 {
                        scored.importance = Some(t);
                        break;
                    }
                }
            }
        }
        covered += scored.candidate.text_len();
        picks.push(scored);
        if !config.highlight_all && covered as f64 > budget {
            break;
        }
    }

    picks.sort_by_key(|s| s.index);
    trim_selection_starts(tree, vis, &mut picks);
    Ok(picks)
}

/// Left-trim each selected sentence's start offset, except when it directly
/// continues an also-selected neighbor on the same rendered line (same
/// nearest line-breaking boundary), where the leading space belongs to the
/// highlighted run.
fn trim_selection_starts<T: ContentTree, V: VisibilityOracle>(
    tree: &T,
    vis: &V,
    picks: &mut [ScoredCandidate],
) {
    for j in (0..picks.len()).rev() {
        if picks[j].candidate.as_sentence().is_none() {
            continue;
        }

        let mut to_trim = j == 0;
        if j >= 1 {
            let cur_index = picks[j].index;
            let prev = &picks[j - 1];
            to_trim = cur_index > prev.index + 1;
            if cur_index == prev.index + 1 {
                let cur_first = match &picks[j].candidate {
                    Candidate::Sentence(s) => s.nodes.first().copied(),
                    Candidate::Block(b) => b.leaves.first().map(|l| l.node),
                };
                let prev_last = match &prev.candidate {
                    Candidate::Sentence(s) => s.nodes.last().copied(),
                    Candidate::Block(b) => b.leaves.last().map(|l| l.node),
                };
                if let (Some(cur), Some(last)) = (cur_first, prev_last) {
                    if nearest_boundary(tree, vis, cur) != nearest_boundary(tree, vis, last) {
                        to_trim = true;
                    }
                }
            }
        }

        if to_trim {
            if let Candidate::Sentence(s) = &mut picks[j].candidate {
                trim_sentence_start(tree, s);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_table_matches_supported_states() {
        assert_eq!(coverage_ratio(2, 1), Some(0.25));
        assert_eq!(coverage_ratio(4, 3), Some(0.40));
        assert_eq!(coverage_ratio(4, 4), None);
        assert_eq!(coverage_ratio(5, 1), None);
        assert_eq!(coverage_ratio(4, 0), None);
    }

    #[test]
    fn log2_weight_is_one_for_singletons() {
        assert_eq!(log2_weight(1), 1.0);
        assert_eq!(log2_weight(2), 2.0);
    }
}
