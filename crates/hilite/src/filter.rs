//! Structural candidate filtering.

use crate::dom::{has_ancestor_tag, in_tag_one_up, INPUT_TAGS};
use hilite_core::{Candidate, ContentTree, HighlightConfig, TextBlock};
use std::collections::BTreeSet;

/// Select the sentences eligible for highlighting, in document order.
///
/// Sentences inside user-input elements are never candidates. The rest must
/// clear the structural thresholds and either sit in main content or end on
/// a genuine terminator. Exact-text duplicates keep only their first
/// occurrence so boilerplate and repeated captions cannot inflate scores.
pub fn candidates<T: ContentTree>(
    tree: &T,
    config: &HighlightConfig,
    blocks: &[TextBlock],
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for block in blocks {
        let in_code = block.leaves.first().is_some_and(|l| {
            has_ancestor_tag(tree, l.node, "code", config.code_ancestor_depth)
        });
        for sentence in &block.sentences {
            let user_input = sentence
                .nodes
                .first()
                .is_some_and(|&n| in_tag_one_up(tree, n, &INPUT_TAGS));
            if user_input {
                continue;
            }

            let mut eligible = sentence.word_count > config.min_word_count
                && sentence.text_len > config.min_chars
                && sentence.text_len < config.max_chars
                && sentence.avg_word_len < config.max_avg_word_len
                && sentence.link_density < config.max_link_density
                && !in_code
                && (block.main_content || sentence.has_end);

            if config.highlight_all {
                eligible = true;
            }
            if config.main_content_only {
                eligible = eligible && block.main_content;
            }

            if eligible {
                out.push(Candidate::Sentence(sentence.clone()));
            }
        }
    }

    let mut seen = BTreeSet::new();
    out.retain(|c| seen.insert(c.text().to_string()));
    out
}
