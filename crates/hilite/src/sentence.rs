//! Rule-based sentence boundary detection and span projection.
//!
//! Boundary detection runs over the concatenated text of a sub-block (the
//! run of text leaves between break markers), so sentences are found
//! independently of how the text is fragmented across nodes. Detected
//! boundaries are then projected back onto per-leaf character offsets.
//!
//! All indices in this module are character indices, never byte indices.

use crate::dom::{has_ancestor_tag, in_link};
use hilite_core::{ContentTree, HighlightConfig, Leaf, Sentence};

const SENTENCE_ENDS: [char; 3] = ['.', '?', '!'];
// Neutral double quote, closing curly quote, closing paren.
const QUOTE_ENDS: [char; 3] = ['\u{0022}', '\u{201D}', ')'];

/// Case-sensitive abbreviation table. A `.` directly after one of these
/// (with the token preceded by whitespace or string start) does not end a
/// sentence.
const ABBREVIATIONS: &[&str] = &[
    "ie", "eg", "ext",
    "Fig", "fig", "Figs", "figs", "et al", "Co", "Corp",
    "Ave", "Inc", "Ex", "Viz", "vs", "Vs", "repr", "Rep",
    "Dem", "trans", "Vol", "pp", "rev", "est", "Ref", "Refs",
    "Eq", "Eqs", "Ch", "Sec", "Secs", "mi", "Dept",
    "Univ", "Nos", "No", "Mol", "Cell",
    "Miss", "Mrs", "Mr", "Ms",
    "Prof", "Dr",
    "Sgt", "Col", "Gen", "Sen", "Gov", "Lt", "Maj", "Capt", "St",
    "Sr", "Jr", "jr", "Rev",
    "PhD", "MD", "BA", "MA", "MM",
    "BSc", "MSc",
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov", "Dec",
    "Sun", "Mon", "Tu", "Tue", "Tues", "Wed", "Th", "Thu", "Thur", "Thurs", "Fri", "Sat",
    // AP state abbreviations.
    "Ala", "Ariz", "Ark",
    "Calif", "Colo", "Conn",
    "Del",
    "Fla",
    "Ga",
    "Ill", "Ind",
    "Kan", "Ky",
    "La",
    "Md", "Mass", "Mich", "Minn", "Mo", "Mont",
    "Neb", "Nev",
    "Okla", "Ore",
    "Pa",
    "Tenn",
    "Vt", "Va",
    "Wash", "Wis", "Wyo",
    "etc",
    // All-caps months show up in some mastheads.
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN",
    "JUL", "AUG", "SEP", "SEPT", "OCT", "NOV", "DEC",
];

fn max_abbreviation_len() -> usize {
    ABBREVIATIONS.iter().map(|a| a.len()).max().unwrap_or(0)
}

/// One detected sentence end: the inclusive char index of the last char,
/// and whether a genuine terminator was found there (`false` when the span
/// ends only because the sub-block ended).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub end: usize,
    pub has_end: bool,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Abbreviation ending exactly at `j` (the index of the terminator char).
fn ends_abbreviation(chars: &[char], j: usize, max_len: usize) -> bool {
    for k in 1..=j.min(max_len) {
        let token: String = chars[j - k..j].iter().collect();
        if ABBREVIATIONS.contains(&token.as_str())
            && (j < k + 1 || chars[j - k - 1].is_whitespace())
        {
            return true;
        }
    }
    false
}

/// Scanning backward over word chars from `j`, another terminator before
/// any non-word char flags an acronym sequence like "U.S.A.".
fn inside_acronym(chars: &[char], j: usize) -> bool {
    for k in 1..=j {
        let c = chars[j - k];
        if SENTENCE_ENDS.contains(&c) {
            return true;
        }
        if !is_word_char(c) {
            return false;
        }
    }
    false
}

/// Detect sentence ends in `text`.
///
/// Returns strictly increasing boundaries; the final char is always
/// recorded, tagged `has_end=false` when no terminator rule fired for it.
pub fn sentence_segments(text: &str) -> Vec<Boundary> {
    let chars: Vec<char> = text.chars().collect();
    let max_abbr = max_abbreviation_len();
    let mut out = Vec::new();

    for j in 0..chars.len() {
        let c = chars[j];
        let at_text_end = j + 1 >= chars.len();
        let mut is_end = false;

        if SENTENCE_ENDS.contains(&c) {
            is_end = true;
            // A terminator at the very end of the text always counts; the
            // downgrade rules apply only mid-text.
            if !at_text_end && j > 0 {
                if ends_abbreviation(&chars, j, max_abbr) {
                    is_end = false;
                }
                if is_end && inside_acronym(&chars, j) {
                    is_end = false;
                }
                // Single capital initial, e.g. a middle initial.
                if is_end
                    && j > 1
                    && chars[j - 1].is_ascii_uppercase()
                    && chars[j - 2].is_whitespace()
                {
                    is_end = false;
                }
                // A label can't end a sentence before any separation has
                // occurred.
                if is_end && !chars[..j].iter().any(|c| c.is_whitespace()) {
                    is_end = false;
                }
                if is_end && !chars[j + 1].is_whitespace() {
                    is_end = false;
                }
            }
        } else if QUOTE_ENDS.contains(&c) {
            // Closing quote/paren directly after a `.`, followed by
            // whitespace or text end.
            if j > 0
                && chars[j - 1] == '.'
                && (at_text_end || chars[j + 1].is_whitespace())
            {
                is_end = true;
            }
        }

        if is_end {
            out.push(Boundary { end: j, has_end: true });
        } else if at_text_end {
            out.push(Boundary { end: j, has_end: false });
        }
    }
    out
}

/// Insert `has_end=false` boundaries at every blank-line run (2+
/// consecutive `\n`/`\r`) not already an end. Preformatted text has no
/// natural sentence punctuation but still needs segmentation.
pub fn insert_blank_line_breaks(text: &str, boundaries: &mut Vec<Boundary>) {
    let chars: Vec<char> = text.chars().collect();
    let mut j = 0;
    while j < chars.len() {
        if matches!(chars[j], '\n' | '\r') {
            let start = j;
            while j < chars.len() && matches!(chars[j], '\n' | '\r') {
                j += 1;
            }
            if j - start >= 2 {
                match boundaries.binary_search_by_key(&start, |b| b.end) {
                    Ok(_) => {}
                    Err(pos) => boundaries.insert(
                        pos,
                        Boundary {
                            end: start,
                            has_end: false,
                        },
                    ),
                }
            }
        } else {
            j += 1;
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Word count of already-trimmed sentence text. Empty text still counts as
/// one word, which keeps the average-length division well-defined.
pub fn count_words(text: &str) -> usize {
    collapse_whitespace(text.trim()).split(' ').count()
}

/// Build the sentences of one block. Sub-blocks are delimited by break
/// leaves; sentences never cross them.
pub fn sentences_for_block<T: ContentTree>(
    tree: &T,
    config: &HighlightConfig,
    leaves: &[Leaf],
    main_content: bool,
) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut sub: Vec<&Leaf> = Vec::new();
    for leaf in leaves {
        if leaf.is_break() {
            if !sub.is_empty() {
                sentences_for_sub_block(tree, config, &sub, main_content, &mut sentences);
                sub.clear();
            }
        } else {
            sub.push(leaf);
        }
    }
    if !sub.is_empty() {
        sentences_for_sub_block(tree, config, &sub, main_content, &mut sentences);
    }
    sentences
}

fn sentences_for_sub_block<T: ContentTree>(
    tree: &T,
    config: &HighlightConfig,
    sub: &[&Leaf],
    main_content: bool,
    out: &mut Vec<Sentence>,
) {
    let texts: Vec<&str> = sub.iter().map(|l| l.text().unwrap_or("")).collect();
    let lens: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    if lens.iter().all(|&n| n == 0) {
        return;
    }
    let text: String = texts.concat();

    let mut boundaries = sentence_segments(&text);
    let in_pre = sub
        .first()
        .is_some_and(|l| has_ancestor_tag(tree, l.node, "pre", config.pre_ancestor_depth));
    if in_pre {
        insert_blank_line_breaks(&text, &mut boundaries);
    }

    // Char range covered by each leaf, as [start, end] inclusive.
    let mut leaf_starts = Vec::with_capacity(lens.len());
    let mut cum = 0;
    for &n in &lens {
        leaf_starts.push(cum);
        cum += n;
    }

    let mut span_start = 0;
    for b in boundaries {
        let (start, end) = (span_start, b.end);
        span_start = b.end + 1;

        // First leaf containing `start`, last leaf containing `end`.
        let first = match leaf_starts
            .iter()
            .zip(&lens)
            .rposition(|(&s, &n)| n > 0 && s <= start)
        {
            Some(k) => k,
            None => continue,
        };
        let last = match leaf_starts
            .iter()
            .zip(&lens)
            .rposition(|(&s, &n)| n > 0 && s <= end)
        {
            Some(l) => l,
            None => continue,
        };
        let within_start = start - leaf_starts[first];
        let within_end = end - leaf_starts[last];

        out.push(build_sentence(
            tree,
            config,
            &sub[first..=last],
            within_start,
            within_end,
            b.has_end,
            main_content,
        ));
    }
}

fn char_slice(text: &str, from: usize, to_inclusive: Option<usize>) -> String {
    match to_inclusive {
        Some(to) => text.chars().skip(from).take(to + 1 - from).collect(),
        None => text.chars().skip(from).collect(),
    }
}

fn build_sentence<T: ContentTree>(
    tree: &T,
    config: &HighlightConfig,
    nodes: &[&Leaf],
    start: usize,
    end: usize,
    has_end: bool,
    main_content: bool,
) -> Sentence {
    let raw = if nodes.len() == 1 {
        char_slice(nodes[0].text().unwrap_or(""), start, Some(end))
    } else {
        let mut s = char_slice(nodes[0].text().unwrap_or(""), start, None);
        for leaf in &nodes[1..nodes.len() - 1] {
            s.push_str(leaf.text().unwrap_or(""));
        }
        s.push_str(&char_slice(
            nodes[nodes.len() - 1].text().unwrap_or(""),
            0,
            Some(end),
        ));
        s
    };
    let text = raw.trim().to_string();
    let text_len = text.chars().count();
    let word_count = count_words(&text);

    let mut link_chars = 0usize;
    for (i, leaf) in nodes.iter().enumerate() {
        if !in_link(tree, leaf.node, config.link_ancestor_depth) {
            continue;
        }
        let mut chars = leaf.text().map_or(0, |t| t.chars().count());
        if i == 0 {
            chars = chars.saturating_sub(start);
        } else if i == nodes.len() - 1 {
            chars = end + 1;
        }
        link_chars += chars;
    }
    let link_density = if text_len > 0 {
        link_chars as f64 / text_len as f64
    } else {
        0.0
    };

    Sentence {
        nodes: nodes.iter().map(|l| l.node).collect(),
        start,
        end,
        text,
        text_len,
        word_count,
        avg_word_len: if word_count > 0 {
            text_len as f64 / word_count as f64
        } else {
            0.0
        },
        link_density,
        has_end,
        main_content,
    }
}

/// Advance `sentence.start` past leading whitespace in its first leaf,
/// leaving at least one char. Mutates only the offset; the cached text is
/// already trimmed.
pub fn trim_sentence_start<T: ContentTree>(tree: &T, sentence: &mut Sentence) {
    let Some(&first) = sentence.nodes.first() else {
        return;
    };
    let Some(text) = tree.kind(first).text() else {
        return;
    };
    let chars: Vec<char> = text.chars().collect();
    let limit = if sentence.nodes.len() == 1 {
        match sentence.end.checked_sub(1) {
            Some(e) => e,
            None => return,
        }
    } else {
        match chars.len().checked_sub(2) {
            Some(e) => e,
            None => return,
        }
    };
    let mut i = sentence.start;
    while i <= limit && chars.get(i).is_some_and(|c| c.is_whitespace()) {
        sentence.start += 1;
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(text: &str) -> Vec<(usize, bool)> {
        sentence_segments(text)
            .into_iter()
            .map(|b| (b.end, b.has_end))
            .collect()
    }

    #[test]
    fn abbreviation_does_not_end_a_sentence() {
        let text = "Dr. Smith went home.";
        assert_eq!(ends(text), vec![(19, true)]);
    }

    #[test]
    fn figure_reference_does_not_split() {
        let text = "See Fig. 2 for details.";
        assert_eq!(ends(text), vec![(22, true)]);
    }

    #[test]
    fn acronym_periods_do_not_split() {
        let text = "They toured the U.S.A. last summer.";
        assert_eq!(ends(text), vec![(34, true)]);
    }

    #[test]
    fn middle_initial_does_not_split() {
        let text = "John F. Kennedy spoke. Crowds cheered.";
        assert_eq!(ends(text), vec![(21, true), (37, true)]);
    }

    #[test]
    fn closing_quote_after_period_ends_sentence() {
        let text = "He said \"Stop.\" Then he left.";
        assert_eq!(ends(text), vec![(14, true), (28, true)]);
    }

    #[test]
    fn no_whitespace_before_period_is_not_an_end() {
        // A bare label followed by a space: nothing has been separated yet.
        let text = "Chapter1. ";
        assert_eq!(ends(text), vec![(9, false)]);
    }

    #[test]
    fn period_followed_by_non_whitespace_is_not_an_end() {
        let text = "Visit example.com for more info.";
        assert_eq!(ends(text), vec![(31, true)]);
    }

    #[test]
    fn unterminated_text_ends_at_block_end_without_has_end() {
        assert_eq!(ends("just a fragment"), vec![(14, false)]);
    }

    #[test]
    fn terminal_period_always_ends() {
        assert_eq!(ends("Hi."), vec![(2, true)]);
    }

    #[test]
    fn multiple_sentences_split_in_order() {
        let text = "One is here. Two is there! Three?";
        assert_eq!(ends(text), vec![(11, true), (25, true), (32, true)]);
    }

    #[test]
    fn blank_line_breaks_are_inserted_for_preformatted_text() {
        let text = "fn main() {}\n\nfn other() {}";
        let mut bounds = sentence_segments(text);
        insert_blank_line_breaks(text, &mut bounds);
        assert!(bounds.iter().any(|b| b.end == 12 && !b.has_end));
        // Still strictly increasing and terminated at the last char.
        let idx: Vec<usize> = bounds.iter().map(|b| b.end).collect();
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(idx.last().copied(), Some(text.chars().count() - 1));
    }

    #[test]
    fn blank_line_insertion_skips_existing_ends() {
        let text = "All done.\n\nmore";
        let mut bounds = sentence_segments(text);
        let before = bounds.len();
        insert_blank_line_breaks(text, &mut bounds);
        // The `.` end at index 8 stays; the run's own boundary lands at
        // the first newline.
        assert_eq!(bounds.len(), before + 1);
        let idx: Vec<usize> = bounds.iter().map(|b| b.end).collect();
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn count_words_collapses_whitespace() {
        assert_eq!(count_words("three  word   phrase"), 3);
        assert_eq!(count_words(""), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ends_strictly_increase_and_cover_the_text(text in ".{1,200}") {
                let bounds = sentence_segments(&text);
                let n = text.chars().count();
                prop_assert!(!bounds.is_empty());
                let idx: Vec<usize> = bounds.iter().map(|b| b.end).collect();
                prop_assert!(idx.windows(2).all(|w| w[0] < w[1]));
                prop_assert_eq!(idx.last().copied(), Some(n - 1));
            }

            #[test]
            fn spans_partition_the_text(text in "[ -~]{1,200}") {
                let bounds = sentence_segments(&text);
                let mut start = 0;
                let chars: Vec<char> = text.chars().collect();
                let mut rebuilt = String::new();
                for b in &bounds {
                    prop_assert!(b.end >= start);
                    rebuilt.extend(&chars[start..=b.end]);
                    start = b.end + 1;
                }
                prop_assert_eq!(start, chars.len());
                prop_assert_eq!(rebuilt, text);
            }
        }
    }
}
