//! Tokenization and term normalization.
//!
//! `token_counts` is the scoring pipeline's view of a sentence: a map from
//! normalized term to occurrence count. Pure function of the input text and
//! the configured stemmer; no external state.

use hilite_core::Stemmer;
use std::collections::{BTreeMap, BTreeSet};

/// Normalized terms longer than this are truncated.
const MAX_TOKEN_LEN: usize = 20;

/// NLTK English stop words plus the common-word extras from Open Text
/// Summarizer. Matched against lowercased tokens; entries that are not
/// lowercase can never match and are kept only for table fidelity.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "don", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same", "she",
    "should", "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "you", "your", "yours", "yourself",
    "yourselves",
    // Open Text Summarizer extras.
    "along", "almost", "also", "always", "among", "another", "anybody", "anything", "anywhere",
    "apart", "around", "cannot", "comes", "could", "couldn", "didn", "different", "doesn",
    "done", "dr", "either", "enough", "etc", "even", "every", "everybody", "everything",
    "everywhere", "except", "exactly", "final", "first", "get", "go", "goes", "gone", "good",
    "got", "hence", "however", "i.e", "initial", "isn", "last", "least", "less", "let", "lets",
    "let's", "like", "lot", "made", "make", "many", "may", "maybe", "might", "mine", "Mr",
    "much", "must", "near", "need", "next", "niether", "nobody", "nothing", "nowhere", "often",
    "oh", "ok", "okay", "one", "onto", "perhaps", "please", "previous", "quite", "rather", "re",
    "really", "said", "say", "see", "seems", "several", "shall", "shouldn't", "since",
    "somebody", "something", "somewhere", "still", "stuff", "thing", "things", "thus", "top",
    "two", "unless", "upon", "us", "use", "v", "ve", "want", "well", "went", "without", "won",
    "would", "x", "yes", "yet",
];

/// Small hand-curated synonym-folding table.
const SYNONYMS: &[(&str, &str)] = &[
    ("colour", "color"),
    ("honour", "honor"),
    ("murder", "kill"),
    ("assist", "help"),
    ("simple", "basic"),
    ("winsome", "charming"),
    ("incisive", "perceptive"),
    ("bay", "bark"),
    ("verbose", "wordy"),
    ("angry", "mad"),
    ("unhappy", "sad"),
    ("depressed", "sad"),
    ("dismal", "sad"),
    ("mournful", "sad"),
    ("dreadful", "sad"),
    ("dreary", "sad"),
    ("discouraged", "sad"),
    ("fled", "run"),
    ("fearful", "afraid"),
    ("terrified", "afraid"),
    ("hysterical", "afraid"),
    ("worried", "afraid"),
    ("scared", "afraid"),
    ("petrified", "afraid"),
    ("worse", "bad"),
    ("terrible", "bad"),
    ("horrible", "bad"),
    ("wicked", "evil"),
    ("huge", "big"),
    ("massive", "big"),
    ("giant", "big"),
    ("gigantic", "big"),
    ("monstrous", "big"),
    ("tremendous", "big"),
    ("bulky", "big"),
    ("anxious", "eager"),
    ("intent", "eager"),
    ("ardent", "eager"),
    ("avid", "eager"),
    ("brave", "bold"),
    ("excellent", "good"),
    ("worthy", "good"),
    ("proper", "good"),
    ("favored", "good"),
    ("fine", "good"),
    ("brisk", "happy"),
    ("glad", "happy"),
    ("cheerful", "happy"),
    ("jolly", "happy"),
    ("pleased", "happy"),
    ("satisfied", "happy"),
    ("vivacious", "happy"),
    ("cheery", "happy"),
    ("merry", "happy"),
    ("injured", "hurt"),
    ("offended", "hurt"),
    ("distressed", "hurt"),
    ("suffering", "hurt"),
    ("afflicted", "hurt"),
    ("little", "small"),
    ("tiny", "small"),
    ("microscopic", "small"),
    ("miniscule", "small"),
    ("slender", "small"),
    ("insignificant", "small"),
    ("gaze", "look"),
    ("stare", "look"),
    ("view", "look"),
    ("inspect", "look"),
    ("glance", "look"),
    ("announce", "say"),
];

fn has_alpha(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_alphabetic())
}

/// Term normalization state: stop words, synonym table, and the pluggable
/// stemmer. Built once per `Highlighter`.
pub struct Nlp {
    stopwords: BTreeSet<&'static str>,
    synonyms: BTreeMap<&'static str, &'static str>,
    stemmer: Box<dyn Stemmer>,
}

impl Nlp {
    pub fn new(stemmer: Box<dyn Stemmer>) -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            synonyms: SYNONYMS.iter().copied().collect(),
            stemmer,
        }
    }

    /// Split text into raw tokens. `.` is stripped first so dotted
    /// abbreviations and acronyms stay in one piece; every other non-word
    /// char acts as a separator.
    pub fn tokenize(text: &str) -> Vec<String> {
        let mut cleaned = String::with_capacity(text.len());
        let mut last_space = true;
        for ch in text.chars() {
            if ch == '.' {
                continue;
            }
            if ch.is_ascii_alphanumeric() || ch == '_' {
                cleaned.push(ch);
                last_space = false;
            } else if !last_space {
                cleaned.push(' ');
                last_space = true;
            }
        }
        cleaned
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Lowercase, drop non-alphabetic and stop-word and single-char tokens,
    /// fold synonyms, stem, re-filter, and cap token length.
    pub fn normalize(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| has_alpha(t))
            .filter(|t| !self.stopwords.contains(t.as_str()))
            .filter(|t| t.chars().count() > 1)
            .map(|t| match self.synonyms.get(t.as_str()) {
                Some(s) => (*s).to_string(),
                None => t,
            })
            .map(|t| self.stemmer.stem(&t))
            .filter(|t| has_alpha(t))
            .map(|t| t.chars().take(MAX_TOKEN_LEN).collect())
            .collect()
    }

    /// Normalized term → occurrence count for `text`.
    pub fn token_counts(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for stem in self.normalize(Self::tokenize(text)) {
            *counts.entry(stem).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stem::EnglishStemmer;

    fn nlp() -> Nlp {
        Nlp::new(Box::new(EnglishStemmer::new()))
    }

    #[test]
    fn tokenize_keeps_dotted_acronyms_whole() {
        assert_eq!(Nlp::tokenize("The U.S.A. rocks"), vec!["The", "USA", "rocks"]);
    }

    #[test]
    fn tokenize_treats_punctuation_as_separators() {
        assert_eq!(
            Nlp::tokenize("foo-bar, baz/qux"),
            vec!["foo", "bar", "baz", "qux"]
        );
    }

    #[test]
    fn normalize_drops_stopwords_and_short_tokens() {
        let out = nlp().normalize(Nlp::tokenize("the quick brown fox is a fox"));
        assert!(out.contains(&"quick".to_string()));
        assert!(out.contains(&"brown".to_string()));
        assert_eq!(out.iter().filter(|t| *t == "fox").count(), 2);
        assert!(!out.iter().any(|t| t == "the" || t == "is" || t == "a"));
    }

    #[test]
    fn normalize_requires_an_alphabetic_char() {
        let out = nlp().normalize(Nlp::tokenize("10,000 people paid 42"));
        assert!(!out.iter().any(|t| t == "10" || t == "000" || t == "42"));
        assert!(out.contains(&"peopl".to_string()) || out.contains(&"people".to_string()));
        assert!(out.contains(&"paid".to_string()));
    }

    #[test]
    fn normalize_folds_synonyms_before_stemming() {
        let out = nlp().normalize(vec!["huge".to_string(), "colour".to_string()]);
        assert_eq!(out, vec!["big".to_string(), "color".to_string()]);
    }

    #[test]
    fn token_counts_counts_repeated_terms() {
        let counts = nlp().token_counts("widget widget widget gadget");
        assert_eq!(counts.get("widget").copied(), Some(3));
        assert_eq!(counts.get("gadget").copied(), Some(1));
    }

    #[test]
    fn token_counts_is_deterministic() {
        let n = nlp();
        let text = "Deterministic scoring requires deterministic term maps.";
        assert_eq!(n.token_counts(text), n.token_counts(text));
    }
}
