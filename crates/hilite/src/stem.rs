//! Default `Stemmer` implementation.

use hilite_core::Stemmer;
use rust_stemmers::{Algorithm, Stemmer as Snowball};

/// English Porter-family stemmer backed by `rust-stemmers`. Swap in your
/// own `Stemmer` via `Highlighter::with_stemmer` if you need different
/// behavior (or a no-op for non-English pages).
pub struct EnglishStemmer {
    inner: Snowball,
}

impl EnglishStemmer {
    pub fn new() -> Self {
        Self {
            inner: Snowball::create(Algorithm::English),
        }
    }
}

impl Default for EnglishStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for EnglishStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_plurals_and_suffixes() {
        let s = EnglishStemmer::new();
        assert_eq!(s.stem("widgets"), "widget");
        assert_eq!(s.stem("running"), "run");
    }

    #[test]
    fn stemming_is_pure() {
        let s = EnglishStemmer::new();
        assert_eq!(s.stem("informative"), s.stem("informative"));
    }
}
