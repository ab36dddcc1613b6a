use std::collections::HashMap;
use std::sync::Arc;

use crate::{Count, CountMatrix, LexibayesError, Result};

/// An ordered, deduplicated, immutable sequence of terms.
///
/// The position of a term is its column in every [`CountMatrix`] built against this
/// vocabulary. Once created the vocabulary never changes; clones share the same storage,
/// so the vectorizer and a trained model can hold the same vocabulary without copying it.
///
/// Terms that are not in the vocabulary contribute nothing when vectorizing. The
/// vocabulary never grows to accommodate them.
///
/// # Examples
///
/// ```rust
/// use lexibayes_core::Vocabulary;
///
/// let vocab = Vocabulary::from_tokens(["spam", "eggs", "spam", "ham"]);
/// assert_eq!(vocab.len(), 3);
/// assert_eq!(vocab.index_of("ham"), Some(2));
///
/// let row = vocab.count_vector(["spam", "spam", "toast"]);
/// assert_eq!(row, vec![2, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Arc<[String]>,
    index: Arc<HashMap<String, usize>>,
}

impl Vocabulary {
    /// Builds a vocabulary from terms that must already be distinct.
    ///
    /// # Errors
    ///
    /// - [`LexibayesError::DuplicateTerm`] if any term appears more than once.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();

        for term in terms {
            let term = term.into();
            if index.contains_key(&term) {
                return Err(LexibayesError::DuplicateTerm(term));
            }
            index.insert(term.clone(), ordered.len());
            ordered.push(term);
        }

        Ok(Self {
            terms: ordered.into(),
            index: Arc::new(index),
        })
    }

    /// Builds a vocabulary from a token stream, keeping the first occurrence of each term.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();

        for token in tokens {
            let token = token.as_ref();
            if !index.contains_key(token) {
                index.insert(token.to_owned(), ordered.len());
                ordered.push(token.to_owned());
            }
        }

        Self {
            terms: ordered.into(),
            index: Arc::new(index),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column index of `term`, or `None` if it is out of vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Term stored at column `index`.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    /// Counts the in-vocabulary tokens of a single document.
    ///
    /// The result always has length [`len`](Vocabulary::len). Out-of-vocabulary tokens are
    /// dropped.
    pub fn count_vector<I, S>(&self, tokens: I) -> Vec<Count>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: Vec<Count> = vec![0; self.len()];
        for token in tokens {
            if let Some(j) = self.index_of(token.as_ref()) {
                counts[j] = counts[j].saturating_add(1);
            }
        }
        counts
    }

    /// Counts a batch of tokenized documents into a `(documents × terms)` matrix.
    pub fn count_matrix<D, S>(&self, documents: &[D]) -> CountMatrix
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut x = CountMatrix::zeros(documents.len(), self.len());
        for (i, doc) in documents.iter().enumerate() {
            for token in doc.as_ref() {
                if let Some(j) = self.index_of(token.as_ref()) {
                    x[(i, j)] = x[(i, j)].saturating_add(1);
                }
            }
        }
        x
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.terms, &other.terms) || self.terms == other.terms
    }
}

impl Eq for Vocabulary {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_vocabulary_new_keeps_order() {
        let vocab = Vocabulary::new(["a", "b", "c"]).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(vocab.index_of("c"), Some(2));
        assert_eq!(vocab.term(1), Some("b"));
        assert_eq!(vocab.term(3), None);
    }

    #[test]
    fn test_vocabulary_new_rejects_duplicates() {
        let result = Vocabulary::new(["a", "b", "a"]);
        assert!(matches!(result, Err(LexibayesError::DuplicateTerm(t)) if t == "a"));
    }

    #[test]
    fn test_vocabulary_from_tokens_first_seen_order() {
        let vocab = Vocabulary::from_tokens(["b", "a", "b", "c", "a"]);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_vocabulary_empty() {
        let vocab = Vocabulary::from_tokens(Vec::<String>::new());
        assert!(vocab.is_empty());
        assert_eq!(vocab.count_vector(["x"]), Vec::<Count>::new());
    }

    #[test]
    fn test_count_vector_drops_out_of_vocabulary() {
        let vocab = Vocabulary::new(["a", "b"]).unwrap();
        assert_eq!(vocab.count_vector(["a", "z", "a", "b", "q"]), vec![2, 1]);
    }

    #[test]
    fn test_count_matrix_rows_follow_documents() {
        let vocab = Vocabulary::new(["a", "b"]).unwrap();
        let docs = vec![vec!["a", "a"], vec!["b", "b", "b"], vec!["unknown"]];
        let x = vocab.count_matrix(&docs);

        assert_eq!(x.nrows(), 3);
        assert_eq!(x.ncols(), 2);
        assert_eq!(x[(0, 0)], 2);
        assert_eq!(x[(0, 1)], 0);
        assert_eq!(x[(1, 1)], 3);
        assert_eq!(x.row(2).iter().sum::<Count>(), 0);
    }

    #[test]
    fn test_count_vector_agrees_with_count_matrix_row() {
        let vocab = Vocabulary::new(["x", "y", "z"]).unwrap();
        let doc = vec!["z", "x", "z", "z", "w"];
        let counts: Vec<Count> = vocab.count_vector(&doc);
        let x = vocab.count_matrix(&[doc]);

        assert_eq!(counts, vec![1, 0, 3]);
        assert_eq!(x.row(0).iter().copied().collect::<Vec<Count>>(), counts);
    }

    #[test]
    fn test_clones_are_equal() {
        let vocab = Vocabulary::new(["a", "b"]).unwrap();
        let shared = vocab.clone();
        assert_eq!(vocab, shared);
        assert_ne!(vocab, Vocabulary::new(["b", "a"]).unwrap());
    }

    proptest! {
        #[test]
        fn prop_count_vector_matches_in_vocabulary_tokens(
            tokens in proptest::collection::vec("[a-e]", 0..64)
        ) {
            let vocab = Vocabulary::new(["a", "b", "c"]).unwrap();
            let counts = vocab.count_vector(&tokens);
            let in_vocab = tokens
                .iter()
                .filter(|t| vocab.index_of(t).is_some())
                .count();

            prop_assert_eq!(counts.len(), vocab.len());
            prop_assert_eq!(counts.iter().map(|&c| c as usize).sum::<usize>(), in_vocab);
        }
    }
}
