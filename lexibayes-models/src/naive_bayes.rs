use std::collections::HashMap;
use std::hash::Hash;

use lexibayes_core::{
    argmax_first, log_sum_exp, CountMatrix, Float, Label, LexibayesError, Matrix, Result, Vector,
    Vocabulary,
};
use log::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How term counts in a query document enter the class score.
///
/// Training is the same for both settings; only [`predict`](MultinomialNB::predict) and
/// the other scoring methods look at this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermWeighting {
    /// Every term with a nonzero count adds its log-likelihood exactly once.
    ///
    /// A term seen five times scores the same as a term seen once.
    #[default]
    Presence,
    /// Every term adds its log-likelihood multiplied by its count (textbook multinomial).
    Count,
}

/// Parameters estimated by [`MultinomialNB::fit`].
///
/// Built in one pass and swapped in whole, so no partially trained state is observable.
#[derive(Debug, Clone)]
struct FittedState<L> {
    vocabulary: Vocabulary,
    /// Class set in first-appearance order. Row `c` of every per-class table is `classes[c]`.
    classes: Vec<L>,
    class_index: HashMap<L, usize>,
    /// `P(class)`, length `C`.
    class_prior: Vector,
    /// Total term occurrences per class.
    class_term_total: Vec<u64>,
    /// Smoothed `P(term | class)`, shape `(C × V)`.
    likelihood: Matrix,
    log_prior: Vector,
    log_likelihood: Matrix,
}

/// **Multinomial Naive Bayes** classifier over term-count matrices.
///
/// Each class is modelled as a multinomial distribution over a fixed vocabulary.
/// Training estimates a class prior and a Laplace-smoothed term distribution per class;
/// prediction picks the class with the highest joint log score.
///
/// # Algorithm
///
/// **Training** ([`fit`](MultinomialNB::fit)), with `N` documents and `V` terms:
///
/// ```text
/// P(c)       = N_c / N
/// T_c        = Σ_{i ∈ c} Σ_j x[i,j]
/// r(c,j)     = Σ_{i ∈ c} x[i,j]
/// P(j | c)   = (r(c,j) + 1) / (T_c + V)
/// ```
///
/// Because `Σ_j (r(c,j) + 1) = T_c + V`, each class's term distribution sums to one and
/// every entry is strictly positive, including terms never seen with that class.
///
/// **Prediction** ([`predict`](MultinomialNB::predict)):
///
/// ```text
/// score(c) = ln P(c) + Σ_{j : x[j] > 0} w(x[j]) · ln P(j | c)
/// ŷ        = argmax_c score(c)
/// ```
///
/// where `w` is `1` under [`TermWeighting::Presence`] (the default) and `x[j]` under
/// [`TermWeighting::Count`]. Scores stay in log space so long documents do not underflow.
/// Ties go to the class that appeared first in the training labels.
///
/// # Labels
///
/// Labels are any `Clone + Eq + Hash` type. The default is the integer [`Label`].
///
/// # Concurrency
///
/// `fit` takes `&mut self`; every other method takes `&self` and has no side effects, so a
/// trained model can be shared across threads for prediction.
///
/// # Errors
///
/// - [`LexibayesError::EmptyVocabulary`] if the vocabulary has no terms
/// - [`LexibayesError::EmptyTrainingData`] if there are no training documents
/// - [`LexibayesError::ShapeMismatch`] if row length or label count disagree
/// - [`LexibayesError::NotFitted`] if prediction is requested before fitting
#[derive(Debug, Clone)]
pub struct MultinomialNB<L = Label> {
    weighting: TermWeighting,
    state: Option<FittedState<L>>,
}

impl<L> Default for MultinomialNB<L> {
    fn default() -> Self {
        Self {
            weighting: TermWeighting::Presence,
            state: None,
        }
    }
}

impl<L: Clone + Eq + Hash> MultinomialNB<L> {
    /// Creates a new, unfitted model that scores by term presence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how query term counts are weighted when scoring.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let model = MultinomialNB::<usize>::new().with_weighting(TermWeighting::Count);
    /// ```
    pub fn with_weighting(mut self, weighting: TermWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Fits class priors and smoothed term likelihoods.
    ///
    /// # Parameters
    ///
    /// - `vocabulary`: The vocabulary that defines the columns of `x`. The model keeps a
    ///   shared handle to it.
    /// - `x`: Count matrix of shape `(n_documents, vocabulary.len())`.
    /// - `y`: One label per row of `x`.
    ///
    /// # Returns
    ///
    /// `Ok(())` on success. Any previous fit is replaced entirely. On error the model
    /// keeps whatever state it had before the call.
    ///
    /// # Errors
    ///
    /// - [`LexibayesError::EmptyVocabulary`] if `vocabulary` is empty
    /// - [`LexibayesError::EmptyTrainingData`] if `x` has zero rows
    /// - [`LexibayesError::ShapeMismatch`] if `x.ncols() != vocabulary.len()` or
    ///   `y.len() != x.nrows()`
    ///
    /// # Complexity
    ///
    /// - Time: `O(N·V + C·V)`
    /// - Space: `O(C·V)` for the dense likelihood tables
    pub fn fit(&mut self, vocabulary: &Vocabulary, x: &CountMatrix, y: &[L]) -> Result<()> {
        let n = x.nrows();
        let v = vocabulary.len();

        if v == 0 {
            return Err(LexibayesError::EmptyVocabulary);
        }

        if n == 0 {
            return Err(LexibayesError::EmptyTrainingData);
        }

        if x.ncols() != v {
            return Err(LexibayesError::ShapeMismatch {
                expected: format!("Expected {} features", v),
                got: format!("Got {} features", x.ncols()),
            });
        }

        if y.len() != n {
            return Err(LexibayesError::ShapeMismatch {
                expected: format!("Expected {} labels", n),
                got: format!("Got {} labels", y.len()),
            });
        }

        // Class set in first-appearance order, and each document's class row.
        let mut classes: Vec<L> = Vec::new();
        let mut class_index: HashMap<L, usize> = HashMap::new();
        let mut doc_class: Vec<usize> = Vec::with_capacity(n);

        for label in y {
            let c = match class_index.get(label) {
                Some(&c) => c,
                None => {
                    let c = classes.len();
                    class_index.insert(label.clone(), c);
                    classes.push(label.clone());
                    c
                }
            };
            doc_class.push(c);
        }

        let n_classes = classes.len();

        let mut doc_counts = vec![0usize; n_classes];
        for &c in &doc_class {
            doc_counts[c] += 1;
        }

        // r(c, j): walk column by column, nalgebra storage is column-major.
        let mut raw = nalgebra::DMatrix::<u64>::zeros(n_classes, v);
        for j in 0..v {
            for (i, &count) in x.column(j).iter().enumerate() {
                raw[(doc_class[i], j)] += u64::from(count);
            }
        }

        let class_term_total: Vec<u64> = (0..n_classes).map(|c| raw.row(c).sum()).collect();

        let v_f = v as Float;
        let likelihood = Matrix::from_fn(n_classes, v, |c, j| {
            (raw[(c, j)] as Float + 1.0) / (class_term_total[c] as Float + v_f)
        });

        let n_f = n as Float;
        let class_prior = Vector::from_fn(n_classes, |c, _| doc_counts[c] as Float / n_f);

        let log_prior = class_prior.map(Float::ln);
        let log_likelihood = likelihood.map(Float::ln);

        debug!(
            "fitted multinomial naive bayes: {} documents, {} classes, {} terms",
            n, n_classes, v
        );
        for c in 0..n_classes {
            trace!(
                "class #{}: {} documents, prior {:.6}, {} term occurrences",
                c,
                doc_counts[c],
                class_prior[c],
                class_term_total[c]
            );
        }

        self.state = Some(FittedState {
            vocabulary: vocabulary.clone(),
            classes,
            class_index,
            class_prior,
            class_term_total,
            likelihood,
            log_prior,
            log_likelihood,
        });

        Ok(())
    }

    /// Predicts one label per row of `x`.
    ///
    /// # Parameters
    ///
    /// - `x`: Count matrix of shape `(n_queries, V)` built against the training vocabulary.
    ///
    /// # Returns
    ///
    /// Vector of predicted labels of length `n_queries`.
    ///
    /// # Errors
    ///
    /// - [`LexibayesError::NotFitted`] if the model is not fitted
    /// - [`LexibayesError::ShapeMismatch`] if `x.ncols() != V`
    ///
    /// # Complexity
    ///
    /// - Time: `O(n_queries · nnz_per_row · C)`
    /// - Space: `O(n_queries + C)`
    pub fn predict(&self, x: &CountMatrix) -> Result<Vec<L>> {
        let state = self.checked_state(x)?;
        let tables = ScoreTables::new(state, self.weighting);

        // A fitted model has at least one class, so every score row is non-empty.
        let best = |i: usize| {
            let scores = tables.joint_log_scores(x, i);
            debug_assert!(!scores.is_empty());
            argmax_first(&scores).unwrap_or(0)
        };

        #[cfg(feature = "parallel")]
        let winners: Vec<usize> = (0..x.nrows()).into_par_iter().map(best).collect();

        #[cfg(not(feature = "parallel"))]
        let winners: Vec<usize> = (0..x.nrows()).map(best).collect();

        debug!(
            "predicted {} documents over {} classes",
            winners.len(),
            state.classes.len()
        );

        Ok(winners
            .into_iter()
            .map(|c| state.classes[c].clone())
            .collect())
    }

    /// Joint log scores `ln P(c) + Σ ln P(j | c)` for every row and class.
    ///
    /// # Returns
    ///
    /// Matrix of shape `(n_queries, C)`. Column `c` belongs to `classes()[c]`.
    ///
    /// # Errors
    ///
    /// Same as [`predict`](MultinomialNB::predict).
    pub fn predict_log_scores(&self, x: &CountMatrix) -> Result<Matrix> {
        let state = self.checked_state(x)?;
        let tables = ScoreTables::new(state, self.weighting);

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<Float>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| tables.joint_log_scores(x, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<Float>> = (0..x.nrows())
            .map(|i| tables.joint_log_scores(x, i))
            .collect();

        Ok(Matrix::from_fn(x.nrows(), state.classes.len(), |i, c| {
            rows[i][c]
        }))
    }

    /// Posterior class probabilities for every row.
    ///
    /// Each row of [`predict_log_scores`](MultinomialNB::predict_log_scores) is normalised
    /// with log-sum-exp, so every row of the result sums to one.
    ///
    /// # Errors
    ///
    /// Same as [`predict`](MultinomialNB::predict).
    pub fn predict_proba(&self, x: &CountMatrix) -> Result<Matrix> {
        let mut scores = self.predict_log_scores(x)?;

        for mut row in scores.row_iter_mut() {
            let values: Vec<Float> = row.iter().copied().collect();
            let lse = log_sum_exp(&values);
            for s in row.iter_mut() {
                *s = (*s - lse).exp();
            }
        }

        Ok(scores)
    }

    fn checked_state(&self, x: &CountMatrix) -> Result<&FittedState<L>> {
        let state = self.state.as_ref().ok_or(LexibayesError::NotFitted)?;
        let v = state.vocabulary.len();

        if x.ncols() != v {
            return Err(LexibayesError::ShapeMismatch {
                expected: format!("Expected {} features", v),
                got: format!("Got {} features", x.ncols()),
            });
        }

        Ok(state)
    }

    /// Returns the weighting used when scoring.
    pub fn weighting(&self) -> TermWeighting {
        self.weighting
    }

    /// Whether [`fit`](MultinomialNB::fit) has succeeded at least once.
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Class set in first-appearance order, or `None` before fitting.
    pub fn classes(&self) -> Option<&[L]> {
        self.state.as_ref().map(|s| s.classes.as_slice())
    }

    /// Number of classes (0 before fitting).
    pub fn n_classes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.classes.len())
    }

    /// Vocabulary size the model was fitted on (0 before fitting).
    pub fn n_features(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.vocabulary.len())
    }

    /// The vocabulary the model was fitted on.
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.state.as_ref().map(|s| &s.vocabulary)
    }

    /// Class priors in class-set order.
    pub fn class_priors(&self) -> Option<&Vector> {
        self.state.as_ref().map(|s| &s.class_prior)
    }

    /// Term likelihood table of shape `(C × V)` in class-set order.
    pub fn likelihoods(&self) -> Option<&Matrix> {
        self.state.as_ref().map(|s| &s.likelihood)
    }

    /// `P(label)`, or `None` if unfitted or the label was not in the training data.
    pub fn class_prior(&self, label: &L) -> Option<Float> {
        let state = self.state.as_ref()?;
        let c = *state.class_index.get(label)?;
        Some(state.class_prior[c])
    }

    /// Total term occurrences across the training documents labelled `label`.
    pub fn class_term_total(&self, label: &L) -> Option<u64> {
        let state = self.state.as_ref()?;
        let c = *state.class_index.get(label)?;
        Some(state.class_term_total[c])
    }

    /// `P(term j | label)`. `None` if unfitted, the label is unknown, or `j >= V`.
    pub fn term_likelihood(&self, label: &L, j: usize) -> Option<Float> {
        let state = self.state.as_ref()?;
        let c = *state.class_index.get(label)?;
        (j < state.likelihood.ncols()).then(|| state.likelihood[(c, j)])
    }
}

/// Borrowed log tables for scoring.
///
/// Holds no labels, so scoring closures are `Send + Sync` for any label type.
struct ScoreTables<'a> {
    log_prior: &'a Vector,
    log_likelihood: &'a Matrix,
    weighting: TermWeighting,
}

impl<'a> ScoreTables<'a> {
    fn new<L>(state: &'a FittedState<L>, weighting: TermWeighting) -> Self {
        Self {
            log_prior: &state.log_prior,
            log_likelihood: &state.log_likelihood,
            weighting,
        }
    }

    fn joint_log_scores(&self, x: &CountMatrix, i: usize) -> Vec<Float> {
        let mut scores: Vec<Float> = self.log_prior.iter().copied().collect();

        for (j, &count) in x.row(i).iter().enumerate() {
            if count == 0 {
                continue;
            }

            match self.weighting {
                TermWeighting::Presence => {
                    for (c, score) in scores.iter_mut().enumerate() {
                        *score += self.log_likelihood[(c, j)];
                    }
                }
                TermWeighting::Count => {
                    let w = Float::from(count);
                    for (c, score) in scores.iter_mut().enumerate() {
                        *score += w * self.log_likelihood[(c, j)];
                    }
                }
            }
        }

        scores
    }
}
