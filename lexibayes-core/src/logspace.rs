use crate::Float;

/// Computes `ln(Σ_k exp(s_k))` without overflow or underflow.
///
/// Naive Bayes scores are sums of logarithms of probabilities below one, so for long
/// documents they are large negative numbers whose exponentials underflow to `0.0`.
/// Shifting by the maximum keeps every exponent in `(-∞, 0]`.
///
/// # Definition
///
/// ```text
/// m   = max_k s_k
/// LSE = m + ln(Σ_k exp(s_k − m))
/// ```
///
/// # Returns
///
/// - The log-sum-exp of `scores`.
/// - `Float::NEG_INFINITY` for an empty slice (the log of an empty sum).
///
/// # Examples
///
/// ```rust
/// use lexibayes_core::logspace::log_sum_exp;
///
/// let lse = log_sum_exp(&[0.5f64.ln(), 0.5f64.ln()]);
/// assert!(lse.abs() < 1e-12);
/// ```
pub fn log_sum_exp(scores: &[Float]) -> Float {
    let max = scores.iter().copied().fold(Float::NEG_INFINITY, Float::max);
    if !max.is_finite() {
        return max;
    }

    let sum: Float = scores.iter().map(|&s| (s - max).exp()).sum();
    max + sum.ln()
}

/// Index of the largest score, resolving ties to the earliest index.
///
/// Only a strictly greater score replaces the current best, so when several entries
/// share the maximum the first one wins. This is the tie-break used for class
/// selection: the first class in class-set order that reaches the maximum.
///
/// Returns `None` for an empty slice.
///
/// # Examples
///
/// ```rust
/// use lexibayes_core::logspace::argmax_first;
///
/// assert_eq!(argmax_first(&[-2.0, -1.0, -1.0]), Some(1));
/// assert_eq!(argmax_first(&[]), None);
/// ```
pub fn argmax_first(scores: &[Float]) -> Option<usize> {
    let mut best: Option<(usize, Float)> = None;

    for (i, &s) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }

    best.map(|(i, _)| i)
}
