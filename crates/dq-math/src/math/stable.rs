//! Numerically stable primitives for log-domain probability math.
//!
//! Raw likelihoods of a 784-dimensional Gaussian underflow `f64` by
//! hundreds of orders of magnitude, so all posterior arithmetic stays in
//! log space and only crosses back through [`normalize_log_probs`].

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or when every input is -inf.
/// NaN inputs propagate.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Convert unnormalized log-probabilities to normalized probabilities.
///
/// `p_i = exp(v_i - log_sum_exp(v))`: the log-domain total from
/// [`log_sum_exp`] is subtracted before exponentiating, so the output is
/// finite, non-negative, and sums to 1 regardless of how small the raw
/// values are. When every input is -inf the distribution is undefined
/// and a uniform vector is returned.
pub fn normalize_log_probs(log_probs: &[f64]) -> Vec<f64> {
    if log_probs.is_empty() {
        return Vec::new();
    }
    let total = log_sum_exp(log_probs);
    if total == f64::NEG_INFINITY {
        let uniform = 1.0 / log_probs.len() as f64;
        return vec![uniform; log_probs.len()];
    }
    log_probs.iter().map(|lp| (lp - total).exp()).collect()
}
