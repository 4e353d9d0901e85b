use ndarray::ArrayView2;

use super::argmax_rows;

/// Fraction of rows whose predicted class matches the one-hot target.
pub fn accuracy(pred: ArrayView2<f64>, actual: ArrayView2<f64>) -> f64 {
    let rows = pred.nrows();
    if rows == 0 {
        return 0.;
    }

    let hits = argmax_rows(pred)
        .iter()
        .zip(argmax_rows(actual).iter())
        .filter(|(p, a)| p == a)
        .count();

    hits as f64 / rows as f64
}

/// Spread of a weight matrix's rows: mean pairwise euclidean distance
/// scaled by `sqrt(columns)`.
pub fn diversity_score(w: ArrayView2<f64>) -> f64 {
    let (rows, cols) = w.dim();
    if rows < 2 || cols == 0 {
        return 0.;
    }

    let clean = w.mapv(|v| if v.is_nan() { 0. } else { v });

    let mut total = 0.;
    let mut pairs = 0usize;
    for i in 0..rows {
        for j in (i + 1)..rows {
            let d = (&clean.row(i) - &clean.row(j))
                .mapv_into(|v| v.powi(2))
                .sum()
                .sqrt();
            total += d.max(1e-10);
            pairs += 1;
        }
    }

    let max_possible = (cols as f64).sqrt().max(1e-10);
    (total / pairs as f64) / max_possible
}
