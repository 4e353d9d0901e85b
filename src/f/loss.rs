use ndarray::{ArrayView2, Zip};

const CLIP: f64 = 1e-7;

fn clip(p: f64) -> f64 {
    p.clamp(CLIP, 1. - CLIP)
}

/// Mean over rows of `-sum(y * ln(p))`.
pub fn categorical_cross_entropy(pred: ArrayView2<f64>, actual: ArrayView2<f64>) -> f64 {
    let rows = pred.nrows();
    if rows == 0 {
        return 0.;
    }

    let total = Zip::from(&pred)
        .and(&actual)
        .fold(0., |a, &p, &y| a - y * clip(p).ln());

    total / rows as f64
}

/// Mean over every entry of `-(y * ln(p) + (1 - y) * ln(1 - p))`.
pub fn binary_cross_entropy(pred: ArrayView2<f64>, actual: ArrayView2<f64>) -> f64 {
    let len = pred.len();
    if len == 0 {
        return 0.;
    }

    let total = Zip::from(&pred).and(&actual).fold(0., |a, &p, &y| {
        let p_clipped = clip(p);
        a - (y * p_clipped.ln() + (1. - y) * (1. - p_clipped).ln())
    });

    total / len as f64
}
