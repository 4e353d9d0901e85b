use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_stats::QuantileExt;

pub fn argmax(d: ArrayView1<f64>) -> usize {
    if d.len() < 1 {
        return 0;
    }

    let mut max_ix = 0;
    let mut max = &d[0];

    for (i, v) in d.iter().enumerate() {
        if v > max {
            max = v;
            max_ix = i;
        }
    }

    max_ix
}

/// Row-wise argmax of a 2d array.
pub fn argmax_rows(x: ArrayView2<f64>) -> Array1<usize> {
    x.map_axis(Axis(1), argmax)
}

pub fn onehot(i: usize, size: usize) -> Vec<f64> {
    let mut oh = vec![0.; size];
    if i < size {
        oh[i] = 1.;
    }
    oh
}

pub fn encode_one_hot(labels: &[usize], classes: usize) -> Array2<f64> {
    let mut y = Array2::zeros((labels.len(), classes));
    for (row, &label) in labels.iter().enumerate() {
        if label < classes {
            y[[row, label]] = 1.;
        }
    }
    y
}

pub fn decode_one_hot(y: ArrayView2<f64>) -> Vec<usize> {
    argmax_rows(y).to_vec()
}

/// Numerically stable row softmax. Rows are shifted by their max before
/// exponentiating and the denominator carries an epsilon. A row holding
/// `+inf` splits its mass evenly across the infinite entries.
pub fn softmax(x: ArrayView2<f64>) -> Array2<f64> {
    const EPSILON: f64 = 1e-10;

    let mut out = Array2::zeros(x.raw_dim());
    for (row, mut probs) in x.rows().into_iter().zip(out.rows_mut()) {
        if row.is_empty() {
            continue;
        }
        let max = *row.max_skipnan();

        if max == f64::INFINITY {
            let k = row.iter().filter(|v| **v == f64::INFINITY).count() as f64;
            probs.zip_mut_with(&row, |p, &v| {
                *p = if v == f64::INFINITY { 1. / k } else { 0. }
            });
            continue;
        }

        let shift = if max.is_finite() { max } else { 0. };
        let exps = row.mapv(|v| (v - shift).exp());
        let sum = exps.sum() + EPSILON;
        probs.assign(&(exps / sum));
    }

    out
}

/// Scales the whole array into [-1, 1] by its largest absolute entry.
pub fn normalization(x: Array2<f64>) -> Array2<f64> {
    let max_abs = x.fold(0., |a: f64, v| a.max(v.abs()));
    if max_abs == 0. || !max_abs.is_finite() {
        return x;
    }
    x.mapv_into(|v| v / max_abs)
}

pub fn as_tensor(rows: &[Vec<f64>]) -> Array2<f64> {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut t = Array2::zeros((rows.len(), cols));
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.iter().take(cols).enumerate() {
            t[[i, j]] = *v;
        }
    }
    t
}
