use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::activation::ActivationChain;
use crate::data::check_dataset;
use crate::error::{PlanError, Result};
use crate::f;
use crate::learner::History;

/// Closed-form PLAN fit: correlates one-hot labels with the activated inputs
/// in a single pass, `W += Yᵀ · act(X)`, then normalizes the result.
///
/// Passing `w` continues from an existing weight matrix.
pub fn fit(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    activations: &ActivationChain,
    w: Option<Array2<f64>>,
    auto_normalization: bool,
) -> Result<Array2<f64>> {
    check_dataset(x, y)?;

    let activated = match auto_normalization {
        true => f::normalization(activations.apply(x)),
        false => activations.apply(x),
    };

    let shape = (y.ncols(), activated.ncols());
    let mut weight = match w {
        Some(w) if w.dim() == shape => w,
        Some(w) => {
            return Err(PlanError::ShapeMismatch(format!(
                "continuation weights are {:?}, expected {:?}",
                w.dim(),
                shape
            )))
        }
        None => Array2::zeros(shape),
    };

    weight += &y.t().dot(&activated);

    Ok(f::normalization(weight))
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    /// `act(X) · Wᵀ` before softmax.
    pub raw: Array2<f64>,
    pub accuracy: f64,
    /// Row softmax of `raw`.
    pub predictions: Array2<f64>,
}

fn check_weights(x: &Array2<f64>, w: ArrayView2<f64>) -> Result<()> {
    if x.ncols() != w.ncols() {
        return Err(PlanError::ShapeMismatch(format!(
            "activated inputs have {} features, weights expect {}",
            x.ncols(),
            w.ncols()
        )));
    }
    Ok(())
}

/// Softmax class probabilities for `x`.
pub fn predict(
    x: ArrayView2<f64>,
    w: ArrayView2<f64>,
    activations: &ActivationChain,
) -> Result<Array2<f64>> {
    let activated = activations.apply(x);
    check_weights(&activated, w)?;
    Ok(f::softmax(activated.dot(&w.t()).view()))
}

/// Forward pass, softmax and accuracy for one genome. Pure: the same inputs
/// always give bit-identical outputs.
pub fn evaluate(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    w: ArrayView2<f64>,
    activations: &ActivationChain,
) -> Result<Evaluation> {
    check_dataset(x, y)?;
    if y.ncols() != w.nrows() {
        return Err(PlanError::ShapeMismatch(format!(
            "labels have {} classes, weights produce {}",
            y.ncols(),
            w.nrows()
        )));
    }

    let activated = activations.apply(x);
    check_weights(&activated, w)?;

    let raw = activated.dot(&w.t());
    let predictions = f::softmax(raw.view());
    let accuracy = f::accuracy(predictions.view(), y);

    Ok(Evaluation {
        raw,
        accuracy,
        predictions,
    })
}

/// The output of a learner run: the best genome and how it scored.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Model {
    pub weights: Array2<f64>,
    pub activations: ActivationChain,
    /// Accuracy of the best genome on the batch it was scored with.
    pub accuracy: f64,
    /// Softmax predictions from that same evaluation.
    pub predictions: Array2<f64>,
    /// Full training set accuracy of the best genome.
    pub final_accuracy: f64,
    /// Full training set loss, or fitness when scoring by diversity.
    pub final_loss: f64,
    pub history: History,
}

impl Model {
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        predict(x, self.weights.view(), &self.activations)
    }

    pub fn evaluate(&self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Evaluation> {
        evaluate(x, y, self.weights.view(), &self.activations)
    }

    pub fn dump(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn load(serialized: &[u8]) -> Result<Model> {
        Ok(bincode::deserialize(serialized)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(serialized: &str) -> Result<Model> {
        Ok(serde_json::from_str(serialized)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activations;
    use ndarray::array;

    fn toy() -> (Array2<f64>, Array2<f64>) {
        (
            array![[1., 0.1], [0.9, 0.2], [0.1, 1.], [0.2, 0.8]],
            array![[1., 0.], [1., 0.], [0., 1.], [0., 1.]],
        )
    }

    #[test]
    fn fit_beats_chance_on_separable_data() {
        let (x, y) = toy();
        let linear = ActivationChain::single(Activations::Linear);

        let w = fit(x.view(), y.view(), &linear, None, false).unwrap();
        assert_eq!(w.dim(), (2, 2));
        assert!(w.iter().all(|v| v.abs() <= 1.));

        let eval = evaluate(x.view(), y.view(), w.view(), &linear).unwrap();
        assert!(eval.accuracy >= 0.75);
    }

    #[test]
    fn fit_rejects_misaligned_rows() {
        let (x, _) = toy();
        let y = array![[1., 0.], [0., 1.]];
        let linear = ActivationChain::single(Activations::Linear);
        assert!(matches!(
            fit(x.view(), y.view(), &linear, None, false),
            Err(PlanError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn fit_continues_from_existing_weights() {
        let (x, y) = toy();
        let linear = ActivationChain::single(Activations::Linear);
        let first = fit(x.view(), y.view(), &linear, None, true).unwrap();
        let second = fit(x.view(), y.view(), &linear, Some(first.clone()), true).unwrap();
        assert_eq!(second.dim(), first.dim());

        let wrong = Array2::zeros((3, 3));
        assert!(fit(x.view(), y.view(), &linear, Some(wrong), false).is_err());
    }

    #[test]
    fn evaluate_is_deterministic_and_valid() {
        let (x, y) = toy();
        let chain = ActivationChain::new(vec![Activations::Tanh, Activations::Swish]).unwrap();
        let w = fit(x.view(), y.view(), &chain, None, false).unwrap();

        let a = evaluate(x.view(), y.view(), w.view(), &chain).unwrap();
        let b = evaluate(x.view(), y.view(), w.view(), &chain).unwrap();
        assert_eq!(a.accuracy.to_bits(), b.accuracy.to_bits());
        assert_eq!(a.predictions, b.predictions);

        assert!((0. ..=1.).contains(&a.accuracy));
        for row in a.predictions.rows() {
            assert!((row.sum() - 1.).abs() < 1e-6);
        }
    }

    #[test]
    fn model_survives_bincode_and_json() {
        let (x, y) = toy();
        let linear = ActivationChain::single(Activations::Linear);
        let w = fit(x.view(), y.view(), &linear, None, false).unwrap();
        let eval = evaluate(x.view(), y.view(), w.view(), &linear).unwrap();

        let model = Model {
            weights: w,
            activations: linear,
            accuracy: eval.accuracy,
            predictions: eval.predictions,
            final_accuracy: eval.accuracy,
            final_loss: 0.1,
            history: History::default(),
        };

        let restored = Model::load(&model.dump().unwrap()).unwrap();
        assert_eq!(restored.weights, model.weights);
        assert_eq!(restored.activations, model.activations);

        let json = model.to_json().unwrap();
        assert!(json.contains("\"linear\""));
        let restored = Model::from_json(&json).unwrap();
        let drift = (&restored.weights - &model.weights).mapv(f64::abs).sum();
        assert!(drift < 1e-9);
        assert_eq!(restored.activations, model.activations);
    }
}
