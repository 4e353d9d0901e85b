use std::fmt::{self, Debug};

use ndarray::{ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use crate::f;
use crate::loss::Losses;
use crate::model::Evaluation;

/// Weighted accuracy-loss score.
pub fn wals(acc: f64, loss: f64, acc_impact: f64, loss_impact: f64) -> f64 {
    acc_impact * acc - loss_impact * loss
}

/// Scores one evaluated genome; higher is better.
pub trait FitnessScorer {
    fn score(
        &self,
        y_true: ArrayView2<f64>,
        y_pred: ArrayView2<f64>,
        diversity: f64,
        accuracy: f64,
    ) -> f64;
}

impl<F> FitnessScorer for F
where
    F: Fn(ArrayView2<f64>, ArrayView2<f64>, f64, f64) -> f64,
{
    fn score(
        &self,
        y_true: ArrayView2<f64>,
        y_pred: ArrayView2<f64>,
        diversity: f64,
        accuracy: f64,
    ) -> f64 {
        self(y_true, y_pred, diversity, accuracy)
    }
}

/// Rewards accuracy and the probability mass placed on the true class, with a
/// small bonus for weight diversity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct HybridAccuracyConfidence {
    pub alpha: f64,
    pub beta: f64,
    pub lambda_div: f64,
}

impl Default for HybridAccuracyConfidence {
    fn default() -> Self {
        HybridAccuracyConfidence {
            alpha: 2.,
            beta: 1.5,
            lambda_div: 0.05,
        }
    }
}

impl FitnessScorer for HybridAccuracyConfidence {
    fn score(
        &self,
        y_true: ArrayView2<f64>,
        y_pred: ArrayView2<f64>,
        diversity: f64,
        accuracy: f64,
    ) -> f64 {
        let rows = y_true.nrows().max(1) as f64;
        let confidence = Zip::from(&y_true)
            .and(&y_pred)
            .fold(0., |a, &t, &p| a + t * p)
            / rows;

        self.alpha * accuracy + self.beta * confidence + self.lambda_div * diversity
    }
}

/// How the learner ranks genomes.
pub enum Fitness {
    /// `acc_impact * accuracy - loss_impact * loss`.
    LossWeighted {
        loss: Losses,
        acc_impact: f64,
        loss_impact: f64,
    },
    /// A pluggable scorer fed the weight matrix's diversity score.
    Diversity(Box<dyn FitnessScorer>),
}

impl Default for Fitness {
    fn default() -> Self {
        Fitness::LossWeighted {
            loss: Losses::CategoricalCrossEntropy,
            acc_impact: 0.9,
            loss_impact: 0.1,
        }
    }
}

impl Debug for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fitness::LossWeighted {
                loss,
                acc_impact,
                loss_impact,
            } => write!(
                f,
                "LossWeighted({}, acc_impact={}, loss_impact={})",
                loss, acc_impact, loss_impact
            ),
            Fitness::Diversity(_) => write!(f, "Diversity(FitnessScorer)"),
        }
    }
}

/// A genome's ranking signal plus the secondary metric tracked in history:
/// the loss when loss-weighted, the fitness itself otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub fitness: f64,
    pub metric: f64,
}

impl Fitness {
    pub fn tracks_loss(&self) -> bool {
        matches!(self, Fitness::LossWeighted { .. })
    }

    pub fn score(&self, y_true: ArrayView2<f64>, w: ArrayView2<f64>, eval: &Evaluation) -> Score {
        match self {
            Fitness::LossWeighted {
                loss,
                acc_impact,
                loss_impact,
            } => {
                let l = loss.wake().a(eval.predictions.view(), y_true);
                Score {
                    fitness: wals(eval.accuracy, l, *acc_impact, *loss_impact),
                    metric: l,
                }
            }
            Fitness::Diversity(scorer) => {
                let diversity = f::diversity_score(w);
                let fitness =
                    scorer.score(y_true, eval.predictions.view(), diversity, eval.accuracy);
                Score {
                    fitness,
                    metric: fitness,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn eval(acc: f64) -> Evaluation {
        let predictions = array![[0.8, 0.2], [0.4, 0.6]];
        Evaluation {
            raw: predictions.clone(),
            accuracy: acc,
            predictions,
        }
    }

    #[test]
    fn wals_trades_accuracy_against_loss() {
        assert!((wals(1., 0.5, 0.9, 0.1) - 0.85).abs() < 1e-12);
        assert!(wals(0.5, 0., 0.9, 0.1) > wals(0.5, 1., 0.9, 0.1));
    }

    #[test]
    fn loss_weighted_reports_loss_as_metric() {
        let y = array![[1., 0.], [0., 1.]];
        let w = array![[1., 0.], [0., 1.]];
        let score = Fitness::default().score(y.view(), w.view(), &eval(1.));
        let loss = f::categorical_cross_entropy(eval(1.).predictions.view(), y.view());
        assert!((score.metric - loss).abs() < 1e-12);
        assert!((score.fitness - (0.9 - 0.1 * loss)).abs() < 1e-12);
    }

    #[test]
    fn diversity_scorer_sees_all_four_arguments() {
        let y = array![[1., 0.], [0., 1.]];
        let w = array![[1., 0.], [0., 1.]];
        fn scorer(_: ArrayView2<f64>, p: ArrayView2<f64>, d: f64, acc: f64) -> f64 {
            acc * 10. + d + p[[0, 0]]
        }
        let fitness = Fitness::Diversity(Box::new(scorer));
        let score = fitness.score(y.view(), w.view(), &eval(0.5));
        assert!((score.fitness - (5. + 1. + 0.8)).abs() < 1e-12);
        assert_eq!(score.fitness, score.metric);
        assert!(!fitness.tracks_loss());
    }

    #[test]
    fn hybrid_confidence_prefers_confident_genomes() {
        let y = array![[1., 0.], [0., 1.]];
        let sure = array![[0.9, 0.1], [0.1, 0.9]];
        let unsure = array![[0.6, 0.4], [0.4, 0.6]];
        let h = HybridAccuracyConfidence::default();
        assert!(h.score(y.view(), sure.view(), 0., 1.) > h.score(y.view(), unsure.view(), 0., 1.));
    }
}
