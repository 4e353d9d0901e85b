use ndarray::Array2;

use crate::activation::ActivationChain;
use crate::fitness::Score;
use crate::model::Evaluation;

/// The best genome seen so far and the evaluation that made it best.
#[derive(Clone, Debug)]
pub struct Champion {
    pub weights: Array2<f64>,
    /// Stored collapsed.
    pub activations: ActivationChain,
    pub accuracy: f64,
    /// Loss, or fitness when scoring by diversity.
    pub metric: f64,
    pub fitness: f64,
    pub predictions: Array2<f64>,
}

/// Single-writer best-so-far record. Starts empty, with an implied fitness
/// of negative infinity.
#[derive(Default, Debug)]
pub struct BestSoFar {
    champion: Option<Champion>,
}

impl BestSoFar {
    pub fn fitness(&self) -> f64 {
        self.champion
            .as_ref()
            .map_or(f64::NEG_INFINITY, |c| c.fitness)
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn into_champion(self) -> Option<Champion> {
        self.champion
    }

    /// Records the genome when its fitness is at least the incumbent's, so a
    /// later genome wins a tie. Returns whether it was recorded.
    pub fn offer(
        &mut self,
        score: Score,
        weights: &Array2<f64>,
        activations: &ActivationChain,
        eval: &Evaluation,
    ) -> bool {
        if !(score.fitness >= self.fitness()) {
            return false;
        }

        self.champion = Some(Champion {
            weights: weights.clone(),
            activations: activations.collapsed(),
            accuracy: eval.accuracy,
            metric: score.metric,
            fitness: score.fitness,
            predictions: eval.predictions.clone(),
        });
        true
    }
}
