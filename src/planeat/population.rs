use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::{ActivationChain, Activations};
use crate::error::{PlanError, Result};
use crate::f;

/// Two index-aligned lists: genome `i` is `(weights[i], activations[i])`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Population {
    pub weights: Vec<Array2<f64>>,
    pub activations: Vec<ActivationChain>,
}

impl Population {
    pub fn new(weights: Vec<Array2<f64>>, activations: Vec<ActivationChain>) -> Result<Population> {
        if weights.len() != activations.len() {
            return Err(PlanError::ShapeMismatch(format!(
                "{} weight matrices but {} activation chains",
                weights.len(),
                activations.len()
            )));
        }
        Ok(Population {
            weights,
            activations,
        })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn genome(&self, i: usize) -> Option<(&Array2<f64>, &ActivationChain)> {
        Some((self.weights.get(i)?, self.activations.get(i)?))
    }

    pub fn set(&mut self, i: usize, weights: Array2<f64>, activations: ActivationChain) -> &mut Self {
        if i < self.len() {
            self.weights[i] = weights;
            self.activations[i] = activations;
        }
        self
    }

    pub fn push(&mut self, weights: Array2<f64>, activations: ActivationChain) -> &mut Self {
        self.weights.push(weights);
        self.activations.push(activations);
        self
    }

    /// Confirms the population has `size` aligned genomes of `C×D` weights.
    pub fn check(&self, size: usize, shape: (usize, usize)) -> Result<()> {
        if self.weights.len() != size || self.activations.len() != size {
            return Err(PlanError::Degenerate(format!(
                "expected {} genomes, got {} weights and {} activation chains",
                size,
                self.weights.len(),
                self.activations.len()
            )));
        }

        if let Some((i, w)) = self.weights.iter().enumerate().find(|(_, w)| w.dim() != shape) {
            return Err(PlanError::ShapeMismatch(format!(
                "genome {} has {:?} weights, expected {:?}",
                i,
                w.dim(),
                shape
            )));
        }

        Ok(())
    }
}

pub fn random_activation<R: Rng + ?Sized>(rng: &mut R) -> Activations {
    Activations::ALL[rng.gen_range(0..Activations::ALL.len())]
}

/// A random starting population: normalized uniform weights shaped
/// `output_shape × input_shape` and one random activation each.
pub fn define_genomes<R: Rng + ?Sized>(
    input_shape: usize,
    output_shape: usize,
    population_size: usize,
    rng: &mut R,
) -> Population {
    let mut population = Population::default();

    for _ in 0..population_size {
        let w = Array2::random_using((output_shape, input_shape), Uniform::new(-1., 1.), rng);
        population.push(
            f::normalization(w),
            ActivationChain::single(random_activation(rng)),
        );
    }

    population
}
