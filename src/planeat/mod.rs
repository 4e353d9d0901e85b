mod evolver;
mod population;

use ndarray::ArrayView1;
use rand::RngCore;

pub use evolver::{CrossOver, Evolver, EvolverConfig, Policy, Strategy};
pub use population::{define_genomes, random_activation, Population};

use crate::error::Result;

/// Turns one scored generation into the next. Implementations must return a
/// population of the same size and genome shape; `fitness[i]` scores genome `i`
/// and higher is better.
pub trait GeneticOperator {
    /// Checked once before any data is touched.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn next_generation(
        &mut self,
        population: Population,
        generation: usize,
        fitness: ArrayView1<f64>,
        rng: &mut dyn RngCore,
    ) -> Result<Population>;
}

impl<F> GeneticOperator for F
where
    F: FnMut(Population, usize, ArrayView1<f64>, &mut dyn RngCore) -> Result<Population>,
{
    fn next_generation(
        &mut self,
        population: Population,
        generation: usize,
        fitness: ArrayView1<f64>,
        rng: &mut dyn RngCore,
    ) -> Result<Population> {
        self(population, generation, fitness, rng)
    }
}
