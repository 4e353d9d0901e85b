use log::info;
use ndarray::{Array2, ArrayView1, Zip};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::population::{random_activation, Population};
use super::GeneticOperator;
use crate::activation::ActivationChain;
use crate::error::{invalid, PlanError, Result};
use crate::f;

/// How much of the ranked population survives into the next generation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Top half survives.
    Normal,
    /// Top quarter survives.
    MoreSelective,
    /// Top three quarters survive.
    LessSelective,
}

impl Strategy {
    fn survival(&self) -> f64 {
        match self {
            Strategy::Normal => 0.5,
            Strategy::MoreSelective => 0.25,
            Strategy::LessSelective => 0.75,
        }
    }
}

/// How parents are drawn from the survivors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Champion mates with a random survivor.
    Aggressive,
    /// Two random survivors.
    Explorer,
    /// Each parent wins a three-way tournament.
    MoreSelective,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CrossOver {
    /// Rank-weighted average of both parents' weights.
    Average,
    /// Each weight row copied from one parent or the other.
    RowPick,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EvolverConfig {
    pub strategy: Strategy,
    pub policy: Policy,
    pub cross_over: CrossOver,
    pub activation_add_prob: f64,
    pub activation_delete_prob: f64,
    pub activation_change_prob: f64,
    pub weight_mutate_prob: f64,
    /// Fraction of entries perturbed when weights mutate.
    pub weight_mutate_rate: f64,
    /// Noise amplitude for weight mutation.
    pub weight_mutate_power: f64,
    /// Chance a replacement genome is a mutated survivor instead of a child.
    pub bad_genomes_mutation_prob: f64,
    pub max_activations: usize,
    pub verbose: bool,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        EvolverConfig {
            strategy: Strategy::Normal,
            policy: Policy::Aggressive,
            cross_over: CrossOver::Average,
            activation_add_prob: 0.5,
            activation_delete_prob: 0.5,
            activation_change_prob: 0.5,
            weight_mutate_prob: 1.,
            weight_mutate_rate: 0.1,
            weight_mutate_power: 0.3,
            bad_genomes_mutation_prob: 0.2,
            max_activations: 8,
            verbose: false,
        }
    }
}

impl EvolverConfig {
    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("activation_add_prob", self.activation_add_prob),
            ("activation_delete_prob", self.activation_delete_prob),
            ("activation_change_prob", self.activation_change_prob),
            ("weight_mutate_prob", self.weight_mutate_prob),
            ("weight_mutate_rate", self.weight_mutate_rate),
            ("bad_genomes_mutation_prob", self.bad_genomes_mutation_prob),
        ];

        for (name, p) in probabilities {
            if !(0. ..=1.).contains(&p) {
                return Err(invalid(format!("{} must be in [0, 1], got {}", name, p)));
            }
        }

        let power = self.weight_mutate_power;
        if !(power > 0. && (2. * power).is_finite()) {
            return Err(invalid(format!(
                "weight_mutate_power must be positive and finite, got {}",
                power
            )));
        }

        if self.max_activations == 0 {
            return Err(invalid("max_activations must be at least 1"));
        }

        Ok(())
    }
}

/// The PLANEAT genetic operator: ranks a scored generation, keeps its best
/// genomes and refills the rest through crossover and mutation.
#[derive(Debug, Clone, Default)]
pub struct Evolver {
    config: EvolverConfig,
}

impl Evolver {
    pub fn new() -> Evolver {
        Evolver::default()
    }

    pub fn override_config(&mut self, config: EvolverConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.config.strategy = strategy;
        self
    }

    pub fn set_policy(&mut self, policy: Policy) -> &mut Self {
        self.config.policy = policy;
        self
    }

    pub fn set_cross_over(&mut self, cross_over: CrossOver) -> &mut Self {
        self.config.cross_over = cross_over;
        self
    }

    pub fn set_activation_add_prob(&mut self, p: f64) -> &mut Self {
        self.config.activation_add_prob = p;
        self
    }

    pub fn set_activation_delete_prob(&mut self, p: f64) -> &mut Self {
        self.config.activation_delete_prob = p;
        self
    }

    pub fn set_activation_change_prob(&mut self, p: f64) -> &mut Self {
        self.config.activation_change_prob = p;
        self
    }

    pub fn set_weight_mutation(&mut self, prob: f64, rate: f64, power: f64) -> &mut Self {
        self.config.weight_mutate_prob = prob;
        self.config.weight_mutate_rate = rate;
        self.config.weight_mutate_power = power;
        self
    }

    pub fn set_bad_genomes_mutation_prob(&mut self, p: f64) -> &mut Self {
        self.config.bad_genomes_mutation_prob = p;
        self
    }

    pub fn set_max_activations(&mut self, max: usize) -> &mut Self {
        self.config.max_activations = max;
        self
    }

    pub fn verbose(&mut self) -> &mut Self {
        self.config.verbose = true;
        self
    }

    pub fn config(&self) -> &EvolverConfig {
        &self.config
    }

    /// Population indices ordered best first. NaN scores rank last; ties keep
    /// their original order.
    fn rank(fitness: ArrayView1<f64>) -> Vec<usize> {
        let sane = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
        let mut order = (0..fitness.len()).collect::<Vec<usize>>();
        order.sort_by(|a, b| sane(fitness[*b]).total_cmp(&sane(fitness[*a])));
        order
    }

    fn pick_parent(&self, survivors: usize, rng: &mut dyn RngCore) -> usize {
        match self.config.policy {
            Policy::MoreSelective => (0..3)
                .map(|_| rng.gen_range(0..survivors))
                .min()
                .unwrap_or(0),
            _ => rng.gen_range(0..survivors),
        }
    }

    fn parents(&self, survivors: usize, rng: &mut dyn RngCore) -> (usize, usize) {
        match self.config.policy {
            Policy::Aggressive => (0, rng.gen_range(0..survivors)),
            _ => (
                self.pick_parent(survivors, rng),
                self.pick_parent(survivors, rng),
            ),
        }
    }

    fn cross_weights(
        &self,
        (w1, r1): (&Array2<f64>, usize),
        (w2, r2): (&Array2<f64>, usize),
        rng: &mut dyn RngCore,
    ) -> Array2<f64> {
        match self.config.cross_over {
            CrossOver::Average => {
                let (wx, wy) = (1. / (1. + r1 as f64), 1. / (1. + r2 as f64));
                Zip::from(w1)
                    .and(w2)
                    .map_collect(|&a, &b| f::weighted_average(a, wx, b, wy))
            }
            CrossOver::RowPick => {
                let mut child = w1.clone();
                for (mut row, donor) in child.rows_mut().into_iter().zip(w2.rows()) {
                    if rng.gen_bool(0.5) {
                        row.assign(&donor);
                    }
                }
                child
            }
        }
    }

    /// One-point crossover: a non-empty prefix of the first chain followed
    /// by a suffix of the second.
    fn cross_activations(
        &self,
        a1: &ActivationChain,
        a2: &ActivationChain,
        rng: &mut dyn RngCore,
    ) -> ActivationChain {
        let cut1 = rng.gen_range(1..=a1.len());
        let cut2 = rng.gen_range(0..=a2.len());

        let mut child = ActivationChain::single(a1.names()[0]);
        for a in a1.names()[1..cut1].iter().chain(a2.names()[cut2..].iter()) {
            if child.len() >= self.config.max_activations {
                break;
            }
            child.push(*a);
        }
        child
    }

    fn mutate_activations(&self, chain: &mut ActivationChain, rng: &mut dyn RngCore) {
        let c = &self.config;

        if rng.gen_bool(c.activation_add_prob) && chain.len() < c.max_activations {
            chain.push(random_activation(rng));
        }

        if rng.gen_bool(c.activation_delete_prob) && chain.len() > 1 {
            let ix = rng.gen_range(0..chain.len());
            chain.remove(ix);
        }

        if rng.gen_bool(c.activation_change_prob) {
            let ix = rng.gen_range(0..chain.len());
            chain.replace(ix, random_activation(rng));
        }
    }

    fn mutate_weights(&self, w: Array2<f64>, rng: &mut dyn RngCore) -> Array2<f64> {
        let c = &self.config;
        if !rng.gen_bool(c.weight_mutate_prob) {
            return w;
        }

        let power = c.weight_mutate_power;
        let noise = Array2::random_using(w.raw_dim(), Uniform::new(-power, power), rng);
        let mask = Array2::random_using(w.raw_dim(), Uniform::new(0., 1.), rng);

        let mutated = Zip::from(&w)
            .and(&noise)
            .and(&mask)
            .map_collect(|&v, &n, &m| if m < c.weight_mutate_rate { v + n } else { v });

        f::normalization(mutated)
    }
}

impl GeneticOperator for Evolver {
    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn next_generation(
        &mut self,
        population: Population,
        generation: usize,
        fitness: ArrayView1<f64>,
        rng: &mut dyn RngCore,
    ) -> Result<Population> {
        self.config.validate()?;

        let size = population.len();
        if fitness.len() != size {
            return Err(PlanError::ShapeMismatch(format!(
                "{} fitness scores for {} genomes",
                fitness.len(),
                size
            )));
        }
        if size == 0 {
            return Ok(population);
        }

        let order = Evolver::rank(fitness);
        let survivors = ((size as f64 * self.config.strategy.survival()).round() as usize)
            .max(1)
            .min(size);

        let Population {
            mut weights,
            activations,
        } = population;

        // Ranked copies of the survivors; index 0 is the champion.
        let elite_w = order[..survivors]
            .iter()
            .map(|&i| std::mem::take(&mut weights[i]))
            .collect::<Vec<Array2<f64>>>();
        let elite_a = order[..survivors]
            .iter()
            .map(|&i| activations[i].clone())
            .collect::<Vec<ActivationChain>>();

        let mut next = Population::default();
        for (w, a) in elite_w.iter().zip(elite_a.iter()) {
            next.push(w.clone(), a.clone());
        }

        let mut mutated_only = 0;
        while next.len() < size {
            let (w, mut a) = if rng.gen_bool(self.config.bad_genomes_mutation_prob) {
                mutated_only += 1;
                let ix = rng.gen_range(0..survivors);
                (elite_w[ix].clone(), elite_a[ix].clone())
            } else {
                let (p1, p2) = self.parents(survivors, rng);
                let w = self.cross_weights((&elite_w[p1], p1), (&elite_w[p2], p2), rng);
                let a = self.cross_activations(&elite_a[p1], &elite_a[p2], rng);
                (w, a)
            };

            self.mutate_activations(&mut a, rng);
            let w = self.mutate_weights(w, rng);
            next.push(w, a);
        }

        if self.config.verbose {
            info!(
                "[planeat gen {}] kept {} of {}, {} children, {} mutated survivors, champion {}",
                generation + 1,
                survivors,
                size,
                size - survivors - mutated_only,
                mutated_only,
                next.activations[0]
            );
        }

        Ok(next)
    }
}
