mod champion;
mod context;
mod history;
mod hyper;
mod observer;

use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView2};

pub use champion::{BestSoFar, Champion};
pub use context::TrainingContext;
pub use history::History;
pub use hyper::LearnerHyper;
pub use observer::{ActivationLog, HistoryPlot, Observer, ProgressLog};

use crate::activation::{ActivationChain, Activations};
use crate::data::{batcher, check_dataset, optimize_labels, Memory};
use crate::error::{invalid, PlanError, Result};
use crate::fitness::{Fitness, FitnessScorer};
use crate::loss::Losses;
use crate::model::{evaluate, fit, Model};
use crate::planeat::{define_genomes, Evolver, GeneticOperator};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stop {
    TargetAccuracy,
    TargetLoss,
    EarlyStop,
    Exhausted,
}

/// Generational PLANEAT driver. Evolves weight matrices and activation chains,
/// scoring each genome with a single-shot fit and evaluation, and returns the
/// best genome it saw.
///
/// ```no_run
/// use ndarray::array;
/// use plan::learner::{Learner, ProgressLog};
///
/// let x = array![[1., 0.1], [0.9, 0.2], [0.1, 1.], [0.2, 0.8]];
/// let y = array![[1., 0.], [1., 0.], [0., 1.], [0., 1.]];
///
/// let model = Learner::default()
///     .set_generations(5)
///     .set_target_acc(1.)
///     .add_observer(ProgressLog)
///     .learn(x.view(), y.view())
///     .unwrap();
/// ```
pub struct Learner {
    hyper: LearnerHyper,
    fitness: Fitness,
    operator: Box<dyn GeneticOperator>,
    observers: Vec<Box<dyn Observer>>,
    start: Option<(Array2<f64>, ActivationChain)>,
}

impl Default for Learner {
    fn default() -> Self {
        Learner::new(Evolver::new())
    }
}

impl Learner {
    pub fn new(operator: impl GeneticOperator + 'static) -> Learner {
        Learner {
            hyper: LearnerHyper::new(),
            fitness: Fitness::default(),
            operator: Box::new(operator),
            observers: vec![],
            start: None,
        }
    }

    pub fn override_hyper(&mut self, hyper: LearnerHyper) -> &mut Self {
        self.hyper = hyper;
        self
    }

    pub fn hyper(&self) -> &LearnerHyper {
        &self.hyper
    }

    pub fn set_generations(&mut self, generations: usize) -> &mut Self {
        self.hyper.generations = Some(generations);
        self
    }

    pub fn set_batch_size(&mut self, batch_size: f64) -> &mut Self {
        self.hyper.batch_size = batch_size;
        self
    }

    pub fn set_pop_size(&mut self, pop_size: usize) -> &mut Self {
        self.hyper.pop_size = Some(pop_size);
        self
    }

    pub fn set_fit_start(&mut self, fit_start: bool) -> &mut Self {
        self.hyper.fit_start = fit_start;
        self
    }

    pub fn set_early_stop(&mut self, early_stop: bool) -> &mut Self {
        self.hyper.early_stop = early_stop;
        self
    }

    pub fn set_target_acc(&mut self, target_acc: f64) -> &mut Self {
        self.hyper.target_acc = Some(target_acc);
        self
    }

    pub fn set_target_loss(&mut self, target_loss: f64) -> &mut Self {
        self.hyper.target_loss = Some(target_loss);
        self
    }

    pub fn set_auto_normalization(&mut self, auto_normalization: bool) -> &mut Self {
        self.hyper.auto_normalization = auto_normalization;
        self
    }

    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.hyper.seed = Some(seed);
        self
    }

    /// `"cpu"` or `"gpu"`.
    pub fn set_memory(&mut self, memory: &str) -> Result<&mut Self> {
        self.hyper.memory = memory.parse::<Memory>()?;
        Ok(self)
    }

    /// `"categorical_crossentropy"` or `"binary_crossentropy"`. Switches a
    /// diversity-scored learner back to loss-weighted fitness.
    pub fn set_loss(&mut self, loss: &str) -> Result<&mut Self> {
        let parsed = loss.parse::<Losses>()?;
        match &mut self.fitness {
            Fitness::LossWeighted { loss, .. } => *loss = parsed,
            Fitness::Diversity(_) => {
                self.fitness = Fitness::LossWeighted {
                    loss: parsed,
                    acc_impact: 0.9,
                    loss_impact: 0.1,
                }
            }
        }
        Ok(self)
    }

    pub fn set_impacts(&mut self, acc_impact: f64, loss_impact: f64) -> &mut Self {
        let loss = match &self.fitness {
            Fitness::LossWeighted { loss, .. } => *loss,
            Fitness::Diversity(_) => Losses::default(),
        };
        self.fitness = Fitness::LossWeighted {
            loss,
            acc_impact,
            loss_impact,
        };
        self
    }

    pub fn set_fitness(&mut self, fitness: Fitness) -> &mut Self {
        self.fitness = fitness;
        self
    }

    /// Scores genomes with `scorer(y_true, y_pred, diversity, accuracy)`.
    pub fn set_fitness_fn<F>(&mut self, scorer: F) -> &mut Self
    where
        F: Fn(ArrayView2<f64>, ArrayView2<f64>, f64, f64) -> f64 + 'static,
    {
        self.fitness = Fitness::Diversity(Box::new(scorer));
        self
    }

    pub fn set_scorer(&mut self, scorer: impl FitnessScorer + 'static) -> &mut Self {
        self.fitness = Fitness::Diversity(Box::new(scorer));
        self
    }

    /// Puts this genome at population index 0 of generation 0 instead of a
    /// fitted or random one.
    pub fn start_from(&mut self, weights: Array2<f64>, activations: ActivationChain) -> &mut Self {
        self.start = Some((weights, activations));
        self
    }

    pub fn add_observer(&mut self, observer: impl Observer + 'static) -> &mut Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Full-dataset accuracy and loss (or fitness) of a genome.
    fn full_evaluation(
        &self,
        x: ArrayView2<f64>,
        y: ArrayView2<f64>,
        weights: &Array2<f64>,
        activations: &ActivationChain,
    ) -> Result<(f64, f64)> {
        let eval = evaluate(x, y, weights.view(), activations)?;
        let score = self.fitness.score(y, weights.view(), &eval);
        Ok((eval.accuracy, score.metric))
    }

    fn reached_target(&self, champion: &Champion) -> Option<Stop> {
        if let Some(target) = self.hyper.target_acc {
            if champion.accuracy >= target {
                return Some(Stop::TargetAccuracy);
            }
        }

        if let Some(target) = self.hyper.target_loss {
            if champion.metric <= target {
                return Some(Stop::TargetLoss);
            }
        }

        None
    }

    pub fn learn(&mut self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<Model> {
        let (generations, pop_size) = self.hyper.resolve(&self.fitness)?;
        self.operator.validate()?;
        check_dataset(x, y)?;
        if x.nrows() == 0 {
            return Err(invalid("training set is empty"));
        }

        let hyper = self.hyper.clone();
        let y = optimize_labels(y, hyper.memory);
        let y = y.view();
        let (classes, features) = (y.ncols(), x.ncols());

        if let Some((w, _)) = &self.start {
            if w.dim() != (classes, features) {
                return Err(PlanError::ShapeMismatch(format!(
                    "start genome weights are {:?}, expected {:?}",
                    w.dim(),
                    (classes, features)
                )));
            }
        }

        info!(
            "learning {} samples, {} features, {} classes: {} generations of {} genomes ({} memory)",
            x.nrows(),
            features,
            classes,
            generations,
            pop_size,
            hyper.memory
        );

        let mut observers = std::mem::take(&mut self.observers);
        let result = self.run(x, y, generations, pop_size, &hyper, &mut observers);
        self.observers = observers;
        result
    }

    fn run(
        &mut self,
        x: ArrayView2<f64>,
        y: ArrayView2<f64>,
        generations: usize,
        pop_size: usize,
        hyper: &LearnerHyper,
        observers: &mut [Box<dyn Observer>],
    ) -> Result<Model> {
        let mut ctx = TrainingContext::new(hyper.seed, observers);
        let (classes, features) = (y.ncols(), x.ncols());
        let vocabulary = Activations::all();

        let mut population = define_genomes(features, classes, pop_size, ctx.rng());
        let seeded = self.start.is_some();
        if let Some((w, a)) = &self.start {
            population.set(0, w.clone(), a.clone());
        }

        let mut best = BestSoFar::default();
        let mut history = History::named(match self.fitness.tracks_loss() {
            true => "loss",
            false => "fitness",
        });
        let mut stop = Stop::Exhausted;

        'generations: for generation in 0..generations {
            ctx.generation_start(generation, generations);
            let mut fitness = Vec::with_capacity(pop_size);

            for j in 0..pop_size {
                let batch = batcher(x.view(), y.view(), hyper.batch_size, ctx.rng())?;

                let warm = hyper.fit_start && generation == 0 && j < vocabulary.len();
                if warm && !(seeded && j == 0) {
                    let chain = ActivationChain::single(vocabulary[j]);
                    let w = fit(
                        batch.x.view(),
                        batch.y.view(),
                        &chain,
                        None,
                        hyper.auto_normalization,
                    )?;
                    population.set(j, w, chain);
                }

                let (w, a) = population
                    .genome(j)
                    .ok_or_else(|| PlanError::Degenerate(format!("genome {} is missing", j)))?;
                let eval = evaluate(batch.x.view(), batch.y.view(), w.view(), a)?;
                let score = self.fitness.score(batch.y.view(), w.view(), &eval);
                fitness.push(score.fitness);

                debug!(
                    "[gen {} genome {}] {} accuracy = {:.4}, fitness = {:.4}",
                    generation + 1,
                    j,
                    a,
                    eval.accuracy,
                    score.fitness
                );

                if best.offer(score, w, a, &eval) {
                    if let Some(champion) = best.champion() {
                        ctx.new_best(generation, champion);
                        if let Some(reason) = self.reached_target(champion) {
                            stop = reason;
                            break 'generations;
                        }
                    }
                }
            }

            let champion = best.champion().ok_or_else(|| {
                PlanError::Degenerate(format!(
                    "no genome produced a comparable fitness in generation {}",
                    generation + 1
                ))
            })?;

            let (acc, metric) = match hyper.batch_size == 1. {
                true => (champion.accuracy, champion.metric),
                false => self.full_evaluation(x, y, &champion.weights, &champion.activations)?,
            };
            history.push(acc, metric);
            ctx.generation_end(generation, &history);

            population = self.operator.next_generation(
                population,
                generation,
                Array1::from(fitness).view(),
                ctx.rng(),
            )?;
            population.check(pop_size, (classes, features))?;

            if hyper.early_stop && history.stalled() {
                stop = Stop::EarlyStop;
                break;
            }
        }

        let champion = best.into_champion().ok_or_else(|| {
            PlanError::Degenerate("no genome produced a comparable fitness".to_string())
        })?;

        let (final_accuracy, final_loss) =
            self.full_evaluation(x, y, &champion.weights, &champion.activations)?;

        match stop {
            Stop::Exhausted => info!("finished all {} generations", generations),
            reason => warn!("stopping early: {:?}", reason),
        }
        info!(
            "best activations {}, train accuracy = {:.4}, train loss = {:.4} ({:.2}s)",
            champion.activations,
            final_accuracy,
            final_loss,
            ctx.elapsed_secs()
        );

        let model = Model {
            weights: champion.weights,
            activations: champion.activations,
            accuracy: champion.accuracy,
            predictions: champion.predictions,
            final_accuracy,
            final_loss,
            history,
        };

        ctx.finish(&model);
        Ok(model)
    }
}
