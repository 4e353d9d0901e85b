use std::time::Instant;

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Champion, History, Observer};
use crate::error::{PlanError, Result};
use crate::model::Model;

/// Per-run state that is not part of the numerics: the randomness source and
/// the observers. Lives for exactly one `Learner::learn` call.
pub struct TrainingContext<'a> {
    rng: StdRng,
    observers: &'a mut [Box<dyn Observer>],
    started: Instant,
}

impl<'a> TrainingContext<'a> {
    pub fn new(seed: Option<u64>, observers: &'a mut [Box<dyn Observer>]) -> TrainingContext<'a> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        TrainingContext {
            rng,
            observers,
            started: Instant::now(),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn notify(&mut self, hook: &str, mut call: impl FnMut(&mut Box<dyn Observer>) -> Result<()>) {
        for observer in self.observers.iter_mut() {
            if let Err(e) = call(observer) {
                let e = match e {
                    PlanError::VisualizationFailure(_) => e,
                    other => PlanError::VisualizationFailure(other.to_string()),
                };
                warn!("{} observer failed, continuing: {}", hook, e);
            }
        }
    }

    pub fn generation_start(&mut self, generation: usize, generations: usize) {
        self.notify("generation start", |o| {
            o.on_generation_start(generation, generations)
        });
    }

    pub fn new_best(&mut self, generation: usize, champion: &Champion) {
        self.notify("new best", |o| o.on_new_best(generation, champion));
    }

    pub fn generation_end(&mut self, generation: usize, history: &History) {
        self.notify("generation end", |o| o.on_generation_end(generation, history));
    }

    pub fn finish(&mut self, model: &Model) {
        self.notify("finish", |o| o.on_finish(model));
    }
}
