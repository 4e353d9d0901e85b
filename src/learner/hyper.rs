use serde::{Deserialize, Serialize};

use crate::activation::Activations;
use crate::data::{check_batch_size, Memory};
use crate::error::{invalid, Result};
use crate::fitness::Fitness;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LearnerHyper {
    /// Defaults to the activation vocabulary size.
    pub generations: Option<usize>,
    /// Fraction of the training set each genome is scored on.
    pub batch_size: f64,
    /// Defaults to the activation vocabulary size.
    pub pop_size: Option<usize>,
    /// Warm-start generation 0 with one fitted genome per base activation.
    pub fit_start: bool,
    pub early_stop: bool,
    pub target_acc: Option<f64>,
    pub target_loss: Option<f64>,
    pub auto_normalization: bool,
    pub memory: Memory,
    pub seed: Option<u64>,
}

impl Default for LearnerHyper {
    fn default() -> Self {
        LearnerHyper::new()
    }
}

impl LearnerHyper {
    pub fn new() -> LearnerHyper {
        LearnerHyper {
            generations: None,
            batch_size: 1.,
            pop_size: None,
            fit_start: true,
            early_stop: false,
            target_acc: None,
            target_loss: None,
            auto_normalization: false,
            memory: Memory::Cpu,
            seed: None,
        }
    }

    /// Checks every knob before any data is touched and resolves the
    /// defaulted counts into `(generations, pop_size)`.
    pub fn resolve(&self, fitness: &Fitness) -> Result<(usize, usize)> {
        let vocabulary = Activations::all().len();
        let generations = self.generations.unwrap_or(vocabulary);
        let pop_size = self.pop_size.unwrap_or(vocabulary);

        if generations == 0 {
            return Err(invalid("generations must be at least 1"));
        }

        if pop_size == 0 {
            return Err(invalid("pop_size must be at least 1"));
        }

        if self.fit_start && pop_size < vocabulary {
            return Err(invalid(format!(
                "pop_size must be higher or equal to {} when fit_start is set, got {}",
                vocabulary, pop_size
            )));
        }

        check_batch_size(self.batch_size)?;

        if let Some(acc) = self.target_acc {
            if !(0. ..=1.).contains(&acc) {
                return Err(invalid(format!(
                    "target_acc must be in range 0 and 1, got {}",
                    acc
                )));
            }
        }

        if let Some(loss) = self.target_loss {
            if loss.is_nan() {
                return Err(invalid("target_loss must be a number"));
            }
            if !fitness.tracks_loss() {
                return Err(invalid(
                    "target_loss needs a loss-weighted fitness, diversity scoring tracks no loss",
                ));
            }
        }

        Ok((generations, pop_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::fitness::HybridAccuracyConfidence;

    #[test]
    fn defaults_follow_vocabulary() {
        let (gens, pop) = LearnerHyper::new().resolve(&Fitness::default()).unwrap();
        assert_eq!(gens, Activations::all().len());
        assert_eq!(pop, Activations::all().len());
    }

    #[test]
    fn small_population_needs_random_start() {
        let mut hyper = LearnerHyper::new();
        hyper.pop_size = Some(4);
        assert!(matches!(
            hyper.resolve(&Fitness::default()),
            Err(PlanError::InvalidArgument(_))
        ));

        hyper.fit_start = false;
        assert_eq!(hyper.resolve(&Fitness::default()).unwrap().1, 4);
    }

    #[test]
    fn out_of_range_knobs_are_rejected() {
        let fitness = Fitness::default();
        let bad = [
            LearnerHyper {
                target_acc: Some(1.2),
                ..LearnerHyper::new()
            },
            LearnerHyper {
                target_acc: Some(-0.1),
                ..LearnerHyper::new()
            },
            LearnerHyper {
                batch_size: 0.,
                ..LearnerHyper::new()
            },
            LearnerHyper {
                generations: Some(0),
                ..LearnerHyper::new()
            },
        ];

        for hyper in bad.iter() {
            assert!(matches!(
                hyper.resolve(&fitness),
                Err(PlanError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn target_loss_requires_loss_fitness() {
        let hyper = LearnerHyper {
            target_loss: Some(0.1),
            ..LearnerHyper::new()
        };
        assert!(hyper.resolve(&Fitness::default()).is_ok());

        let diversity = Fitness::Diversity(Box::new(HybridAccuracyConfidence::default()));
        assert!(hyper.resolve(&diversity).is_err());
    }

    #[test]
    fn hyper_round_trips_through_json() {
        let hyper = LearnerHyper {
            seed: Some(42),
            memory: Memory::Gpu,
            ..LearnerHyper::new()
        };
        let json = serde_json::to_string(&hyper).unwrap();
        assert!(json.contains("\"gpu\""));
        assert_eq!(serde_json::from_str::<LearnerHyper>(&json).unwrap(), hyper);
    }
}
