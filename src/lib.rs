pub mod activation;
pub mod data;
mod error;
pub mod f;
pub mod fitness;
pub mod learner;
pub mod loss;
pub mod model;
pub mod planeat;

pub use activation::{ActivationChain, Activations};
pub use data::Memory;
pub use error::{PlanError, Result};
pub use fitness::{Fitness, FitnessScorer, HybridAccuracyConfidence};
pub use learner::{Learner, LearnerHyper};
pub use loss::Losses;
pub use model::{evaluate, fit, predict, Evaluation, Model};
pub use planeat::{Evolver, GeneticOperator, Population};

pub type Dataset = (Vec<Vec<f64>>, Vec<Vec<f64>>);
