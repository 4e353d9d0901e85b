use std::fmt::{self, Debug};
use std::rc::Rc;
use std::str::FromStr;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{invalid, PlanError, Result};
use crate::f;

/// Loss between softmax predictions and one-hot targets, reduced to a scalar.
pub trait Loss {
    fn a(&self, pred: ArrayView2<f64>, target: ArrayView2<f64>) -> f64;
}

impl Debug for dyn Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LossFn")
    }
}

pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    pub fn new() -> Rc<CategoricalCrossEntropy> {
        Rc::new(CategoricalCrossEntropy)
    }
}

impl Loss for CategoricalCrossEntropy {
    fn a(&self, pred: ArrayView2<f64>, target: ArrayView2<f64>) -> f64 {
        f::categorical_cross_entropy(pred, target)
    }
}

pub struct BinaryCrossEntropy;

impl BinaryCrossEntropy {
    pub fn new() -> Rc<BinaryCrossEntropy> {
        Rc::new(BinaryCrossEntropy)
    }
}

impl Loss for BinaryCrossEntropy {
    fn a(&self, pred: ArrayView2<f64>, target: ArrayView2<f64>) -> f64 {
        f::binary_cross_entropy(pred, target)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Losses {
    #[default]
    #[serde(rename = "categorical_crossentropy")]
    CategoricalCrossEntropy,
    #[serde(rename = "binary_crossentropy")]
    BinaryCrossEntropy,
}

impl Losses {
    pub fn wake(&self) -> Rc<dyn Loss> {
        match self {
            Losses::CategoricalCrossEntropy => CategoricalCrossEntropy::new(),
            Losses::BinaryCrossEntropy => BinaryCrossEntropy::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Losses::CategoricalCrossEntropy => "categorical_crossentropy",
            Losses::BinaryCrossEntropy => "binary_crossentropy",
        }
    }
}

impl fmt::Display for Losses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Losses {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "categorical_crossentropy" => Ok(Losses::CategoricalCrossEntropy),
            "binary_crossentropy" => Ok(Losses::BinaryCrossEntropy),
            other => Err(invalid(format!(
                "loss must be 'categorical_crossentropy' or 'binary_crossentropy', got '{}'",
                other
            ))),
        }
    }
}
