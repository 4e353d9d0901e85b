use std::fmt;
use std::str::FromStr;

use log::trace;
use ndarray::{Array2, ArrayView2, Axis, CowArray, Ix2};
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, PlanError, Result};

/// Where the training set is meant to live. The host backend computes in
/// main memory either way; the mode is validated and reported.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Memory {
    #[default]
    Cpu,
    Gpu,
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memory::Cpu => write!(f, "cpu"),
            Memory::Gpu => write!(f, "gpu"),
        }
    }
}

impl FromStr for Memory {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(Memory::Cpu),
            "gpu" => Ok(Memory::Gpu),
            other => Err(invalid(format!(
                "memory parameter must be 'cpu' or 'gpu', got '{}'",
                other
            ))),
        }
    }
}

/// An index-aligned slice of the training set. Borrows the full set when no
/// sampling happened.
pub struct TrainChunk<'a> {
    pub x: CowArray<'a, f64, Ix2>,
    pub y: CowArray<'a, f64, Ix2>,
}

impl<'a> TrainChunk<'a> {
    pub fn full(x: ArrayView2<'a, f64>, y: ArrayView2<'a, f64>) -> TrainChunk<'a> {
        TrainChunk {
            x: CowArray::from(x),
            y: CowArray::from(y),
        }
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }
}

pub fn check_dataset(x: ArrayView2<f64>, y: ArrayView2<f64>) -> Result<()> {
    if x.nrows() != y.nrows() {
        return Err(PlanError::ShapeMismatch(format!(
            "x_train and y_train must have the same length ({} != {})",
            x.nrows(),
            y.nrows()
        )));
    }
    Ok(())
}

pub fn check_batch_size(batch_size: f64) -> Result<()> {
    if !(batch_size > 0. && batch_size <= 1.) {
        return Err(invalid(format!(
            "batch_size must be in (0, 1], got {}",
            batch_size
        )));
    }
    Ok(())
}

/// Draws a uniform sample holding `batch_size` of the rows, without
/// replacement. `batch_size == 1` hands back the full set.
pub fn batcher<'a, R: Rng + ?Sized>(
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
    batch_size: f64,
    rng: &mut R,
) -> Result<TrainChunk<'a>> {
    check_dataset(x, y)?;
    check_batch_size(batch_size)?;

    if batch_size == 1. {
        return Ok(TrainChunk::full(x, y));
    }

    let rows = x.nrows();
    let take = ((rows as f64 * batch_size).floor() as usize).max(1).min(rows);
    let picked = index::sample(rng, rows, take).into_vec();

    trace!("sampled {} of {} training rows", take, rows);

    Ok(TrainChunk {
        x: CowArray::from(x.select(Axis(0), &picked)),
        y: CowArray::from(y.select(Axis(0), &picked)),
    })
}

/// Copies labels into a contiguous row-major block ready for the evaluator.
pub fn optimize_labels(y: ArrayView2<f64>, memory: Memory) -> Array2<f64> {
    trace!("placing {} label rows in {} memory", y.nrows(), memory);
    y.as_standard_layout().into_owned()
}
