use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, PlanError, Result};
use crate::f;

/// A resolved transfer function. Most activations are elementwise; a few
/// (softmax) need the whole row.
#[derive(Clone, Copy, Debug)]
pub enum Transfer {
    Elementwise(fn(f64) -> f64),
    Rowwise(fn(ArrayView2<f64>) -> Array2<f64>),
}

impl Transfer {
    pub fn a(&self, x: Array2<f64>) -> Array2<f64> {
        match self {
            Transfer::Elementwise(g) => x.mapv_into(*g),
            Transfer::Rowwise(g) => g(x.view()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Activations {
    Linear,
    Sigmoid,
    Swish,
    LeakyRelu,
    Relu,
    Softplus,
    Elu,
    Gelu,
    Selu,
    Softmax,
    Tanh,
    Sinakt,
    PSquared,
    Exsig,
    SinPlus,
    Acos,
    Isra,
    Arctan,
    BentIdentity,
    Sech,
    Softsign,
    Cubic,
    Gaussian,
    Sine,
    TanhSquare,
    Quartic,
    SineSquare,
    Logarithmic,
    SineOffset,
}

impl Activations {
    /// The full vocabulary, in seeding order.
    pub const ALL: [Activations; 29] = [
        Activations::Linear,
        Activations::Sigmoid,
        Activations::Swish,
        Activations::LeakyRelu,
        Activations::Relu,
        Activations::Softplus,
        Activations::Elu,
        Activations::Gelu,
        Activations::Selu,
        Activations::Softmax,
        Activations::Tanh,
        Activations::Sinakt,
        Activations::PSquared,
        Activations::Exsig,
        Activations::SinPlus,
        Activations::Acos,
        Activations::Isra,
        Activations::Arctan,
        Activations::BentIdentity,
        Activations::Sech,
        Activations::Softsign,
        Activations::Cubic,
        Activations::Gaussian,
        Activations::Sine,
        Activations::TanhSquare,
        Activations::Quartic,
        Activations::SineSquare,
        Activations::Logarithmic,
        Activations::SineOffset,
    ];

    pub fn all() -> &'static [Activations] {
        &Self::ALL
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activations::Linear => "linear",
            Activations::Sigmoid => "sigmoid",
            Activations::Swish => "swish",
            Activations::LeakyRelu => "leaky_relu",
            Activations::Relu => "relu",
            Activations::Softplus => "softplus",
            Activations::Elu => "elu",
            Activations::Gelu => "gelu",
            Activations::Selu => "selu",
            Activations::Softmax => "softmax",
            Activations::Tanh => "tanh",
            Activations::Sinakt => "sinakt",
            Activations::PSquared => "p_squared",
            Activations::Exsig => "exsig",
            Activations::SinPlus => "sin_plus",
            Activations::Acos => "acos",
            Activations::Isra => "isra",
            Activations::Arctan => "arctan",
            Activations::BentIdentity => "bent_identity",
            Activations::Sech => "sech",
            Activations::Softsign => "softsign",
            Activations::Cubic => "cubic",
            Activations::Gaussian => "gaussian",
            Activations::Sine => "sine",
            Activations::TanhSquare => "tanh_square",
            Activations::Quartic => "quartic",
            Activations::SineSquare => "sine_square",
            Activations::Logarithmic => "logarithmic",
            Activations::SineOffset => "sine_offset",
        }
    }

    pub fn wake(&self) -> Transfer {
        use Transfer::Elementwise as E;

        match self {
            Activations::Linear => E(f::linear),
            Activations::Sigmoid => E(f::sigmoid),
            Activations::Swish => E(f::swish),
            Activations::LeakyRelu => E(f::leaky_relu),
            Activations::Relu => E(f::relu),
            Activations::Softplus => E(f::softplus),
            Activations::Elu => E(f::elu),
            Activations::Gelu => E(f::gelu),
            Activations::Selu => E(f::selu),
            Activations::Softmax => Transfer::Rowwise(f::softmax),
            Activations::Tanh => E(f::tanh),
            Activations::Sinakt => E(f::sinakt),
            Activations::PSquared => E(f::p_squared),
            Activations::Exsig => E(f::exsig),
            Activations::SinPlus => E(f::sin_plus),
            Activations::Acos => E(f::acos),
            Activations::Isra => E(f::isra),
            Activations::Arctan => E(f::arctan),
            Activations::BentIdentity => E(f::bent_identity),
            Activations::Sech => E(f::sech),
            Activations::Softsign => E(f::softsign),
            Activations::Cubic => E(f::cubic),
            Activations::Gaussian => E(f::gaussian),
            Activations::Sine => E(f::sine),
            Activations::TanhSquare => E(f::tanh_square),
            Activations::Quartic => E(f::quartic),
            Activations::SineSquare => E(f::sine_square),
            Activations::Logarithmic => E(f::logarithmic),
            Activations::SineOffset => E(f::sine_offset),
        }
    }
}

impl fmt::Display for Activations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Activations {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        Activations::ALL
            .iter()
            .find(|a| a.name() == s)
            .copied()
            .ok_or_else(|| invalid(format!("unknown activation function '{}'", s)))
    }
}

/// An ordered, non-empty list of activations applied one after another
/// before the linear projection. Each name is resolved to its transfer
/// function when the chain is built.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Activations>", into = "Vec<Activations>")]
pub struct ActivationChain {
    names: Vec<Activations>,
    transfers: Vec<Transfer>,
}

impl ActivationChain {
    pub fn new(names: Vec<Activations>) -> Result<ActivationChain> {
        if names.is_empty() {
            return Err(invalid("activation chain must hold at least one activation"));
        }

        let transfers = names.iter().map(|a| a.wake()).collect();
        Ok(ActivationChain { names, transfers })
    }

    pub fn single(activation: Activations) -> ActivationChain {
        ActivationChain {
            names: vec![activation],
            transfers: vec![activation.wake()],
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<ActivationChain> {
        let parsed = names
            .iter()
            .map(|n| n.as_ref().parse::<Activations>())
            .collect::<Result<Vec<Activations>>>()?;
        ActivationChain::new(parsed)
    }

    pub fn names(&self) -> &[Activations] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_uniform(&self) -> bool {
        self.names.iter().all(|a| *a == self.names[0])
    }

    /// A chain of one repeated activation reports as that activation alone.
    pub fn collapsed(&self) -> ActivationChain {
        if self.is_uniform() {
            return ActivationChain::single(self.names[0]);
        }
        self.clone()
    }

    pub fn apply(&self, x: ArrayView2<f64>) -> Array2<f64> {
        self.transfers
            .iter()
            .fold(x.to_owned(), |acc, transfer| transfer.a(acc))
    }

    pub fn push(&mut self, activation: Activations) -> &mut Self {
        self.names.push(activation);
        self.transfers.push(activation.wake());
        self
    }

    /// Removes the activation at `index`. The last remaining activation is
    /// never removed.
    pub fn remove(&mut self, index: usize) -> &mut Self {
        if self.names.len() > 1 && index < self.names.len() {
            self.names.remove(index);
            self.transfers.remove(index);
        }
        self
    }

    pub fn replace(&mut self, index: usize, activation: Activations) -> &mut Self {
        if index < self.names.len() {
            self.names[index] = activation;
            self.transfers[index] = activation.wake();
        }
        self
    }
}

impl PartialEq for ActivationChain {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl fmt::Debug for ActivationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}

impl fmt::Display for ActivationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .names
            .iter()
            .map(|a| a.name())
            .collect::<Vec<&str>>()
            .join(", ");
        write!(f, "[{}]", names)
    }
}

impl From<Activations> for ActivationChain {
    fn from(activation: Activations) -> Self {
        ActivationChain::single(activation)
    }
}

impl TryFrom<Vec<Activations>> for ActivationChain {
    type Error = PlanError;

    fn try_from(names: Vec<Activations>) -> Result<Self> {
        ActivationChain::new(names)
    }
}

impl From<ActivationChain> for Vec<Activations> {
    fn from(chain: ActivationChain) -> Self {
        chain.names
    }
}
