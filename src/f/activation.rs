use std::f64::consts::{E, PI};

pub fn linear(x: f64) -> f64 {
    x
}

pub fn relu(x: f64) -> f64 {
    if x < 0. {
        return 0.;
    }
    x
}

pub fn leaky_relu(x: f64) -> f64 {
    if x < 0. {
        return 0.01 * x;
    }
    x
}

pub fn elu(x: f64) -> f64 {
    if x < 0. {
        return x.exp() - 1.;
    }
    x
}

pub fn selu(x: f64) -> f64 {
    const LAMBDA: f64 = 1.050_700_987_355_480_5;
    const ALPHA: f64 = 1.673_263_242_354_377_3;

    if x < 0. {
        return LAMBDA * ALPHA * (x.exp() - 1.);
    }
    LAMBDA * x
}

pub fn sigmoid(x: f64) -> f64 {
    1. / (1. + E.powf(-x))
}

pub fn swish(x: f64) -> f64 {
    x * sigmoid(x)
}

pub fn softplus(x: f64) -> f64 {
    // ln(1 + e^x) without overflowing for large x
    x.max(0.) + (-x.abs()).exp().ln_1p()
}

pub fn gelu(x: f64) -> f64 {
    0.5 * x * (1. + ((2. / PI).sqrt() * (x + 0.044715 * x.powi(3))).tanh())
}

pub fn tanh(x: f64) -> f64 {
    x.tanh()
}

pub fn sinakt(x: f64) -> f64 {
    x.sin() + x.cos()
}

pub fn p_squared(x: f64) -> f64 {
    x.powi(2)
}

pub fn exsig(x: f64) -> f64 {
    1. / (1. + (-x.powi(2)).exp())
}

pub fn sin_plus(x: f64) -> f64 {
    (x.sin() + 1.) / 2.
}

pub fn acos(x: f64) -> f64 {
    x.clamp(-1., 1.).acos()
}

pub fn isra(x: f64) -> f64 {
    x / (1. + x.powi(2)).sqrt()
}

pub fn arctan(x: f64) -> f64 {
    x.atan()
}

pub fn bent_identity(x: f64) -> f64 {
    ((x.powi(2) + 1.).sqrt() - 1.) / 2. + x
}

pub fn sech(x: f64) -> f64 {
    1. / x.cosh()
}

pub fn softsign(x: f64) -> f64 {
    x / (1. + x.abs())
}

pub fn cubic(x: f64) -> f64 {
    x.powi(3)
}

pub fn gaussian(x: f64) -> f64 {
    (-x.powi(2)).exp()
}

pub fn sine(x: f64) -> f64 {
    x.sin()
}

pub fn tanh_square(x: f64) -> f64 {
    x.tanh().powi(2)
}

pub fn quartic(x: f64) -> f64 {
    x.powi(4)
}

pub fn sine_square(x: f64) -> f64 {
    x.sin().powi(2)
}

pub fn logarithmic(x: f64) -> f64 {
    (x.powi(2) + 1.).ln()
}

pub fn sine_offset(x: f64) -> f64 {
    x.sin() + 1.
}
