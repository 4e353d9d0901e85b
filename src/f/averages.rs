/// Weighted mean of two values. Falls back to the plain mean when the
/// weights cancel out.
pub fn weighted_average(x: f64, wx: f64, y: f64, wy: f64) -> f64 {
    let total = wx + wy;
    if total.abs() < f64::EPSILON {
        return (x + y) / 2.;
    }
    ((x * wx) + (y * wy)) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_pull_towards_heavier_side() {
        assert_eq!(weighted_average(0., 1., 10., 3.), 7.5);
        assert_eq!(weighted_average(2., 0., 4., 0.), 3.);
    }
}
