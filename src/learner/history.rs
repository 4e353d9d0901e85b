use serde::{Deserialize, Serialize};

/// One entry per completed generation: the best accuracy and the matching
/// loss (or fitness, when scoring by diversity).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct History {
    pub accuracy: Vec<f64>,
    pub metric: Vec<f64>,
    /// What `metric` holds, `"loss"` or `"fitness"`.
    #[serde(default)]
    pub metric_name: String,
}

impl History {
    pub fn named(metric_name: &str) -> History {
        History {
            metric_name: metric_name.to_string(),
            ..History::default()
        }
    }

    pub fn metric_name(&self) -> &str {
        match self.metric_name.as_str() {
            "" => "metric",
            name => name,
        }
    }

    pub fn push(&mut self, accuracy: f64, metric: f64) -> &mut Self {
        self.accuracy.push(accuracy);
        self.metric.push(metric);
        self
    }

    pub fn len(&self) -> usize {
        self.accuracy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accuracy.is_empty()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.accuracy.last()?, *self.metric.last()?))
    }

    /// The last two generations recorded the exact same accuracy.
    pub fn stalled(&self) -> bool {
        match self.accuracy.as_slice() {
            [.., prev, last] => prev == last,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stalls_only_on_exact_repeat() {
        let mut h = History::default();
        assert!(!h.stalled());
        h.push(0.5, 1.);
        assert!(!h.stalled());
        h.push(0.75, 0.8);
        assert!(!h.stalled());
        h.push(0.75, 0.7);
        assert!(h.stalled());
        assert_eq!(h.last(), Some((0.75, 0.7)));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn unnamed_metric_reads_neutrally() {
        assert_eq!(History::default().metric_name(), "metric");
        assert_eq!(History::named("fitness").metric_name(), "fitness");
    }
}
