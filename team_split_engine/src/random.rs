use rand::{Rng, RngCore};

/// A source of uniformly distributed floats in `[0, 1)`.
///
/// Every shuffle and allocation step takes its randomness through this trait,
/// so callers decide whether teams come from `thread_rng()`, a seeded
/// generator or a fixed sequence of values.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Draws an index in `0..upper`. Values outside `[0, 1)` are clamped, so a
    /// misbehaving source can never produce an out of range index.
    fn next_index(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            // Still consume a value so the call order stays fixed.
            self.next_f64();
            return 0;
        }
        let value = self.next_f64();
        let index = (value * upper as f64).floor();
        if index.is_nan() || index < 0.0 {
            0
        } else {
            (index as usize).min(upper - 1)
        }
    }
}

impl<R> RandomSource for R
where
    R: RngCore,
{
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed sequence of values, starting over once it is exhausted.
///
/// An empty sequence always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ReplayRandom {
    values: Vec<f64>,
    position: usize,
}

impl ReplayRandom {
    pub fn new(values: Vec<f64>) -> Self {
        ReplayRandom { values, position: 0 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    pub fn draws(&self) -> usize {
        self.position
    }
}

impl RandomSource for ReplayRandom {
    fn next_f64(&mut self) -> f64 {
        let value = if self.values.is_empty() {
            0.0
        } else {
            self.values[self.position % self.values.len()]
        };
        self.position += 1;
        value
    }
}
