//! Uniform sources backed by `rand` generators.

use lily_hop_core::UniformSource;
use rand::Rng;

/// Adapts any `rand` generator into a [`UniformSource`].
#[derive(Clone, Debug)]
pub struct RngSource<G> {
    rng: G,
}

impl<G: Rng> RngSource<G> {
    /// Wraps the provided generator.
    #[must_use]
    pub fn new(rng: G) -> Self {
        Self { rng }
    }

    /// Unwraps the generator.
    #[must_use]
    pub fn into_inner(self) -> G {
        self.rng
    }
}

impl<G: Rng> UniformSource for RngSource<G> {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
