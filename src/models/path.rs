use crate::models::NormalSource;
use crate::state::TimeGrid;

/// Exact GBM path generator.
///
/// S_i = S_{i-1} * exp((r - sigma^2/2) dt + sigma sqrt(dt) Z_i)
///
/// Log-returns are exactly normal, so the step size adds no
/// discretisation bias. Drift and diffusion per step are precomputed.
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator {
    spot: f64,
    drift_per_step: f64,
    vol_per_step: f64,
    n_steps: usize,
}

impl PathGenerator {
    pub fn new(spot: f64, rate: f64, sigma: f64, grid: &TimeGrid) -> Self {
        let dt = grid.dt();
        Self {
            spot,
            drift_per_step: (rate - 0.5 * sigma * sigma) * dt,
            vol_per_step: sigma * dt.sqrt(),
            n_steps: grid.n_steps(),
        }
    }

    /// One path of n_steps + 1 prices, consuming exactly n_steps draws.
    pub fn generate<N: NormalSource + ?Sized>(&self, source: &mut N) -> Vec<f64> {
        let mut path = Vec::with_capacity(self.n_steps + 1);
        path.push(self.spot);

        let mut s = self.spot;
        for _ in 0..self.n_steps {
            let z = source.next_normal();
            s *= (self.drift_per_step + self.vol_per_step * z).exp();
            path.push(s);
        }

        path
    }
}
