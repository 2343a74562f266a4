use crate::errors::{EngineError, EngineResult};

// ── Simulation Inputs ──

/// The seven scalar inputs of one hedging run.
/// Copy, passed by value into the engine and never mutated during a run.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationParameters {
    /// Initial underlying price S0
    pub spot: f64,
    /// Strike K
    pub strike: f64,
    /// Maturity T in years
    pub maturity: f64,
    /// Continuously compounded risk-free rate r
    pub rate: f64,
    /// Volatility sigma
    pub sigma: f64,
    pub n_steps: usize,
    /// Number of calls sold and hedged
    pub n_options: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            spot: 100.0,
            strike: 100.0,
            maturity: 1.0,
            rate: 0.05,
            sigma: 0.2,
            n_steps: 252,
            n_options: 100,
        }
    }
}

impl SimulationParameters {
    /// Reject inputs that leave the recurrence undefined.
    /// Called before any path is drawn.
    pub fn validate(&self) -> EngineResult<()> {
        positive("spot", self.spot)?;
        positive("strike", self.strike)?;
        positive("maturity", self.maturity)?;
        positive("sigma", self.sigma)?;

        if !self.rate.is_finite() {
            return Err(EngineError::InvalidParameter(format!(
                "rate must be finite, got {}",
                self.rate
            )));
        }

        if self.n_steps < 1 {
            return Err(EngineError::InvalidParameter(
                "n_steps must be at least 1".into(),
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn grid(&self) -> TimeGrid {
        TimeGrid::new(self.maturity, self.n_steps)
    }
}

fn positive(name: &str, value: f64) -> EngineResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

// ── Time Grid ──

/// Uniform grid t_i = i * dt for i in 0..=n_steps. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TimeGrid {
    maturity: f64,
    n_steps: usize,
    dt: f64,
}

impl TimeGrid {
    pub fn new(maturity: f64, n_steps: usize) -> Self {
        Self {
            maturity,
            n_steps,
            dt: maturity / n_steps as f64,
        }
    }

    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of grid points (n_steps + 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.n_steps + 1
    }

    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.dt
    }

    /// Remaining time to maturity T - i*dt.
    #[inline]
    pub fn remaining(&self, step: usize) -> f64 {
        self.maturity - step as f64 * self.dt
    }

    #[inline]
    pub fn is_expiry(&self, step: usize) -> bool {
        step == self.n_steps
    }

    pub fn points(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.time_at(i)).collect()
    }
}

// ── Simulation Output ──

/// Six parallel series indexed by grid step, each of length n_steps + 1.
/// Only the engine can build one; callers get read-only slices.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimulationResult {
    grid: TimeGrid,
    stock_price: Vec<f64>,
    option_price: Vec<f64>,
    delta: Vec<f64>,
    portfolio_value: Vec<f64>,
    cash_position: Vec<f64>,
    hedge_error: Vec<f64>,
}

impl SimulationResult {
    pub(crate) fn from_series(
        grid: TimeGrid,
        stock_price: Vec<f64>,
        option_price: Vec<f64>,
        delta: Vec<f64>,
        portfolio_value: Vec<f64>,
        cash_position: Vec<f64>,
        hedge_error: Vec<f64>,
    ) -> Self {
        debug_assert!([
            stock_price.len(),
            option_price.len(),
            delta.len(),
            portfolio_value.len(),
            cash_position.len(),
            hedge_error.len(),
        ]
        .iter()
        .all(|&n| n == grid.len()));

        Self {
            grid,
            stock_price,
            option_price,
            delta,
            portfolio_value,
            cash_position,
            hedge_error,
        }
    }

    #[inline]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stock_price.len()
    }

    pub fn stock_price(&self) -> &[f64] {
        &self.stock_price
    }

    pub fn option_price(&self) -> &[f64] {
        &self.option_price
    }

    pub fn delta(&self) -> &[f64] {
        &self.delta
    }

    pub fn portfolio_value(&self) -> &[f64] {
        &self.portfolio_value
    }

    pub fn cash_position(&self) -> &[f64] {
        &self.cash_position
    }

    pub fn hedge_error(&self) -> &[f64] {
        &self.hedge_error
    }

    /// Values at the last grid point.
    pub fn terminal(&self) -> TerminalState {
        let last = self.len() - 1;
        TerminalState {
            stock_price: self.stock_price[last],
            option_price: self.option_price[last],
            delta: self.delta[last],
            portfolio_value: self.portfolio_value[last],
            cash_position: self.cash_position[last],
            hedge_error: self.hedge_error[last],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TerminalState {
    pub stock_price: f64,
    pub option_price: f64,
    pub delta: f64,
    pub portfolio_value: f64,
    pub cash_position: f64,
    pub hedge_error: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = SimulationParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.n_steps, 252);
        assert_eq!(params.n_options, 100);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let base = SimulationParameters::default();
        let cases = [
            SimulationParameters { spot: 0.0, ..base },
            SimulationParameters { strike: -1.0, ..base },
            SimulationParameters { maturity: 0.0, ..base },
            SimulationParameters { sigma: 0.0, ..base },
            SimulationParameters { sigma: f64::NAN, ..base },
            SimulationParameters { rate: f64::INFINITY, ..base },
            SimulationParameters { n_steps: 0, ..base },
        ];

        for params in cases {
            let err = params.validate();
            assert!(
                matches!(err, Err(EngineError::InvalidParameter(_))),
                "{params:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_zero_options_is_valid() {
        let params = SimulationParameters { n_options: 0, ..Default::default() };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_grid_points() {
        let grid = TimeGrid::new(1.0, 4);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.dt(), 0.25);
        assert_eq!(grid.points(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(grid.remaining(0), 1.0);
        assert_eq!(grid.remaining(4), 0.0);
        assert!(grid.is_expiry(4));
        assert!(!grid.is_expiry(3));
    }
}
