use crate::errors::{EngineError, EngineResult};
use crate::models::black_scholes::{BlackScholesCall, CallParams};
use crate::models::path::PathGenerator;
use crate::models::NormalSource;
use crate::state::{SimulationParameters, SimulationResult, TimeGrid};

// ═══════════════════════════════════════════════════════════════════════════════
// SELF-FINANCING DELTA HEDGE
//
// Short n calls, long delta shares, the remainder in cash at the risk-free
// rate. Each step:
//   1. Reprice the calls and their delta at the new spot
//   2. Grow yesterday's cash by e^(r dt)
//   3. Trade shares up/down to the new delta, settled in cash
//   4. Mark the replicating portfolio and compare it to the calls
//
// At the last grid point there is no time left, so the calls are worth
// their payoff and delta is 1 or 0.
// ═══════════════════════════════════════════════════════════════════════════════

/// Hedging engine. Holds the pricer so repeated runs reuse it.
#[derive(Debug, Clone, Default)]
pub struct HedgingEngine {
    pricer: BlackScholesCall,
}

/// Per-step quantities for the whole option position.
#[derive(Debug, Clone, Copy)]
struct Quote {
    option_price: f64,
    delta: f64,
}

impl HedgingEngine {
    pub fn new() -> Self {
        Self {
            pricer: BlackScholesCall::new(),
        }
    }

    /// Run one hedging simulation.
    ///
    /// Parameters are validated before any draw is taken. A non-finite
    /// value or a non-positive price anywhere in the run aborts it and no
    /// partial result is returned.
    pub fn run<N: NormalSource + ?Sized>(
        &self,
        params: SimulationParameters,
        source: &mut N,
    ) -> EngineResult<SimulationResult> {
        params.validate()?;

        let grid = params.grid();
        let n = grid.len();
        let growth = (params.rate * grid.dt()).exp();

        tracing::info!(
            spot = params.spot,
            strike = params.strike,
            maturity = params.maturity,
            rate = params.rate,
            sigma = params.sigma,
            n_steps = params.n_steps,
            n_options = params.n_options,
            "starting hedge simulation"
        );

        let stock_price = PathGenerator::new(params.spot, params.rate, params.sigma, &grid)
            .generate(source);

        let mut option_price = Vec::with_capacity(n);
        let mut delta = Vec::with_capacity(n);
        let mut portfolio_value = Vec::with_capacity(n);
        let mut cash_position = Vec::with_capacity(n);
        let mut hedge_error = Vec::with_capacity(n);

        // Sell the calls, buy the initial hedge, keep the rest as cash.
        let q0 = self.quote(&params, &grid, 0, params.spot);
        let cash0 = q0.option_price - q0.delta * params.spot;
        check_finite(0, "option price", q0.option_price)?;
        check_finite(0, "delta", q0.delta)?;
        check_finite(0, "cash", cash0)?;

        let cp0 = CallParams::new(params.spot, params.strike, params.maturity, params.rate, params.sigma);
        tracing::debug!(
            gamma = f64::from(params.n_options) * self.pricer.gamma(&cp0),
            "initial position gamma"
        );

        option_price.push(q0.option_price);
        delta.push(q0.delta);
        cash_position.push(cash0);
        portfolio_value.push(q0.option_price);
        hedge_error.push(0.0);

        for i in 1..n {
            let s = stock_price[i];
            if !(s > 0.0 && s.is_finite()) {
                return Err(EngineError::NumericDegeneracy {
                    step: i,
                    detail: format!("stock price {s} is not a positive finite number"),
                });
            }

            let q = self.quote(&params, &grid, i, s);
            let prev_delta = delta[i - 1];
            let cash = cash_position[i - 1] * growth - (q.delta - prev_delta) * s;
            let portfolio = q.delta * s + cash;
            let error = portfolio - q.option_price;

            check_finite(i, "option price", q.option_price)?;
            check_finite(i, "delta", q.delta)?;
            check_finite(i, "cash", cash)?;
            check_finite(i, "hedge error", error)?;

            tracing::trace!(
                step = i,
                stock = s,
                option = q.option_price,
                delta = q.delta,
                cash,
                portfolio,
                error,
                "rebalanced"
            );

            option_price.push(q.option_price);
            delta.push(q.delta);
            cash_position.push(cash);
            portfolio_value.push(portfolio);
            hedge_error.push(error);
        }

        let result = SimulationResult::from_series(
            grid,
            stock_price,
            option_price,
            delta,
            portfolio_value,
            cash_position,
            hedge_error,
        );

        let terminal = result.terminal();
        tracing::info!(
            final_stock = terminal.stock_price,
            final_portfolio = terminal.portfolio_value,
            final_option = terminal.option_price,
            final_error = terminal.hedge_error,
            "hedge simulation complete"
        );

        Ok(result)
    }

    /// Position value and delta at grid step `step`.
    #[inline]
    fn quote(
        &self,
        params: &SimulationParameters,
        grid: &TimeGrid,
        step: usize,
        spot: f64,
    ) -> Quote {
        let n_options = f64::from(params.n_options);

        if grid.is_expiry(step) {
            let payoff = self.pricer.expiry_price(spot, params.strike);
            let delta = self.pricer.expiry_delta(spot, params.strike);
            tracing::debug!(spot, strike = params.strike, payoff, delta, "expiry: settling at intrinsic");
            return Quote {
                option_price: n_options * payoff,
                delta: n_options * delta,
            };
        }

        let cp = CallParams::new(
            spot,
            params.strike,
            grid.remaining(step),
            params.rate,
            params.sigma,
        );

        Quote {
            option_price: n_options * self.pricer.price(&cp),
            delta: n_options * self.pricer.delta(&cp),
        }
    }
}

/// Run one simulation with a fresh engine.
pub fn run<N: NormalSource + ?Sized>(
    params: SimulationParameters,
    source: &mut N,
) -> EngineResult<SimulationResult> {
    HedgingEngine::new().run(params, source)
}

#[inline]
fn check_finite(step: usize, what: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NumericDegeneracy {
            step,
            detail: format!("{what} is {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::random::{FixedNormals, SeededNormals};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_scenario_zero_draws() {
        let params = SimulationParameters::default();
        let result = run(params, &mut FixedNormals::zeros()).unwrap();

        assert_eq!(result.len(), 253);
        for series in [
            result.stock_price(),
            result.option_price(),
            result.delta(),
            result.portfolio_value(),
            result.cash_position(),
            result.hedge_error(),
        ] {
            assert_eq!(series.len(), 253);
        }

        assert_eq!(result.stock_price()[0], 100.0);
        assert!(result.stock_price().windows(2).all(|w| w[1] > w[0]));

        // 100 options: per-option 10.4506 and 0.6368
        assert_abs_diff_eq!(result.option_price()[0] / 100.0, 10.4506, epsilon = 1e-3);
        assert_abs_diff_eq!(result.delta()[0] / 100.0, 0.6368, epsilon = 1e-3);
    }

    #[test]
    fn test_initial_portfolio_equals_option_value() {
        let result = run(SimulationParameters::default(), &mut SeededNormals::new(5)).unwrap();
        assert_eq!(result.portfolio_value()[0], result.option_price()[0]);
        assert_eq!(result.hedge_error()[0], 0.0);
        assert_abs_diff_eq!(
            result.cash_position()[0],
            result.option_price()[0] - result.delta()[0] * 100.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_recurrence_holds_every_step() {
        let params = SimulationParameters { n_steps: 50, ..Default::default() };
        let result = run(params, &mut SeededNormals::new(9)).unwrap();
        let growth = (params.rate * result.grid().dt()).exp();

        for i in 1..result.len() {
            let s = result.stock_price()[i];
            let cash = result.cash_position()[i - 1] * growth
                - (result.delta()[i] - result.delta()[i - 1]) * s;
            assert_abs_diff_eq!(result.cash_position()[i], cash, epsilon = 1e-9);

            let portfolio = result.delta()[i] * s + result.cash_position()[i];
            assert_abs_diff_eq!(result.portfolio_value()[i], portfolio, epsilon = 1e-9);
            assert_abs_diff_eq!(
                result.hedge_error()[i],
                result.portfolio_value()[i] - result.option_price()[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_prices_positive_and_delta_bounded() {
        let params = SimulationParameters { n_options: 1, ..Default::default() };
        let result = run(params, &mut SeededNormals::new(21)).unwrap();
        assert!(result.stock_price().iter().all(|&s| s > 0.0));
        let d0 = result.delta()[0];
        assert!(d0 > 0.0 && d0 < 1.0, "initial delta {d0} out of (0,1)");
        // Close to expiry Phi(d1) may round to exactly 0 or 1.
        for &d in result.delta() {
            assert!((0.0..=1.0).contains(&d), "delta {d} out of [0,1]");
        }
    }

    #[test]
    fn test_expiry_settles_at_intrinsic() {
        let params = SimulationParameters { n_options: 10, ..Default::default() };
        let result = run(params, &mut SeededNormals::new(4)).unwrap();
        let t = result.terminal();
        let payoff = 10.0 * (t.stock_price - params.strike).max(0.0);
        assert_eq!(t.option_price, payoff);
        assert!(t.delta == 0.0 || t.delta == 10.0);
        assert!(result.hedge_error().iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_deterministic_for_same_draws() {
        let params = SimulationParameters::default();
        let a = run(params, &mut SeededNormals::new(1234)).unwrap();
        let b = run(params, &mut SeededNormals::new(1234)).unwrap();
        assert_eq!(a, b);

        let draws = vec![0.3, -1.1, 0.7, 2.0, -0.4];
        let c = run(params, &mut FixedNormals::new(draws.clone())).unwrap();
        let d = run(params, &mut FixedNormals::new(draws)).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_zero_options_never_hedge() {
        let params = SimulationParameters { n_options: 0, ..Default::default() };
        let result = run(params, &mut SeededNormals::new(77)).unwrap();
        assert!(result.option_price().iter().all(|&v| v == 0.0));
        assert!(result.delta().iter().all(|&v| v == 0.0));
        assert!(result.cash_position().iter().all(|&v| v == 0.0));
        assert!(result.portfolio_value().iter().all(|&v| v == 0.0));
        assert!(result.hedge_error().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_near_zero_vol_deep_itm_tracks_exactly() {
        // Delta pinned at 1: the hedge is one share per call financed at r = 0.
        let params = SimulationParameters {
            spot: 100.0,
            strike: 80.0,
            maturity: 1.0,
            rate: 0.0,
            sigma: 1e-4,
            n_steps: 100,
            n_options: 1,
        };
        let result = run(params, &mut SeededNormals::new(8)).unwrap();
        let max_err = result
            .hedge_error()
            .iter()
            .fold(0.0_f64, |acc, e| acc.max(e.abs()));
        assert!(max_err < 1e-8, "hedge error should stay ~0, max |err| = {max_err}");
    }

    #[test]
    fn test_finer_grid_shrinks_error() {
        let coarse = SimulationParameters { n_steps: 12, n_options: 1, ..Default::default() };
        let fine = SimulationParameters { n_steps: 2_000, n_options: 1, ..Default::default() };

        let mean_abs_final = |params: SimulationParameters| {
            let engine = HedgingEngine::new();
            let mut total = 0.0;
            for seed in 0..40 {
                let r = engine.run(params, &mut SeededNormals::new(seed)).unwrap();
                total += r.terminal().hedge_error.abs();
            }
            total / 40.0
        };

        let e_coarse = mean_abs_final(coarse);
        let e_fine = mean_abs_final(fine);
        assert!(e_fine < e_coarse, "fine grid error {e_fine} should beat coarse {e_coarse}");
    }

    #[test]
    fn test_invalid_parameters_rejected_before_drawing() {
        struct Panicking;
        impl NormalSource for Panicking {
            fn next_normal(&mut self) -> f64 {
                panic!("no draw should be taken for invalid parameters");
            }
        }

        let params = SimulationParameters { sigma: -0.2, ..Default::default() };
        let err = run(params, &mut Panicking);
        assert!(matches!(err, Err(EngineError::InvalidParameter(_))));
    }

    #[test]
    fn test_overflowing_vol_reports_degeneracy() {
        let params = SimulationParameters { sigma: 1e200, ..Default::default() };
        let err = run(params, &mut FixedNormals::zeros());
        assert!(
            matches!(err, Err(EngineError::NumericDegeneracy { .. })),
            "expected degeneracy, got {err:?}"
        );
    }

    #[test]
    fn test_dyn_source() {
        let mut boxed: Box<dyn NormalSource> = Box::new(FixedNormals::zeros());
        let result = run(SimulationParameters::default(), boxed.as_mut()).unwrap();
        assert_eq!(result.len(), 253);
    }
}
