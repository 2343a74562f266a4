use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Precomputed Black-Scholes inputs for one (spot, time-to-maturity) point.
/// Stack-allocated, Copy.
#[derive(Debug, Clone, Copy)]
pub struct CallParams {
    pub spot: f64,
    pub strike: f64,
    pub ttl_years: f64,
    pub rate: f64,
    pub sigma: f64,
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
    pub ln_s_k: f64,
    /// e^(-rT)
    pub discount: f64,
}

impl CallParams {
    pub fn new(spot: f64, strike: f64, ttl_years: f64, rate: f64, sigma: f64) -> Self {
        let sqrt_t = ttl_years.max(0.0).sqrt();
        Self {
            spot,
            strike,
            ttl_years,
            rate,
            sigma,
            sqrt_t,
            sigma_sqrt_t: sigma * sqrt_t,
            ln_s_k: (spot / strike).ln(),
            discount: (-rate * ttl_years).exp(),
        }
    }

    /// d1 = (ln(S/K) + (r + sigma^2/2) T) / (sigma sqrt(T))
    #[inline]
    pub fn d1(&self) -> f64 {
        (self.ln_s_k + (self.rate + 0.5 * self.sigma * self.sigma) * self.ttl_years)
            / self.sigma_sqrt_t
    }

    #[inline]
    pub fn d2(&self) -> f64 {
        self.d1() - self.sigma_sqrt_t
    }
}

/// Black-Scholes European call.
///
/// C = S * Phi(d1) - K * e^(-rT) * Phi(d2)
/// delta = Phi(d1)
/// gamma = phi(d1) / (S * sigma * sqrt(T))
///
/// Closed-form values require T > 0 and sigma > 0. At T = 0 use the
/// expiry_* functions instead.
#[derive(Debug, Clone)]
pub struct BlackScholesCall {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl Default for BlackScholesCall {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackScholesCall {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    #[inline]
    pub fn price(&self, params: &CallParams) -> f64 {
        debug_assert!(params.ttl_years > 0.0 && params.sigma > 0.0);
        let d1 = params.d1();
        let d2 = d1 - params.sigma_sqrt_t;
        params.spot * self.normal.cdf(d1)
            - params.strike * params.discount * self.normal.cdf(d2)
    }

    #[inline]
    pub fn delta(&self, params: &CallParams) -> f64 {
        debug_assert!(params.ttl_years > 0.0 && params.sigma > 0.0);
        self.normal.cdf(params.d1())
    }

    /// Not used by the hedge itself; kept for diagnostics.
    #[inline]
    pub fn gamma(&self, params: &CallParams) -> f64 {
        debug_assert!(params.ttl_years > 0.0 && params.sigma > 0.0);
        self.normal.pdf(params.d1()) / (params.spot * params.sigma_sqrt_t)
    }

    /// Intrinsic payoff max(S - K, 0).
    #[inline]
    pub fn expiry_price(&self, spot: f64, strike: f64) -> f64 {
        (spot - strike).max(0.0)
    }

    /// Limit of delta as T -> 0+: 1 in the money, 0 otherwise.
    #[inline]
    pub fn expiry_delta(&self, spot: f64, strike: f64) -> f64 {
        if spot > strike { 1.0 } else { 0.0 }
    }
}
