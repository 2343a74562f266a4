use crate::errors::{EngineError, EngineResult};
use crate::state::SimulationParameters;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub params: SimulationParameters,
    /// None = seed the path from OS entropy
    pub seed: Option<u64>,
    pub histogram_bins: usize,
    pub output_json: Option<PathBuf>,
    /// Monte-Carlo batch size (0 = single path only)
    pub mc_paths: usize,
    pub max_steps: usize,
    pub max_paths: usize,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. The environment in production, a map in tests.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SimulationParameters::default();

        let n_options = parse_or::<i64>(&lookup, "HEDGE_OPTIONS", defaults.n_options.into())?;
        if n_options < 0 {
            return Err(EngineError::InvalidParameter(format!(
                "n_options must be >= 0, got {n_options}"
            )));
        }
        let n_options = u32::try_from(n_options)
            .map_err(|_| EngineError::InvalidParameter(format!("n_options too large: {n_options}")))?;

        let n_steps = parse_or::<i64>(&lookup, "HEDGE_STEPS", defaults.n_steps as i64)?;
        if n_steps < 1 {
            return Err(EngineError::InvalidParameter(format!(
                "n_steps must be >= 1, got {n_steps}"
            )));
        }

        let params = SimulationParameters {
            spot: parse_or(&lookup, "HEDGE_S0", defaults.spot)?,
            strike: parse_or(&lookup, "HEDGE_STRIKE", defaults.strike)?,
            maturity: parse_or(&lookup, "HEDGE_MATURITY", defaults.maturity)?,
            rate: parse_or(&lookup, "HEDGE_RATE", defaults.rate)?,
            sigma: parse_or(&lookup, "HEDGE_SIGMA", defaults.sigma)?,
            n_steps: n_steps as usize,
            n_options,
        };
        params.validate()?;

        let max_steps = parse_or(&lookup, "HEDGE_MAX_STEPS", 1_000_000usize)?;
        if params.n_steps > max_steps {
            return Err(EngineError::InvalidParameter(format!(
                "n_steps {} exceeds ceiling {max_steps}",
                params.n_steps
            )));
        }

        let max_paths = parse_or(&lookup, "HEDGE_MAX_PATHS", 100_000usize)?;
        let mc_paths = parse_or(&lookup, "HEDGE_MC_PATHS", 0usize)?;
        if mc_paths > max_paths {
            return Err(EngineError::InvalidParameter(format!(
                "mc_paths {mc_paths} exceeds ceiling {max_paths}"
            )));
        }

        let histogram_bins = parse_or(&lookup, "HEDGE_HISTOGRAM_BINS", 50usize)?;
        if histogram_bins == 0 {
            return Err(EngineError::Config("HEDGE_HISTOGRAM_BINS must be >= 1".into()));
        }

        let seed = match lookup("HEDGE_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| EngineError::Config(format!("HEDGE_SEED: {e}")))?,
            ),
            None => None,
        };

        Ok(Self {
            params,
            seed,
            histogram_bins,
            output_json: lookup("HEDGE_OUTPUT_JSON")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            mc_paths,
            max_steps,
            max_paths,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> EngineResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| EngineError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}
