use crate::errors::{EngineError, EngineResult};
use crate::hedging::simulator::HedgingEngine;
use crate::hedging::tracker::HedgeErrorStats;
use crate::models::random::SeededNormals;
use crate::state::SimulationParameters;
use tokio::task::JoinSet;

/// Monte-Carlo summary over many independent hedged paths.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchSummary {
    pub paths: usize,
    pub base_seed: u64,
    /// Distribution of the hedge error at the last grid point
    pub final_error: HedgeErrorStats,
    pub mean_final_stock: f64,
    pub mean_final_portfolio: f64,
}

/// Per-path outcome kept by the workers (the full series are dropped).
#[derive(Debug, Clone, Copy)]
struct PathOutcome {
    index: usize,
    final_error: f64,
    final_stock: f64,
    final_portfolio: f64,
}

/// Run `paths` independent simulations across the blocking pool.
///
/// Path k always uses seed `base_seed + k`, so the summary does not
/// depend on how many workers the machine has.
pub async fn run_batch(
    params: SimulationParameters,
    paths: usize,
    base_seed: u64,
) -> EngineResult<BatchSummary> {
    params.validate()?;
    if paths == 0 {
        return Err(EngineError::InvalidParameter(
            "batch needs at least one path".into(),
        ));
    }

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(paths);
    let chunk = paths.div_ceil(workers);

    tracing::info!(paths, workers, chunk, base_seed, "starting monte-carlo batch");

    let mut set = JoinSet::new();
    for start in (0..paths).step_by(chunk) {
        let end = (start + chunk).min(paths);
        set.spawn_blocking(move || run_chunk(params, start..end, base_seed));
    }

    let mut outcomes = Vec::with_capacity(paths);
    while let Some(joined) = set.join_next().await {
        outcomes.extend(joined??);
    }
    outcomes.sort_by_key(|o| o.index);

    summarise(paths, base_seed, &outcomes)
}

fn run_chunk(
    params: SimulationParameters,
    range: std::ops::Range<usize>,
    base_seed: u64,
) -> EngineResult<Vec<PathOutcome>> {
    let engine = HedgingEngine::new();
    let mut out = Vec::with_capacity(range.len());

    for index in range {
        let mut source = SeededNormals::new(base_seed.wrapping_add(index as u64));
        let terminal = engine.run(params, &mut source)?.terminal();
        out.push(PathOutcome {
            index,
            final_error: terminal.hedge_error,
            final_stock: terminal.stock_price,
            final_portfolio: terminal.portfolio_value,
        });
    }

    Ok(out)
}

fn summarise(paths: usize, base_seed: u64, outcomes: &[PathOutcome]) -> EngineResult<BatchSummary> {
    let errors: Vec<f64> = outcomes.iter().map(|o| o.final_error).collect();
    let final_error = HedgeErrorStats::from_series(&errors)
        .ok_or_else(|| EngineError::Worker("batch produced no paths".into()))?;

    let n = outcomes.len() as f64;
    let mean_final_stock = outcomes.iter().map(|o| o.final_stock).sum::<f64>() / n;
    let mean_final_portfolio = outcomes.iter().map(|o| o.final_portfolio).sum::<f64>() / n;

    tracing::info!(
        paths,
        mean_error = final_error.mean,
        std_error = final_error.std_dev,
        mean_final_stock,
        "monte-carlo batch complete"
    );

    Ok(BatchSummary {
        paths,
        base_seed,
        final_error,
        mean_final_stock,
        mean_final_portfolio,
    })
}
