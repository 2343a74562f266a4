mod config;
mod errors;
mod hedging;
mod models;
mod report;
mod state;

use crate::hedging::simulator::HedgingEngine;
use crate::hedging::{batch, tracker};
use crate::models::random::SeededNormals;

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("rusty_hedger starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let mut source = match cfg.seed {
        Some(seed) => SeededNormals::new(seed),
        None => SeededNormals::from_entropy(),
    };
    tracing::info!(
        seed = ?source.seed(),
        max_steps = cfg.max_steps,
        max_paths = cfg.max_paths,
        "random source ready"
    );

    let engine = HedgingEngine::new();
    let result = match engine.run(cfg.params, &mut source) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "simulation aborted");
            std::process::exit(1);
        }
    };

    println!("{}", report::render_summary(&cfg.params, &result));
    println!(
        "{}",
        report::render_histogram(&tracker::histogram(result.hedge_error(), cfg.histogram_bins))
    );

    if let Some(path) = &cfg.output_json {
        if let Err(e) = report::write_chart_data(path, &cfg.params, &result, cfg.histogram_bins) {
            tracing::error!(error = %e, path = %path.display(), "chart export failed");
            std::process::exit(1);
        }
    }

    if cfg.mc_paths > 0 {
        let base_seed = cfg.seed.unwrap_or_else(rand::random);
        match batch::run_batch(cfg.params, cfg.mc_paths, base_seed).await {
            Ok(summary) => println!("{}", report::render_batch(&summary)),
            Err(e) => {
                tracing::error!(error = %e, "monte-carlo batch failed");
                std::process::exit(1);
            }
        }
    }

    tracing::info!("rusty_hedger done");
}
