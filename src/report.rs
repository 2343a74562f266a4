//! Headless reporting: console text and JSON chart data.
//! Consumes finished results only; nothing here feeds back into the engine.

use crate::errors::EngineResult;
use crate::hedging::batch::BatchSummary;
use crate::hedging::tracker::{self, HedgeErrorStats, HistogramBin};
use crate::state::{SimulationParameters, SimulationResult};
use std::fmt::Write as _;
use std::io::{BufWriter, Write as _};
use std::path::Path;

const BAR_WIDTH: usize = 40;

/// Everything an external plotter needs for the four series charts and
/// the hedge-error histogram.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChartData<'a> {
    pub generated_at: String,
    pub parameters: SimulationParameters,
    pub dt: f64,
    pub time: Vec<f64>,
    pub stock_price: &'a [f64],
    pub portfolio_value: &'a [f64],
    pub option_price: &'a [f64],
    pub delta: &'a [f64],
    pub cash_position: &'a [f64],
    pub hedge_error: &'a [f64],
    pub hedge_error_stats: Option<HedgeErrorStats>,
    pub hedge_error_histogram: Vec<HistogramBin>,
}

impl<'a> ChartData<'a> {
    pub fn new(params: &SimulationParameters, result: &'a SimulationResult, bins: usize) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            parameters: *params,
            dt: result.grid().dt(),
            time: result.grid().points(),
            stock_price: result.stock_price(),
            portfolio_value: result.portfolio_value(),
            option_price: result.option_price(),
            delta: result.delta(),
            cash_position: result.cash_position(),
            hedge_error: result.hedge_error(),
            hedge_error_stats: HedgeErrorStats::from_result(result),
            hedge_error_histogram: tracker::histogram(result.hedge_error(), bins),
        }
    }
}

/// Write chart data as pretty JSON, creating parent directories.
pub fn write_chart_data(
    path: &Path,
    params: &SimulationParameters,
    result: &SimulationResult,
    bins: usize,
) -> EngineResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ChartData::new(params, result, bins))?;
    writer.flush()?;
    tracing::info!(path = %path.display(), "chart data written");
    Ok(())
}

/// Parameter echo and end-of-run values.
pub fn render_summary(params: &SimulationParameters, result: &SimulationResult) -> String {
    let t = result.terminal();
    let mut out = String::new();

    let _ = writeln!(out, "Delta hedging simulation");
    let _ = writeln!(out, "  initial spot        {:>12.2}", params.spot);
    let _ = writeln!(out, "  strike              {:>12.2}", params.strike);
    let _ = writeln!(out, "  maturity (years)    {:>12.2}", params.maturity);
    let _ = writeln!(out, "  risk-free rate      {:>11.2}%", params.rate * 100.0);
    let _ = writeln!(out, "  volatility          {:>11.2}%", params.sigma * 100.0);
    let _ = writeln!(out, "  time steps          {:>12}", params.n_steps);
    let _ = writeln!(out, "  options             {:>12}", params.n_options);
    let _ = writeln!(out);
    let _ = writeln!(out, "Final values");
    let _ = writeln!(out, "  stock price         {:>12.2}", t.stock_price);
    let _ = writeln!(out, "  portfolio value     {:>12.2}", t.portfolio_value);
    let _ = writeln!(out, "  option price        {:>12.2}", t.option_price);
    let _ = writeln!(out, "  hedge error         {:>12.2}", t.hedge_error);

    if let Some(stats) = HedgeErrorStats::from_result(result) {
        let _ = writeln!(out);
        let _ = writeln!(out, "Hedge error over the path");
        let _ = writeln!(out, "  mean                {:>12.4}", stats.mean);
        let _ = writeln!(out, "  std dev             {:>12.4}", stats.std_dev);
        let _ = writeln!(out, "  rms                 {:>12.4}", stats.rms);
        let _ = writeln!(out, "  min / max           {:>12.4} / {:.4}", stats.min, stats.max);
    }

    out
}

/// Text histogram, one row per bin, bars scaled to the fullest bin.
pub fn render_histogram(bins: &[HistogramBin]) -> String {
    let mut out = String::from("Hedge error distribution\n");
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
    if peak == 0 {
        out.push_str("  (no data)\n");
        return out;
    }

    for b in bins {
        let len = b.count * BAR_WIDTH / peak;
        let _ = writeln!(
            out,
            "  [{:>10.4}, {:>10.4}) {:>6} {}",
            b.lower,
            b.upper,
            b.count,
            "#".repeat(len)
        );
    }
    out
}

pub fn render_batch(summary: &BatchSummary) -> String {
    let e = &summary.final_error;
    let mut out = String::new();
    let _ = writeln!(out, "Monte-Carlo batch ({} paths, base seed {})", summary.paths, summary.base_seed);
    let _ = writeln!(out, "  mean final stock    {:>12.2}", summary.mean_final_stock);
    let _ = writeln!(out, "  mean final portfolio{:>12.2}", summary.mean_final_portfolio);
    let _ = writeln!(out, "  final error mean    {:>12.4}", e.mean);
    let _ = writeln!(out, "  final error std     {:>12.4}", e.std_dev);
    let _ = writeln!(out, "  final error p5/p95  {:>12.4} / {:.4}", e.p05, e.p95);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedging::simulator;
    use crate::models::random::FixedNormals;

    fn sample() -> (SimulationParameters, SimulationResult) {
        let params = SimulationParameters { n_steps: 20, ..Default::default() };
        let result = simulator::run(params, &mut FixedNormals::new(vec![0.5, -0.3, 1.2])).unwrap();
        (params, result)
    }

    #[test]
    fn test_summary_mentions_final_values() {
        let (params, result) = sample();
        let text = render_summary(&params, &result);
        assert!(text.contains("Final values"));
        assert!(text.contains(&format!("{:.2}", result.terminal().stock_price)));
        assert!(text.contains("5.00%"));
    }

    #[test]
    fn test_histogram_rows() {
        let (_, result) = sample();
        let bins = tracker::histogram(result.hedge_error(), 5);
        let text = render_histogram(&bins);
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains(&"#".repeat(BAR_WIDTH)));
        assert!(render_histogram(&[]).contains("no data"));
    }

    #[test]
    fn test_chart_data_json_shape() {
        let (params, result) = sample();
        let json = serde_json::to_value(ChartData::new(&params, &result, 8)).unwrap();
        assert_eq!(json["time"].as_array().unwrap().len(), 21);
        assert_eq!(json["stock_price"].as_array().unwrap().len(), 21);
        assert_eq!(json["hedge_error_histogram"].as_array().unwrap().len(), 8);
        assert_eq!(json["parameters"]["n_steps"], 20);
        assert_eq!(json["time"][20].as_f64().unwrap(), 1.0);
    }

    #[test]
    fn test_write_chart_data_roundtrip() {
        let (params, result) = sample();
        let dir = std::env::temp_dir().join(format!("rusty_hedger_{}", std::process::id()));
        let path = dir.join("nested").join("chart.json");

        write_chart_data(&path, &params, &result, 4).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["delta"].as_array().unwrap().len(), 21);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
