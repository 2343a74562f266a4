/// Hedge-error statistics and histogram bins.
/// All functions are pure -- they take a series and return computed values.
use crate::state::SimulationResult;
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Summary of a hedge-error series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct HedgeErrorStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub median: f64,
    pub p95: f64,
}

impl HedgeErrorStats {
    /// Statistics over any series. Returns None for an empty series.
    /// std_dev is the sample standard deviation (0 for a single value).
    pub fn from_series(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let std_dev = if values.len() > 1 { values.std_dev() } else { 0.0 };
        let mut data = Data::new(values.to_vec());

        Some(Self {
            count: values.len(),
            mean: values.mean(),
            std_dev,
            rms: values.quadratic_mean(),
            min: Statistics::min(values),
            max: Statistics::max(values),
            p05: data.percentile(5),
            median: data.median(),
            p95: data.percentile(95),
        })
    }

    /// Statistics over the hedge-error series of one run.
    pub fn from_result(result: &SimulationResult) -> Option<Self> {
        Self::from_series(result.hedge_error())
    }
}

/// One equal-width histogram bin over [lower, upper).
/// The last bin also includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    /// count / (n * width): integrates to 1 over all bins
    pub density: f64,
}

/// Equal-width histogram with `bins` bins over the range of `values`.
/// A constant series gets a single unit-width bin centred on the value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let (lo, hi, bins) = if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
        (lo - 0.5, lo + 0.5, 1)
    } else {
        (lo, hi, bins)
    };

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let n = finite.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + i as f64 * width,
            upper: lo + (i + 1) as f64 * width,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}
