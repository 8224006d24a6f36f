//! Monte Carlo forward simulation of portfolio value.
//!
//! The aggregate portfolio value follows a single Geometric Brownian Motion
//! parameterised by the annualized expected return and volatility:
//!
//! `V(t+dt) = V(t) * exp((mu - sigma^2 / 2) * dt + sigma * sqrt(dt) * Z)`
//!
//! with `dt = 1/252` and an independent standard normal `Z` per step and
//! trial. Seeded runs use `Pcg64`, so a given seed reproduces the same paths
//! on every platform and process.

use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64;

use super::error::PortvisError;
use super::metrics::TRADING_DAYS_PER_YEAR;

pub const DEFAULT_DAYS: usize = 252;
pub const DEFAULT_SIMS: usize = 300;
pub const DEFAULT_PERCENTILES: [f64; 3] = [5.0, 50.0, 95.0];
pub const FAN_CHART_PATHS: usize = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub initial_value: f64,
    pub mu: f64,
    pub sigma: f64,
    pub days: usize,
    pub sims: usize,
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl SimulationParams {
    pub fn new(initial_value: f64, mu: f64, sigma: f64) -> Self {
        Self {
            initial_value,
            mu,
            sigma,
            days: DEFAULT_DAYS,
            sims: DEFAULT_SIMS,
            seed: None,
        }
    }

    fn validate(&self) -> Result<(), PortvisError> {
        if self.sims < 1 {
            return Err(PortvisError::invalid("sims must be at least 1"));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(PortvisError::invalid(format!(
                "sigma must be a finite non-negative volatility, got {}",
                self.sigma
            )));
        }
        if !self.mu.is_finite() {
            return Err(PortvisError::invalid(format!(
                "mu must be finite, got {}",
                self.mu
            )));
        }
        if !self.initial_value.is_finite() {
            return Err(PortvisError::invalid(format!(
                "initial_value must be finite, got {}",
                self.initial_value
            )));
        }
        Ok(())
    }
}

/// Simulated values: `days + 1` time-step rows by `sims` trial columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPaths {
    days: usize,
    sims: usize,
    values: Vec<f64>,
}

impl SimulatedPaths {
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn sims(&self) -> usize {
        self.sims
    }

    pub fn row_count(&self) -> usize {
        self.days + 1
    }

    /// All trial values at time step `t`.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.values[t * self.sims..(t + 1) * self.sims]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.sims)
    }

    /// The path of trial `j` over every time step.
    pub fn trial(&self, j: usize) -> Vec<f64> {
        self.rows().map(|row| row[j]).collect()
    }

    /// The first `min(limit, sims)` trial paths, for plotting.
    pub fn fan_subset(&self, limit: usize) -> Vec<Vec<f64>> {
        (0..limit.min(self.sims)).map(|j| self.trial(j)).collect()
    }

    pub fn terminal(&self) -> &[f64] {
        self.row(self.days)
    }
}

pub fn simulate_paths(params: &SimulationParams) -> Result<SimulatedPaths, PortvisError> {
    params.validate()?;

    let mut rng = match params.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    };

    let dt = 1.0 / TRADING_DAYS_PER_YEAR;
    let drift = (params.mu - 0.5 * params.sigma * params.sigma) * dt;
    let vol = params.sigma * dt.sqrt();

    let sims = params.sims;
    let mut values = Vec::with_capacity((params.days + 1) * sims);
    values.extend(std::iter::repeat_n(params.initial_value, sims));

    let mut cumulative = vec![0.0_f64; sims];
    for _ in 0..params.days {
        for log_return in cumulative.iter_mut() {
            let z: f64 = StandardNormal.sample(&mut rng);
            *log_return += drift + vol * z;
            values.push(params.initial_value * log_return.exp());
        }
    }

    tracing::debug!(
        days = params.days,
        sims,
        seeded = params.seed.is_some(),
        "simulated GBM paths"
    );

    Ok(SimulatedPaths {
        days: params.days,
        sims,
        values,
    })
}

/// Cross-sectional percentiles, one row per time step.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileTable {
    pub percentiles: Vec<f64>,
    pub rows: Vec<Vec<f64>>,
}

impl PercentileTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column of values for percentile `q`, if it was requested.
    pub fn column(&self, q: f64) -> Option<Vec<f64>> {
        let idx = self.percentiles.iter().position(|p| *p == q)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// Column labels such as `p5`, `p50`, `p97.5`.
    pub fn labels(&self) -> Vec<String> {
        self.percentiles.iter().map(|q| format!("p{q}")).collect()
    }
}

pub fn percentiles(paths: &SimulatedPaths, q: &[f64]) -> Result<PercentileTable, PortvisError> {
    validate_percentiles(q)?;

    let rows = paths
        .rows()
        .map(|row| {
            let sorted = sorted_copy(row);
            q.iter().map(|&p| interpolate(&sorted, p)).collect()
        })
        .collect();

    Ok(PercentileTable {
        percentiles: q.to_vec(),
        rows,
    })
}

/// Percentiles of the final-day value across trials.
pub fn terminal_percentiles(
    paths: &SimulatedPaths,
    q: &[f64],
) -> Result<Vec<(f64, f64)>, PortvisError> {
    validate_percentiles(q)?;
    let sorted = sorted_copy(paths.terminal());
    Ok(q.iter().map(|&p| (p, interpolate(&sorted, p))).collect())
}

fn validate_percentiles(q: &[f64]) -> Result<(), PortvisError> {
    if q.is_empty() {
        return Err(PortvisError::invalid("at least one percentile is required"));
    }
    if let Some(p) = q.iter().find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0) {
        return Err(PortvisError::invalid(format!(
            "percentiles must lie in [0, 100], got {p}"
        )));
    }
    Ok(())
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear interpolation between order statistics at rank `(n - 1) * q / 100`.
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let lower = sorted[lo];
    if lo == hi {
        return lower;
    }
    lower + (rank - lo as f64) * (sorted[hi] - lower)
}
