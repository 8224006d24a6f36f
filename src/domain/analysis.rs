//! Analysis pipeline: prices → returns → portfolio → metrics → projection.

use chrono::NaiveDate;

use super::error::PortvisError;
use super::metrics::{portfolio_metrics, MetricsResult};
use super::monte_carlo::{
    percentiles, simulate_paths, terminal_percentiles, PercentileTable, SimulatedPaths,
    SimulationParams, DEFAULT_DAYS, DEFAULT_PERCENTILES, DEFAULT_SIMS,
};
use super::portfolio::{
    allocation, cumulative_index, equal_weights, portfolio_daily, PortfolioDailySeries,
    PortfolioIndexSeries, WeightVector,
};
use super::prices::{PriceTable, ReturnsTable};
use super::returns::compute_returns;
use crate::ports::price_port::PricePort;

pub const DEFAULT_TOTAL_INVEST: f64 = 10_000.0;
pub const MIN_TOTAL_INVEST: f64 = 1_000.0;
pub const MAX_RISK_FREE_RATE: f64 = 0.20;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_invest: f64,
    pub risk_free_rate: f64,
    pub index_base: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub days: usize,
    pub sims: usize,
    pub seed: Option<u64>,
    pub percentiles: Vec<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            sims: DEFAULT_SIMS,
            seed: Some(DEFAULT_SEED),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub prices: PriceTable,
    pub returns: ReturnsTable,
    pub weights: WeightVector,
    pub daily: PortfolioDailySeries,
    pub index: PortfolioIndexSeries,
    pub metrics: MetricsResult,
}

impl AnalysisResult {
    pub fn allocation(&self) -> Vec<(String, f64)> {
        allocation(self.prices.symbols(), &self.weights)
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// No usable price or return rows; nothing further to compute.
    Empty,
    Completed(Box<AnalysisResult>),
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub paths: SimulatedPaths,
    pub bands: PercentileTable,
    pub terminal: Vec<(f64, f64)>,
}

pub fn run_analysis(
    port: &dyn PricePort,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, PortvisError> {
    let prices = port.fetch_prices(&config.tickers, config.start_date, config.end_date)?;
    tracing::debug!(
        rows = prices.row_count(),
        symbols = prices.symbols().len(),
        "fetched prices"
    );
    analyze_prices(prices, config.risk_free_rate, config.index_base)
}

/// Runs the analytics core over an already retrieved price table.
pub fn analyze_prices(
    prices: PriceTable,
    risk_free_rate: f64,
    index_base: f64,
) -> Result<AnalysisOutcome, PortvisError> {
    if prices.is_empty() {
        return Ok(AnalysisOutcome::Empty);
    }

    let returns = compute_returns(&prices);
    if returns.is_empty() {
        tracing::warn!(
            price_rows = prices.row_count(),
            "no complete return rows in price table"
        );
        return Ok(AnalysisOutcome::Empty);
    }

    let weights = equal_weights(prices.symbols().len())?;
    let daily = portfolio_daily(&returns, &weights)?;
    let index = cumulative_index(&daily, index_base);
    let metrics = portfolio_metrics(&daily, risk_free_rate);

    tracing::debug!(
        return_rows = returns.row_count(),
        expected_return = metrics.expected_return,
        volatility = metrics.volatility,
        sharpe = metrics.sharpe,
        "analysis complete"
    );

    Ok(AnalysisOutcome::Completed(Box::new(AnalysisResult {
        prices,
        returns,
        weights,
        daily,
        index,
        metrics,
    })))
}

/// Projects `total_invest` forward under GBM using the realized metrics.
pub fn project(
    metrics: &MetricsResult,
    total_invest: f64,
    sim: &SimulationConfig,
) -> Result<Projection, PortvisError> {
    let params = SimulationParams {
        initial_value: total_invest,
        mu: metrics.expected_return,
        sigma: metrics.volatility,
        days: sim.days,
        sims: sim.sims,
        seed: sim.seed,
    };
    let paths = simulate_paths(&params)?;
    let bands = percentiles(&paths, &sim.percentiles)?;
    let terminal = terminal_percentiles(&paths, &sim.percentiles)?;
    Ok(Projection {
        paths,
        bands,
        terminal,
    })
}
