//! CSV artifact writer.
//!
//! The `*_csv` functions render the downloadable artifacts to bytes;
//! [`CsvReportAdapter`] writes them into an output directory.

use crate::domain::analysis::{AnalysisResult, Projection};
use crate::domain::error::PortvisError;
use crate::domain::metrics::MetricsResult;
use crate::domain::monte_carlo::PercentileTable;
use crate::domain::portfolio::PortfolioIndexSeries;
use crate::domain::prices::ReturnsTable;
use crate::domain::session::SessionRecord;
use crate::ports::report_port::ExportPort;
use std::fs;
use std::path::{Path, PathBuf};

pub const RETURNS_FILE: &str = "daily_returns.csv";
pub const METRICS_FILE: &str = "metrics.csv";
pub const INDEX_FILE: &str = "portfolio_index.csv";
pub const PERCENTILES_FILE: &str = "percentiles.csv";
pub const PATHS_FILE: &str = "paths.csv";

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, PortvisError> {
    writer
        .into_inner()
        .map_err(|e| PortvisError::Io(e.into_error()))
}

/// `date,<SYM>...` with one row per returns date.
pub fn returns_csv(returns: &ReturnsTable) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["date".to_string()];
    header.extend(returns.symbols.iter().cloned());
    wtr.write_record(&header)?;

    for row in &returns.rows {
        let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
        record.extend(row.returns.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// `metric,value` rows.
pub fn metrics_csv(metrics: &MetricsResult) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["metric", "value"])?;
    for (name, value) in metrics.rows() {
        wtr.write_record([name.to_string(), value.to_string()])?;
    }
    finish(wtr)
}

pub fn index_csv(index: &PortfolioIndexSeries) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["date", "index"])?;
    for point in &index.points {
        wtr.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            point.value.to_string(),
        ])?;
    }
    finish(wtr)
}

/// `day,p5,p50,...` with one row per simulated day.
pub fn percentiles_csv(table: &PercentileTable) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["day".to_string()];
    header.extend(table.labels());
    wtr.write_record(&header)?;

    for (day, row) in table.rows.iter().enumerate() {
        let mut record = vec![day.to_string()];
        record.extend(row.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// `day,trial_0,trial_1,...` for the given trial paths.
pub fn paths_csv(paths: &[Vec<f64>]) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["day".to_string()];
    header.extend((0..paths.len()).map(|j| format!("trial_{j}")));
    wtr.write_record(&header)?;

    let steps = paths.first().map_or(0, Vec::len);
    for day in 0..steps {
        let mut record = vec![day.to_string()];
        record.extend(paths.iter().map(|p| p[day].to_string()));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// Saved-session summary table, one row per record in the given order.
pub fn sessions_csv(records: &[&SessionRecord]) -> Result<Vec<u8>, PortvisError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "timestamp",
        "session_name",
        "tickers",
        "expected_return",
        "volatility",
        "sharpe",
        "start_date",
        "end_date",
        "total_invest",
        "rf_rate",
    ])?;
    for record in records {
        wtr.write_record([
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.label.clone(),
            record.config.tickers.join(" "),
            record.metrics.expected_return.to_string(),
            record.metrics.volatility.to_string(),
            record.metrics.sharpe.to_string(),
            record.config.start_date.to_string(),
            record.config.end_date.to_string(),
            record.config.total_invest.to_string(),
            record.config.risk_free_rate.to_string(),
        ])?;
    }
    finish(wtr)
}

pub struct CsvReportAdapter {
    output_dir: PathBuf,
    fan_paths: Option<usize>,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            fan_paths: None,
        }
    }

    /// Also write the first `limit` trial paths to `paths.csv`.
    pub fn with_fan_paths(mut self, limit: usize) -> Self {
        self.fan_paths = Some(limit);
        self
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, PortvisError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(name);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
        Ok(path)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ExportPort for CsvReportAdapter {
    fn write_analysis(&self, result: &AnalysisResult) -> Result<Vec<PathBuf>, PortvisError> {
        Ok(vec![
            self.write_file(RETURNS_FILE, &returns_csv(&result.returns)?)?,
            self.write_file(METRICS_FILE, &metrics_csv(&result.metrics)?)?,
            self.write_file(INDEX_FILE, &index_csv(&result.index)?)?,
        ])
    }

    fn write_projection(&self, projection: &Projection) -> Result<Vec<PathBuf>, PortvisError> {
        let mut written = vec![self.write_file(PERCENTILES_FILE, &percentiles_csv(&projection.bands)?)?];
        if let Some(limit) = self.fan_paths {
            let subset = projection.paths.fan_subset(limit);
            written.push(self.write_file(PATHS_FILE, &paths_csv(&subset)?)?);
        }
        Ok(written)
    }
}
