//! Configuration validation.
//!
//! Validates all config fields before an analysis runs.

use crate::domain::analysis::{MAX_RISK_FREE_RATE, MIN_TOTAL_INVEST};
use crate::domain::error::PortvisError;
use crate::domain::tickers::clean_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    validate_tickers(config)?;
    validate_dates(config)?;
    validate_total_invest(config)?;
    validate_risk_free_rate(config)?;
    validate_index_base(config)?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    validate_days(config)?;
    validate_sims(config)?;
    parse_seed(config)?;
    parse_percentiles(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PortvisError {
    PortvisError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    match config.get_string("analysis", "tickers") {
        Some(s) if !clean_tickers(&s).is_empty() => Ok(()),
        _ => Err(PortvisError::ConfigMissing {
            section: "analysis".to_string(),
            key: "tickers".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let start_str = config.get_string("analysis", "start_date");
    let end_str = config.get_string("analysis", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "analysis",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, PortvisError> {
    match value {
        None => Err(PortvisError::ConfigMissing {
            section: "analysis".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "analysis",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_total_invest(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let value = parse_double(config, "analysis", "total_invest", MIN_TOTAL_INVEST)?;
    if !(value >= MIN_TOTAL_INVEST) || !value.is_finite() {
        return Err(invalid(
            "analysis",
            "total_invest",
            format!("total_invest must be at least {MIN_TOTAL_INVEST}"),
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let value = parse_double(config, "analysis", "risk_free_rate", 0.0)?;
    if !(0.0..=MAX_RISK_FREE_RATE).contains(&value) {
        return Err(invalid(
            "analysis",
            "risk_free_rate",
            format!("risk_free_rate must be between 0 and {MAX_RISK_FREE_RATE}"),
        ));
    }
    Ok(())
}

fn validate_index_base(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let value = parse_double(config, "analysis", "index_base", 100.0)?;
    if !(value > 0.0) || !value.is_finite() {
        return Err(invalid(
            "analysis",
            "index_base",
            "index_base must be positive",
        ));
    }
    Ok(())
}

fn validate_days(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let value = parse_int(config, "simulation", "days", 0)?;
    if value < 0 {
        return Err(invalid(
            "simulation",
            "days",
            "days must be non-negative",
        ));
    }
    Ok(())
}

fn validate_sims(config: &dyn ConfigPort) -> Result<(), PortvisError> {
    let value = parse_int(config, "simulation", "sims", 1)?;
    if value < 1 {
        return Err(invalid("simulation", "sims", "sims must be at least 1"));
    }
    Ok(())
}

/// `default` when the key is absent or blank; a value that does not parse is
/// `ConfigInvalid` rather than silently replaced.
pub fn parse_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PortvisError> {
    match config.get_non_empty(section, key) {
        None => Ok(default),
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| invalid(section, key, format!("{key} must be a number, got {s:?}"))),
    }
}

/// Integer counterpart of [`parse_double`].
pub fn parse_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, PortvisError> {
    match config.get_non_empty(section, key) {
        None => Ok(default),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| invalid(section, key, format!("{key} must be an integer, got {s:?}"))),
    }
}

/// `None` when the seed is absent, blank or `none`.
pub fn parse_seed(config: &dyn ConfigPort) -> Result<Option<u64>, PortvisError> {
    match config.get_string("simulation", "seed") {
        None => Ok(None),
        Some(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("none") {
                return Ok(None);
            }
            s.parse::<u64>().map(Some).map_err(|_| {
                invalid(
                    "simulation",
                    "seed",
                    "seed must be a non-negative integer or none",
                )
            })
        }
    }
}

/// Comma-separated percentiles, each within [0, 100]. `None` when absent.
pub fn parse_percentiles(config: &dyn ConfigPort) -> Result<Option<Vec<f64>>, PortvisError> {
    let Some(raw) = config.get_string("simulation", "percentiles") else {
        return Ok(None);
    };

    let mut values = Vec::new();
    for token in raw.split(',') {
        let value: f64 = token.trim().parse().map_err(|_| {
            invalid(
                "simulation",
                "percentiles",
                format!("invalid percentile {:?}", token.trim()),
            )
        })?;
        if !(0.0..=100.0).contains(&value) {
            return Err(invalid(
                "simulation",
                "percentiles",
                "percentiles must be between 0 and 100",
            ));
        }
        values.push(value);
    }
    Ok(Some(values))
}
