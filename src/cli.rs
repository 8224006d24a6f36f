//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::cached_price_adapter::CachedPriceAdapter;
use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::{percentiles_csv, sessions_csv, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{
    project, run_analysis, AnalysisConfig, AnalysisOutcome, Projection, SimulationConfig,
    DEFAULT_RISK_FREE_RATE, DEFAULT_TOTAL_INVEST,
};
use crate::domain::config_validation::{
    parse_date, parse_double, parse_int, parse_percentiles, parse_seed,
    validate_analysis_config, validate_simulation_config,
};
use crate::domain::error::PortvisError;
use crate::domain::metrics::MetricsResult;
use crate::domain::monte_carlo::{
    percentiles, simulate_paths, terminal_percentiles, SimulationParams, DEFAULT_DAYS,
    DEFAULT_PERCENTILES, DEFAULT_SIMS, FAN_CHART_PATHS,
};
use crate::domain::portfolio::DEFAULT_INDEX_BASE;
use crate::domain::session::{default_label, AnalysisSession, SessionStore};
use crate::domain::tickers::clean_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ExportPort;

#[derive(Parser, Debug)]
#[command(name = "portvis", about = "Stock portfolio visualizer and risk estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze an equal-weight portfolio and project its value
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory of <SYMBOL>.csv price files (overrides [data] path)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Artifact directory (overrides [output] dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Simulation seed (overrides [simulation] seed)
        #[arg(long)]
        seed: Option<u64>,
        /// Save the analysis summary under this label
        #[arg(long)]
        save: Option<String>,
    },
    /// Run the Monte Carlo simulator on its own
    Simulate {
        #[arg(long)]
        initial: f64,
        #[arg(long)]
        mu: f64,
        #[arg(long)]
        sigma: f64,
        #[arg(long, default_value_t = DEFAULT_DAYS)]
        days: usize,
        #[arg(long, default_value_t = DEFAULT_SIMS)]
        sims: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Write the percentile table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            data,
            output,
            seed,
            save,
        } => {
            let mut session = AnalysisSession::new();
            run_analyze(
                &mut session,
                &config,
                data.as_ref(),
                output.as_ref(),
                seed,
                save.as_deref(),
            )
        }
        Command::Simulate {
            initial,
            mu,
            sigma,
            days,
            sims,
            seed,
            output,
        } => run_simulate(
            SimulationParams {
                initial_value: initial,
                mu,
                sigma,
                days,
                sims,
                seed,
            },
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: PortvisError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, PortvisError> {
    let tickers = clean_tickers(&adapter.get_string("analysis", "tickers").unwrap_or_default());
    if tickers.is_empty() {
        return Err(PortvisError::ConfigMissing {
            section: "analysis".into(),
            key: "tickers".into(),
        });
    }

    let start_date = parse_date(
        adapter.get_string("analysis", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("analysis", "end_date").as_deref(),
        "end_date",
    )?;

    Ok(AnalysisConfig {
        tickers,
        start_date,
        end_date,
        total_invest: parse_double(adapter, "analysis", "total_invest", DEFAULT_TOTAL_INVEST)?,
        risk_free_rate: parse_double(
            adapter,
            "analysis",
            "risk_free_rate",
            DEFAULT_RISK_FREE_RATE,
        )?,
        index_base: parse_double(adapter, "analysis", "index_base", DEFAULT_INDEX_BASE)?,
    })
}

pub fn build_simulation_config(
    adapter: &dyn ConfigPort,
) -> Result<SimulationConfig, PortvisError> {
    let defaults = SimulationConfig::default();

    let days = parse_int(adapter, "simulation", "days", DEFAULT_DAYS as i64)?;
    let days = usize::try_from(days).map_err(|_| PortvisError::ConfigInvalid {
        section: "simulation".into(),
        key: "days".into(),
        reason: "days must be non-negative".into(),
    })?;
    let sims = parse_int(adapter, "simulation", "sims", DEFAULT_SIMS as i64)?;
    let sims = usize::try_from(sims)
        .ok()
        .filter(|s| *s >= 1)
        .ok_or_else(|| PortvisError::ConfigInvalid {
            section: "simulation".into(),
            key: "sims".into(),
            reason: "sims must be at least 1".into(),
        })?;

    let seed = if adapter.get_string("simulation", "seed").is_some() {
        parse_seed(adapter)?
    } else {
        defaults.seed
    };

    Ok(SimulationConfig {
        days,
        sims,
        seed,
        percentiles: parse_percentiles(adapter)?.unwrap_or(defaults.percentiles),
    })
}

fn resolve_path(
    flag: Option<&PathBuf>,
    adapter: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: &str,
) -> PathBuf {
    flag.cloned()
        .or_else(|| adapter.get_non_empty(section, key).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

pub fn run_analyze(
    session: &mut AnalysisSession,
    config_path: &Path,
    data_dir: Option<&PathBuf>,
    output_dir: Option<&PathBuf>,
    seed_override: Option<u64>,
    save_label: Option<&str>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_analysis_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(e);
    }

    let analysis = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let mut simulation = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if seed_override.is_some() {
        simulation.seed = seed_override;
    }

    // Stage 2: Wire adapters
    let data_dir = resolve_path(data_dir, &adapter, "data", "path", "data");
    let output_dir = resolve_path(output_dir, &adapter, "output", "dir", ".");
    let prices = CachedPriceAdapter::new(CsvPriceAdapter::new(data_dir));
    let mut exporter = CsvReportAdapter::new(output_dir);
    if adapter.get_bool("output", "fan_paths", false) {
        exporter = exporter.with_fan_paths(FAN_CHART_PATHS);
    }

    let code = run_analysis_pipeline(
        session,
        &prices,
        &exporter,
        analysis,
        &simulation,
        save_label,
    );
    if !session.store().is_empty() {
        if let Err(e) = print_session_table(session.store()) {
            return fail(e);
        }
    }
    code
}

pub fn run_analysis_pipeline(
    session: &mut AnalysisSession,
    price_port: &dyn PricePort,
    exporter: &dyn ExportPort,
    config: AnalysisConfig,
    simulation: &SimulationConfig,
    save_label: Option<&str>,
) -> ExitCode {
    eprintln!(
        "Analyzing {} from {} to {}",
        config.tickers.join(", "),
        config.start_date,
        config.end_date
    );

    // Stage 3: Fetch prices and compute metrics
    let result = match run_analysis(price_port, &config) {
        Ok(AnalysisOutcome::Completed(result)) => *result,
        Ok(AnalysisOutcome::Empty) => {
            let err = PortvisError::NoData {
                symbols: config.tickers.join(","),
                start: config.start_date.to_string(),
                end: config.end_date.to_string(),
            };
            eprintln!("warning: {err}");
            return (&err).into();
        }
        Err(e) => return fail(e),
    };

    // Stage 4: Monte Carlo projection
    let projection = match project(&result.metrics, config.total_invest, simulation) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    print_summary(&result.metrics, &result.allocation(), &projection, simulation);

    // Stage 5: Artifacts
    match exporter.write_all(&result, &projection) {
        Ok(paths) => {
            for path in paths {
                eprintln!("Wrote {}", path.display());
            }
        }
        Err(e) => return fail(e),
    }

    let tickers = config.tickers.clone();
    session.record_analysis(config, result);

    // Stage 6: Optional session save
    if let Some(label) = save_label {
        let label = if label.trim().is_empty() {
            default_label(&tickers, Local::now().date_naive())
        } else {
            label.to_string()
        };
        match session.save(&label) {
            Ok(id) => eprintln!("\nSession '{}' saved ({})", label, id),
            Err(e) => return fail(e),
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(
    metrics: &MetricsResult,
    allocation: &[(String, f64)],
    projection: &Projection,
    simulation: &SimulationConfig,
) {
    eprintln!("\n=== Portfolio Metrics ===");
    eprintln!("Expected Annual Return: {:.2}%", metrics.expected_return * 100.0);
    eprintln!("Annual Volatility:      {:.2}%", metrics.volatility * 100.0);
    eprintln!("Sharpe Ratio:           {:.2}", metrics.sharpe);

    eprintln!("\n=== Allocation ===");
    for (symbol, weight) in allocation {
        eprintln!("  {}: {:.1}%", symbol, weight * 100.0);
    }

    eprintln!(
        "\n=== Monte Carlo ({} days, {} paths) ===",
        simulation.days, simulation.sims
    );
    for (q, value) in &projection.terminal {
        eprintln!("  {:>5}th pct: ${:.0}", q, value);
    }
}

fn print_session_table(store: &SessionStore) -> Result<(), PortvisError> {
    let bytes = sessions_csv(&store.records())?;
    std::io::stdout().write_all(&bytes)?;
    Ok(())
}

pub fn run_simulate(params: SimulationParams, output: Option<&PathBuf>) -> ExitCode {
    let paths = match simulate_paths(&params) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    let bands = match percentiles(&paths, &DEFAULT_PERCENTILES) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let terminal = match terminal_percentiles(&paths, &DEFAULT_PERCENTILES) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    eprintln!(
        "Simulated {} paths over {} days from {:.2}",
        params.sims, params.days, params.initial_value
    );
    for (q, value) in &terminal {
        eprintln!("  {:>5}th pct: {:.2}", q, value);
    }

    let bytes = match percentiles_csv(&bands) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    match output {
        Some(path) => match std::fs::write(path, &bytes) {
            Ok(()) => {
                eprintln!("Percentiles written to: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => fail(e.into()),
        },
        None => {
            print!("{}", String::from_utf8_lossy(&bytes));
            ExitCode::SUCCESS
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_simulation_config(&adapter) {
        return fail(e);
    }

    let analysis = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let simulation = match build_simulation_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    eprintln!("\nAnalysis:");
    eprintln!("  tickers:        {}", analysis.tickers.join(", "));
    eprintln!("  period:         {} to {}", analysis.start_date, analysis.end_date);
    eprintln!("  total_invest:   {:.2}", analysis.total_invest);
    eprintln!("  risk_free_rate: {}", analysis.risk_free_rate);
    eprintln!("\nSimulation:");
    eprintln!("  days:           {}", simulation.days);
    eprintln!("  sims:           {}", simulation.sims);
    match simulation.seed {
        Some(seed) => eprintln!("  seed:           {}", seed),
        None => eprintln!("  seed:           entropy"),
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
