use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weight_trend::utils::format_date;
use weight_trend::{analyze, AnalysisConfig, AnalysisParams, DateWindow, StoredData, TrendError};

const USAGE: &str =
    "usage: trend_report <store.json> [--config <file.toml|file.json>]... [--recent <count>]";

#[derive(Debug, PartialEq)]
struct Args {
    store: PathBuf,
    toml: Option<PathBuf>,
    json: Option<PathBuf>,
    recent: Option<usize>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, String> {
    let mut args = args.into_iter();
    let mut store = None;
    let mut toml = None;
    let mut json = None;
    let mut recent = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = PathBuf::from(args.next().ok_or("--config needs a path")?);
                match path.extension().and_then(|e| e.to_str()) {
                    Some("toml") => toml = Some(path),
                    Some("json") => json = Some(path),
                    _ => return Err(format!("unsupported config file '{}'", path.display())),
                }
            }
            "--recent" | "-r" => {
                let count = args.next().ok_or("--recent needs a count")?;
                recent = Some(
                    count
                        .parse::<usize>()
                        .map_err(|_| format!("invalid recent count '{}'", count))?,
                );
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            _ if store.is_none() => store = Some(PathBuf::from(arg)),
            other => return Err(format!("unexpected argument '{}'\n{}", other, USAGE)),
        }
    }

    Ok(Args {
        store: store.ok_or_else(|| USAGE.to_string())?,
        toml,
        json,
        recent,
    })
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> weight_trend::Result<()> {
    let config = AnalysisConfig::load_layered(args.toml.as_deref(), args.json.as_deref())?;
    init_logging(&config.log_level);
    let projection = match args.recent {
        Some(count) => config.projection_with_recent_count(count)?,
        None => config.projection,
    };

    let store = StoredData::load(&args.store)?;
    let series = store.series()?;
    let milestones = store.normalized_milestones()?;

    let Some(last) = series.last() else {
        println!("No entries recorded yet.");
        return Ok(());
    };

    let window = DateWindow::last_months(last.timestamp, config.default_window_months)?;
    let params = AnalysisParams::new(window).with_projection(projection);
    let (start, end) = (format_date(window.start)?, format_date(window.end)?);
    info!(%start, %end, "analysing window");

    let analysis = analyze(&series, &milestones, &params)?;

    println!(
        "Window: {} to {} ({} entries)",
        start,
        end,
        analysis.windowed.len()
    );
    match (&analysis.milestone, &analysis.fit) {
        (Some(milestone), Some(fit)) => println!(
            "Trend since {} ({}): {:.2}/week over {} entries",
            milestone.label,
            format_date(milestone.timestamp)?,
            fit.regression.slope_per_week(),
            fit.sample_size
        ),
        (Some(milestone), None) => println!(
            "Not enough entries since {} for a trend",
            milestone.label
        ),
        (None, _) => println!("No milestone in window"),
    }
    if let Some(end) = analysis.projection_end {
        println!("Projected by {}", format_date(end)?);
    }
    print!("{}", analysis.summary);

    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ (TrendError::ConfigError(_) | TrendError::InvalidParameter(_))) => {
            eprintln!("{}", err);
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
