use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use harstat_cli::OutputFormat;
use harstat_cli::commands;
use harstat_cli::commands::report::ReportOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harstat")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Traffic statistics for HTTP Archive (HAR) captures",
    long_about = "harstat turns a HAR capture into a traffic report: latency and size \
                  statistics, percentiles, top-N rankings, and request counts grouped by \
                  status code, method, host and URL prefix."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a statistics report from a HAR file
    Report {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of entries in each top-N ranking
        #[arg(short = 'n', long, env = "HARSTAT_TOP_N")]
        top_n: Option<usize>,

        /// Comma-separated request size quantiles in [0,1] ("none" to skip)
        #[arg(long, env = "HARSTAT_SIZE_QUANTILES", value_parser = parse_quantiles)]
        size_quantiles: Option<QuantileList>,

        /// Comma-separated latency quantiles in [0,1] ("none" to skip)
        #[arg(long, env = "HARSTAT_LATENCY_QUANTILES", value_parser = parse_quantiles)]
        latency_quantiles: Option<QuantileList>,

        /// Fail on malformed URLs instead of leaving them out of URL groupings
        #[arg(long)]
        strict_urls: bool,

        /// Only include hosts matching these patterns (repeatable, globs allowed)
        #[arg(long = "host", value_name = "PATTERN")]
        hosts: Vec<String>,

        /// Only include status codes matching this pattern (404, 4xx, 500-599)
        #[arg(long)]
        status: Option<String>,

        /// Only include this HTTP method
        #[arg(long)]
        method: Option<String>,

        /// Only include responses whose content type contains this text
        #[arg(long)]
        content_type: Option<String>,

        /// Write one CSV row per transaction to this file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,

        /// Write the full report as JSON to this file
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone)]
struct QuantileList(Vec<f64>);

fn parse_quantiles(raw: &str) -> Result<QuantileList, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Ok(QuantileList(Vec::new()));
    }

    raw.split(',')
        .map(|part| {
            let q: f64 = part
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a number", part.trim()))?;
            if (0.0..=1.0).contains(&q) {
                Ok(q)
            } else {
                Err(format!("quantile {} is outside [0, 1]", q))
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(QuantileList)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report {
            file,
            top_n,
            size_quantiles,
            latency_quantiles,
            strict_urls,
            hosts,
            status,
            method,
            content_type,
            csv,
            json,
        } => {
            let options = ReportOptions {
                top_n,
                size_quantiles: size_quantiles.map(|q| q.0),
                latency_quantiles: latency_quantiles.map(|q| q.0),
                strict_urls,
                hosts,
                status,
                method,
                content_type,
                csv,
                json,
            };
            commands::report::execute(&file, &options, cli.format)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("harstat=debug,harstat_cli=debug,harstat_core=debug")
    } else {
        EnvFilter::new("harstat=info,harstat_cli=info,harstat_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
