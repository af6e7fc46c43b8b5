use std::path::PathBuf;

use clap::Parser;
use flowplan::{OutputFormat, ReportOptions, init_logging, load_config, render};
use flowplan_core::model::Year;

#[derive(Parser, Debug)]
#[command(name = "flowplan")]
#[command(about = "A year-by-year household cashflow and net worth simulator")]
struct Args {
    /// Simulation configuration (.yaml, .yml or .json)
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// First simulated year (overrides the configuration)
    #[arg(long)]
    start_year: Option<Year>,

    /// Last simulated year (overrides the configuration)
    #[arg(long)]
    end_year: Option<Year>,

    /// Print every warning instead of the first three
    #[arg(long)]
    all_warnings: bool,

    /// Show how cashflows were split in this year
    #[arg(long, value_name = "YEAR")]
    allocations: Option<Year>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    let config = load_config(&args.config)?.with_years(args.start_year, args.end_year);
    let plan = config.build()?;
    let result = flowplan_core::simulate(&plan)?;

    let options = ReportOptions {
        all_warnings: args.all_warnings,
        allocations_year: args.allocations,
    };
    println!("{}", render(&result, &plan, args.format, options)?);

    tracing::info!(warnings = result.warnings.len(), "report printed");
    Ok(())
}
