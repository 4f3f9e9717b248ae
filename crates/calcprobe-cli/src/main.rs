//! Calcprobe CLI: acceptance scenarios for a web calculator widget
//!
//! ## Usage
//!
//! ```bash
//! calcprobe list                          # Show the scenario catalog
//! calcprobe run                           # Run every scenario in Chromium
//! calcprobe run --filter negative         # Run matching scenarios
//! calcprobe run --mock --report out.json  # Simulated calculator, JSON report
//! ```

use calcprobe::catalog;
use calcprobe_cli::{
    logging, Cli, CliConfig, CliResult, ColorChoice, Commands, ListArgs, RunArgs, SuiteRunner,
    Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity, config.color.should_color());

    match cli.command {
        Commands::Run(args) => run_scenarios(config, &args),
        Commands::List(args) => run_list(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let harness_config = args.harness_config()?;
    let config = config.with_fail_fast(args.fail_fast);

    let rt = tokio::runtime::Runtime::new()?;
    let mut runner = SuiteRunner::new(config, harness_config);
    rt.block_on(runner.run(args))?;
    Ok(())
}

fn run_list(args: &ListArgs) -> CliResult<()> {
    let scenarios = catalog::catalog();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
        return Ok(());
    }
    for scenario in &scenarios {
        println!("{}", scenario.name());
        for line in scenario.outline() {
            println!("    {line}");
        }
    }
    Ok(())
}
