//! CLI command definitions using clap

use calcprobe::HarnessConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::CliResult;

/// Calcprobe: acceptance scenarios for a web calculator widget
#[derive(Parser, Debug)]
#[command(name = "calcprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run acceptance scenarios
    Run(RunArgs),

    /// List the scenario catalog
    List(ListArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Drive the in-process simulated calculator instead of a browser
    #[arg(long)]
    pub mock: bool,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Write the suite report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// YAML config file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page hosting the calculator
    #[arg(long, env = "CALCPROBE_URL")]
    pub url: Option<String>,

    /// Delay after each activation in milliseconds
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Presence wait budget per activation in milliseconds
    #[arg(long)]
    pub presence_timeout_ms: Option<u64>,

    /// Interactability wait budget per activation in milliseconds
    #[arg(long)]
    pub interactable_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the Chromium binary
    #[arg(long)]
    pub chromium_path: Option<String>,
}

impl RunArgs {
    /// Config file (or defaults) with command line overrides applied
    pub fn harness_config(&self) -> CliResult<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_yaml_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(url) = &self.url {
            config = config.with_url(url.as_str());
        }
        if let Some(ms) = self.settle_ms {
            config = config.with_settle_ms(ms);
        }
        if let Some(ms) = self.presence_timeout_ms {
            config = config.with_presence_timeout_ms(ms);
        }
        if let Some(ms) = self.interactable_timeout_ms {
            config = config.with_interactable_timeout_ms(ms);
        }

        let mut browser = config.browser.clone();
        if self.headed {
            browser = browser.with_headless(false);
        }
        if self.no_sandbox {
            browser = browser.with_no_sandbox();
        }
        if let Some(path) = &self.chromium_path {
            browser = browser.with_chromium_path(path.as_str());
        }
        let config = config.with_browser(browser);

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Print scenarios as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
