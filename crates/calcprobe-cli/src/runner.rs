//! Suite runner: picks a session provider and drives the harness

use std::path::Path;

use calcprobe::catalog;
use calcprobe::mock::MockProvider;
use calcprobe::{Harness, HarnessConfig, Scenario, SessionProvider, SuiteReport};

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// Runs catalog scenarios for the `run` command
#[derive(Debug)]
pub struct SuiteRunner {
    config: CliConfig,
    harness_config: HarnessConfig,
    reporter: ProgressReporter,
}

impl SuiteRunner {
    /// Create a new suite runner
    #[must_use]
    pub fn new(config: CliConfig, harness_config: HarnessConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self {
            config,
            harness_config,
            reporter,
        }
    }

    /// Harness configuration in effect
    #[must_use]
    pub const fn harness_config(&self) -> &HarnessConfig {
        &self.harness_config
    }

    /// Run `scenarios` on sessions from `provider`
    pub async fn run_with<P>(&mut self, provider: &P, scenarios: &[Scenario]) -> SuiteReport
    where
        P: SessionProvider + ?Sized,
    {
        let mut harness = Harness::new(&self.harness_config);
        harness.fail_fast = self.config.fail_fast;

        self.reporter
            .start_progress(scenarios.len() as u64, "Running scenarios");
        let report = harness
            .run_suite_observed(provider, scenarios, &self.reporter)
            .await;
        self.reporter.finish();
        self.reporter.summary(&report);
        report
    }

    /// Execute the `run` command
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<SuiteReport> {
        let scenarios = catalog::select(args.filter.as_deref());
        if scenarios.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches filter {:?}",
                args.filter.as_deref().unwrap_or_default()
            )));
        }

        tracing::debug!(
            scenarios = scenarios.len(),
            mock = args.mock,
            url = %self.harness_config.url,
            "starting run"
        );

        let report = if args.mock {
            self.reporter.info("Using simulated calculator");
            self.run_with(&MockProvider::new(), &scenarios).await
        } else {
            self.run_browser(&scenarios).await?
        };

        if let Some(path) = &args.report {
            write_report(&report, path)?;
            self.reporter
                .info(&format!("Report written to {}", path.display()));
        }

        if report.all_passed() {
            Ok(report)
        } else {
            Err(CliError::ScenariosFailed {
                failed: report.failed(),
                total: report.total(),
            })
        }
    }

    #[cfg(feature = "browser")]
    async fn run_browser(&mut self, scenarios: &[Scenario]) -> CliResult<SuiteReport> {
        let provider = calcprobe::ChromiumProvider::new(
            self.harness_config.browser.clone(),
            self.harness_config.url.clone(),
        );
        self.reporter
            .info(&format!("Testing {}", self.harness_config.url));
        Ok(self.run_with(&provider, scenarios).await)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_browser(&mut self, _scenarios: &[Scenario]) -> CliResult<SuiteReport> {
        Err(CliError::config(
            "browser support not enabled; rebuild with --features browser or pass --mock",
        ))
    }
}

/// Write the suite report as pretty JSON
pub fn write_report(report: &SuiteReport, path: &Path) -> CliResult<()> {
    let json = report.to_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn quiet_config() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    fn fast_harness() -> HarnessConfig {
        HarnessConfig::default()
            .with_settle_ms(0)
            .with_presence_timeout_ms(20)
            .with_interactable_timeout_ms(20)
            .with_readiness_timeout_ms(20)
    }

    #[tokio::test]
    async fn test_mock_run_passes() {
        let mut runner = SuiteRunner::new(quiet_config(), fast_harness());
        let args = RunArgs {
            mock: true,
            ..RunArgs::default()
        };
        let report = runner.run(&args).await.unwrap();
        assert_eq!(report.passed(), 3);
    }

    #[tokio::test]
    async fn test_filter() {
        let mut runner = SuiteRunner::new(quiet_config(), fast_harness());
        let args = RunArgs {
            mock: true,
            filter: Some("digits".into()),
            ..RunArgs::default()
        };
        let report = runner.run(&args).await.unwrap();
        assert_eq!(report.total(), 1);
    }

    #[tokio::test]
    async fn test_unknown_filter_is_error() {
        let mut runner = SuiteRunner::new(quiet_config(), fast_harness());
        let args = RunArgs {
            mock: true,
            filter: Some("nothing".into()),
            ..RunArgs::default()
        };
        let err = runner.run(&args).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_failing_suite_is_error() {
        let mut runner = SuiteRunner::new(quiet_config(), fast_harness());
        let provider = MockProvider::with_factory(|| {
            calcprobe::mock::MockSession::new().without("symbolMinus")
        });
        let report = runner.run_with(&provider, &catalog::catalog()).await;
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let mut runner = SuiteRunner::new(quiet_config(), fast_harness());
        let args = RunArgs {
            mock: true,
            report: Some(path.clone()),
            ..RunArgs::default()
        };
        runner.run(&args).await.unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["scenarios"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_harness_config_kept() {
        let runner = SuiteRunner::new(quiet_config(), fast_harness());
        assert_eq!(runner.harness_config().settle_ms, 0);
    }
}
