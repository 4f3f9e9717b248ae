//! Scenario execution.
//!
//! [`Harness`] runs each scenario on its own session: readiness gate, then
//! steps and checkpoints strictly in order, stopping at the first failure.
//! Scenarios are never retried as a whole; resilience lives in the
//! per-activation fallback.

use std::time::Instant;

use crate::activator::Activator;
use crate::config::HarnessConfig;
use crate::display::DisplayReader;
use crate::keypad::display_selector;
use crate::report::{ScenarioReport, SuiteReport};
use crate::result::{HarnessError, HarnessResult};
use crate::scenario::{Action, Scenario};
use crate::session::{CalculatorSession, SessionProvider};
use crate::wait::{wait_for_element, ElementState, WaitOptions};

/// Receives progress while a suite runs
pub trait SuiteObserver: Send + Sync {
    /// A scenario is about to start
    fn scenario_started(&self, _scenario: &Scenario, _index: usize, _total: usize) {}

    /// A scenario finished
    fn scenario_finished(&self, _report: &ScenarioReport) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SuiteObserver for Silent {}

/// Runs scenarios against sessions
#[derive(Debug, Clone, Default)]
pub struct Harness {
    activator: Activator,
    reader: DisplayReader,
    readiness: WaitOptions,
    /// Whether to stop the suite after the first failing scenario
    pub fail_fast: bool,
}

impl Harness {
    /// Create a harness from a config
    #[must_use]
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            activator: Activator::new(config.activation()),
            reader: DisplayReader::new(),
            readiness: config.readiness(),
            fail_fast: false,
        }
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Wait for the calculator display to appear.
    ///
    /// # Errors
    ///
    /// [`HarnessError::SessionUnavailable`] if it does not appear in time.
    pub async fn ensure_ready<S>(&self, session: &S) -> HarnessResult<()>
    where
        S: CalculatorSession + ?Sized,
    {
        let selector = display_selector();
        match wait_for_element(session, &selector, ElementState::Attached, &self.readiness).await {
            Ok(_) => Ok(()),
            Err(HarnessError::Timeout { ms, .. }) => Err(HarnessError::session(format!(
                "calculator display did not appear within {ms}ms"
            ))),
            Err(err) => Err(err),
        }
    }

    /// Run one scenario on an open session.
    ///
    /// Mismatches, unreachable controls and invalid scenarios end up in the
    /// report.
    ///
    /// # Errors
    ///
    /// [`HarnessError::SessionUnavailable`] when the session fails.
    pub async fn run_scenario<S>(
        &self,
        session: &S,
        scenario: &Scenario,
    ) -> HarnessResult<ScenarioReport>
    where
        S: CalculatorSession + ?Sized,
    {
        match self.run_counted(session, scenario).await {
            (_, Some(err)) => Err(err),
            (report, None) => Ok(report),
        }
    }

    /// Run `scenario`, returning the report so far alongside any session
    /// error that cut it short
    async fn run_counted<S>(
        &self,
        session: &S,
        scenario: &Scenario,
    ) -> (ScenarioReport, Option<HarnessError>)
    where
        S: CalculatorSession + ?Sized,
    {
        let start = Instant::now();
        let mut report = ScenarioReport::new(scenario.name());
        tracing::info!(scenario = scenario.name(), "scenario started");

        let (report, session_error) = match self.execute(session, scenario, &mut report).await {
            Ok(()) => (report, None),
            Err(err) if err.is_session_level() => (report, Some(err)),
            Err(err) => (report.fail(err), None),
        };
        let report = report.with_duration(start.elapsed());

        if let Some(err) = &session_error {
            tracing::warn!(
                scenario = scenario.name(),
                activations = report.activations,
                error = %err,
                "session lost"
            );
        } else if let Some(failure) = &report.failure {
            tracing::info!(scenario = scenario.name(), %failure, "scenario failed");
        } else {
            tracing::info!(
                scenario = scenario.name(),
                activations = report.activations,
                degraded = report.degraded,
                "scenario passed"
            );
        }
        (report, session_error)
    }

    async fn execute<S>(
        &self,
        session: &S,
        scenario: &Scenario,
        report: &mut ScenarioReport,
    ) -> HarnessResult<()>
    where
        S: CalculatorSession + ?Sized,
    {
        scenario.validate()?;
        self.ensure_ready(session).await?;

        for action in scenario.actions() {
            match action {
                Action::Step(step) => {
                    for button in step.presses() {
                        let outcome = self.activator.press(session, &button).await?;
                        report.activations += 1;
                        if outcome.is_degraded() {
                            report.degraded += 1;
                        }
                    }
                }
                Action::Check(checkpoint) => {
                    let actual = self.reader.read(session).await?;
                    if actual != *checkpoint.expected {
                        return Err(HarnessError::AssertionMismatch {
                            description: checkpoint.description.clone(),
                            expected: checkpoint.expected.clone(),
                            actual: actual.into_inner(),
                        });
                    }
                    report.checkpoints_passed += 1;
                    tracing::debug!(check = %checkpoint.description, "checkpoint held");
                }
            }
        }
        Ok(())
    }

    /// Run scenarios in order, each on a fresh session from `provider`
    pub async fn run_suite<P>(&self, provider: &P, scenarios: &[Scenario]) -> SuiteReport
    where
        P: SessionProvider + ?Sized,
    {
        self.run_suite_observed(provider, scenarios, &Silent).await
    }

    /// [`Harness::run_suite`] reporting progress to `observer`
    pub async fn run_suite_observed<P>(
        &self,
        provider: &P,
        scenarios: &[Scenario],
        observer: &dyn SuiteObserver,
    ) -> SuiteReport
    where
        P: SessionProvider + ?Sized,
    {
        let start = Instant::now();
        let mut suite = SuiteReport::default();

        for (index, scenario) in scenarios.iter().enumerate() {
            observer.scenario_started(scenario, index, scenarios.len());
            let report = self.run_isolated(provider, scenario).await;
            observer.scenario_finished(&report);
            let failed = !report.passed;
            suite.scenarios.push(report);
            if failed && self.fail_fast {
                tracing::info!(scenario = scenario.name(), "stopping after failure");
                break;
            }
        }

        suite.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        suite
    }

    async fn run_isolated<P>(&self, provider: &P, scenario: &Scenario) -> ScenarioReport
    where
        P: SessionProvider + ?Sized,
    {
        let start = Instant::now();
        let session = match provider.open().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(scenario = scenario.name(), error = %err, "cannot open session");
                return ScenarioReport::new(scenario.name())
                    .fail(err)
                    .with_duration(start.elapsed());
            }
        };

        let report = match self.run_counted(&session, scenario).await {
            (report, None) => report,
            (report, Some(err)) => report.fail(err),
        };

        if let Err(err) = provider.close(session).await {
            tracing::warn!(scenario = scenario.name(), error = %err, "session teardown failed");
        }
        report
    }
}
