//! Output formatting and progress reporting

use calcprobe::{Scenario, ScenarioReport, SuiteObserver, SuiteReport};
use console::{style, Color, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Pass,
    Fail,
    Warn,
    Info,
}

impl Tag {
    const fn glyph(self) -> (&'static str, Color) {
        match self {
            Self::Pass => ("✓", Color::Green),
            Self::Fail => ("✗", Color::Red),
            Self::Warn => ("⚠", Color::Yellow),
            Self::Info => ("ℹ", Color::Blue),
        }
    }

    const fn plain(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        }
    }
}

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_hidden() => pb.println(text),
            _ => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn tagged(&self, tag: Tag, message: &str) {
        if self.quiet && tag != Tag::Fail {
            return;
        }
        let prefix = if self.use_color {
            let (glyph, color) = tag.glyph();
            style(glyph).fg(color).bold().to_string()
        } else {
            tag.plain().to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.tagged(Tag::Pass, message);
    }

    /// Print a failure message; shown even in quiet mode
    pub fn failure(&self, message: &str) {
        self.tagged(Tag::Fail, message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.tagged(Tag::Warn, message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.tagged(Tag::Info, message);
    }

    /// Print suite summary
    pub fn summary(&self, report: &SuiteReport) {
        let failed = report.failed();
        if self.quiet && failed == 0 {
            return;
        }

        let passed = report.passed();
        let total = report.total();
        let degraded = report.degraded();
        let duration_secs = Duration::from_millis(report.duration_ms).as_secs_f64();

        let _ = self.term.write_line("");
        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let degraded_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} forced activations)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                degraded_style.apply_to(degraded)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {degraded} forced activations)"
            ));
        }
    }
}

impl SuiteObserver for ProgressReporter {
    fn scenario_started(&self, scenario: &Scenario, _index: usize, _total: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(scenario.name().to_string());
        }
    }

    fn scenario_finished(&self, report: &ScenarioReport) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
        match &report.failure {
            None if report.degraded > 0 => self.warning(&format!(
                "{} ({} of {} activations forced)",
                report.name, report.degraded, report.activations
            )),
            None => self.success(&report.name),
            Some(failure) => self.failure(&format!("{}: {failure}", report.name)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_default_reporter() {
            let reporter = ProgressReporter::default();
            assert!(reporter.use_color);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("warned");
            reporter.info("info");
        }

        #[test]
        fn test_summary() {
            let reporter = ProgressReporter::new(false, false);
            let report = SuiteReport {
                scenarios: vec![ScenarioReport::new("a")],
                duration_ms: 1200,
            };
            reporter.summary(&report);
        }

        #[test]
        fn test_observer_with_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "Running scenarios");
            reporter.scenario_started(&Scenario::new("a"), 0, 2);
            reporter.scenario_finished(&ScenarioReport::new("a"));
            let mut degraded = ScenarioReport::new("b");
            degraded.degraded = 1;
            degraded.activations = 4;
            reporter.scenario_finished(&degraded);
            reporter.finish();
            assert_eq!(reporter.progress_bar.as_ref().unwrap().position(), 2);
        }

        #[test]
        fn test_quiet_mode_skips_progress() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.failure("shown");
        }
    }
}
