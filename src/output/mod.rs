//! Result reporting
//!
//! Reachable tests are reported on stdout and everything else on stderr, one
//! `name<TAB>RESULT<TAB>` line per test, so CI logs and shell pipelines can
//! tell them apart without parsing colors.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{format_duration, result_line, FormattingOptions, OutputFormatter, PlainFormatter};

use crate::{
    error::Result,
    executor::{OutcomeSink, RunSummary, TestOutcome},
    models::Config,
};
use std::io::Write;
use std::sync::Arc;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Stream a rendered line belongs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    verbose: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, verbose: bool) -> Self {
        Self { formatter, verbose }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color, config.verbose),
            config.verbose,
        )
    }

    /// Render one outcome and pick its stream
    pub fn render_outcome(&self, outcome: &TestOutcome) -> Result<(OutputStream, String)> {
        let stream = if outcome.passed() { OutputStream::Stdout } else { OutputStream::Stderr };
        Ok((stream, self.formatter.format_outcome(outcome)?))
    }

    /// Print one outcome as soon as it is known
    pub fn display_outcome(&self, outcome: &TestOutcome) -> Result<()> {
        let (stream, line) = self.render_outcome(outcome)?;
        match stream {
            OutputStream::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", line)?;
                out.flush()?;
            }
            OutputStream::Stderr => {
                let mut err = std::io::stderr().lock();
                writeln!(err, "{}", line)?;
            }
        }
        Ok(())
    }

    /// Summary block printed at the end of a verbose run
    pub fn render_summary(&self, summary: &RunSummary) -> Result<Option<String>> {
        if !self.verbose {
            return Ok(None);
        }
        self.formatter.format_summary(summary).map(Some)
    }

    /// Print the summary to stderr in verbose mode, keeping stdout for results
    pub fn display_summary(&self, summary: &RunSummary) -> Result<()> {
        if let Some(text) = self.render_summary(summary)? {
            eprintln!("\n{}", text);
        }
        Ok(())
    }

    /// Sink for the executor that prints each outcome as it arrives
    pub fn into_sink(self: Arc<Self>) -> OutcomeSink {
        Arc::new(move |outcome: &TestOutcome| {
            if let Err(e) = self.display_outcome(outcome) {
                eprintln!("{}\t{}\t(output error: {})", outcome.name, outcome.result, e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReachabilityResult;
    use crate::types::TestStatus;
    use std::time::Duration;

    fn outcome(name: &str, status: TestStatus) -> TestOutcome {
        let result = match status {
            TestStatus::Pass => ReachabilityResult::Reachable,
            TestStatus::Fail => ReachabilityResult::Unreachable,
        };
        TestOutcome {
            name: name.to_string(),
            result,
            status,
            verify_time: None,
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_streams_follow_status() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false, false), false);

        let (stream, line) = coordinator.render_outcome(&outcome("ok", TestStatus::Pass)).unwrap();
        assert_eq!(stream, OutputStream::Stdout);
        assert_eq!(line, "ok\tREACHABLE\t");

        let (stream, line) = coordinator.render_outcome(&outcome("bad", TestStatus::Fail)).unwrap();
        assert_eq!(stream, OutputStream::Stderr);
        assert_eq!(line, "bad\tUNREACHABLE\t");
    }

    #[test]
    fn test_summary_only_in_verbose_mode() {
        let summary = RunSummary {
            outcomes: vec![outcome("ok", TestStatus::Pass)],
            total: 1,
            passed: 1,
            failed: 0,
            elapsed: Duration::from_millis(20),
        };

        let quiet = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false, false), false);
        assert!(quiet.render_summary(&summary).unwrap().is_none());

        let verbose = OutputCoordinator::new(OutputFormatterFactory::create_formatter(false, true), true);
        let text = verbose.render_summary(&summary).unwrap().unwrap();
        assert!(text.contains("Total:    1"));
    }

    #[test]
    fn test_factory_honours_color_flag() {
        let colored = OutputFormatterFactory::create_formatter(true, false);
        let line = colored.format_outcome(&outcome("t", TestStatus::Pass)).unwrap();
        assert!(line.contains("PASS"));
        assert!(line.ends_with(" t\tREACHABLE\t"));

        let plain = OutputFormatterFactory::create_formatter(false, false);
        assert_eq!(plain.format_outcome(&outcome("t", TestStatus::Pass)).unwrap(), "t\tREACHABLE\t");
    }
}
