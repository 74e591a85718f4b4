//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    executor::{RunSummary, TestOutcome},
};
use std::fmt::Write as _;
use std::time::Duration;

/// Main trait for result formatting
pub trait OutputFormatter: Send + Sync {
    /// Format the line reported for one finished test
    fn format_outcome(&self, outcome: &TestOutcome) -> Result<String>;

    /// Format the closing summary block
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with per-test timings
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// The `name<TAB>RESULT<TAB>` line scripts parse
pub fn result_line(outcome: &TestOutcome) -> String {
    format!("{}\t{}\t", outcome.name, outcome.result)
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{:.0}ms", ms)
    } else if ms < 60000.0 {
        format!("{:.1}s", ms / 1000.0)
    } else {
        let minutes = (ms / 60000.0) as u32;
        let seconds = (ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

/// Plain text formatter for scripts and logs
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_outcome(&self, outcome: &TestOutcome) -> Result<String> {
        Ok(result_line(outcome))
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();
        let fail = |e: std::fmt::Error| AppError::io(format!("Failed to format summary: {}", e));

        writeln!(output, "Summary:").map_err(fail)?;
        writeln!(output, "--------").map_err(fail)?;
        writeln!(output, "Total:    {}", summary.total).map_err(fail)?;
        writeln!(output, "Passed:   {}", summary.passed).map_err(fail)?;
        writeln!(output, "Failed:   {}", summary.failed).map_err(fail)?;
        write!(output, "Elapsed:  {}", format_duration(summary.elapsed)).map_err(fail)?;

        if self.options.verbose_mode && !summary.outcomes.is_empty() {
            writeln!(output).map_err(fail)?;
            let mut outcomes: Vec<&TestOutcome> = summary.outcomes.iter().collect();
            outcomes.sort_by(|a, b| a.name.cmp(&b.name));
            for outcome in outcomes {
                write!(
                    output,
                    "\n  {} {} {} ({})",
                    outcome.status.label(),
                    outcome.name,
                    outcome.result,
                    format_duration(outcome.elapsed)
                )
                .map_err(fail)?;
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReachabilityResult;
    use crate::types::TestStatus;

    fn outcome(name: &str, result: ReachabilityResult) -> TestOutcome {
        let status = if result == ReachabilityResult::Reachable { TestStatus::Pass } else { TestStatus::Fail };
        TestOutcome {
            name: name.to_string(),
            result,
            status,
            verify_time: None,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_plain_outcome_line() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        let line = formatter
            .format_outcome(&outcome("projects/p/locations/global/connectivityTests/web", ReachabilityResult::Unreachable))
            .unwrap();
        assert_eq!(line, "projects/p/locations/global/connectivityTests/web\tUNREACHABLE\t");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }

    #[test]
    fn test_summary_counts() {
        let formatter = PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: false,
        });
        let summary = RunSummary {
            outcomes: vec![outcome("a", ReachabilityResult::Reachable)],
            total: 3,
            passed: 2,
            failed: 1,
            elapsed: Duration::from_secs(4),
        };

        let text = formatter.format_summary(&summary).unwrap();
        assert!(text.contains("Total:    3"));
        assert!(text.contains("Failed:   1"));
        assert!(text.contains("Elapsed:  4.0s"));
        assert!(!text.contains("PASS a"));
    }

    #[test]
    fn test_verbose_summary_lists_tests_sorted() {
        let formatter = PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: true,
        });
        let summary = RunSummary {
            outcomes: vec![outcome("b", ReachabilityResult::Ambiguous), outcome("a", ReachabilityResult::Reachable)],
            total: 2,
            passed: 1,
            failed: 1,
            elapsed: Duration::from_secs(2),
        };

        let text = formatter.format_summary(&summary).unwrap();
        let a = text.find("PASS a REACHABLE").unwrap();
        let b = text.find("FAIL b AMBIGUOUS").unwrap();
        assert!(a < b);
    }
}
