//! Command-line interface with topic help

pub mod help;

pub use help::HelpSystem;

use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ", ",
    env!("TARGET_TRIPLE"),
    ")"
);

/// Reachability Rerun - re-verify cloud connectivity tests and report PASS/FAIL
#[derive(Parser, Debug, Clone)]
#[command(name = "reachability-rerun")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Cloud project that owns the connectivity tests
    #[arg(long)]
    pub project: Option<String>,

    /// Location of the connectivity tests [default: global]
    #[arg(long)]
    pub location: Option<String>,

    /// Comma-separated test IDs or resource names; all tests when omitted
    #[arg(long)]
    pub tests: Option<String>,

    /// Service-account key file to encrypt into the Travis configuration
    #[arg(long = "secretkey", value_name = "PATH")]
    pub secret_key: Option<PathBuf>,

    /// Generate CI configuration instead of running tests (travis, circleci)
    #[arg(long, value_name = "TARGET")]
    pub gen: Option<String>,

    /// Print raw API responses and progress
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// OAuth2 access token to use instead of discovering credentials
    #[arg(long, hide_env_values = true, env = "REACHABILITY_TOKEN")]
    pub token: Option<String>,

    /// Base URL of the reachability API
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Delay between polls of a pending rerun, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Seconds to wait for a rerun to finish, 0 waits forever
    #[arg(long, value_name = "SECONDS")]
    pub poll_timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Show help for a specific topic (auth, config, gen, exit-codes)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Parse arguments, accepting `-name` as well as `--name` for long flags
    pub fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_long_flags(args))
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Display help for the requested topic
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        match &self.help_topic {
            Some(topic) => help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: {}\n",
                    topic,
                    HelpSystem::topics().join(", ")
                )
            }),
            None => help_system.display_topic_help("config", use_colors).unwrap_or_default(),
        }
    }
}

/// Rewrite single-dash long flags (`-project=p`, `-gen travis`) to their
/// double-dash form. Short flags and values are left untouched.
pub fn normalize_long_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let long_names: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .chain(["help", "version"])
        .collect();

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|text| {
                let flag = text.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
                let name = flag.split('=').next().unwrap_or(flag);
                long_names.contains(&name).then(|| OsString::from(format!("-{}", text)))
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::try_parse_from(["test", "--project", "my-project"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some("my-project"));
        assert!(cli.location.is_none());
        assert!(cli.tests.is_none());
        assert!(!cli.verbose);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::try_parse_from([
            "test",
            "--project", "p",
            "--location", "us-central1",
            "--tests", "a,b",
            "--secretkey", "/tmp/key.json",
            "--gen", "travis",
            "-v",
            "--token", "abc",
            "--endpoint", "http://localhost:8080/v1beta1",
            "--poll-interval-ms", "50",
            "--poll-timeout", "30",
            "--no-color",
            "--debug",
        ])
        .unwrap();

        assert_eq!(cli.location.as_deref(), Some("us-central1"));
        assert_eq!(cli.tests.as_deref(), Some("a,b"));
        assert_eq!(cli.secret_key, Some(PathBuf::from("/tmp/key.json")));
        assert_eq!(cli.gen.as_deref(), Some("travis"));
        assert!(cli.verbose);
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8080/v1beta1"));
        assert_eq!(cli.poll_interval_ms, Some(50));
        assert_eq!(cli.poll_timeout, Some(30));
        assert!(cli.no_color);
        assert!(cli.debug);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_equals_syntax() {
        let cli = Cli::try_parse_from(["test", "--project=p", "--tests=t1"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some("p"));
        assert_eq!(cli.tests.as_deref(), Some("t1"));
    }

    #[test]
    fn test_single_dash_long_flags() {
        let cli = Cli::try_parse_args([
            "test",
            "-project=p",
            "-location", "europe-west1",
            "-tests=a,b",
            "-gen", "travis",
            "-secretkey=key.json",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.project.as_deref(), Some("p"));
        assert_eq!(cli.location.as_deref(), Some("europe-west1"));
        assert_eq!(cli.tests.as_deref(), Some("a,b"));
        assert_eq!(cli.gen.as_deref(), Some("travis"));
        assert_eq!(cli.secret_key, Some(PathBuf::from("key.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_normalize_leaves_values_and_short_flags() {
        let args = normalize_long_flags(["test", "-v", "--project", "p", "-x", "plain", "-debug"]);
        let expected: Vec<OsString> = ["test", "-v", "--project", "p", "-x", "plain", "--debug"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_invalid_poll_interval() {
        assert!(Cli::try_parse_from(["test", "--poll-interval-ms", "soon"]).is_err());
    }

    #[test]
    fn test_unknown_help_topic() {
        let cli = Cli::try_parse_from(["test", "--help-topic", "nope", "--no-color"]).unwrap();
        let help = cli.display_help();
        assert!(help.contains("Unknown help topic: 'nope'"));
        assert!(help.contains("auth"));
    }
}
