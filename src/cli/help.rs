//! Topic help for the command line
//!
//! `--help` covers the flags; the topics here explain how credentials are
//! found, how configuration layers combine, what `--gen` produces and how the
//! exit status should be read in a pipeline.

use crate::config::env::EnvManager;
use colored::*;

/// Help system for the CLI application
pub struct HelpSystem {
    binary: &'static str,
}

impl HelpSystem {
    pub fn new() -> Self {
        Self { binary: crate::PKG_NAME }
    }

    /// Topic names accepted by `--help-topic`
    pub fn topics() -> &'static [&'static str] {
        &["auth", "config", "gen", "exit-codes"]
    }

    /// Display help for a topic, `None` when the topic is unknown
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "auth" | "credentials" => Some(self.format_auth_help(use_colors)),
            "config" | "env" | "environment" => Some(self.format_config_help(use_colors)),
            "gen" | "ci" => Some(self.format_gen_help(use_colors)),
            "exit-codes" | "exit" => Some(self.format_exit_code_help(use_colors)),
            _ => None,
        }
    }

    fn title(&self, text: &str, use_colors: bool) -> String {
        if use_colors {
            format!("{}\n", text.bold().blue())
        } else {
            format!("{}\n{}\n", text, "=".repeat(text.len()))
        }
    }

    fn format_auth_help(&self, use_colors: bool) -> String {
        let mut help = self.title("Authentication", use_colors);
        help.push_str("\nCredentials are resolved in this order:\n\n");
        help.push_str("  1. --token or REACHABILITY_TOKEN\n");
        help.push_str("  2. GOOGLE_APPLICATION_CREDENTIALS or the gcloud application default\n");
        help.push_str("     credentials file: service-account keys and authorized_user\n");
        help.push_str("     credentials are exchanged for a token directly\n");
        help.push_str("  3. `gcloud auth application-default print-access-token`\n\n");
        help.push_str("A token rejected with 401 during a long run is fetched again once.\n");
        help.push_str("An explicit --token cannot be renewed, so runs must finish before it expires.\n\n");
        help.push_str(&format!(
            "Example:\n  {} --project my-project --token \"$(gcloud auth print-access-token)\"\n",
            self.binary
        ));
        help
    }

    fn format_config_help(&self, use_colors: bool) -> String {
        let mut help = self.title("Configuration", use_colors);
        help.push('\n');
        help.push_str(&EnvManager::display_env_help());
        help
    }

    fn format_gen_help(&self, use_colors: bool) -> String {
        let mut help = self.title("CI configuration generation", use_colors);
        help.push_str("\n  --gen travis    requires --secretkey and the `travis` CLI; the key is\n");
        help.push_str("                  encrypted with `travis encrypt-file` and decrypted on CI\n");
        help.push_str("  --gen circleci  expects the key JSON in the GCLOUD_SERVICE_KEY\n");
        help.push_str("                  project environment variable\n\n");
        help.push_str("The configuration is written to stdout:\n\n");
        help.push_str(&format!(
            "  {} --project my-project --gen travis --secretkey key.json > .travis.yml\n",
            self.binary
        ));
        help.push_str(&format!(
            "  {} --project my-project --gen circleci > .circleci/config.yml\n",
            self.binary
        ));
        help
    }

    fn format_exit_code_help(&self, use_colors: bool) -> String {
        let mut help = self.title("Exit codes", use_colors);
        help.push_str("\n  0   every test is REACHABLE\n");
        help.push_str("  1   at least one test is not REACHABLE, or invalid flags or configuration\n");
        help.push_str("  2   network or API error\n");
        help.push_str("  3   a rerun did not finish within --poll-timeout\n");
        help.push_str("  4   no usable credentials\n");
        help.push_str("  5   file or CI generation error\n");
        help.push_str("  99  internal error\n");
        help
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}
