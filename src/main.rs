//! Reachability Rerun - Main CLI Application
//!
//! Re-verifies cloud connectivity tests and exits non-zero when any tested
//! path is no longer reachable, so it can gate a CI pipeline.

use reachability_rerun::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the output of --version.");
        process::exit(99);
    }));

    let cli = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        // --help and --version print to stdout and exit 0
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // Usage errors share the configuration error exit code
            let _ = e.print();
            process::exit(1);
        }
    };

    if cli.help_topic.is_some() {
        print!("{}", cli.display_help());
        return;
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) if summary.has_failures() => process::exit(summary.exit_code()),
        Ok(_) => {}
        Err(e) => {
            reporter.report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Pass --project or set REACHABILITY_PROJECT");
            eprintln!("  - --gen accepts travis or circleci");
            eprintln!("  - Run with --help-topic config for all settings");
        }
        AppError::Auth(_) => {
            eprintln!();
            eprintln!("Authentication help:");
            eprintln!("  - Run 'gcloud auth application-default login'");
            eprintln!("  - Or pass an access token with --token");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection and proxy settings");
            eprintln!("  - Verify --endpoint if you changed it");
        }
        AppError::Timeout(_) => {
            eprintln!();
            eprintln!("Timeout help:");
            eprintln!("  - Raise --poll-timeout, or pass 0 to wait indefinitely");
        }
        AppError::Generate(_) => {
            eprintln!();
            eprintln!("Generation help:");
            eprintln!("  - Install the travis CLI and run 'travis login' first");
            eprintln!("  - Run with --help-topic gen for details");
        }
        _ => {}
    }
}
