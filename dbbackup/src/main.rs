//! Database backup tool.
//!
//! Connects to one MySQL, PostgreSQL or MongoDB database and writes every
//! table or collection to its own file in the destination directory.
//!
//! # Exit codes
//! - 1: invalid arguments, connection failure, table listing failure, or
//!   error journal cannot be created
//! - 0: run finished (individual table failures are reported in the
//!   summary and the error journal) or interrupted with Ctrl-C

use clap::Parser;
use dbbackup::run::{EXIT_FAILURE, EXIT_SUCCESS};
use dbbackup::{
    Cli, Interrupt, NoPrompter, RunOutcome, TerminalPrompter, export_until_interrupted,
    usage_exit_status,
};
use dbbackup_core::logging::{default_log_dirs, init_logging};
use dbbackup_core::{
    ErrorLog, ExportOptions, ExportSummary, FileErrorLog, OutputWriter, UnitOutcome, connect,
};
use std::process::ExitCode;
use tracing::{error, info};

/// Environment variable holding the password.
const PASSWORD_ENV: &str = "DBBACKUP_PASSWORD";

const INTERRUPTED_MESSAGE: &str = "Database connection closed";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_status(&e));
        }
    };

    if let Err(e) = init_logging(cli.verbose, cli.quiet) {
        eprintln!("{}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    let interrupt = Interrupt::listen();

    // An explicit directory must work; the defaults fall back in order
    let journal = match &cli.log_dir {
        Some(dir) => FileErrorLog::new(dir),
        None => FileErrorLog::open_first(&default_log_dirs()),
    };
    let journal = match journal {
        Ok(journal) => journal,
        Err(e) => {
            eprintln!("Failed to initialize error journal: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    info!("Error journal: {}", journal.path().display());

    let concurrency = cli.jobs as usize;
    let password = std::env::var(PASSWORD_ENV).ok();
    let prompts = tokio::task::spawn_blocking(move || {
        if cli.no_prompt {
            cli.into_config(&mut NoPrompter, password)
        } else {
            cli.into_config(&mut TerminalPrompter, password)
        }
    });

    let config = match interrupt.race(prompts).await {
        Some(Ok(Ok(config))) => config,
        Some(Ok(Err(e))) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
        Some(Err(e)) => {
            eprintln!("Error: prompt failed: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
        None => {
            println!("{}", INTERRUPTED_MESSAGE);
            // The prompt thread may still be blocked on the terminal, and
            // runtime shutdown would wait for it
            std::process::exit(i32::from(EXIT_SUCCESS));
        }
    };

    info!("Target: {}", config);
    info!("Destination: {}", config.destination.display());

    let adapter = match interrupt.race(connect(&config)).await {
        Some(Ok(adapter)) => adapter,
        Some(Err(e)) => {
            error!("{}", e);
            journal.record(&e.to_string());
            return ExitCode::from(EXIT_FAILURE);
        }
        None => {
            println!("{}", INTERRUPTED_MESSAGE);
            return ExitCode::from(EXIT_SUCCESS);
        }
    };
    println!("Connected to database");

    let writer = OutputWriter::new(config.destination.clone());
    let options = ExportOptions { concurrency };
    let outcome =
        export_until_interrupted(adapter.as_ref(), &writer, &journal, options, &interrupt).await;

    match &outcome {
        RunOutcome::Completed(summary) => print_summary(summary),
        RunOutcome::Interrupted => println!("{}", INTERRUPTED_MESSAGE),
        RunOutcome::Failed => {}
    }
    ExitCode::from(outcome.exit_status())
}

fn print_summary(summary: &ExportSummary) {
    println!(
        "Exported {} of {} units",
        summary.exported_count(),
        summary.units.len()
    );

    for report in &summary.units {
        match &report.outcome {
            UnitOutcome::Exported { file, records } => {
                println!("  {} -> {} ({} records)", report.name, file.display(), records)
            }
            UnitOutcome::Failed { error } => println!("  {} FAILED: {}", report.name, error),
        }
    }
}
