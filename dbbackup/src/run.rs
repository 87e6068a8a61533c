//! Run control for the binary: Ctrl-C handling, adapter teardown and exit
//! statuses.

use dbbackup_core::{DatabaseAdapter, ErrorLog, ExportOptions, ExportSummary, Exporter, OutputWriter};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;

/// Exit status for a finished or interrupted run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for usage, configuration, connection, listing and journal
/// failures.
pub const EXIT_FAILURE: u8 = 1;

/// Exit status for a command line clap rejected.
///
/// `--help` and `--version` are not failures; every other parse error is a
/// configuration error.
pub fn usage_exit_status(error: &clap::Error) -> u8 {
    use clap::error::ErrorKind;

    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}

/// Ctrl-C notification shared by every phase of a run.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    notify: Arc<Notify>,
}

impl Interrupt {
    /// Interrupt that only fires through [`Interrupt::trigger`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening for Ctrl-C in the background.
    ///
    /// Must be called inside a tokio runtime.
    pub fn listen() -> Self {
        let interrupt = Self::new();
        let notify = Arc::clone(&interrupt.notify);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => notify.notify_one(),
                Err(e) => tracing::warn!("Failed to listen for Ctrl+C: {}", e),
            }
        });
        interrupt
    }

    pub fn trigger(&self) {
        self.notify.notify_one();
    }

    /// Resolves once the interrupt has fired, even if it fired before the
    /// call.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }

    /// Runs `work` to completion unless the interrupt fires first.
    pub async fn race<F: Future>(&self, work: F) -> Option<F::Output> {
        tokio::select! {
            output = work => Some(output),
            () = self.wait() => None,
        }
    }
}

/// How the export phase ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(ExportSummary),
    /// Destination or listing failure, already logged and journaled
    Failed,
    Interrupted,
}

impl RunOutcome {
    pub fn exit_status(&self) -> u8 {
        match self {
            RunOutcome::Completed(_) | RunOutcome::Interrupted => EXIT_SUCCESS,
            RunOutcome::Failed => EXIT_FAILURE,
        }
    }
}

/// Exports every unit unless interrupted, then closes the adapter.
///
/// The adapter is closed on every path.
pub async fn export_until_interrupted(
    adapter: &dyn DatabaseAdapter,
    writer: &OutputWriter,
    journal: &dyn ErrorLog,
    options: ExportOptions,
    interrupt: &Interrupt,
) -> RunOutcome {
    let exporter = Exporter::new(adapter, writer, journal).with_options(options);
    let export = exporter.run();

    let outcome = match interrupt.race(export).await {
        Some(Ok(summary)) => RunOutcome::Completed(summary),
        Some(Err(_)) => RunOutcome::Failed,
        None => RunOutcome::Interrupted,
    };

    adapter.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::Parser;
    use dbbackup_core::error::BackupError;
    use dbbackup_core::models::{TableStructure, UnitRecords};
    use dbbackup_core::{DatabaseKind, MemoryErrorLog, Result};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    use crate::Cli;

    /// Listing either fails, hangs, or returns no units.
    #[derive(Clone, Copy)]
    enum Listing {
        Empty,
        Fails,
        Hangs,
    }

    struct ScriptedAdapter {
        listing: Listing,
        closed: AtomicBool,
    }

    impl ScriptedAdapter {
        fn new(listing: Listing) -> Self {
            Self {
                listing,
                closed: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl DatabaseAdapter for ScriptedAdapter {
        fn database_kind(&self) -> DatabaseKind {
            DatabaseKind::Postgres
        }

        async fn test_connection(&self) -> Result<()> {
            Ok(())
        }

        async fn list_units(&self) -> Result<Vec<String>> {
            match self.listing {
                Listing::Empty => Ok(Vec::new()),
                Listing::Fails => Err(BackupError::enumeration_failed(
                    "information_schema.tables",
                    std::io::Error::other("permission denied"),
                )),
                Listing::Hangs => std::future::pending().await,
            }
        }

        async fn table_structure(&self, _name: &str) -> Result<Option<TableStructure>> {
            Ok(None)
        }

        async fn fetch_records(
            &self,
            _name: &str,
            _structure: Option<&TableStructure>,
        ) -> Result<UnitRecords> {
            Ok(UnitRecords::Documents(Vec::new()))
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    async fn run(listing: Listing, interrupt: &Interrupt) -> (RunOutcome, bool) {
        let temp = TempDir::new().unwrap();
        let adapter = ScriptedAdapter::new(listing);
        let writer = OutputWriter::new(temp.path());
        let journal = MemoryErrorLog::new();

        let outcome = export_until_interrupted(
            &adapter,
            &writer,
            &journal,
            ExportOptions::default(),
            interrupt,
        )
        .await;
        (outcome, adapter.closed.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_completed_run_closes_adapter() {
        let (outcome, closed) = run(Listing::Empty, &Interrupt::new()).await;

        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert_eq!(outcome.exit_status(), EXIT_SUCCESS);
        assert!(closed);
    }

    #[tokio::test]
    async fn test_listing_failure_closes_adapter_and_fails() {
        let (outcome, closed) = run(Listing::Fails, &Interrupt::new()).await;

        assert!(matches!(outcome, RunOutcome::Failed));
        assert_eq!(outcome.exit_status(), EXIT_FAILURE);
        assert!(closed);
    }

    #[tokio::test]
    async fn test_interrupt_closes_adapter_and_exits_zero() {
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let (outcome, closed) = run(Listing::Hangs, &interrupt).await;

        assert!(matches!(outcome, RunOutcome::Interrupted));
        assert_eq!(outcome.exit_status(), EXIT_SUCCESS);
        assert!(closed);
    }

    #[tokio::test]
    async fn test_race_returns_work_output_without_interrupt() {
        let interrupt = Interrupt::new();
        assert_eq!(interrupt.race(async { 7 }).await, Some(7));

        interrupt.trigger();
        assert_eq!(interrupt.race(std::future::pending::<u8>()).await, None);
    }

    #[test]
    fn test_usage_errors_exit_with_one() {
        let missing_type = Cli::try_parse_from(["dbbackup", "-d", "/tmp/out"]).unwrap_err();
        assert_eq!(usage_exit_status(&missing_type), EXIT_FAILURE);

        let missing_destination = Cli::try_parse_from(["dbbackup", "-t", "mysql"]).unwrap_err();
        assert_eq!(usage_exit_status(&missing_destination), EXIT_FAILURE);

        let unsupported =
            Cli::try_parse_from(["dbbackup", "-t", "oracle", "-d", "/tmp/out"]).unwrap_err();
        assert_eq!(usage_exit_status(&unsupported), EXIT_FAILURE);

        let help = Cli::try_parse_from(["dbbackup", "--help"]).unwrap_err();
        assert_eq!(usage_exit_status(&help), EXIT_SUCCESS);
    }
}
