//! Per-unit export pipeline.
//!
//! Every table or collection is exported independently: file name check,
//! structure step, data step, file write. A failure in one unit is
//! journaled and the run moves on; only enumeration failures end it.
//!
//! Relational units run concurrently up to `ExportOptions::concurrency`;
//! collections are exported one after another. [`Exporter::run`] returns
//! only after every unit has finished.

pub mod sql;

use crate::Result;
use crate::adapters::DatabaseAdapter;
use crate::error::BackupError;
use crate::logging::ErrorLog;
use crate::models::{TableStructure, UnitRecords};
use crate::output::{OutputWriter, UnitFile, validate_unit_name};
use futures::stream::{self, StreamExt};
use sql::{STRUCTURE_TERMINATOR, SqlDialect};
use std::path::PathBuf;

/// Tuning knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Relational units exported at the same time
    pub concurrency: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Exported { file: PathBuf, records: usize },
    Failed { error: String },
}

/// Outcome of one unit, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub name: String,
    pub outcome: UnitOutcome,
}

/// Result of a whole run, units in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub units: Vec<UnitReport>,
}

impl ExportSummary {
    pub fn exported_count(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Exported { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.units.len() - self.exported_count()
    }

    /// Reports of units that failed.
    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Failed { .. }))
    }
}

/// Drives an export over one connected adapter.
pub struct Exporter<'a> {
    adapter: &'a dyn DatabaseAdapter,
    writer: &'a OutputWriter,
    journal: &'a dyn ErrorLog,
    options: ExportOptions,
}

impl<'a> Exporter<'a> {
    pub fn new(
        adapter: &'a dyn DatabaseAdapter,
        writer: &'a OutputWriter,
        journal: &'a dyn ErrorLog,
    ) -> Self {
        Self {
            adapter,
            writer,
            journal,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Exports every unit the adapter lists.
    ///
    /// # Errors
    /// Returns an error, after journaling it, if the destination cannot be
    /// created or the units cannot be listed. Per-unit failures are part of
    /// the summary instead.
    pub async fn run(&self) -> Result<ExportSummary> {
        let kind = self.adapter.database_kind();

        if let Err(e) = self.writer.ensure_directory().await {
            self.report(&e);
            return Err(e);
        }

        let units = match self.adapter.list_units().await {
            Ok(units) => units,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        tracing::info!(
            "Exporting {} units to {}",
            units.len(),
            self.writer.destination().display()
        );

        let reports = if kind.is_relational() {
            self.export_concurrent(&units).await
        } else {
            self.export_sequential(&units).await
        };

        let summary = ExportSummary { units: reports };
        tracing::info!("Backup for {} database completed.", kind);
        Ok(summary)
    }

    async fn export_concurrent(&self, units: &[String]) -> Vec<UnitReport> {
        let unit_futures = units.iter().enumerate().map(|(index, name)| async move {
            (index, self.export_unit(name).await)
        });

        let mut stream =
            stream::iter(unit_futures).buffer_unordered(self.options.concurrency.max(1));

        let mut finished = Vec::with_capacity(units.len());
        while let Some(result) = stream.next().await {
            finished.push(result);
        }

        finished.sort_by_key(|(index, _)| *index);
        finished.into_iter().map(|(_, report)| report).collect()
    }

    async fn export_sequential(&self, units: &[String]) -> Vec<UnitReport> {
        let mut reports = Vec::with_capacity(units.len());
        for name in units {
            reports.push(self.export_unit(name).await);
        }
        reports
    }

    async fn export_unit(&self, name: &str) -> UnitReport {
        let outcome = match self.try_export_unit(name).await {
            Ok((file, records)) => {
                tracing::info!("Exported '{}' ({} records)", name, records);
                UnitOutcome::Exported { file, records }
            }
            Err(e) => {
                self.report(&e);
                UnitOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        UnitReport {
            name: name.to_string(),
            outcome,
        }
    }

    async fn try_export_unit(&self, name: &str) -> Result<(PathBuf, usize)> {
        validate_unit_name(name)?;

        let kind = self.adapter.database_kind();
        let file_name = format!("{}.{}", name, kind.file_extension());

        match self.adapter.table_structure(name).await? {
            Some(structure) => {
                let dialect = SqlDialect::for_kind(kind).ok_or_else(|| {
                    BackupError::configuration(format!("{} has no SQL dialect", kind))
                })?;
                self.write_table(name, &file_name, dialect, &structure).await
            }
            None => self.write_documents(name, &file_name).await,
        }
    }

    /// Structure statement first, then one `INSERT` per row.
    ///
    /// The structure is kept on disk even if the data step fails.
    async fn write_table(
        &self,
        name: &str,
        file_name: &str,
        dialect: SqlDialect,
        structure: &TableStructure,
    ) -> Result<(PathBuf, usize)> {
        let mut file = self.writer.create(file_name).await?;
        file.append(&format!(
            "{}{}",
            structure.create_statement, STRUCTURE_TERMINATOR
        ))
        .await?;

        let records = match self.adapter.fetch_records(name, Some(structure)).await {
            Ok(UnitRecords::Rows(data)) => data,
            Ok(UnitRecords::Documents(_)) => {
                self.finish_partial(file).await;
                return Err(BackupError::configuration(format!(
                    "Adapter returned documents for table {}",
                    name
                )));
            }
            Err(e) => {
                self.finish_partial(file).await;
                return Err(e);
            }
        };

        for row in &records.rows {
            file.append(&dialect.insert_statement(name, &records.columns, row))
                .await?;
        }

        let path = file.finish().await?;
        Ok((path, records.rows.len()))
    }

    /// Closes a file whose data step failed. A close failure is journaled
    /// on its own so the data step's error is the one reported for the unit.
    async fn finish_partial(&self, file: UnitFile) {
        if let Err(e) = file.finish().await {
            self.report(&e);
        }
    }

    /// Pretty-printed JSON array of every document.
    async fn write_documents(&self, name: &str, file_name: &str) -> Result<(PathBuf, usize)> {
        let documents = match self.adapter.fetch_records(name, None).await? {
            UnitRecords::Documents(documents) => documents,
            UnitRecords::Rows(_) => {
                return Err(BackupError::configuration(format!(
                    "Adapter returned rows without a structure for {}",
                    name
                )));
            }
        };

        let json = serde_json::to_string_pretty(&documents).map_err(|e| {
            BackupError::Serialization {
                context: format!("Failed to serialize documents of {}", name),
                source: e,
            }
        })?;

        let path = self.writer.write_file(file_name, &json).await?;
        Ok((path, documents.len()))
    }

    fn report(&self, error: &BackupError) {
        let message = error.to_string();
        tracing::error!("{}", message);
        self.journal.record(&message);
    }
}
