//! Command-line arguments and interactive input.
//!
//! Anything not given as a flag or environment variable is asked for on the
//! terminal, unless `--no-prompt` is set. Empty answers fall back to the
//! defaults: host `localhost`, user `root`, empty database and password.

use clap::Parser;
use dbbackup_core::error::BackupError;
use dbbackup_core::{ConnectionConfig, Credentials, DatabaseKind, Result};
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_USER: &str = "root";

#[derive(Debug, Parser)]
#[command(name = "dbbackup")]
#[command(about = "Back up a MySQL, PostgreSQL or MongoDB database into per-table files")]
#[command(version)]
#[command(long_about = "
dbbackup - one file per table or collection

MySQL and PostgreSQL tables are written as <table>.sql: the CREATE TABLE
statement followed by one INSERT per row. MongoDB collections are written
as <collection>.json: a pretty-printed array of the documents.

Host, user, database and password are prompted for when not supplied.
The password can be passed through DBBACKUP_PASSWORD.

EXAMPLES:
  dbbackup -t mysql -d ./backup --host db.internal -u backup --database shop
  dbbackup -t pgsql -d /var/backups/shop --jobs 8
  DBBACKUP_PASSWORD=secret dbbackup -t mongodb -d ./carts --database shop --no-prompt
")]
pub struct Cli {
    /// Database type
    #[arg(
        short = 't',
        long = "type",
        env = "DBBACKUP_TYPE",
        value_name = "TYPE",
        help = "Database type (mysql, pgsql, mongodb)"
    )]
    pub kind: DatabaseKind,

    /// Destination directory
    #[arg(
        short,
        long,
        env = "DBBACKUP_DESTINATION",
        value_name = "DIR",
        help = "Directory the backup files are written to (created if missing)"
    )]
    pub destination: PathBuf,

    #[arg(long, env = "DBBACKUP_HOST", help = "Database host")]
    pub host: Option<String>,

    #[arg(long, env = "DBBACKUP_PORT", help = "Database port (engine default if omitted)")]
    pub port: Option<u16>,

    #[arg(short, long, env = "DBBACKUP_USER", help = "Database user")]
    pub user: Option<String>,

    #[arg(long, env = "DBBACKUP_DATABASE", help = "Database name")]
    pub database: Option<String>,

    /// Relational export concurrency
    #[arg(
        short,
        long,
        env = "DBBACKUP_JOBS",
        default_value = "4",
        value_parser = clap::value_parser!(u32).range(1..=32),
        help = "Tables exported at the same time (1-32, MySQL/PostgreSQL only)"
    )]
    pub jobs: u32,

    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..),
        value_name = "SECS",
        help = "Connection timeout in seconds"
    )]
    pub connect_timeout: u64,

    #[arg(
        long,
        env = "DBBACKUP_LOG_DIR",
        value_name = "DIR",
        help = "Directory of the error journal (default: <install root>/logs, then the temp directory)"
    )]
    pub log_dir: Option<PathBuf>,

    #[arg(long, help = "Never prompt; use defaults for missing values")]
    pub no_prompt: bool,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Source of interactive answers.
pub trait Prompter {
    /// Asks for a visible value; an empty answer means "use the default".
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Asks for a secret without echo.
    fn ask_secret(&mut self, question: &str) -> io::Result<String>;
}

/// Reads answers from the terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        rpassword::prompt_password(question)
    }
}

/// Answers every question with the empty string.
#[derive(Debug, Default)]
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn ask(&mut self, _question: &str) -> io::Result<String> {
        Ok(String::new())
    }

    fn ask_secret(&mut self, _question: &str) -> io::Result<String> {
        Ok(String::new())
    }
}

fn prompt_error(e: io::Error) -> BackupError {
    BackupError::configuration(format!("Failed to read input: {}", e))
}

fn or_default(answer: String, default: &str) -> String {
    if answer.is_empty() {
        default.to_string()
    } else {
        answer
    }
}

impl Cli {
    /// Builds the run configuration, asking for whatever is missing.
    ///
    /// # Arguments
    /// * `prompter` - Answers for missing values
    /// * `password` - Password from the environment, if any
    ///
    /// # Errors
    /// Returns a configuration error if input cannot be read, the
    /// destination cannot be resolved, or the result fails validation
    pub fn into_config(
        self,
        prompter: &mut dyn Prompter,
        password: Option<String>,
    ) -> Result<ConnectionConfig> {
        let host = match self.host {
            Some(host) => host,
            None => or_default(
                prompter.ask("Enter hostname: ").map_err(prompt_error)?,
                DEFAULT_HOST,
            ),
        };
        let user = match self.user {
            Some(user) => user,
            None => or_default(
                prompter.ask("Enter username: ").map_err(prompt_error)?,
                DEFAULT_USER,
            ),
        };
        let database = match self.database {
            Some(database) => database,
            None => prompter
                .ask("Enter database name: ")
                .map_err(prompt_error)?,
        };
        let password = match password {
            Some(password) => password,
            None => prompter
                .ask_secret("Enter your password: ")
                .map_err(prompt_error)?,
        };

        let destination = normalize_destination(&self.destination)?;

        let mut config = ConnectionConfig::new(self.kind, host)
            .with_database(database)
            .with_credentials(Credentials::new(user, password))
            .with_destination(destination)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_max_connections(self.jobs);
        if let Some(port) = self.port {
            config = config.with_port(port);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Makes the destination absolute and removes `.` and `..` components
/// without touching the filesystem.
pub fn normalize_destination(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(BackupError::configuration("destination cannot be empty"));
    }

    let absolute = std::path::absolute(path).map_err(|e| {
        BackupError::configuration(format!(
            "Cannot resolve destination {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
