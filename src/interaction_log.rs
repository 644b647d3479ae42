use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::core::{GoalLedger, RetirementProfile};

#[derive(Debug, Error)]
pub enum InteractionLogError {
    #[error("failed to open interaction log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write interaction log record: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to flush interaction log: {0}")]
    Flush(#[from] io::Error),
    #[error("interaction log lock was poisoned")]
    Poisoned,
}

/// One row of the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRecord {
    pub timestamp: String,
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub annual_rate_pct: f64,
    pub goal_count: usize,
    pub total_monthly_commitment: f64,
    pub projected_net_worth: f64,
}

impl InteractionRecord {
    pub fn new(profile: &RetirementProfile, ledger: &GoalLedger, projected_net_worth: f64) -> Self {
        Self {
            timestamp: jiff::Timestamp::now().to_string(),
            current_age: profile.current_age,
            retirement_age: profile.retirement_age,
            monthly_income: profile.monthly_income,
            monthly_expenses: profile.monthly_expenses,
            annual_rate_pct: profile.annual_rate_pct,
            goal_count: ledger.len(),
            total_monthly_commitment: ledger.total_monthly_commitment(),
            projected_net_worth,
        }
    }
}

/// Append-only CSV sink of computations.
pub struct InteractionLog {
    path: PathBuf,
    writer: Mutex<csv::Writer<std::fs::File>>,
}

impl InteractionLog {
    /// Open `path` for appending. A header row is written only when the file
    /// is new or empty.
    pub fn open(path: &Path) -> Result<Self, InteractionLogError> {
        let open_err = |source| InteractionLogError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;
        let is_empty = file.metadata().map_err(open_err)?.len() == 0;

        let writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &InteractionRecord) -> Result<(), InteractionLogError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| InteractionLogError::Poisoned)?;
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Like [`InteractionLog::append`], but a failing sink only logs a warning.
    pub fn record(&self, record: &InteractionRecord) {
        if let Err(e) = self.append(record) {
            tracing::warn!(path = %self.path.display(), error = %e, "interaction log write failed");
        }
    }
}
