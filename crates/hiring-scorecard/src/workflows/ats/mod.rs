//! Import of applicant-tracking exports into typed pipeline records.

mod normalizer;
mod parser;

use crate::workflows::scorecard::PipelineRecord;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub enum AtsImportError {
    Io(std::io::Error),
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for AtsImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtsImportError::Io(err) => write!(f, "failed to read ATS export: {}", err),
            AtsImportError::Open { path, source } => {
                write!(f, "failed to read ATS export {}: {}", path.display(), source)
            }
            AtsImportError::Csv(err) => write!(f, "invalid ATS CSV data: {}", err),
            AtsImportError::InvalidRow { line, reason } => {
                write!(f, "invalid ATS row on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for AtsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtsImportError::Io(err) => Some(err),
            AtsImportError::Open { source, .. } => Some(source),
            AtsImportError::Csv(err) => Some(err),
            AtsImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for AtsImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AtsImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct AtsImporter;

impl AtsImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PipelineRecord>, AtsImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| AtsImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let records = Self::from_reader(file)?;
        info!(path = %path.display(), records = records.len(), "imported ATS export");
        Ok(records)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PipelineRecord>, AtsImportError> {
        parser::parse_records(reader)
    }

    /// Raw export text, for callers that key caches on file content.
    pub fn read_export<P: AsRef<Path>>(path: P) -> Result<String, AtsImportError> {
        let path = path.as_ref();
        std::fs::read_to_string(path).map_err(|source| AtsImportError::Open {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_csv_str(raw: &str) -> Result<Vec<PipelineRecord>, AtsImportError> {
        Self::from_reader(raw.as_bytes())
    }
}
