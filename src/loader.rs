use crate::config::SizingConfig;
use crate::error::AuditError;
use crate::types::RawAuditRecord;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// An audit export holds either one record or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuditFile {
    Many(Vec<RawAuditRecord>),
    One(Box<RawAuditRecord>),
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_records: usize,
    pub with_stats: usize,
    pub without_service: usize,
}

pub fn load_records(path: impl AsRef<Path>) -> Result<(Vec<RawAuditRecord>, LoadReport), AuditError> {
    let path = path.as_ref();
    let text = read(path)?;
    let file: AuditFile = serde_json::from_str(&text).map_err(|source| AuditError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    let records = match file {
        AuditFile::Many(records) => records,
        AuditFile::One(record) => vec![*record],
    };

    let report = LoadReport {
        total_records: records.len(),
        with_stats: records
            .iter()
            .filter(|r| r.load.as_ref().is_some_and(|l| l.stats.is_some()))
            .count(),
        without_service: records.iter().filter(|r| r.services.is_empty()).count(),
    };
    info!(path = %path.display(), records = report.total_records, "loaded audit records");
    Ok((records, report))
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SizingConfig, AuditError> {
    let path = path.as_ref();
    let text = read(path)?;
    let config = serde_json::from_str(&text).map_err(|source| AuditError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "loaded sizing config");
    Ok(config)
}

fn read(path: &Path) -> Result<String, AuditError> {
    std::fs::read_to_string(path).map_err(|source| AuditError::Read {
        path: path.display().to_string(),
        source,
    })
}
