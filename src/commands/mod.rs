use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::RawSearchResult;

pub mod ingest;
pub mod status;
pub mod triage;

pub(crate) fn read_batch(path: &Path) -> Result<Vec<RawSearchResult>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<RawSearchResult> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(records)
}
