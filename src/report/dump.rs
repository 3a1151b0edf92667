use crate::model::{ActivityRecord, RawActivity, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DUMP_FILE: &str = "contribution_data.json";

/// Serialises records in the activity input format so a dump can be fed back
/// in with `--activity`.
pub fn dump_json(records: &[ActivityRecord]) -> Result<String> {
    let raws = records.iter().map(ActivityRecord::to_raw).collect::<Vec<RawActivity>>();
    Ok(serde_json::to_string_pretty(&raws)?)
}

pub fn dump_records(output_dir: &Path, records: &[ActivityRecord]) -> Result<PathBuf> {
    let path = output_dir.join(DUMP_FILE);
    fs::write(&path, dump_json(records)?)?;
    log::info!("Dumped {} contribution records to {}", records.len(), path.display());
    Ok(path)
}
