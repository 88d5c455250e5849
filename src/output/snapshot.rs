use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::index::FileRecord;

/// Writes the pre-enrichment record list as pretty-printed JSON
pub fn save_snapshot(records: &[FileRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    tracing::info!("Structure snapshot saved to {}", path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Vec<FileRecord>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
