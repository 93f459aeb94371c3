//! Run metadata captured alongside the `.aqs`/`.txt` output files.
//!
//! The original (`main.cpp`) renders this into a flat `key=value` text
//! file; this is its serde-based equivalent, written as JSON next to each
//! run's data files.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunMetadata {
    pub run_number: u32,
    pub drift_field: String,
    pub mesh_voltage: String,
    pub detector_pressure: String,
    pub run_tag: String,
    pub clock: String,
    pub shaping: String,
    pub gain: String,
    pub detector: String,
    pub run_comments: String,
}

impl RunMetadata {
    /// Serialize as pretty JSON to `<dir>/run.info`.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let mut file = std::fs::File::create(dir.join("run.info"))?;
        file.write_all(&json)?;
        Ok(())
    }
}
