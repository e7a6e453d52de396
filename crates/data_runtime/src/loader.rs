//! Data loaders. Paths resolve under the workspace `data/` directory so
//! tests and tools can run from any crate.

use crate::tables::AllConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn data_root() -> PathBuf {
    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() {
        ws
    } else {
        here.join("data")
    }
}

/// Read a raw JSON file under `data/` and return its string.
pub fn read_json(rel: impl AsRef<Path>) -> Result<String> {
    let path = data_root().join(rel);
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Load and deserialize the exported config bundle (from data/combat/*).
pub fn load_all_config(rel: impl AsRef<Path>) -> Result<AllConfig> {
    let txt = read_json(rel)?;
    let cfg: AllConfig = serde_json::from_str(&txt).context("parse combat config json")?;
    Ok(cfg)
}
