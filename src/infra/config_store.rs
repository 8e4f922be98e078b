// ============================================================
// Layer 6 — Config Store
// ============================================================
// Reads and writes a FinetuneConfig as pretty-printed JSON, so a
// run can be repeated exactly with `from-config`.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::application::finetune_use_case::FinetuneConfig;

pub fn save_config(cfg: &FinetuneConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

    tracing::debug!("Saved run config to '{}'", path.display());
    Ok(())
}

pub fn load_config(path: &Path) -> Result<FinetuneConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

    serde_json::from_str(&json)
        .with_context(|| format!("Malformed config in '{}'", path.display()))
}
