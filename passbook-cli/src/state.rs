use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn passbook_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".passbook"))
}

pub fn ensure_passbook_home() -> Result<PathBuf> {
    let dir = passbook_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Output path base: `--out` when given, else the input path (extension replaced by the writer)
pub fn output_base(input: &Path, out: Option<&Path>) -> PathBuf {
    match out {
        Some(p) => p.to_path_buf(),
        None => input.to_path_buf(),
    }
}
