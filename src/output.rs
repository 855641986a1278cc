use std::{fs, path::Path};

use anyhow::Context;
use serde::Serialize;

/// Pretty-print `value` as JSON to `path`, creating parent directories as needed.
pub fn write_json<T: ?Sized + Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
