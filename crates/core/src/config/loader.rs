//! Ordered candidate-path resolution.
//!
//! Config and database files are looked up by trying a fixed, ordered
//! list of candidate directories and taking the first one that already
//! exists; if none exist, a local fallback directory is created, rather
//! than deriving a single path from `current_exe()` alone.

use std::path::{Path, PathBuf};

use super::ConfigResult;

/// Environment variable that, if set, is tried first for the gostrike
/// base directory.
const BASE_DIR_ENV: &str = "GOSTRIKE_BASE_DIR";

/// Ordered list of candidate base directories, first-existing-wins.
fn candidate_base_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(env_dir) = std::env::var(BASE_DIR_ENV) {
        candidates.push(PathBuf::from(env_dir));
    }

    if let Ok(exe) = std::env::current_exe() {
        // addons/gostrike/bin/<platform>/gostrike.so -> addons/gostrike
        if let Some(base) = exe.parent().and_then(|p| p.parent()).and_then(|p| p.parent()) {
            candidates.push(base.to_path_buf());
        }
    }

    candidates.push(PathBuf::from("/etc/gostrike"));
    candidates.push(PathBuf::from("./gostrike"));

    candidates
}

/// Resolve the base directory: the first candidate that already exists,
/// or a freshly created local fallback (the last candidate) if none do.
pub fn base_dir() -> ConfigResult<PathBuf> {
    let candidates = candidate_base_dirs();
    for candidate in &candidates {
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
    }

    let fallback = candidates
        .last()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("./gostrike"));
    std::fs::create_dir_all(&fallback)?;
    Ok(fallback)
}

pub fn configs_dir() -> ConfigResult<PathBuf> {
    Ok(base_dir()?.join("configs"))
}

pub fn data_dir() -> ConfigResult<PathBuf> {
    Ok(base_dir()?.join("data"))
}

/// Path for the main config file: `configs/core.json`.
pub fn core_config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("core.json"))
}

/// Path for a plugin's default config file: `configs/plugins/<slug>.json`.
pub fn plugin_config_path(slug: &str) -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("plugins").join(format!("{slug}.json")))
}

/// Path for the permission database: `data/permissions.db`.
pub fn permissions_db_path() -> ConfigResult<PathBuf> {
    Ok(data_dir()?.join("permissions.db"))
}

/// Path for an isolated per-plugin SQLite file: `data/plugins/<slug>.db`.
pub fn plugin_db_path(slug: &str) -> ConfigResult<PathBuf> {
    Ok(data_dir()?.join("plugins").join(format!("{slug}.db")))
}

pub(super) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_paths_are_namespaced_by_slug() {
        let base = PathBuf::from("/srv/gostrike");
        let configs = base.join("configs").join("plugins").join("kickvote.json");
        assert!(configs.ends_with("plugins/kickvote.json"));
        let db = base.join("data").join("plugins").join("kickvote.db");
        assert!(db.ends_with("plugins/kickvote.db"));
    }
}
