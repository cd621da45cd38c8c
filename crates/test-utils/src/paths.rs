//! Filesystem helpers standing in for the shared exports volume.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path to the bridge script shipped with the service.
pub fn bridge_script() -> PathBuf {
    workspace_root().join("scripts").join("csv2bufr_bridge.py")
}

/// Creates a temporary directory acting as the shared exports volume.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_exports_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("csv2bufr_exports_")
        .tempdir()
        .expect("Failed to create temporary exports directory")
}

/// Writes `contents` to `dir/name` and returns the full path.
pub fn write_input_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write input file");
    path
}

/// Lists `*.bufr4` files directly under `dir`, sorted by name.
///
/// Returns an empty list if the directory does not exist.
pub fn list_bufr_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "bufr4"))
        .collect();
    files.sort();
    files
}
