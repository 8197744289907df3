use std::path::PathBuf;

/// Returns the workspace root directory (parent of the calling crate).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or(manifest_dir)
}

/// Returns `<workspace>/test_output/<sub_dir>/<name>`, creating the directory.
pub fn output_path(sub_dir: &str, name: &str) -> std::io::Result<PathBuf> {
    let dir = workspace_root().join("test_output").join(sub_dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(name))
}
