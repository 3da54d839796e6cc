//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// All regular files below `root`, as paths relative to it, sorted.
///
/// Unreadable entries are skipped; a missing root yields an empty list.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| relative_path(root, e.path()))
        .collect();

    files.sort();
    files
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Total size in bytes of a file, or 0 if it cannot be read.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("libllama.so"), "elf").unwrap();
        fs::write(lib.join("libggml.so"), "elf").unwrap();
        fs::write(lib.join("libggml.a"), "ar").unwrap();

        let files = glob_files(tmp.path(), &["lib/*.so".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("libggml.so"));
    }

    #[test]
    fn test_list_files_is_relative_and_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("x86/lib")).unwrap();
        fs::create_dir_all(tmp.path().join("arm64-v8a/lib")).unwrap();
        fs::write(tmp.path().join("x86/lib/liba.so"), "").unwrap();
        fs::write(tmp.path().join("arm64-v8a/lib/liba.so"), "").unwrap();

        let files = list_files(tmp.path());
        assert_eq!(
            files,
            vec![
                PathBuf::from("arm64-v8a/lib/liba.so"),
                PathBuf::from("x86/lib/liba.so"),
            ]
        );
    }

    #[test]
    fn test_list_files_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_remove_helpers_tolerate_missing() {
        let tmp = TempDir::new().unwrap();
        remove_dir_all_if_exists(&tmp.path().join("missing")).unwrap();
        remove_file_if_exists(&tmp.path().join("missing.aar")).unwrap();

        let file = tmp.path().join("old.aar");
        fs::write(&file, "x").unwrap();
        remove_file_if_exists(&file).unwrap();
        assert!(!file.exists());
    }
}
