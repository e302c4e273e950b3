//! Module discovery from configured directories.
//!
//! Every configured directory is a drop location: each immediate
//! subdirectory holding a `disuwaremodule.json` is a module. Subdirectories
//! without a manifest are skipped silently.
//!
//! Checks of different directories and subdirectories share no state and
//! run concurrently; the first failing directory fails the whole scan.

use crate::descriptor::ModuleDescriptor;
use crate::error::{RuntimeError, RuntimeResult};
use crate::manifest::{ModuleManifest, MANIFEST_FILE};
use futures::future::try_join_all;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Discover all modules in the given directories.
///
/// Directories are scanned in the given order and subdirectories in name
/// order, so repeated scans of an unchanged tree yield the same list.
pub async fn discover_modules(dirs: &[PathBuf]) -> RuntimeResult<Vec<ModuleDescriptor>> {
    let per_directory = try_join_all(dirs.iter().map(|dir| discover_in_directory(dir))).await?;
    let modules: Vec<ModuleDescriptor> = per_directory.into_iter().flatten().collect();

    info!("Discovered {} modules", modules.len());
    Ok(modules)
}

/// Discover modules in a single directory.
pub async fn discover_in_directory(dir: &Path) -> RuntimeResult<Vec<ModuleDescriptor>> {
    debug!("Scanning module directory: {:?}", dir);

    let unreadable = |source: std::io::Error| RuntimeError::ModuleDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut candidates = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        candidates.push(entry.path());
    }
    candidates.sort();

    let inspected = try_join_all(candidates.into_iter().map(inspect_directory)).await?;
    Ok(inspected.into_iter().flatten().collect())
}

/// Inspect one directory entry; `None` if it is not an enabled module.
async fn inspect_directory(path: PathBuf) -> RuntimeResult<Option<ModuleDescriptor>> {
    let metadata = tokio::fs::metadata(&path).await?;
    if !metadata.is_dir() {
        return Ok(None);
    }

    let manifest_path = path.join(MANIFEST_FILE);
    let content = match tokio::fs::read_to_string(&manifest_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Skipping {:?}: no {}", path, MANIFEST_FILE);
            return Ok(None);
        }
        Err(e) => {
            return Err(RuntimeError::ManifestInvalid {
                path: manifest_path,
                reason: format!("failed to read: {e}"),
            })
        }
    };

    load_descriptor(&path, &manifest_path, &content)
}

/// Discover a single module from its directory.
///
/// Unlike a directory scan, a missing manifest is an error here.
pub async fn discover_module(path: &Path) -> RuntimeResult<Option<ModuleDescriptor>> {
    let manifest_path = path.join(MANIFEST_FILE);
    let content = tokio::fs::read_to_string(&manifest_path)
        .await
        .map_err(|e| RuntimeError::ManifestInvalid {
            path: manifest_path.clone(),
            reason: format!("failed to read: {e}"),
        })?;

    load_descriptor(path, &manifest_path, &content)
}

fn load_descriptor(
    module_dir: &Path,
    manifest_path: &Path,
    content: &str,
) -> RuntimeResult<Option<ModuleDescriptor>> {
    let Some(manifest) = ModuleManifest::from_str(manifest_path, content)? else {
        debug!("Skipping disabled module at {:?}", module_dir);
        return Ok(None);
    };

    let descriptor = manifest.into_descriptor(module_dir)?;
    debug!("Discovered module: {} at {:?}", descriptor, module_dir);
    Ok(Some(descriptor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_module(dir: &Path, name: &str, manifest: &str) {
        let module_dir = dir.join(name);
        std::fs::create_dir_all(&module_dir).unwrap();

        let mut file = std::fs::File::create(module_dir.join(MANIFEST_FILE)).unwrap();
        file.write_all(manifest.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn test_discover_in_directory() {
        let temp_dir = TempDir::new().unwrap();

        create_test_module(temp_dir.path(), "a", r#"{"interface": "dict", "version": "1.0.0"}"#);
        create_test_module(
            temp_dir.path(),
            "b",
            r#"{"interface": "reader", "version": "0.2.0", "requires": {"dict": "^1"}}"#,
        );
        // Not a module: no manifest
        std::fs::create_dir_all(temp_dir.path().join("assets")).unwrap();
        // Not a module: plain file
        std::fs::write(temp_dir.path().join("README"), "hello").unwrap();

        let modules = discover_in_directory(temp_dir.path()).await.unwrap();

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].to_string(), "dict@1.0.0");
        assert_eq!(modules[1].to_string(), "reader@0.2.0");
        assert_eq!(modules[1].requires.len(), 1);
        assert!(modules[0].source.ends_with("a"));
    }

    #[tokio::test]
    async fn test_disabled_modules_are_dropped() {
        let temp_dir = TempDir::new().unwrap();

        create_test_module(temp_dir.path(), "on", r#"{"interface": "dict", "version": "1.0.0"}"#);
        create_test_module(
            temp_dir.path(),
            "off",
            r#"{"interface": "dict", "version": "1.0.0", "disabled": true}"#,
        );

        let modules = discover_in_directory(temp_dir.path()).await.unwrap();
        assert_eq!(modules.len(), 1);
        assert!(modules[0].source.ends_with("on"));
    }

    #[tokio::test]
    async fn test_invalid_manifest_fails_discovery() {
        let temp_dir = TempDir::new().unwrap();

        create_test_module(temp_dir.path(), "good", r#"{"interface": "dict", "version": "1.0.0"}"#);
        create_test_module(temp_dir.path(), "bad", r#"{"interface": "dict"}"#);

        let err = discover_modules(&[temp_dir.path().to_path_buf()])
            .await
            .unwrap_err();

        match err {
            RuntimeError::ManifestInvalid { path, .. } => {
                assert!(path.starts_with(temp_dir.path().join("bad")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let err = discover_modules(&[missing]).await.unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleDirUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_discover_module_requires_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover_module(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::ManifestInvalid { .. }));
    }

    #[tokio::test]
    async fn test_multiple_directories_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let dir1 = temp_dir.path().join("dir1");
        let dir2 = temp_dir.path().join("dir2");

        create_test_module(&dir2, "x", r#"{"interface": "second", "version": "1.0.0"}"#);
        create_test_module(&dir1, "y", r#"{"interface": "first", "version": "1.0.0"}"#);

        let modules = discover_modules(&[dir1, dir2]).await.unwrap();
        let ids: Vec<_> = modules.iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["first@1.0.0", "second@1.0.0"]);
    }
}
