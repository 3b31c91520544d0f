use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;

// Helper function to create PathBuf from str for tests
fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn test_write_and_read_string() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("cache.json"), "{\"a\":\"b\"}")?;

    assert_eq!(provider.read_to_string(&p("cache.json"))?, "{\"a\":\"b\"}");
    assert!(provider.is_file(&p("cache.json")));
    Ok(())
}

#[test]
fn test_write_creates_parent_directories() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("nested/dir/data.bin"), "payload")?;

    assert!(temp_dir.path().join("nested/dir").is_dir());
    assert_eq!(provider.read_to_string(&p("nested/dir/data.bin"))?, "payload");
    Ok(())
}

#[test]
fn test_overwrite_replaces_content() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("file.txt"), "first version, longer")?;
    provider.write_string(&p("file.txt"), "second")?;

    assert_eq!(provider.read_to_string(&p("file.txt"))?, "second");
    Ok(())
}

#[test]
fn test_read_missing_file_is_not_found() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let result = provider.read_to_string(Path::new("missing.json"));
    assert!(matches!(
        result,
        Err(Error::StorageSystem(StorageSystemError::FileNotFound(_)))
    ));
}
