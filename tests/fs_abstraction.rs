// tests/fs_abstraction.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sprout::fs::{FileSystem, MockFileSystem, RealFileSystem};

type TestResult = Result<(), Box<dyn Error>>;

/// Behaviour both implementations must share.
fn exercise(fs: &dyn FileSystem, root: &Path) -> TestResult {
    let project = root.join("my-app");
    assert!(!fs.exists(&project));

    fs.create_dir_all(&project)?;
    assert!(fs.is_dir(&project));
    assert!(fs.read_dir(&project)?.is_empty());

    let manifest = project.join("config").join("Sprout.toml");
    fs.write(&manifest, b"[project]\nname = \"my-app\"\n")?;
    assert!(fs.exists(&manifest));
    assert!(!fs.is_dir(&manifest));
    assert_eq!(fs.read_to_string(&manifest)?, "[project]\nname = \"my-app\"\n");

    let entries = fs.read_dir(&project)?;
    assert_eq!(entries, vec![project.join("config")]);

    assert!(fs.read_to_string(&project.join("missing.txt")).is_err());
    assert!(fs.read_dir(&manifest).is_err());
    assert!(fs.write(&project, b"oops").is_err());
    Ok(())
}

#[test]
fn mock_filesystem_behaves_like_disk() -> TestResult {
    exercise(&MockFileSystem::new(), Path::new("/work"))
}

#[test]
fn real_filesystem_behaves_like_disk() -> TestResult {
    let dir = TempDir::new()?;
    exercise(&RealFileSystem, dir.path())
}

#[test]
fn mock_clones_share_one_tree() {
    let fs = MockFileSystem::new();
    let clone = fs.clone();
    clone.add_file("a/b.txt", "x");

    assert!(fs.is_dir(Path::new("a")));
    assert_eq!(fs.paths(), vec![PathBuf::from("a"), PathBuf::from("a/b.txt")]);
}
