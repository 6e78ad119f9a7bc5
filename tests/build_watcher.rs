// tests/build_watcher.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use sprout::config::TestSection;
use sprout::watch::{root_relative, BuildOutputMatcher, BuildWatcher, FsBuildWatcher};

type TestResult = Result<(), Box<dyn Error>>;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn matcher_honours_watch_and_exclude() -> TestResult {
    let matcher = BuildOutputMatcher::new(&strings(&["dist/**"]), &strings(&["**/*.map"]))?;

    assert!(matcher.matches("dist/app.js"));
    assert!(matcher.matches("dist/assets/vendor.css"));
    assert!(!matcher.matches("dist/app.js.map"));
    assert!(!matcher.matches("src/app.js"));
    assert!(!matcher.matches(""));
    Ok(())
}

#[test]
fn empty_watch_list_matches_everything_not_excluded() -> TestResult {
    let matcher = BuildOutputMatcher::new(&[], &strings(&["tmp/**"]))?;

    assert!(matcher.matches("anything/at/all.txt"));
    assert!(!matcher.matches("tmp/cache"));
    Ok(())
}

#[test]
fn default_config_watches_dist() -> TestResult {
    let matcher = BuildOutputMatcher::from_config(&TestSection::default())?;
    assert!(matcher.matches("dist/index.html"));
    assert!(!matcher.matches("app/index.html"));
    Ok(())
}

#[test]
fn invalid_glob_is_an_error() {
    assert!(BuildOutputMatcher::new(&strings(&["dist/[unclosed"]), &[]).is_err());
}

#[test]
fn root_relative_uses_forward_slashes() {
    let root = Path::new("/projects/app");
    assert_eq!(
        root_relative(root, &root.join("dist").join("app.js")).as_deref(),
        Some("dist/app.js")
    );
    assert_eq!(root_relative(root, Path::new("/elsewhere/file")), None);
}

#[tokio::test]
async fn writes_under_dist_become_one_build_event() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("dist"))?;
    fs::create_dir_all(dir.path().join("src"))?;

    let config = TestSection {
        exclude: strings(&["**/*.map"]),
        debounce_ms: 200,
        ..TestSection::default()
    };
    let watcher = FsBuildWatcher::from_config(dir.path(), &config)?;
    let mut changes = watcher.subscribe()?;

    // Give the OS watcher a moment to register.
    tokio::time::sleep(Duration::from_millis(50)).await;
    fs::write(dir.path().join("src/app.js"), "source")?;
    fs::write(dir.path().join("dist/app.js"), "built")?;
    fs::write(dir.path().join("dist/app.js.map"), "{}")?;

    let event = with_timeout(changes.recv()).await.ok_or("watcher closed")?;

    assert_eq!(event.sequence, 1);
    assert!(event.paths.contains(&"dist/app.js".to_string()), "{event:?}");
    assert!(event.paths.iter().all(|p| p.starts_with("dist/") && !p.ends_with(".map")));
    Ok(())
}

#[tokio::test]
async fn every_subscriber_sees_each_build() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("dist"))?;

    let watcher = FsBuildWatcher::from_config(dir.path(), &TestSection::default())?;
    let mut first = watcher.subscribe()?;
    let mut second = watcher.subscribe()?;

    tokio::time::sleep(Duration::from_millis(50)).await;
    fs::write(dir.path().join("dist/index.html"), "<html>")?;

    let a = with_timeout(first.recv()).await.ok_or("first closed")?;
    let b = with_timeout(second.recv()).await.ok_or("second closed")?;
    assert_eq!(a, b);
    Ok(())
}
