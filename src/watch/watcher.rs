// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::TestSection;
use crate::watch::patterns::{root_relative, BuildOutputMatcher};
use crate::watch::{BuildEvent, BuildWatcher, ChangeStream};

type Subscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<BuildEvent>>>>;

/// Filesystem-backed build watcher.
///
/// Watches `root` recursively. Changes to paths accepted by the matcher are
/// grouped: the first relevant event opens a window of `debounce`, and every
/// relevant event inside that window joins the same [`BuildEvent`].
///
/// The underlying `notify` watcher starts on the first `subscribe` and lives
/// as long as this value.
pub struct FsBuildWatcher {
    root: PathBuf,
    matcher: Arc<BuildOutputMatcher>,
    debounce: Duration,
    subscribers: Subscribers,
    inner: Mutex<Option<RecommendedWatcher>>,
}

impl std::fmt::Debug for FsBuildWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBuildWatcher")
            .field("root", &self.root)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl FsBuildWatcher {
    pub fn new(root: impl Into<PathBuf>, matcher: BuildOutputMatcher, debounce: Duration) -> Self {
        Self {
            root: root.into(),
            matcher: Arc::new(matcher),
            debounce,
            subscribers: Arc::new(Mutex::new(Vec::new())),
            inner: Mutex::new(None),
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, test: &TestSection) -> Result<Self> {
        Ok(Self::new(
            root,
            BuildOutputMatcher::from_config(test)?,
            Duration::from_millis(test.debounce_ms),
        ))
    }

    fn start(&self) -> Result<RecommendedWatcher> {
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());

        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

        // Called synchronously on notify's own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event_tx.send(event).is_err() {
                        eprintln!("sprout: build watcher loop has stopped; dropping event");
                    }
                }
                Err(err) => eprintln!("sprout: file watch error: {err}"),
            },
            Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        info!(?root, "build watcher started");

        tokio::spawn(debounce_loop(
            root,
            Arc::clone(&self.matcher),
            self.debounce,
            event_rx,
            Arc::clone(&self.subscribers),
        ));

        Ok(watcher)
    }
}

impl BuildWatcher for FsBuildWatcher {
    fn subscribe(&self) -> Result<ChangeStream> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("build watcher state is poisoned"))?;
        if inner.is_none() {
            *inner = Some(self.start()?);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .map_err(|_| anyhow!("build watcher subscribers are poisoned"))?
            .push(tx);
        Ok(rx)
    }
}

async fn debounce_loop(
    root: PathBuf,
    matcher: Arc<BuildOutputMatcher>,
    debounce: Duration,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    subscribers: Subscribers,
) {
    let mut sequence: u64 = 0;

    'builds: loop {
        // Wait for the first relevant event of a build.
        let mut paths = loop {
            let Some(event) = event_rx.recv().await else {
                break 'builds;
            };
            let relevant = relevant_paths(&root, &matcher, &event);
            if !relevant.is_empty() {
                break relevant;
            }
        };

        // Absorb the rest of the burst.
        let mut closed = false;
        loop {
            match tokio::time::timeout(debounce, event_rx.recv()).await {
                Ok(Some(event)) => {
                    for path in relevant_paths(&root, &matcher, &event) {
                        if !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                }
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_elapsed) => break,
            }
        }

        sequence += 1;
        debug!(sequence, ?paths, "build output changed");
        publish(&subscribers, BuildEvent { sequence, paths });

        if closed {
            break;
        }
    }

    debug!("build watcher loop finished");
    // Dropping the senders ends every subscriber's stream.
    match subscribers.lock() {
        Ok(mut subs) => subs.clear(),
        Err(poisoned) => poisoned.into_inner().clear(),
    }
}

fn relevant_paths(root: &std::path::Path, matcher: &BuildOutputMatcher, event: &Event) -> Vec<String> {
    if matches!(event.kind, EventKind::Access(_)) {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter_map(|p| root_relative(root, p))
        .filter(|rel| matcher.matches(rel))
        .collect()
}

fn publish(subscribers: &Subscribers, event: BuildEvent) {
    let mut subs = match subscribers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("build watcher subscribers poisoned; recovering");
            poisoned.into_inner()
        }
    };
    subs.retain(|tx| tx.send(event.clone()).is_ok());
}
