// src/ui/console.rs

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use super::Ui;

const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Plain terminal output: lines on stdout, errors and progress on stderr.
#[derive(Debug, Default)]
pub struct ConsoleUi {
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for ConsoleUi {
    fn start_progress(&self, label: &str, tick: &str) {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{label}");
        let _ = stderr.flush();

        // Outside a runtime the label alone is shown.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no tokio runtime; progress shown without ticks");
            return;
        };

        let tick = tick.to_string();
        let ticker = handle.spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "{tick}");
                let _ = stderr.flush();
            }
        });

        let mut slot = self.ticker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.replace(ticker) {
            previous.abort();
        }
    }

    fn stop_progress(&self) {
        let mut slot = self.ticker.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(ticker) = slot.take() {
            ticker.abort();
        }
        eprintln!();
    }

    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}
