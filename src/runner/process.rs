// src/runner/process.rs

//! Test runner backed by a real child process.

use std::process::Stdio;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{ExitNotifier, SessionMode, TestRunOptions, TestRunner};

enum SessionControl {
    Restart,
}

struct SessionHandle {
    mode: SessionMode,
    control: mpsc::UnboundedSender<SessionControl>,
}

/// Runs the configured test command through the platform shell.
///
/// One runner hosts at most one session. In a dev session, `restart` kills
/// the current child and spawns a fresh one without reporting an exit; the
/// session only reports when a child exits on its own, fails to spawn, or
/// the runner is dropped.
#[derive(Default)]
pub struct ProcessTestRunner {
    session: Mutex<Option<SessionHandle>>,
}

impl std::fmt::Debug for ProcessTestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessTestRunner").finish_non_exhaustive()
    }
}

impl ProcessTestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&self, mode: SessionMode, options: TestRunOptions, on_exit: ExitNotifier) -> Result<()> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| anyhow!("test runner state is poisoned"))?;

        if slot.is_some() {
            bail!("a test session has already been started by this runner");
        }

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_session(mode, options, control_rx, on_exit));

        *slot = Some(SessionHandle {
            mode,
            control: control_tx,
        });
        Ok(())
    }
}

impl TestRunner for ProcessTestRunner {
    fn start_dev(&self, options: TestRunOptions, on_exit: ExitNotifier) -> Result<()> {
        self.start(SessionMode::Dev, options, on_exit)
    }

    fn start_ci(&self, options: TestRunOptions, on_exit: ExitNotifier) -> Result<()> {
        self.start(SessionMode::Ci, options, on_exit)
    }

    fn restart(&self) -> Result<()> {
        let slot = self
            .session
            .lock()
            .map_err(|_| anyhow!("test runner state is poisoned"))?;

        match slot.as_ref() {
            None => bail!("cannot restart: no test session has been started"),
            Some(handle) if handle.mode != SessionMode::Dev => {
                bail!("cannot restart: only dev sessions support restart")
            }
            Some(handle) => handle
                .control
                .send(SessionControl::Restart)
                .map_err(|_| anyhow!("cannot restart: the test session has already ended")),
        }
    }
}

async fn run_session(
    mode: SessionMode,
    options: TestRunOptions,
    mut control_rx: mpsc::UnboundedReceiver<SessionControl>,
    on_exit: ExitNotifier,
) {
    let mut generation: u64 = 0;

    loop {
        generation += 1;

        let mut child = match spawn_child(&options) {
            Ok(child) => child,
            Err(err) => {
                error!(cmd = %options.command, error = %err, "failed to start test process");
                on_exit.errored(err);
                return;
            }
        };

        info!(
            cmd = %options.command,
            ?mode,
            generation,
            pid = child.id(),
            "test process started"
        );

        tokio::select! {
            status = child.wait() => {
                match status {
                    Ok(status) => {
                        let code = status.code().unwrap_or(-1);
                        info!(generation, exit_code = code, "test process exited");
                        on_exit.exited(code);
                    }
                    Err(err) => {
                        error!(generation, error = %err, "waiting for test process failed");
                        on_exit.errored(anyhow!(err).context("waiting for test process"));
                    }
                }
                return;
            }

            control = control_rx.recv() => {
                match control {
                    Some(SessionControl::Restart) => {
                        info!(generation, "restart requested; replacing test process");
                        if let Err(err) = child.kill().await {
                            warn!(generation, error = %err, "failed to kill test process before restart");
                        }
                    }
                    None => {
                        debug!(generation, "runner dropped; stopping test session");
                        if let Err(err) = child.kill().await {
                            warn!(generation, error = %err, "failed to kill test process on shutdown");
                        }
                        on_exit.errored(anyhow!("test runner was dropped while the session was running"));
                        return;
                    }
                }
            }
        }
    }
}

fn spawn_child(options: &TestRunOptions) -> Result<Child> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&options.command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&options.command);
        c
    };

    cmd.current_dir(&options.cwd)
        .envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    cmd.spawn()
        .with_context(|| format!("spawning test command `{}`", options.command))
}
