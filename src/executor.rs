//! Asynchronous execution of the search executable.
//!
//! One child process per search request. The caller gets a handle it can
//! poll without blocking; stdout and stderr are drained by background
//! tasks while the child runs so large result sets cannot stall the
//! process on a full pipe.

use crate::command;
use crate::error::{FastFindError, Result};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

/// Captured output of a finished search process.
#[derive(Debug)]
pub struct SearchOutcome {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// None when the process could not be reaped.
    pub status: Option<ExitStatus>,
    /// True when the process was killed through [`SearchHandle::cancel`].
    pub cancelled: bool,
}

/// Handle to an in-flight search process.
///
/// `is_running` never blocks; once it reports false the outcome can be
/// taken exactly once.
#[derive(Debug)]
pub struct SearchHandle {
    finished: Arc<AtomicBool>,
    outcome: Arc<Mutex<Option<SearchOutcome>>>,
    cancel: CancellationToken,
}

impl SearchHandle {
    pub fn is_running(&self) -> bool {
        !self.finished.load(Ordering::Acquire)
    }

    /// Take the captured output. None while the process is still running
    /// or when the outcome was already taken.
    pub fn take_outcome(&self) -> Option<SearchOutcome> {
        self.outcome.lock().unwrap().take()
    }

    /// Kill the child process. The outcome still becomes available, with
    /// its `cancelled` flag set.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Spawn the search process described by `argv` with `cwd` as its working
/// directory.
///
/// A missing executable is reported as [`FastFindError::ExecutableNotFound`];
/// any other OS-level launch failure as [`FastFindError::Spawn`].
pub fn spawn_search(argv: &[OsString], cwd: Option<&Path>) -> Result<SearchHandle> {
    let executable = argv
        .first()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut cmd = command::to_command(argv, cwd)?;
    log::debug!("spawning search process: {:?}", cmd);

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            FastFindError::ExecutableNotFound(executable.clone())
        } else {
            FastFindError::Spawn {
                executable: executable.clone(),
                source: e,
            }
        }
    })?;

    let mut stdout = child.stdout.take().ok_or_else(|| FastFindError::Spawn {
        executable: executable.clone(),
        source: io::Error::new(io::ErrorKind::Other, "stdout pipe unavailable"),
    })?;
    let mut stderr = child.stderr.take().ok_or_else(|| FastFindError::Spawn {
        executable: executable.clone(),
        source: io::Error::new(io::ErrorKind::Other, "stderr pipe unavailable"),
    })?;

    let finished = Arc::new(AtomicBool::new(false));
    let outcome = Arc::new(Mutex::new(None));
    let cancel = CancellationToken::new();

    let finished_flag = finished.clone();
    let outcome_slot = outcome.clone();
    let token = cancel.clone();

    tokio::spawn(async move {
        // Drain both pipes concurrently with the wait; killing the child
        // closes them and lets these tasks finish.
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stdout.read_to_end(&mut buf).await {
                log::warn!("error reading search stdout: {}", e);
            }
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                log::warn!("error reading search stderr: {}", e);
            }
            buf
        });

        let mut cancelled = false;
        let status = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => Some(status),
                Err(e) => {
                    log::error!("failed to wait for search process: {}", e);
                    None
                }
            },
            _ = token.cancelled() => {
                cancelled = true;
                log::info!("killing search process on cancellation");
                if let Err(e) = child.kill().await {
                    log::warn!("failed to kill search process: {}", e);
                }
                child.wait().await.ok()
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        match status {
            Some(status) if status.success() => {
                log::debug!("search process completed successfully")
            }
            Some(status) => log::debug!("search process exited with {}", status),
            None => log::warn!("search process status unavailable"),
        }

        *outcome_slot.lock().unwrap() = Some(SearchOutcome {
            stdout,
            stderr,
            status,
            cancelled,
        });
        finished_flag.store(true, Ordering::Release);
    });

    Ok(SearchHandle {
        finished,
        outcome,
        cancel,
    })
}
