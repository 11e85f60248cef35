//! Per-search orchestration: build the command, run the executable,
//! parse its output, publish the results.
//!
//! A session moves through `Building -> Searching -> Parsing ->
//! Published`, with `Cancelled` and `Failed` as side exits. Transitions
//! are strictly sequential within one session; overlapping sessions race
//! only on the shared result store, where the last publish wins.

use crate::command;
use crate::config::SearchConfiguration;
use crate::error::{FastFindError, Result};
use crate::executor;
use crate::history::ResultStore;
use crate::host::{self, DisplayItem, SearchHost};
use crate::parser;
use crate::types::{OutputFormat, SearchQuery};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often the executor is polled to drive the host progress
/// indicator. Cooperative re-scheduling, not a busy wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle states of one search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Building,
    Searching,
    Parsing,
    Published,
    Cancelled,
    Failed,
}

/// Runs search sessions against a shared result store.
pub struct SessionController {
    config: SearchConfiguration,
    store: Arc<Mutex<ResultStore>>,
}

impl SessionController {
    pub fn new(config: SearchConfiguration, store: ResultStore) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Shared store handle, for hosts that navigate published results.
    pub fn store(&self) -> Arc<Mutex<ResultStore>> {
        self.store.clone()
    }

    pub fn config(&self) -> &SearchConfiguration {
        &self.config
    }

    /// Drive one search from confirmed request to its terminal state.
    pub async fn run(&self, query: SearchQuery, host: &dyn SearchHost) -> SessionState {
        self.run_with_cancel(query, host, CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), with a token the host cancels when the
    /// user dismisses the result picker.
    ///
    /// Dismissal is a presentation event: unless `kill_on_cancel` is
    /// configured the child process runs to completion and its results
    /// still reach the store and history, only the host publish is
    /// skipped.
    pub async fn run_with_cancel(
        &self,
        query: SearchQuery,
        host: &dyn SearchHost,
        dismiss: CancellationToken,
    ) -> SessionState {
        match self.drive(query, host, dismiss).await {
            Ok(state) => state,
            Err(e) => {
                log::error!("search session failed: {}", e);
                host.error(&e.to_string());
                SessionState::Failed
            }
        }
    }

    async fn drive(
        &self,
        query: SearchQuery,
        host: &dyn SearchHost,
        dismiss: CancellationToken,
    ) -> Result<SessionState> {
        let mut state = SessionState::Idle;

        transition(&mut state, SessionState::Building);
        let argv = command::build(&self.config, &query)?;
        log::debug!("search argv: {:?}", argv);

        transition(&mut state, SessionState::Searching);
        let handle = executor::spawn_search(&argv, self.config.root.as_deref())?;

        let mut dismissed = false;
        let mut tick = 0;
        while handle.is_running() {
            if dismiss.is_cancelled() && !dismissed {
                dismissed = true;
                host.cancelled();
                if self.config.kill_on_cancel {
                    handle.cancel();
                }
            }
            host.progress(&host::progress_indicator(tick));
            tick += 1;
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let outcome = handle.take_outcome().ok_or_else(|| {
            FastFindError::Parse("search process produced no captured output".to_string())
        })?;
        if outcome.cancelled {
            transition(&mut state, SessionState::Cancelled);
            return Ok(state);
        }
        if !outcome.stderr.is_empty() {
            // Diagnostic only; stderr alone is never fatal.
            log::debug!(
                "search stderr: {}",
                String::from_utf8_lossy(&outcome.stderr).trim()
            );
        }

        transition(&mut state, SessionState::Parsing);
        let records = parser::parse(&outcome.stdout, OutputFormat::JsonLines)?;
        let summary = format!("found {} occurrences of '{}'", records.len(), query.term);
        let items: Vec<DisplayItem> = records.iter().map(DisplayItem::from_record).collect();

        {
            let mut store = self.store.lock().unwrap();
            if let Err(e) = store.publish(&query.term, records) {
                log::warn!("failed to persist search history: {}", e);
            }
        }

        if dismissed || dismiss.is_cancelled() {
            // The picker is gone; the results were still recorded.
            transition(&mut state, SessionState::Cancelled);
            return Ok(state);
        }

        transition(&mut state, SessionState::Published);
        log::info!("{}", summary);
        host.publish(items, &summary);
        Ok(state)
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    log::debug!("session: {:?} -> {:?}", state, next);
    *state = next;
}
