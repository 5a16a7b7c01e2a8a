use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::commands::translate::{CycleOutcome, TranslatePipeline};
use crate::state::{AppState, AppStatus};

/// Runs translate cycles on the tokio runtime, one at a time.
pub struct Dispatcher {
    state: Arc<AppState>,
    pipeline: Arc<TranslatePipeline>,
    runtime: Handle,
}

impl Dispatcher {
    pub fn new(state: Arc<AppState>, pipeline: Arc<TranslatePipeline>, runtime: Handle) -> Self {
        Self {
            state,
            pipeline,
            runtime,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Whether the daemon may go down for a restart. A cycle in flight holds the
    /// user's clipboard, so the restart is refused until it completes.
    pub fn can_restart(&self) -> bool {
        let status = self.state.status();
        if status != AppStatus::Idle {
            tracing::warn!("Ignoring restart hotkey: a cycle is in flight ({:?})", status);
            return false;
        }
        true
    }

    /// Starts a cycle unless one is already in flight, in which case the
    /// trigger is dropped and `None` is returned.
    pub fn trigger_translate(&self) -> Option<JoinHandle<CycleOutcome>> {
        let Some(cycle) = self.state.try_begin_cycle() else {
            tracing::warn!(
                "Ignoring translate hotkey: a cycle is already in flight ({:?})",
                self.state.status()
            );
            return None;
        };

        tracing::debug!("Translate hotkey triggered");
        let pipeline = Arc::clone(&self.pipeline);
        Some(self.runtime.spawn(async move {
            let outcome = pipeline.run(&cycle).await;
            drop(cycle);
            outcome
        }))
    }
}
