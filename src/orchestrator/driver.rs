//! Async driver for the update orchestrator.
//!
//! The orchestrator itself is a synchronous state machine; this loop feeds
//! it commands from an mpsc channel and polls `tick()` so the debounce
//! fires without the caller scheduling anything. Returns the orchestrator
//! when the channel closes, so callers can inspect final state.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::UpdateOrchestrator;
use crate::config::defaults::DRIVER_POLL_MS;
use crate::types::{CalculationParameters, WellLogData};

/// Commands the driver accepts from the embedding application.
#[derive(Debug)]
pub enum EngineCommand {
    /// A parameter edit from the UI
    EditParameters(CalculationParameters),
    /// Explicit recompute (manual mode, or a refresh button)
    TriggerUpdate,
    /// Replace the loaded well set
    LoadWells(Vec<WellLogData>),
    /// Stop the loop
    Shutdown,
}

/// Run the orchestrator until `Shutdown` or the command channel closes.
///
/// Results and telemetry flow out through the subscriber channels created
/// with [`UpdateOrchestrator::subscribe`] before the loop starts.
pub async fn run_update_loop(
    mut orchestrator: UpdateOrchestrator,
    mut commands: mpsc::Receiver<EngineCommand>,
) -> UpdateOrchestrator {
    info!("Update loop started");
    let poll = Duration::from_millis(DRIVER_POLL_MS);

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(EngineCommand::EditParameters(params)) => {
                        orchestrator.handle_parameter_edit(params, Instant::now());
                    }
                    Some(EngineCommand::TriggerUpdate) => {
                        orchestrator.trigger_update(Instant::now());
                    }
                    Some(EngineCommand::LoadWells(wells)) => {
                        orchestrator.load_wells(wells);
                    }
                    Some(EngineCommand::Shutdown) | None => {
                        debug!("Command channel closed - update loop stopping");
                        break;
                    }
                }
            }
            () = tokio::time::sleep(poll) => {
                orchestrator.tick(Instant::now());
            }
        }
    }

    info!("Update loop stopped");
    orchestrator
}
