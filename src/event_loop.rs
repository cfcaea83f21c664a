use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::controller::Phase;
use crate::{commands, config::ViewerConfig, engine, loader, showroom::ShowroomState};

const COMMAND_QUEUE_SIZE: usize = 32;

/// Drives model loading, command dispatch and the frame cycle on the current
/// thread until command input ends.
pub async fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);

    tokio::spawn(async move {
        if let Err(e) = commands::read_commands(tokio::io::stdin(), command_tx).await {
            log::error!("Command input failed: {:#}", e);
        }
    });

    let (phase_tx, _) = watch::channel(Phase::Uninitialized);
    let state = ShowroomState::new(config);
    let state = run_with_commands(state, command_rx, phase_tx).await;

    log::info!(
        "Shutting down after {} frames, doors {:?}",
        state.frame,
        state.controller.state()
    );

    Ok(())
}

/// Controller phase is published on `phase` once the load settles.
pub async fn run_with_commands(
    mut state: ShowroomState,
    mut commands: mpsc::Receiver<String>,
    phase: watch::Sender<Phase>,
) -> ShowroomState {
    let model_path = state.config.model_path.clone();
    let load = loader::load_document(&model_path);
    tokio::pin!(load);
    let mut loading = true;

    let frame_time = Duration::from_secs_f64(1.0 / f64::from(state.config.frame_rate.max(1)));
    let mut ticker = tokio::time::interval(frame_time);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log::info!("Loading {}", model_path.display());

    loop {
        tokio::select! {
            result = &mut load, if loading => {
                loading = false;
                match result {
                    Ok(document) => state.on_model_loaded(&document),
                    Err(e) => log::error!("Model load failed: {:#}", e),
                }
                phase.send_replace(state.controller.phase());
            }
            command = commands.recv() => {
                let Some(token) = command else {
                    break;
                };
                state.dispatch(&token);
            }
            _ = ticker.tick() => {
                engine::update(&mut state);
            }
        }
    }

    state
}
