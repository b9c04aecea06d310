//! Clock service — background task that runs game clocks.
//!
//! DESIGN
//! ======
//! One task for the whole server ticks every session whose clocks are
//! running, once per second of game time. A tick takes each session's gate
//! with `try_lock`: a session busy with a player command is skipped for
//! that tick rather than stalling every other game behind it.
//!
//! A tick that runs a clock to zero ends the game on time, tells both seats
//! with `gameOver`, and finalizes while still holding the gate. A game that
//! times out after both seats have gone is removed right away.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::ServerEvent;
use crate::services::finalize;
use crate::state::AppState;

/// Wall-clock period of one tick. `GameSession::tick` takes one whole
/// second off the side to move, so the two must agree.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawn the background clock task. Returns a handle for shutdown.
pub fn spawn_clock_task(state: AppState) -> JoinHandle<()> {
    info!(period_ms = TICK_PERIOD.as_millis(), "clock task configured");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            tick_all(&state).await;
        }
    })
}

/// Tick every running clock once. Returns the codes of games that ended.
pub async fn tick_all(state: &AppState) -> Vec<String> {
    let codes = state.directory.lock().await.stage3_codes();
    let mut timed_out = Vec::new();

    for code in codes {
        let Some(gate) = state.directory.lock().await.gate(&code) else { continue };
        let Ok(_guard) = gate.try_lock_owned() else {
            debug!(%code, "clock: session busy; skipping tick");
            continue;
        };

        let (event, sockets): (ServerEvent, Vec<Uuid>) = {
            let mut dir = state.directory.lock().await;
            let Some(session) = dir.find_ongoing_by_code_mut(&code) else { continue };
            if !session.tick() {
                continue;
            }
            let event = ServerEvent::GameOver { winner: session.winner(), finish_reason: session.finish_reason() };
            let sockets = session
                .seats()
                .filter(|(_, seat)| seat.present)
                .map(|(_, seat)| seat.socket_id)
                .collect();
            (event, sockets)
        };

        info!(%code, "clock: game ended on time");
        for socket in sockets {
            state.send_to(socket, event.clone()).await;
        }
        finalize::finalize_game(state, &code).await;
        if state.directory.lock().await.remove_if_deserted(&code) {
            info!(%code, "clock: removed game with no seats left");
        }
        timed_out.push(code);
    }
    timed_out
}

#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;
