//! Periodic auto-save.
//!
//! The task locks the shared session for the duration of one save, so a
//! snapshot never interleaves with a command.

use crate::session::GameSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Spawn a task that calls [`GameSession::autosave_tick`] every `interval`.
///
/// The first save happens one full interval after spawning. Save failures
/// are logged and the task keeps running; abort the handle to stop it.
pub fn spawn_autosave(session: Arc<Mutex<GameSession>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let mut session = session.lock().await;
            match session.autosave_tick().await {
                Ok(true) => tracing::debug!("auto-saved"),
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "auto-save failed"),
            }
        }
    })
}

/// Spawn the auto-save task using the session's configured interval.
pub async fn spawn_for(session: Arc<Mutex<GameSession>>) -> JoinHandle<()> {
    let interval = session.lock().await.config().autosave_interval;
    spawn_autosave(session, interval)
}
