//! FILENAME: app/dashboard/src/refresh.rs
// PURPOSE: Cancellable auto-refresh timer.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use engine::RecordRef;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{log_debug, log_error, log_info, DashboardState};

/// A repeating task that calls its tick callback once per period, first
/// after one full period. Stopping or dropping the handle guarantees no
/// further ticks start.
#[derive(Debug)]
pub struct AutoRefresh {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl AutoRefresh {
    /// Spawns the timer on the current tokio runtime. A zero period is
    /// raised to one millisecond.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {}
                }
                // A tick in flight is abandoned as soon as the timer stops
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tick() => {}
                }
            }
            log_debug!("REFRESH", "auto-refresh loop exited");
        });

        log_info!("REFRESH", "auto-refresh started period={:?}", period);
        AutoRefresh { token, handle: Some(handle), period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn stop(&mut self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
            log_info!("REFRESH", "auto-refresh stopped");
        }
    }

    /// Stops the timer and waits for its task to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Drives `fetch` on the settings' refresh period and applies each outcome
/// to the session. Returns `None` when auto-refresh is disabled.
pub fn start_session_refresh<F, Fut, E>(state: Arc<DashboardState>, fetch: F) -> Option<AutoRefresh>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<RecordRef>, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let period = state.settings.refresh_period()?;
    Some(AutoRefresh::spawn(period, move || {
        let state = Arc::clone(&state);
        let pending = fetch();
        async move {
            let outcome = pending.await;
            match state.session.lock() {
                Ok(mut session) => {
                    session.apply_refresh(outcome);
                }
                Err(e) => log_error!("REFRESH", "session lock poisoned: {}", e),
            }
        }
    }))
}
