//! Background loops: job history, microphone meter and the simulated
//! studio meters.
//!
//! Each loop skips a tick rather than wait when a lock is busy, so a slow
//! command never stalls them.

use crate::commands::refresh_history;
use crate::dto::{Event, MeterDto, studio_to_tick};
use crate::state::AppState;
use onbeat_model::View;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub type Emitter = UnboundedSender<Event>;

/// A running loop. Dropping the handle stops it.
pub struct PollHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn spawn(name: &'static str, task: JoinHandle<()>) -> Self {
        tracing::debug!("{name} loop started");
        Self { name, task }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("{} loop stopped", self.name);
    }
}

/// Refresh the job history every `interval` while the studio page is
/// showing.
pub fn start_history_loop(app: Arc<AppState>, events: Emitter, interval: Duration) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let in_studio = match app.store.try_lock() {
                Ok(store) => store.state().view == View::Studio,
                Err(_) => continue,
            };
            if !in_studio || app.fault().is_some() {
                continue;
            }

            let fetch = Arc::clone(&app);
            match tokio::task::spawn_blocking(move || refresh_history(&fetch)).await {
                Ok(Ok(jobs)) => {
                    if events.send(Event::History { jobs }).is_err() {
                        break;
                    }
                }
                Ok(Err(e)) => tracing::warn!("history refresh skipped: {e}"),
                Err(e) => tracing::warn!("history task failed: {e}"),
            }
        }
    });
    PollHandle::spawn("history", task)
}

/// Sample the microphone while a capture session is open. Commands open
/// and close the session as the setup dialog opens and closes.
pub fn start_meter_loop(app: Arc<AppState>, events: Emitter, interval: Duration) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let reading = {
                let mut meter = match app.meter.try_lock() {
                    Ok(meter) => meter,
                    Err(_) => continue,
                };
                if !meter.is_active() {
                    continue;
                }
                meter.tick();
                MeterDto::from(meter.reading())
            };

            if events.send(Event::Meter(reading)).is_err() {
                break;
            }
        }
    });
    PollHandle::spawn("meter", task)
}

/// Advance the mastering job, tuner, playback progress and console meters.
pub fn start_sim_loop(app: Arc<AppState>, events: Emitter, interval: Duration) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut last = Instant::now();
        loop {
            ticker.tick().await;
            let now = Instant::now();

            let playing = match app.store.try_lock() {
                Ok(store) => store.state().transport.is_playing,
                Err(_) => continue,
            };
            let tick = {
                let mut studio = match app.studio.try_lock() {
                    Ok(studio) => studio,
                    Err(_) => continue,
                };
                studio.advance(now.duration_since(last), playing);
                studio_to_tick(&studio)
            };
            last = now;

            if events.send(tick).is_err() {
                break;
            }
        }
    });
    PollHandle::spawn("sim", task)
}

pub fn start_all(app: &Arc<AppState>, events: &Emitter) -> Vec<PollHandle> {
    let config = &app.config;
    vec![
        start_history_loop(Arc::clone(app), events.clone(), config.history_interval()),
        start_meter_loop(Arc::clone(app), events.clone(), config.meter_interval()),
        start_sim_loop(
            Arc::clone(app),
            events.clone(),
            config.console_meter_interval(),
        ),
    ]
}
