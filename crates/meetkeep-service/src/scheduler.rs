//! Background reminder scheduler.
//!
//! A spawned task wakes up on a fixed interval, asks the store for meetings
//! whose reminder is due, claims each one by setting its shown flag and
//! hands the reminder to the sink. The loop also listens on a command
//! channel so it can be poked (`TickNow`) or stopped (`Stop`).
//!
//! Lifecycle: Stopped -> `start()` -> Running -> `stop()` -> Stopped. Both
//! transitions are idempotent; `start()` on a running scheduler restarts the
//! cadence.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use meetkeep_core::{Clock, Meeting};

use crate::config::SchedulerConfig;
use crate::notify::{Reminder, SharedSink};
use crate::store::SharedStore;

/// Commands understood by the running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Run a tick right away.
    TickNow,
    /// Leave the loop.
    Stop,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Reminders claimed and handed to the sink.
    pub fired: usize,
    /// Due meetings that were removed, edited or already shown by the time
    /// they were claimed.
    pub skipped: usize,
}

/// Observable scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    /// Whether the background loop is running.
    pub running: bool,
    /// Ticks executed since creation.
    pub ticks: u64,
    /// Clock reading of the last tick.
    pub last_tick: Option<NaiveDateTime>,
    /// Reminders fired since creation.
    pub fired_total: u64,
}

type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Everything a tick needs; shared between the handle and the loop.
struct Ticker {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    sink: SharedSink,
    state: SharedSchedulerState,
}

impl Ticker {
    async fn tick(&self) -> TickReport {
        let now = self.clock.now();
        let due = self.store.get_upcoming_notifications(now).await;
        let report = self.fire(due, now).await;

        let mut state = self.state.write().await;
        state.ticks += 1;
        state.last_tick = Some(now);
        state.fired_total += report.fired as u64;
        report
    }

    async fn fire(&self, due: Vec<Meeting>, now: NaiveDateTime) -> TickReport {
        let mut report = TickReport::default();

        for candidate in due {
            let claimed = {
                let mut table = self.store.write().await;
                match table.get_by_id(candidate.id).cloned() {
                    Ok(current) if current.is_reminder_due(now) => table
                        .mark_notification_shown(current.id)
                        .ok()
                        .filter(|newly_shown| *newly_shown)
                        .map(|_| current),
                    Ok(_) => None,
                    Err(e) => {
                        debug!(error = %e, id = candidate.id, "Due meeting vanished before its reminder fired");
                        None
                    }
                }
            };

            let Some(meeting) = claimed else {
                report.skipped += 1;
                continue;
            };

            let reminder = Reminder::for_meeting(&meeting);
            if let Err(e) = self.sink.deliver(&reminder) {
                warn!(error = %e, id = meeting.id, "Failed to deliver reminder");
            }
            report.fired += 1;
        }

        if report.fired > 0 || report.skipped > 0 {
            debug!(fired = report.fired, skipped = report.skipped, "Tick finished");
        }
        report
    }
}

struct RunningLoop {
    command_tx: mpsc::Sender<SchedulerCommand>,
    task: JoinHandle<()>,
}

/// Periodic reminder scheduler.
pub struct NotificationScheduler {
    config: SchedulerConfig,
    ticker: Arc<Ticker>,
    running: Mutex<Option<RunningLoop>>,
}

impl NotificationScheduler {
    /// Creates a stopped scheduler.
    pub fn new(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        sink: SharedSink,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            config,
            ticker: Arc::new(Ticker {
                store,
                clock,
                sink,
                state: Arc::new(RwLock::new(SchedulerState::default())),
            }),
            running: Mutex::new(None),
        }
    }

    /// Starts the background loop, replacing a running one.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            debug!("Scheduler already running, restarting");
            Self::shutdown_loop(previous).await;
        }

        let (command_tx, command_rx) = mpsc::channel(16);
        let ticker = self.ticker.clone();
        let period = self.config.tick_interval;
        let task = tokio::spawn(run_loop(ticker, period, command_rx));

        *running = Some(RunningLoop { command_tx, task });
        self.ticker.state.write().await.running = true;
        info!(interval_secs = period.as_secs(), "Reminder scheduler started");
    }

    /// Stops the background loop.
    ///
    /// A tick that is already executing finishes first; no tick starts after
    /// this returns. Calling it on a stopped scheduler does nothing.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(current) = running.take() else {
            return;
        };
        Self::shutdown_loop(current).await;
        self.ticker.state.write().await.running = false;
        info!("Reminder scheduler stopped");
    }

    async fn shutdown_loop(running: RunningLoop) {
        // A closed channel also ends the loop, so a failed send is fine.
        let _ = running.command_tx.send(SchedulerCommand::Stop).await;
        if let Err(e) = running.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }

    /// Asks the running loop for an immediate tick.
    ///
    /// Returns false when the scheduler is stopped.
    pub async fn tick_now(&self) -> bool {
        let running = self.running.lock().await;
        match running.as_ref() {
            Some(current) => current
                .command_tx
                .send(SchedulerCommand::TickNow)
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Runs one tick on the caller's task.
    pub async fn tick(&self) -> TickReport {
        self.ticker.tick().await
    }

    /// Claims and fires the given due meetings as of `now`.
    ///
    /// Meetings that disappeared or stopped being due since they were
    /// fetched are counted as skipped.
    pub async fn fire(&self, due: Vec<Meeting>, now: NaiveDateTime) -> TickReport {
        self.ticker.fire(due, now).await
    }

    /// Returns true while the background loop is running.
    pub async fn is_running(&self) -> bool {
        self.ticker.state.read().await.running
    }

    /// Returns a snapshot of the scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.ticker.state.read().await.clone()
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        // Dropping the sender closes the channel; the loop exits after its
        // current tick.
        if self.running.get_mut().take().is_some() {
            debug!("Scheduler dropped while running");
        }
    }
}

async fn run_loop(
    ticker: Arc<Ticker>,
    period: std::time::Duration,
    mut command_rx: mpsc::Receiver<SchedulerCommand>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => match cmd {
                Some(SchedulerCommand::TickNow) => {
                    debug!("Received TickNow command");
                    ticker.tick().await;
                }
                Some(SchedulerCommand::Stop) | None => {
                    debug!("Scheduler loop exiting");
                    break;
                }
            },
            _ = interval.tick() => {
                ticker.tick().await;
            }
        }
    }
}
