//! Shell command: runs the interactive session in the foreground.
//!
//! Wires the pieces together:
//! - in-memory store and system clock
//! - reminder sinks from config, plus a channel feeding the shell
//! - the meeting service and its scheduler
//! - stdin/stdout for the session, Ctrl-C for an early exit

use std::sync::Arc;

use tokio::io::{BufReader, stdin, stdout};
use tracing::{info, warn};

use meetkeep_core::SystemClock;
use meetkeep_service::{ChannelSink, FanoutSink, MeetingService, MeetingStore};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::shell::Shell;

/// Runs the shell until the user quits, input ends or Ctrl-C is pressed.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let (channel, reminders) = ChannelSink::new();
    let sink = FanoutSink::from_config(&config.notify_config()).with(channel);
    let scheduler_config = config.scheduler_config();

    info!(
        sinks = sink.len(),
        tick_secs = scheduler_config.tick_interval.as_secs(),
        "Starting meeting service"
    );

    let service = MeetingService::start(
        MeetingStore::shared(),
        Arc::new(SystemClock),
        Arc::new(sink),
        scheduler_config,
    )
    .await;

    let mut shell = Shell::new(&service, BufReader::new(stdin()), stdout(), reminders)
        .with_json(config.display.json);

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let result = tokio::select! {
        result = shell.run() => result,
        () = interrupted => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    service.shutdown().await;
    let drained = shell.finish().await;
    info!("Meeting service stopped");
    result.and(drained)
}
