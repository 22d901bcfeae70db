//! Meeting store, validation service and reminder scheduler.
//!
//! This crate provides:
//! - [`MeetingStore`]: the locked in-memory meeting collection
//! - [`MeetingService`]: rule-checked add/update/remove, queries and export
//! - [`NotificationScheduler`]: background task firing each reminder once
//!
//! # Example
//!
//! ```rust,no_run
//! use chrono::{Duration, Local};
//! use meetkeep_core::MeetingDraft;
//! use meetkeep_service::MeetingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = MeetingService::with_defaults().await;
//!     let start = Local::now().naive_local() + Duration::hours(1);
//!     let meeting = service
//!         .add_meeting(MeetingDraft::new("Standup", start, start + Duration::minutes(15)))
//!         .await?;
//!     println!("{}", meeting);
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod notify;
mod scheduler;
mod service;
mod store;

pub use config::{DEFAULT_TICK_INTERVAL, NotifyConfig, SchedulerConfig};
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use notify::{
    ChannelSink, DesktopSink, FanoutSink, LogSink, Reminder, ReminderSink, SharedSink,
};
pub use scheduler::{NotificationScheduler, SchedulerCommand, SchedulerState, TickReport};
pub use service::{MeetingService, render_export};
pub use store::{MeetingStore, MeetingTable, SharedStore};
