//! Validated meeting operations.
//!
//! [`MeetingService`] checks the business rules before anything reaches the
//! store and owns the reminder scheduler's lifecycle. Rule checks and the
//! mutation they guard run under one exclusive store lock, so a concurrent
//! add or remove cannot slip in between.
//!
//! Validation order (first failure wins):
//! 1. start is after the current time
//! 2. end is after start
//! 3. reminder, if set, is not after start
//! 4. no other meeting overlaps

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use meetkeep_core::{Clock, Meeting, MeetingDraft, MeetingId, SystemClock};

use crate::config::SchedulerConfig;
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::notify::{LogSink, SharedSink};
use crate::scheduler::NotificationScheduler;
use crate::store::{MeetingStore, MeetingTable, SharedStore};

/// Meeting operations with rule checks and a running reminder scheduler.
pub struct MeetingService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    scheduler: NotificationScheduler,
}

impl MeetingService {
    /// Creates the service and starts its scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        sink: SharedSink,
        config: SchedulerConfig,
    ) -> Self {
        let scheduler = NotificationScheduler::new(store.clone(), clock.clone(), sink, config);
        scheduler.start().await;
        Self {
            store,
            clock,
            scheduler,
        }
    }

    /// Service over an empty store, the system clock and log-only reminders.
    pub async fn with_defaults() -> Self {
        Self::start(
            MeetingStore::shared(),
            Arc::new(SystemClock),
            Arc::new(LogSink),
            SchedulerConfig::default(),
        )
        .await
    }

    /// Validates and stores a new meeting. Returns it with its id.
    pub async fn add_meeting(&self, draft: MeetingDraft) -> ServiceResult<Meeting> {
        let mut table = self.store.write().await;
        let now = self.clock.now();

        validate(
            &table,
            now,
            draft.start,
            draft.end,
            draft.notification_time,
            None,
        )?;

        let meeting = table.add(draft);
        info!(id = meeting.id, title = %meeting.title, "Meeting added");
        Ok(meeting)
    }

    /// Validates and applies new values to an existing meeting.
    ///
    /// Meetings that have already started cannot be edited. The reminder flag
    /// is kept when the reminder time is unchanged and reset otherwise.
    pub async fn update_meeting(&self, meeting: Meeting) -> ServiceResult<Meeting> {
        let mut table = self.store.write().await;
        let now = self.clock.now();

        let existing = table.get_by_id(meeting.id)?.clone();

        validate(
            &table,
            now,
            meeting.start,
            meeting.end,
            meeting.notification_time,
            Some(meeting.id),
        )?;

        if now >= existing.start {
            return Err(ValidationError::AlreadyStarted.into());
        }

        let notification_shown = existing.notification_shown
            && existing.notification_time == meeting.notification_time;
        let updated = Meeting {
            notification_shown,
            ..meeting
        };

        table.update(updated.clone())?;
        info!(id = updated.id, title = %updated.title, "Meeting updated");
        Ok(updated)
    }

    /// Removes a meeting.
    pub async fn remove_meeting(&self, id: MeetingId) -> ServiceResult<()> {
        let removed = self.store.remove(id).await?;
        info!(id, title = %removed.title, "Meeting removed");
        Ok(())
    }

    /// Meetings starting on `date`, ascending by start.
    pub async fn get_meetings_by_date(&self, date: NaiveDate) -> Vec<Meeting> {
        self.store.get_by_date(date).await
    }

    /// Looks up one meeting.
    pub async fn get_meeting_by_id(&self, id: MeetingId) -> ServiceResult<Meeting> {
        self.store.get_by_id(id).await
    }

    /// All meetings, ascending by start.
    pub async fn get_meetings(&self) -> Vec<Meeting> {
        self.store.get_all().await
    }

    /// Meetings whose reminder is due at `now` and not yet shown.
    pub async fn due_reminders(&self, now: NaiveDateTime) -> Vec<Meeting> {
        self.store.get_upcoming_notifications(now).await
    }

    /// Writes the meetings of `date` to `path`, one line each.
    ///
    /// A day without meetings produces an empty file. Returns the number of
    /// lines written.
    pub async fn export_to_file(&self, date: NaiveDate, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ServiceError::invalid_argument("export path is empty"));
        }

        let meetings = self.get_meetings_by_date(date).await;
        let contents = render_export(&meetings);
        tokio::fs::write(path, contents).await?;

        info!(date = %date, path = %path.display(), count = meetings.len(), "Exported meetings");
        Ok(meetings.len())
    }

    /// The reminder scheduler owned by this service.
    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    /// Stops the scheduler, letting a running tick finish.
    pub async fn shutdown(&self) {
        self.scheduler.stop().await;
    }
}

/// One line per meeting, each terminated by a newline.
pub fn render_export(meetings: &[Meeting]) -> String {
    meetings.iter().map(|m| format!("{}\n", m)).collect()
}

fn validate(
    table: &MeetingTable,
    now: NaiveDateTime,
    start: NaiveDateTime,
    end: NaiveDateTime,
    notification_time: Option<NaiveDateTime>,
    exclude: Option<MeetingId>,
) -> Result<(), ValidationError> {
    if start <= now {
        return Err(ValidationError::PastStart);
    }
    if end <= start {
        return Err(ValidationError::InvalidEndTime);
    }
    if notification_time.is_some_and(|at| at > start) {
        return Err(ValidationError::LateReminder);
    }
    if let Some(conflicting_id) = table.find_conflict(start, end, exclude) {
        debug!(conflicting_id, "Rejected overlapping meeting");
        return Err(ValidationError::TimeConflict { conflicting_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use meetkeep_core::MeetingDraft;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn check(
        table: &MeetingTable,
        start_min: i64,
        end_min: i64,
        remind_min: Option<i64>,
    ) -> Result<(), ValidationError> {
        validate(
            table,
            base(),
            base() + Duration::minutes(start_min),
            base() + Duration::minutes(end_min),
            remind_min.map(|m| base() + Duration::minutes(m)),
            None,
        )
    }

    #[test]
    fn each_rule_has_its_own_reason() {
        let mut table = MeetingTable::new();
        let existing = table.add(MeetingDraft::new(
            "existing",
            base() + Duration::hours(1),
            base() + Duration::hours(2),
        ));

        assert_eq!(check(&table, 0, 30, None), Err(ValidationError::PastStart));
        assert_eq!(check(&table, -5, 30, None), Err(ValidationError::PastStart));
        assert_eq!(check(&table, 200, 200, None), Err(ValidationError::InvalidEndTime));
        assert_eq!(check(&table, 200, 190, None), Err(ValidationError::InvalidEndTime));
        assert_eq!(check(&table, 200, 230, Some(201)), Err(ValidationError::LateReminder));
        assert_eq!(
            check(&table, 90, 150, None),
            Err(ValidationError::TimeConflict {
                conflicting_id: existing.id
            })
        );
        assert_eq!(check(&table, 200, 230, Some(200)), Ok(()));
        assert_eq!(check(&table, 120, 180, None), Ok(()));
    }

    #[test]
    fn first_failure_wins() {
        let table = MeetingTable::new();
        // Past start, inverted end and late reminder all at once.
        assert_eq!(check(&table, -60, -90, Some(10)), Err(ValidationError::PastStart));
        // Inverted end and late reminder.
        assert_eq!(check(&table, 60, 30, Some(90)), Err(ValidationError::InvalidEndTime));
    }

    #[test]
    fn export_lines() {
        let start = base() + Duration::hours(5);
        let meetings = vec![
            MeetingDraft::new("Standup", start, start + Duration::minutes(15)).into_meeting(1),
            MeetingDraft::new("Review", start + Duration::hours(1), start + Duration::hours(2))
                .with_notification(start + Duration::minutes(50))
                .into_meeting(2),
        ];
        assert_eq!(
            render_export(&meetings),
            "1: 14:00 - 14:15 | Standup\n2: 15:00 - 16:00 | Review (reminder at 14:50)\n"
        );
        assert_eq!(render_export(&[]), "");
    }
}
