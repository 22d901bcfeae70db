//! In-memory meeting storage.
//!
//! [`MeetingTable`] holds the meetings and the id counter and implements the
//! primitive queries and mutations without any locking. [`MeetingStore`]
//! wraps it in a single [`RwLock`]: every async method takes the lock for
//! exactly one primitive, and [`MeetingStore::write`] hands out the exclusive
//! guard to callers that must check and mutate as one step.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use meetkeep_core::{Meeting, MeetingDraft, MeetingId};

use crate::error::{ServiceError, ServiceResult};

/// The meeting collection and its id counter.
#[derive(Debug)]
pub struct MeetingTable {
    meetings: Vec<Meeting>,
    next_id: MeetingId,
}

impl Default for MeetingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MeetingTable {
    /// Creates an empty table. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            meetings: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of stored meetings.
    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    /// Stores a new meeting under the next id and returns the stored copy.
    ///
    /// No business rules are checked here.
    pub fn add(&mut self, draft: MeetingDraft) -> Meeting {
        let id = self.next_id;
        self.next_id += 1;

        let meeting = draft.into_meeting(id);
        debug!(id, title = %meeting.title, "Stored meeting");
        self.meetings.push(meeting.clone());
        meeting
    }

    /// Overwrites every field of the stored meeting with the same id.
    pub fn update(&mut self, meeting: Meeting) -> ServiceResult<()> {
        let stored = self
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting.id)
            .ok_or_else(|| ServiceError::not_found(meeting.id))?;

        debug!(id = meeting.id, title = %meeting.title, "Updated meeting");
        *stored = meeting;
        Ok(())
    }

    /// Removes a meeting and returns it.
    pub fn remove(&mut self, id: MeetingId) -> ServiceResult<Meeting> {
        let index = self
            .meetings
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ServiceError::not_found(id))?;

        debug!(id, "Removed meeting");
        Ok(self.meetings.remove(index))
    }

    /// Looks up a meeting by id.
    pub fn get_by_id(&self, id: MeetingId) -> ServiceResult<&Meeting> {
        self.meetings
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ServiceError::not_found(id))
    }

    /// All meetings, ascending by start. Equal starts keep insertion order.
    pub fn all(&self) -> Vec<Meeting> {
        sorted(self.meetings.iter())
    }

    /// Meetings starting on `date`, ascending by start.
    pub fn by_date(&self, date: NaiveDate) -> Vec<Meeting> {
        sorted(self.meetings.iter().filter(|m| m.starts_on(date)))
    }

    /// Meetings whose reminder is due at `now` and has not been shown.
    pub fn upcoming_notifications(&self, now: NaiveDateTime) -> Vec<Meeting> {
        let due: Vec<Meeting> = self
            .meetings
            .iter()
            .filter(|m| m.is_reminder_due(now))
            .cloned()
            .collect();
        trace!(now = %now, count = due.len(), "Collected due reminders");
        due
    }

    /// Returns the id of a stored meeting overlapping `[start, end)`.
    ///
    /// The meeting with id `exclude` is skipped, so a meeting never
    /// conflicts with its own stored interval.
    pub fn find_conflict(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        exclude: Option<MeetingId>,
    ) -> Option<MeetingId> {
        self.meetings
            .iter()
            .filter(|m| Some(m.id) != exclude)
            .find(|m| m.overlaps(start, end))
            .map(|m| m.id)
    }

    /// True iff another stored meeting (different id) overlaps `meeting`.
    pub fn has_time_conflict(&self, meeting: &Meeting) -> bool {
        self.find_conflict(meeting.start, meeting.end, Some(meeting.id))
            .is_some()
    }

    /// Sets only the reminder flag of a meeting.
    ///
    /// Returns `false` if the flag was already set.
    pub fn mark_notification_shown(&mut self, id: MeetingId) -> ServiceResult<bool> {
        let stored = self
            .meetings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ServiceError::not_found(id))?;

        if stored.notification_shown {
            return Ok(false);
        }
        stored.notification_shown = true;
        Ok(true)
    }
}

fn sorted<'a>(meetings: impl Iterator<Item = &'a Meeting>) -> Vec<Meeting> {
    let mut out: Vec<Meeting> = meetings.cloned().collect();
    out.sort_by_key(|m| (m.start, m.id));
    out
}

/// Shared handle to a store.
pub type SharedStore = Arc<MeetingStore>;

/// Thread-safe meeting store.
#[derive(Debug, Default)]
pub struct MeetingStore {
    table: RwLock<MeetingTable>,
}

impl MeetingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store behind an `Arc`.
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    /// Takes the exclusive lock for a multi-step operation.
    pub async fn write(&self) -> RwLockWriteGuard<'_, MeetingTable> {
        self.table.write().await
    }

    /// See [`MeetingTable::add`].
    pub async fn add(&self, draft: MeetingDraft) -> Meeting {
        self.table.write().await.add(draft)
    }

    /// See [`MeetingTable::update`].
    pub async fn update(&self, meeting: Meeting) -> ServiceResult<()> {
        self.table.write().await.update(meeting)
    }

    /// See [`MeetingTable::remove`].
    pub async fn remove(&self, id: MeetingId) -> ServiceResult<Meeting> {
        self.table.write().await.remove(id)
    }

    /// See [`MeetingTable::get_by_id`].
    pub async fn get_by_id(&self, id: MeetingId) -> ServiceResult<Meeting> {
        self.table.read().await.get_by_id(id).cloned()
    }

    /// See [`MeetingTable::all`].
    pub async fn get_all(&self) -> Vec<Meeting> {
        self.table.read().await.all()
    }

    /// See [`MeetingTable::by_date`].
    pub async fn get_by_date(&self, date: NaiveDate) -> Vec<Meeting> {
        self.table.read().await.by_date(date)
    }

    /// See [`MeetingTable::upcoming_notifications`].
    pub async fn get_upcoming_notifications(&self, now: NaiveDateTime) -> Vec<Meeting> {
        self.table.read().await.upcoming_notifications(now)
    }

    /// See [`MeetingTable::has_time_conflict`].
    pub async fn has_time_conflict(&self, meeting: &Meeting) -> bool {
        self.table.read().await.has_time_conflict(meeting)
    }

    /// See [`MeetingTable::mark_notification_shown`].
    pub async fn mark_notification_shown(&self, id: MeetingId) -> ServiceResult<bool> {
        self.table.write().await.mark_notification_shown(id)
    }

    /// Number of stored meetings.
    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn draft(title: &str, start_min: i64, len_min: i64) -> MeetingDraft {
        let start = base() + Duration::minutes(start_min);
        MeetingDraft::new(title, start, start + Duration::minutes(len_min))
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let mut table = MeetingTable::new();
        let a = table.add(draft("a", 0, 30));
        let b = table.add(draft("b", 60, 30));

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(!a.notification_shown);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut table = MeetingTable::new();
        table.add(draft("a", 0, 30));
        let b = table.add(draft("b", 60, 30));
        table.remove(b.id).unwrap();

        let c = table.add(draft("c", 120, 30));
        assert_eq!(c.id, 3);
    }

    #[test]
    fn separate_tables_count_independently() {
        let mut first = MeetingTable::new();
        let mut second = MeetingTable::new();
        first.add(draft("a", 0, 30));
        first.add(draft("b", 60, 30));

        assert_eq!(second.add(draft("c", 0, 30)).id, 1);
    }

    #[test]
    fn update_overwrites_fields_in_place() {
        let mut table = MeetingTable::new();
        let mut m = table.add(draft("old", 0, 30));
        m.title = "new".to_string();
        m.end = m.start + Duration::minutes(45);
        m.notification_time = Some(m.start - Duration::minutes(5));

        table.update(m.clone()).unwrap();

        assert_eq!(table.get_by_id(m.id).unwrap(), &m);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut table = MeetingTable::new();
        let ghost = draft("ghost", 0, 30).into_meeting(42);

        let err = table.update(ghost).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id: 42 }));
    }

    #[test]
    fn remove_and_get_missing_are_not_found() {
        let mut table = MeetingTable::new();
        assert!(table.remove(1).unwrap_err().is_not_found());
        assert!(table.get_by_id(1).unwrap_err().is_not_found());

        let m = table.add(draft("a", 0, 30));
        table.remove(m.id).unwrap();
        assert!(table.get_by_id(m.id).unwrap_err().is_not_found());
    }

    #[test]
    fn all_is_ordered_by_start_then_insertion() {
        let mut table = MeetingTable::new();
        table.add(draft("late", 300, 30));
        table.add(draft("early", 0, 30));
        table.add(draft("tie-first", 120, 30));
        table.add(draft("tie-second", 120, 10));

        let titles: Vec<String> = table.all().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["early", "tie-first", "tie-second", "late"]);
    }

    #[test]
    fn by_date_matches_calendar_day_only() {
        let mut table = MeetingTable::new();
        table.add(draft("evening", 12 * 60, 30));
        table.add(draft("morning", 0, 30));
        table.add(draft("tomorrow", 24 * 60, 30));
        table.add(draft("yesterday", -10 * 60, 30));

        let titles: Vec<String> = table
            .by_date(base().date())
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, ["morning", "evening"]);

        assert!(
            table
                .by_date(base().date() + Duration::days(5))
                .is_empty()
        );
    }

    #[test]
    fn upcoming_notifications_window() {
        let mut table = MeetingTable::new();
        let start = base() + Duration::hours(1);
        let with_reminder = table.add(
            MeetingDraft::new("reminded", start, start + Duration::hours(1))
                .with_notification(base() + Duration::minutes(30)),
        );
        table.add(draft("silent", 180, 30));

        assert!(
            table
                .upcoming_notifications(base() + Duration::minutes(29))
                .is_empty()
        );

        let due = table.upcoming_notifications(base() + Duration::minutes(30));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, with_reminder.id);

        assert!(table.upcoming_notifications(start).is_empty());
    }

    #[test]
    fn shown_reminders_are_not_upcoming() {
        let mut table = MeetingTable::new();
        let start = base() + Duration::hours(1);
        let m = table.add(
            MeetingDraft::new("once", start, start + Duration::hours(1))
                .with_notification(base()),
        );

        assert!(table.mark_notification_shown(m.id).unwrap());
        assert!(!table.mark_notification_shown(m.id).unwrap());
        assert!(
            table
                .upcoming_notifications(base() + Duration::minutes(10))
                .is_empty()
        );
    }

    #[test]
    fn mark_shown_missing_is_not_found() {
        let mut table = MeetingTable::new();
        assert!(table.mark_notification_shown(9).unwrap_err().is_not_found());
    }

    #[test]
    fn conflict_detection() {
        let mut table = MeetingTable::new();
        let existing = table.add(draft("existing", 60, 60));

        let overlapping = draft("overlap", 90, 60).into_meeting(99);
        let adjacent = draft("adjacent", 120, 60).into_meeting(99);
        let before = draft("before", 0, 60).into_meeting(99);

        assert!(table.has_time_conflict(&overlapping));
        assert!(!table.has_time_conflict(&adjacent));
        assert!(!table.has_time_conflict(&before));
        assert_eq!(
            table.find_conflict(overlapping.start, overlapping.end, None),
            Some(existing.id)
        );
    }

    #[test]
    fn meeting_never_conflicts_with_itself() {
        let mut table = MeetingTable::new();
        let mut m = table.add(draft("self", 60, 60));
        assert!(!table.has_time_conflict(&m));

        m.title = "renamed".to_string();
        assert!(!table.has_time_conflict(&m));

        m.end += Duration::minutes(30);
        assert!(!table.has_time_conflict(&m));
    }

    #[tokio::test]
    async fn store_wraps_table() {
        let store = MeetingStore::shared();
        assert!(store.is_empty().await);

        let m = store.add(draft("a", 0, 30)).await;
        assert_eq!(store.get_by_id(m.id).await.unwrap(), m);
        assert_eq!(store.get_all().await, vec![m.clone()]);
        assert_eq!(store.get_by_date(base().date()).await.len(), 1);
        assert!(!store.has_time_conflict(&m).await);

        store.remove(m.id).await.unwrap();
        assert_eq!(store.len().await, 0);
        assert!(store.remove(m.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_get_unique_ids() {
        let store = MeetingStore::shared();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.add(draft("parallel", i * 60, 30)).await.id
            }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
        assert_eq!(store.len().await, 32);
    }
}
