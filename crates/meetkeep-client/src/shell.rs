//! Interactive line-oriented shell.
//!
//! The shell shows a numbered menu, prompts for each field and calls the
//! meeting service. Errors are printed and the shell keeps running; only
//! closed input or a failing output stream ends it. Reminders arriving on
//! the channel are printed as soon as they come in, even mid-prompt.

use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use meetkeep_core::{
    DATE_FORMAT, Meeting, MeetingDraft, MeetingId, parse_date, parse_optional_timestamp,
    parse_timestamp,
};
use meetkeep_service::{MeetingService, Reminder};

use crate::error::{ClientError, ClientResult};

const MENU: &str = "\
1. Add meeting
2. List all meetings
3. Update meeting
4. Remove meeting
5. Meetings on a day
6. Show meeting by id
7. Export day to file
8. Quit
> ";

/// Menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    List,
    Update,
    Remove,
    Day,
    Show,
    Export,
    Quit,
}

impl MenuAction {
    /// Accepts the menu number or the action name.
    pub fn parse(input: &str) -> Option<Self> {
        let action = match input.trim().to_ascii_lowercase().as_str() {
            "1" | "add" => Self::Add,
            "2" | "list" => Self::List,
            "3" | "update" => Self::Update,
            "4" | "remove" => Self::Remove,
            "5" | "day" => Self::Day,
            "6" | "show" => Self::Show,
            "7" | "export" => Self::Export,
            "8" | "quit" | "exit" | "q" => Self::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// Interactive shell over any line reader and writer.
pub struct Shell<'a, R, W> {
    service: &'a MeetingService,
    input: Lines<R>,
    output: W,
    reminders: UnboundedReceiver<Reminder>,
    json: bool,
}

impl<'a, R, W> Shell<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a shell. `reminders` is the receiving end of the service's
    /// channel sink.
    pub fn new(
        service: &'a MeetingService,
        input: R,
        output: W,
        reminders: UnboundedReceiver<Reminder>,
    ) -> Self {
        Self {
            service,
            input: input.lines(),
            output,
            reminders,
            json: false,
        }
    }

    /// Builder: print listings as JSON.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Gives back the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the user quits or input ends.
    pub async fn run(&mut self) -> ClientResult<()> {
        loop {
            self.write(MENU).await?;
            let choice = match self.read_line().await {
                Ok(line) => line,
                Err(ClientError::InputClosed) => break,
                Err(e) => return Err(e),
            };

            let Some(action) = MenuAction::parse(&choice) else {
                self.say(format!("unknown choice '{}'", choice.trim()))
                    .await?;
                continue;
            };
            if action == MenuAction::Quit {
                break;
            }

            match self.dispatch(action).await {
                Ok(()) => {}
                Err(ClientError::InputClosed) => break,
                Err(ClientError::Io(e)) => return Err(ClientError::Io(e)),
                Err(e) => {
                    debug!(error = %e, ?action, "Shell action failed");
                    self.say(format!("error: {}", e)).await?;
                }
            }
        }

        self.finish().await
    }

    /// Prints reminders still waiting on the channel and flushes output.
    ///
    /// `run` calls this on the way out; call it directly when the session is
    /// cut short, e.g. by Ctrl-C.
    pub async fn finish(&mut self) -> ClientResult<()> {
        self.drain_reminders().await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn dispatch(&mut self, action: MenuAction) -> ClientResult<()> {
        match action {
            MenuAction::Add => self.add().await,
            MenuAction::List => {
                let meetings = self.service.get_meetings().await;
                self.print_meetings("All meetings", &meetings).await
            }
            MenuAction::Update => self.update().await,
            MenuAction::Remove => {
                let id = self.prompt_id().await?;
                self.service.remove_meeting(id).await?;
                self.say(format!("Meeting {} removed.", id)).await
            }
            MenuAction::Day => {
                let date = parse_date(&self.prompt("Date (dd.mm.yyyy): ").await?)?;
                let meetings = self.service.get_meetings_by_date(date).await;
                let header = format!("Meetings on {}", date.format(DATE_FORMAT));
                self.print_meetings(&header, &meetings).await
            }
            MenuAction::Show => {
                let id = self.prompt_id().await?;
                let meeting = self.service.get_meeting_by_id(id).await?;
                if self.json {
                    let rendered = serde_json::to_string_pretty(&meeting)?;
                    self.say(rendered).await
                } else {
                    self.say(meeting).await
                }
            }
            MenuAction::Export => {
                let date = parse_date(&self.prompt("Date (dd.mm.yyyy): ").await?)?;
                let path = self.prompt("File path: ").await?;
                let path = path.trim();
                let count = self.service.export_to_file(date, path).await?;
                self.say(format!("Exported {} meeting(s) to {}.", count, path))
                    .await
            }
            MenuAction::Quit => Ok(()),
        }
    }

    async fn add(&mut self) -> ClientResult<()> {
        let title = self.prompt("Title: ").await?;
        let start = parse_timestamp(&self.prompt("Start (dd.mm.yyyy HH:MM): ").await?)?;
        let end = parse_timestamp(&self.prompt("End (dd.mm.yyyy HH:MM): ").await?)?;
        let reminder = parse_optional_timestamp(
            &self
                .prompt("Reminder (dd.mm.yyyy HH:MM, empty to skip): ")
                .await?,
        )?;

        let mut draft = MeetingDraft::new(title.trim(), start, end);
        draft.notification_time = reminder;

        let meeting = self.service.add_meeting(draft).await?;
        self.say(format!("Meeting {} added.", meeting.id)).await
    }

    async fn update(&mut self) -> ClientResult<()> {
        let id = self.prompt_id().await?;
        let current = self.service.get_meeting_by_id(id).await?;
        self.say(format!("Editing {}", current)).await?;
        self.say("Leave a field empty to keep its value.").await?;

        let title = self.prompt("Title: ").await?;
        let start = parse_optional_timestamp(&self.prompt("Start (dd.mm.yyyy HH:MM): ").await?)?;
        let end = parse_optional_timestamp(&self.prompt("End (dd.mm.yyyy HH:MM): ").await?)?;
        let reminder_input = self
            .prompt("Reminder (dd.mm.yyyy HH:MM, '-' to clear): ")
            .await?;
        let notification_time = match reminder_input.trim() {
            "-" => None,
            other => parse_optional_timestamp(other)?.or(current.notification_time),
        };

        let title = match title.trim() {
            "" => current.title.clone(),
            other => other.to_string(),
        };
        let updated = Meeting {
            title,
            start: start.unwrap_or(current.start),
            end: end.unwrap_or(current.end),
            notification_time,
            ..current
        };

        self.service.update_meeting(updated).await?;
        self.say(format!("Meeting {} updated.", id)).await
    }

    async fn prompt_id(&mut self) -> ClientResult<MeetingId> {
        let input = self.prompt("Meeting id: ").await?;
        let input = input.trim();
        input
            .parse()
            .map_err(|_| ClientError::InvalidInput(format!("'{}' is not a meeting id", input)))
    }

    async fn print_meetings(&mut self, header: &str, meetings: &[Meeting]) -> ClientResult<()> {
        if self.json {
            let rendered = serde_json::to_string_pretty(meetings)?;
            return self.say(rendered).await;
        }

        self.say(format!("{}:", header)).await?;
        if meetings.is_empty() {
            return self.say("(no meetings)").await;
        }
        for meeting in meetings {
            self.say(meeting).await?;
        }
        Ok(())
    }

    async fn prompt(&mut self, label: &str) -> ClientResult<String> {
        self.write(label).await?;
        self.read_line().await
    }

    /// Reads one line, printing reminders that arrive while waiting.
    async fn read_line(&mut self) -> ClientResult<String> {
        loop {
            let reminder = tokio::select! {
                line = self.input.next_line() => {
                    return line?.ok_or(ClientError::InputClosed);
                }
                Some(reminder) = self.reminders.recv() => reminder,
            };
            self.print_reminder(&reminder).await?;
        }
    }

    async fn drain_reminders(&mut self) -> ClientResult<()> {
        while let Ok(reminder) = self.reminders.try_recv() {
            self.print_reminder(&reminder).await?;
        }
        Ok(())
    }

    async fn print_reminder(&mut self, reminder: &Reminder) -> ClientResult<()> {
        self.write(&format!("\n*** {}\n", reminder.message())).await
    }

    async fn say(&mut self, line: impl fmt::Display) -> ClientResult<()> {
        self.write(&format!("{}\n", line)).await
    }

    async fn write(&mut self, text: &str) -> ClientResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime};
    use meetkeep_core::ManualClock;
    use meetkeep_service::{ChannelSink, MeetingStore, ReminderSink, SchedulerConfig};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    async fn service() -> (MeetingService, ChannelSink, UnboundedReceiver<Reminder>) {
        let (sink, rx) = ChannelSink::new();
        let service = MeetingService::start(
            MeetingStore::shared(),
            Arc::new(ManualClock::new(base())),
            Arc::new(sink.clone()),
            SchedulerConfig::new(Duration::from_secs(3600)),
        )
        .await;
        (service, sink, rx)
    }

    async fn session(
        service: &MeetingService,
        rx: UnboundedReceiver<Reminder>,
        script: &str,
        json: bool,
    ) -> String {
        let mut shell = Shell::new(service, script.as_bytes(), Vec::new(), rx).with_json(json);
        shell.run().await.unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[test]
    fn menu_choices() {
        assert_eq!(MenuAction::parse("1"), Some(MenuAction::Add));
        assert_eq!(MenuAction::parse(" Export "), Some(MenuAction::Export));
        assert_eq!(MenuAction::parse("q"), Some(MenuAction::Quit));
        assert_eq!(MenuAction::parse("9"), None);
    }

    #[tokio::test]
    async fn add_then_list() {
        let (service, _sink, rx) = service().await;
        let script = "1\nStandup\n20.10.2026 10:00\n20.10.2026 10:15\n\n\
                      1\nReview\n20.10.2026 11:00\n20.10.2026 12:00\n20.10.2026 10:50\n\
                      2\n8\n";

        let out = session(&service, rx, script, false).await;

        assert!(out.contains("Meeting 1 added."));
        assert!(out.contains("Meeting 2 added."));
        assert!(out.contains("All meetings:\n1: 10:00 - 10:15 | Standup\n2: 11:00 - 12:00 | Review (reminder at 10:50)\n"));
        assert_eq!(service.get_meetings().await.len(), 2);
    }

    #[tokio::test]
    async fn errors_are_printed_and_shell_continues() {
        let (service, _sink, rx) = service().await;
        let script = "1\nBad\ntomorrow\n\
                      1\nPast\n19.10.2026 10:00\n19.10.2026 11:00\n\n\
                      4\n12\n\
                      6\nabc\n\
                      zzz\n\
                      2\n";

        let out = session(&service, rx, script, false).await;

        assert!(out.contains("error: invalid timestamp 'tomorrow', expected dd.mm.yyyy HH:MM"));
        assert!(out.contains("error: must be scheduled in the future"));
        assert!(out.contains("error: meeting 12 not found"));
        assert!(out.contains("error: invalid input: 'abc' is not a meeting id"));
        assert!(out.contains("unknown choice 'zzz'"));
        assert!(out.contains("All meetings:\n(no meetings)"));
    }

    #[tokio::test]
    async fn overlap_is_reported() {
        let (service, _sink, rx) = service().await;
        let script = "1\nA\n20.10.2026 10:00\n20.10.2026 11:00\n\n\
                      1\nB\n20.10.2026 10:30\n20.10.2026 11:30\n\n";

        let out = session(&service, rx, script, false).await;
        assert!(out.contains("error: overlapping meeting"));
        assert_eq!(service.get_meetings().await.len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_empty_fields() {
        let (service, _sink, rx) = service().await;
        let start = base() + chrono::Duration::hours(1);
        let m = service
            .add_meeting(
                MeetingDraft::new("Old", start, start + chrono::Duration::hours(1))
                    .with_notification(start - chrono::Duration::minutes(10)),
            )
            .await
            .unwrap();

        let script = format!("3\n{}\nNew\n\n20.10.2026 10:30\n\n", m.id);
        let out = session(&service, rx, &script, false).await;

        assert!(out.contains("Meeting 1 updated."));
        let updated = service.get_meeting_by_id(m.id).await.unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.start, start);
        assert_eq!(updated.end, start + chrono::Duration::minutes(30));
        assert_eq!(updated.notification_time, m.notification_time);
    }

    #[tokio::test]
    async fn update_can_clear_reminder() {
        let (service, _sink, rx) = service().await;
        let start = base() + chrono::Duration::hours(1);
        let m = service
            .add_meeting(
                MeetingDraft::new("Sync", start, start + chrono::Duration::hours(1))
                    .with_notification(start),
            )
            .await
            .unwrap();

        let script = format!("update\n{}\n\n\n\n-\n", m.id);
        session(&service, rx, &script, false).await;

        assert_eq!(
            service.get_meeting_by_id(m.id).await.unwrap().notification_time,
            None
        );
    }

    #[tokio::test]
    async fn day_listing_and_remove() {
        let (service, _sink, rx) = service().await;
        let script = "1\nToday\n20.10.2026 10:00\n20.10.2026 10:30\n\n\
                      1\nTomorrow\n21.10.2026 10:00\n21.10.2026 10:30\n\n\
                      5\n21.10.2026\n\
                      4\n1\n\
                      5\n20.10.2026\n";

        let out = session(&service, rx, script, false).await;
        assert!(out.contains("Meetings on 21.10.2026:\n2: 10:00 - 10:30 | Tomorrow\n"));
        assert!(out.contains("Meeting 1 removed."));
        assert!(out.contains("Meetings on 20.10.2026:\n(no meetings)"));
    }

    #[tokio::test]
    async fn export_from_shell() {
        let (service, _sink, rx) = service().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let script = format!(
            "1\nPlanning\n20.10.2026 13:00\n20.10.2026 14:00\n\n7\n20.10.2026\n{}\n",
            path.display()
        );

        let out = session(&service, rx, &script, false).await;
        assert!(out.contains("Exported 1 meeting(s)"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1: 13:00 - 14:00 | Planning\n"
        );
    }

    #[tokio::test]
    async fn json_listing() {
        let (service, _sink, rx) = service().await;
        let script = "1\nStandup\n20.10.2026 10:00\n20.10.2026 10:15\n\n2\n6\n1\n";

        let out = session(&service, rx, script, true).await;
        assert!(out.contains("\"title\": \"Standup\""));
        assert!(out.contains("\"start\": \"2026-10-20T10:00:00\""));
    }

    #[tokio::test]
    async fn finish_drains_reminders_after_an_interrupted_run() {
        let (service, sink, rx) = service().await;
        let start = base() + chrono::Duration::hours(2);
        let meeting = MeetingDraft::new("Planning", start, start + chrono::Duration::hours(1))
            .into_meeting(3);

        // Input that never ends, so `run` has to be cut off.
        let (_keep_open, input) = tokio::io::duplex(64);
        let mut shell = Shell::new(&service, tokio::io::BufReader::new(input), Vec::new(), rx);
        tokio::select! {
            _ = shell.run() => panic!("session should still be waiting for input"),
            _ = tokio::task::yield_now() => {}
        }

        sink.deliver(&Reminder::for_meeting(&meeting)).unwrap();
        shell.finish().await.unwrap();

        let out = String::from_utf8(shell.into_output()).unwrap();
        assert!(out.ends_with("*** Reminder: meeting 'Planning' starts at 11:00\n"));
    }

    #[tokio::test]
    async fn pending_reminders_are_printed() {
        let (service, sink, rx) = service().await;
        let start = base() + chrono::Duration::hours(1);
        let meeting = MeetingDraft::new("Retro", start, start + chrono::Duration::hours(1))
            .into_meeting(4);
        sink.deliver(&Reminder::for_meeting(&meeting)).unwrap();

        let out = session(&service, rx, "8\n", false).await;
        assert!(out.contains("*** Reminder: meeting 'Retro' starts at 10:00"));
    }
}
