//! Calendar event creation and the upcoming-events listing

use chrono::{DateTime, Days, Duration, Utc};
use chrono_tz::Tz;
use google_calendar3::api::{Event, EventAttendee, EventDateTime};
use std::sync::Arc;
use tracing::{error, info};

use crate::calendar_client::CalendarClient;
use crate::error::{AgentError, Result};
use crate::local_time::parse_local_date_time;
use crate::models::CalendarEvent;

const ALL_DAY_MINUTES: i64 = 24 * 60;

/// Translates between [`CalendarEvent`] DTOs and Calendar API events
pub struct CalendarService {
    client: Arc<dyn CalendarClient>,
    timezone: Tz,
    window_days: u32,
    link_overrides_location: bool,
}

impl CalendarService {
    pub fn new(
        client: Arc<dyn CalendarClient>,
        timezone: Tz,
        window_days: u32,
        link_overrides_location: bool,
    ) -> Self {
        Self {
            client,
            timezone,
            window_days,
            link_overrides_location,
        }
    }

    /// Creates the event and returns its id
    pub async fn create_event(&self, request: &CalendarEvent) -> Result<String> {
        let event = build_event(request, &self.timezone, self.link_overrides_location)?;

        let created = self.client.insert_event(event).await?;
        let event_id = created
            .id
            .ok_or_else(|| AgentError::CalendarError("Created event has no ID".to_string()))?;

        info!(
            op = "add_event",
            "Created calendar event id={} htmlLink={}",
            event_id,
            created.html_link.as_deref().unwrap_or("")
        );
        Ok(event_id)
    }

    /// Events from now until the end of the configured window
    pub async fn list_upcoming_events(&self) -> Result<Vec<CalendarEvent>> {
        let (now, until) = upcoming_window(Utc::now(), &self.timezone, self.window_days)?;

        let events = self.client.list_events(now, until).await.map_err(|e| {
            error!(op = "list_events", "Failed to fetch calendar events: {}", e);
            e
        })?;

        Ok(events
            .iter()
            .map(|event| event_to_dto(event, &self.timezone))
            .collect())
    }
}

/// `now` until the same wall-clock time `days` calendar days later in `zone`
///
/// A DST change inside the window makes it an hour shorter or longer than
/// `days * 24h`.
pub fn upcoming_window(
    now: DateTime<Utc>,
    zone: &Tz,
    days: u32,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let until = now
        .with_timezone(zone)
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| {
            AgentError::CalendarError(format!("Event window of {} days is out of range", days))
        })?;
    Ok((now, until.with_timezone(&Utc)))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Parses an RFC 3339 timestamp, or an offset-less local time in `zone`
pub fn parse_date_time(input: &str, zone: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    parse_local_date_time(input, zone)
        .ok_or_else(|| AgentError::Validation(format!("Invalid date/time format: {}", input)))
}

/// Builds the API event for a create request
///
/// The end instant comes from `endDateTime` when present, otherwise from
/// `meetingDurationMinutes` added to the start.
pub fn build_event(
    request: &CalendarEvent,
    zone: &Tz,
    link_overrides_location: bool,
) -> Result<Event> {
    let start_str = non_blank(&request.start_date_time)
        .ok_or_else(|| AgentError::Validation("startDateTime is required".to_string()))?;
    let start = parse_date_time(start_str, zone)?;

    let end = match (non_blank(&request.end_date_time), request.meeting_duration_minutes) {
        (Some(end_str), _) => parse_date_time(end_str, zone)?,
        (None, Some(minutes)) if minutes >= 0 => Duration::try_minutes(minutes)
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| {
                AgentError::Validation(format!("meetingDurationMinutes out of range: {}", minutes))
            })?,
        (None, Some(minutes)) => {
            return Err(AgentError::Validation(format!(
                "meetingDurationMinutes cannot be negative: {}",
                minutes
            )))
        }
        (None, None) => {
            return Err(AgentError::Validation(
                "Either endDateTime or meetingDurationMinutes must be provided".to_string(),
            ))
        }
    };

    let mut description = request.description.clone();
    let mut location = request.location.clone();

    if let Some(link) = non_blank(&request.meeting_link) {
        let join_text = format!("Join meeting: {}", link);
        description = match description.as_deref() {
            None | Some("") => Some(join_text),
            Some(existing) if !existing.contains(link) => {
                Some(format!("{}\n\n{}", existing, join_text))
            }
            Some(existing) => Some(existing.to_string()),
        };
        // Overwrites any caller-supplied location unless configured otherwise
        if link_overrides_location || non_blank(&location).is_none() {
            location = Some(link.to_string());
        }
    }

    let attendees = request
        .attendees
        .as_ref()
        .filter(|emails| !emails.is_empty())
        .map(|emails| {
            emails
                .iter()
                .map(|email| EventAttendee {
                    email: Some(email.clone()),
                    ..Default::default()
                })
                .collect()
        });

    Ok(Event {
        summary: request.summary.clone(),
        description,
        location,
        attendees,
        start: Some(EventDateTime {
            date_time: Some(start),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(end),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Zone an event time should be rendered in: its own, else the configured one
fn render_zone(at: &EventDateTime, fallback: &Tz) -> Tz {
    at.time_zone
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(*fallback)
}

fn render_time(at: &EventDateTime, zone: &Tz) -> Option<String> {
    at.date_time
        .map(|dt| dt.with_timezone(&render_zone(at, zone)).to_rfc3339())
        .or_else(|| at.date.map(|d| d.format("%Y-%m-%d").to_string()))
}

/// Start, end and duration of an API event
///
/// Timed events get the minute delta; all-day events count as one day
/// regardless of span. Anything mixed renders whatever each side has and
/// leaves the duration empty.
fn event_timing(
    start: Option<&EventDateTime>,
    end: Option<&EventDateTime>,
    zone: &Tz,
) -> (Option<String>, Option<String>, Option<i64>) {
    if let (Some(s), Some(e)) = (start, end) {
        if let (Some(start_dt), Some(end_dt)) = (s.date_time, e.date_time) {
            return (
                render_time(s, zone),
                render_time(e, zone),
                Some((end_dt - start_dt).num_minutes()),
            );
        }
        if let (Some(start_date), Some(end_date)) = (s.date, e.date) {
            return (
                Some(start_date.format("%Y-%m-%d").to_string()),
                Some(end_date.format("%Y-%m-%d").to_string()),
                Some(ALL_DAY_MINUTES),
            );
        }
    }

    (
        start.and_then(|s| render_time(s, zone)),
        end.and_then(|e| render_time(e, zone)),
        None,
    )
}

/// Maps an API event onto the transport DTO
pub fn event_to_dto(event: &Event, zone: &Tz) -> CalendarEvent {
    let (start_date_time, end_date_time, meeting_duration_minutes) =
        event_timing(event.start.as_ref(), event.end.as_ref(), zone);

    CalendarEvent {
        event_id: event.id.clone(),
        summary: event.summary.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        meeting_link: event.hangout_link.clone(),
        organizer_email: event.organizer.as_ref().and_then(|o| o.email.clone()),
        attendees: event
            .attendees
            .as_ref()
            .map(|list| list.iter().filter_map(|a| a.email.clone()).collect()),
        start_date_time,
        end_date_time,
        meeting_duration_minutes,
    }
}
