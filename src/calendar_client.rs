//! Google Calendar API client seam

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar3::api::Event;
use tracing::debug;

use crate::auth::CalendarApiHub;
use crate::error::{AgentError, Result};

const EVENTS_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Calendar operations used by [`crate::calendar::CalendarService`]
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// Insert an event and return it as stored by the API
    async fn insert_event(&self, event: Event) -> Result<Event>;

    /// Events overlapping `[time_min, time_max)`, recurring events expanded
    /// to single instances, ordered by start time
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<Event>>;
}

/// Calendar client backed by the google-calendar3 hub
pub struct ProductionCalendarClient {
    hub: CalendarApiHub,
    calendar_id: String,
}

impl ProductionCalendarClient {
    pub fn new(hub: CalendarApiHub, calendar_id: impl Into<String>) -> Self {
        Self {
            hub,
            calendar_id: calendar_id.into(),
        }
    }
}

fn calendar_error(e: impl std::fmt::Display) -> AgentError {
    AgentError::CalendarError(e.to_string())
}

#[async_trait]
impl CalendarClient for ProductionCalendarClient {
    async fn insert_event(&self, event: Event) -> Result<Event> {
        let (_, created) = self
            .hub
            .events()
            .insert(event, &self.calendar_id)
            .add_scope(EVENTS_SCOPE)
            .doit()
            .await
            .map_err(calendar_error)?;

        debug!(
            "Inserted event {:?} ({:?})",
            created.id, created.html_link
        );
        Ok(created)
    }

    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let (_, events) = self
            .hub
            .events()
            .list(&self.calendar_id)
            .time_min(time_min)
            .time_max(time_max)
            .single_events(true)
            .order_by("startTime")
            .add_scope(EVENTS_SCOPE)
            .doit()
            .await
            .map_err(calendar_error)?;

        let items = events.items.unwrap_or_default();
        debug!("Listed {} events between {} and {}", items.len(), time_min, time_max);
        Ok(items)
    }
}
