//! Calendar event creation.
//!
//! Events arrive as nine discrete fields because that is the shape the
//! agent's tool schema exposes. They are validated here, before any
//! credential is loaded or any request is sent.

mod credentials;
mod google;

pub use credentials::{AuthorizedUser, TokenStore};
pub use google::GoogleCalendar;

use crate::config::CalendarSettings;
use crate::error::{AjudanteError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A single-day event, as requested by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// Zone the event's wall-clock times are interpreted in.
#[derive(Debug, Clone, PartialEq)]
pub struct EventZone {
    /// IANA name sent to the provider.
    pub name: String,
    pub tz: Tz,
}

impl EventZone {
    pub fn new(name: &str) -> Result<Self> {
        let tz: Tz = name.parse().map_err(|e| {
            AjudanteError::Config(format!("Unknown calendar time zone '{}': {}", name, e))
        })?;

        Ok(Self {
            name: name.to_string(),
            tz,
        })
    }

    pub fn from_settings(settings: &CalendarSettings) -> Result<Self> {
        Self::new(&settings.time_zone)
    }

    /// Offset in effect at a local wall-clock time on that date.
    ///
    /// A time repeated by a backward shift resolves to its first occurrence;
    /// a time skipped by a forward shift does not exist and is rejected.
    pub fn resolve(&self, naive: NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| {
                AjudanteError::InvalidInput(format!("{} does not exist in {}", naive, self.name))
            })
    }
}

impl CalendarEvent {
    /// Resolve start and end, checking the date exists and start < end.
    pub fn time_range(
        &self,
        zone: &EventZone,
    ) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            AjudanteError::InvalidInput(format!(
                "{:04}-{:02}-{:02} is not a valid date",
                self.year, self.month, self.day
            ))
        })?;

        let start = local_time(self.start_hour, self.start_minute, "start")?;
        let end = local_time(self.end_hour, self.end_minute, "end")?;

        if end <= start {
            return Err(AjudanteError::InvalidInput(format!(
                "Event must end after it starts ({} >= {})",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }

        let start = zone.resolve(date.and_time(start))?;
        let end = zone.resolve(date.and_time(end))?;
        Ok((start, end))
    }

    /// Provider request body for this event.
    pub fn request_body(&self, zone: &EventZone) -> Result<Value> {
        let (start, end) = self.time_range(zone)?;

        Ok(json!({
            "summary": self.summary,
            "description": self.description,
            "start": {
                "dateTime": format_timestamp(&start),
                "timeZone": zone.name,
            },
            "end": {
                "dateTime": format_timestamp(&end),
                "timeZone": zone.name,
            },
        }))
    }
}

fn local_time(hour: u32, minute: u32, which: &str) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        AjudanteError::InvalidInput(format!("Invalid {} time {:02}:{:02}", which, hour, minute))
    })
}

/// ISO-8601 with seconds and a numeric offset, e.g. `2026-01-26T10:00:00-03:00`.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// An event the provider confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub status: String,
    pub html_link: Option<String>,
    /// Full provider event object.
    pub raw: Value,
}

impl CreatedEvent {
    /// Build from a provider response, rejecting anything not confirmed.
    pub fn from_response(raw: Value) -> Result<Self> {
        let status = raw.get("status").and_then(|s| s.as_str()).map(str::to_string);

        match status.as_deref() {
            Some("confirmed") => Ok(Self {
                id: raw.get("id").and_then(|v| v.as_str()).map(str::to_string),
                status: "confirmed".to_string(),
                html_link: raw.get("htmlLink").and_then(|v| v.as_str()).map(str::to_string),
                raw,
            }),
            _ => Err(AjudanteError::EventNotCreated { status }),
        }
    }
}

/// Trait for calendar providers.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Insert an event, returning it only when the provider confirms it.
    async fn insert_event(&self, event: &CalendarEvent) -> Result<CreatedEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planning_meeting() -> CalendarEvent {
        CalendarEvent {
            year: 2026,
            month: 1,
            day: 26,
            start_hour: 10,
            start_minute: 0,
            end_hour: 11,
            end_minute: 0,
            summary: "Reunião de Planejamento".to_string(),
            description: "Discutir metas".to_string(),
        }
    }

    fn sao_paulo() -> EventZone {
        EventZone::from_settings(&CalendarSettings::default()).unwrap()
    }

    #[test]
    fn test_request_body() {
        let body = planning_meeting().request_body(&sao_paulo()).unwrap();

        assert_eq!(body["summary"], "Reunião de Planejamento");
        assert_eq!(body["description"], "Discutir metas");
        assert_eq!(body["start"]["dateTime"], "2026-01-26T10:00:00-03:00");
        assert_eq!(body["end"]["dateTime"], "2026-01-26T11:00:00-03:00");
        assert_eq!(body["start"]["timeZone"], "America/Sao_Paulo");
        assert_eq!(body["end"]["timeZone"], "America/Sao_Paulo");
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut event = planning_meeting();
        event.end_hour = 9;
        assert!(matches!(
            event.time_range(&sao_paulo()),
            Err(AjudanteError::InvalidInput(_))
        ));

        event.end_hour = 10;
        assert!(matches!(
            event.time_range(&sao_paulo()),
            Err(AjudanteError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_date_and_time_rejected() {
        let mut event = planning_meeting();
        event.month = 2;
        event.day = 30;
        assert!(event.time_range(&sao_paulo()).is_err());

        let mut event = planning_meeting();
        event.start_minute = 60;
        assert!(event.time_range(&sao_paulo()).is_err());

        let mut event = planning_meeting();
        event.end_hour = 24;
        assert!(event.time_range(&sao_paulo()).is_err());
    }

    #[test]
    fn test_created_event_requires_confirmation() {
        let created = CreatedEvent::from_response(json!({
            "id": "evt1",
            "status": "confirmed",
            "htmlLink": "https://x"
        }))
        .unwrap();
        assert_eq!(created.html_link.as_deref(), Some("https://x"));
        assert_eq!(created.id.as_deref(), Some("evt1"));

        match CreatedEvent::from_response(json!({"status": "tentative"})) {
            Err(AjudanteError::EventNotCreated { status }) => {
                assert_eq!(status.as_deref(), Some("tentative"))
            }
            other => panic!("Expected EventNotCreated, got {:?}", other),
        }

        assert!(matches!(
            CreatedEvent::from_response(json!({})),
            Err(AjudanteError::EventNotCreated { status: None })
        ));
    }

    #[test]
    fn test_unknown_zone_is_config_error() {
        let settings = CalendarSettings {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..CalendarSettings::default()
        };
        assert!(matches!(
            EventZone::from_settings(&settings),
            Err(AjudanteError::Config(_))
        ));
    }

    #[test]
    fn test_offset_follows_daylight_saving() {
        let toronto = EventZone::new("America/Toronto").unwrap();

        let winter = planning_meeting().request_body(&toronto).unwrap();
        assert_eq!(winter["start"]["dateTime"], "2026-01-26T10:00:00-05:00");

        let summer = CalendarEvent {
            month: 7,
            day: 15,
            ..planning_meeting()
        };
        let body = summer.request_body(&toronto).unwrap();
        assert_eq!(body["start"]["dateTime"], "2026-07-15T10:00:00-04:00");
        assert_eq!(body["end"]["dateTime"], "2026-07-15T11:00:00-04:00");
        assert_eq!(body["start"]["timeZone"], "America/Toronto");
    }

    #[test]
    fn test_skipped_local_time_rejected() {
        // Clocks in Toronto jump from 02:00 to 03:00 on 2026-03-08.
        let toronto = EventZone::new("America/Toronto").unwrap();
        let event = CalendarEvent {
            month: 3,
            day: 8,
            start_hour: 2,
            start_minute: 30,
            end_hour: 4,
            ..planning_meeting()
        };
        assert!(matches!(
            event.time_range(&toronto),
            Err(AjudanteError::InvalidInput(_))
        ));
    }
}
