//! Presence ("stalk") lookups.
//!
//! Failures here are reported, never raised: the caller gets
//! `PresenceLookup::Unavailable` and logs "Unable to find information."

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::platform::{PlatformApi, PresenceRecord};
use crate::util::format_age;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceType {
    Offline,
    Online,
    Playing,
    InStudio,
    Unknown,
}

impl PresenceType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Offline,
            1 => Self::Online,
            2 => Self::Playing,
            3 => Self::InStudio,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Online => "Online",
            Self::Playing => "Playing",
            Self::InStudio => "In Studio",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresenceReport {
    pub user_id: u64,
    pub presence: PresenceType,
    pub last_location: String,
    pub last_online: Option<DateTime<Utc>>,
    /// Humanised age of `last_online`.
    pub last_on: Option<String>,
    pub place_id: Option<u64>,
    pub universe_id: Option<u64>,
}

impl PresenceReport {
    pub fn from_record(user_id: u64, record: PresenceRecord, now: DateTime<Utc>) -> Self {
        let last_online = record.last_online.as_deref().and_then(parse_timestamp);
        Self {
            user_id: record.user_id.unwrap_or(user_id),
            presence: PresenceType::from_code(record.user_presence_type),
            last_location: record.last_location,
            last_on: last_online.map(|t| format_age(t, now)),
            last_online,
            place_id: record.place_id,
            universe_id: record.universe_id,
        }
    }

    /// Console lines, in display order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Last Location: {}", self.last_location),
            format!("Last On: {}", self.last_on.as_deref().unwrap_or("unknown")),
            format!("Presence: {}", self.presence.label()),
        ];
        if let Some(universe) = self.universe_id {
            lines.push(format!("Universe: {}", universe));
        }
        lines
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PresenceLookup {
    Found(PresenceReport),
    Unavailable { reason: String },
}

/// Accepts RFC 3339 and the platform's zone-less variant (read as UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

#[derive(Clone)]
pub struct PresenceService {
    api: Arc<dyn PlatformApi>,
}

impl PresenceService {
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api }
    }

    pub async fn lookup(&self, user_id: u64) -> PresenceLookup {
        match self.api.presence(&[user_id]).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => {
                    PresenceLookup::Found(PresenceReport::from_record(user_id, record, Utc::now()))
                }
                None => PresenceLookup::Unavailable {
                    reason: format!("no presence record for user {}", user_id),
                },
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "presence lookup failed");
                PresenceLookup::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakePlatform;
    use chrono::Duration;

    fn record(code: u8, last_online: Option<&str>, universe: Option<u64>) -> PresenceRecord {
        PresenceRecord {
            user_presence_type: code,
            last_location: "Jailbreak".to_string(),
            last_online: last_online.map(str::to_string),
            universe_id: universe,
            ..Default::default()
        }
    }

    #[test]
    fn test_presence_labels() {
        assert_eq!(PresenceType::from_code(0).label(), "Offline");
        assert_eq!(PresenceType::from_code(1).label(), "Online");
        assert_eq!(PresenceType::from_code(2).label(), "Playing");
        assert_eq!(PresenceType::from_code(9), PresenceType::Unknown);
    }

    #[test]
    fn test_report_lines() {
        let now = Utc::now();
        let two_hours_ago = (now - Duration::hours(2)).to_rfc3339();
        let report =
            PresenceReport::from_record(42, record(2, Some(&two_hours_ago), Some(245683)), now);

        assert_eq!(
            report.lines(),
            vec![
                "Last Location: Jailbreak".to_string(),
                "Last On: 2 Hour(s)".to_string(),
                "Presence: Playing".to_string(),
                "Universe: 245683".to_string(),
            ]
        );
    }

    #[test]
    fn test_report_without_universe_or_timestamp() {
        let report = PresenceReport::from_record(42, record(0, None, None), Utc::now());
        let lines = report.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Last On: unknown");
    }

    #[test]
    fn test_parse_zoneless_timestamp() {
        let parsed = parse_timestamp("2020-01-02T03:04:05.123").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-01-02T03:04:05.123+00:00");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let mut fake = FakePlatform::default();
        fake.presences.insert(42, record(1, None, None));
        let service = PresenceService::new(Arc::new(fake));

        match service.lookup(42).await {
            PresenceLookup::Found(report) => {
                assert_eq!(report.user_id, 42);
                assert_eq!(report.presence, PresenceType::Online);
            }
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_without_record_is_unavailable() {
        let service = PresenceService::new(Arc::new(FakePlatform::default()));
        assert!(matches!(
            service.lookup(42).await,
            PresenceLookup::Unavailable { .. }
        ));
    }
}
