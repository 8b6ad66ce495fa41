use chrono::{DateTime, Utc};
use meeting_insights_database::error::DatabaseError;
use meeting_insights_database::models::{Meeting, ParticipantNextMeeting};
use meeting_insights_database::MeetingStore;
use serde::Serialize;

pub const DEFAULT_AVERAGE_PARTICIPANTS_MEETINGS: i64 = 20;
pub const DEFAULT_UPCOMING_LIMIT: i64 = 5;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextMeeting {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<ParticipantNextMeeting> for NextMeeting {
    fn from(row: ParticipantNextMeeting) -> Self {
        Self {
            name: row.name,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UpcomingMeeting {
    pub participants: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub topic: String,
}

impl From<Meeting> for UpcomingMeeting {
    fn from(meeting: Meeting) -> Self {
        Self {
            participants: meeting.participants,
            start: meeting.start_time,
            end: meeting.end_time,
            topic: meeting.topic,
        }
    }
}

/// Mean participant count of the next `total_meetings` meetings, 0 when there are none.
pub async fn average_participants(
    store: &dyn MeetingStore,
    now: DateTime<Utc>,
    total_meetings: i64,
) -> Result<f64, DatabaseError> {
    Ok(store
        .average_participants(now, total_meetings)
        .await?
        .unwrap_or(0.0))
}

/// Past meetings count here too, unlike the other queries.
pub async fn average_meetings_per_month(store: &dyn MeetingStore) -> Result<f64, DatabaseError> {
    Ok(store.average_meetings_per_month().await?.unwrap_or(0.0))
}

pub async fn next_meeting_per_participant(
    store: &dyn MeetingStore,
    now: DateTime<Utc>,
) -> Result<Vec<NextMeeting>, DatabaseError> {
    Ok(store
        .next_meeting_per_participant(now)
        .await?
        .into_iter()
        .map(NextMeeting::from)
        .collect())
}

pub async fn upcoming_meetings(
    store: &dyn MeetingStore,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<UpcomingMeeting>, DatabaseError> {
    Ok(store
        .upcoming_meetings(now, limit)
        .await?
        .into_iter()
        .map(UpcomingMeeting::from)
        .collect())
}

pub async fn total_meetings_count(store: &dyn MeetingStore) -> Result<i64, DatabaseError> {
    store.total_meetings().await
}
