use chrono::{DateTime, Duration, Utc};
use meeting_insights_config::{Config, HoursRange};
use meeting_insights_database::error::DatabaseError;
use meeting_insights_database::models::NewMeeting;
use meeting_insights_database::MeetingStore;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::random::{random_int, random_participant_slice};
use crate::schedule::next_start_time;

/// Roster and duration bounds, fixed at startup.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub participants: Vec<String>,
    pub hours_range: HoursRange,
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            participants: config.participants.clone(),
            hours_range: config.hours_range,
        }
    }
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub inserted_meetings: u32,
    pub error_meetings: u32,
}

/// Candidate meeting following `previous_end`; nothing is stored.
///
/// `None` when the meeting would not fit before the last representable instant.
pub fn generate_meeting<R: Rng + ?Sized>(
    rng: &mut R,
    previous_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    topic: &str,
    settings: &GenerationSettings,
) -> Option<NewMeeting> {
    let start_time = next_start_time(previous_end, now)?;
    let hours = random_int(
        rng,
        settings.hours_range.minimum,
        settings.hours_range.maximum,
    );
    let end_time = start_time.checked_add_signed(Duration::try_hours(hours)?)?;
    Some(NewMeeting {
        start_time,
        end_time,
        topic: topic.to_owned(),
        participants: random_participant_slice(rng, &settings.participants).to_vec(),
    })
}

/// Generates and stores `count` meetings one after another.
///
/// Only a successful insert moves the chain forward, so the meeting after a
/// failed one is sequenced off the last stored meeting. Failed inserts are
/// counted, never retried. Failing to read the seed aborts the whole batch.
pub async fn bulk_generate<R: Rng + Send + ?Sized>(
    store: &dyn MeetingStore,
    rng: &mut R,
    count: u32,
    topic: &str,
    settings: &GenerationSettings,
) -> Result<BatchOutcome, DatabaseError> {
    let mut previous_end = store.last_meeting_end().await?;
    let mut outcome = BatchOutcome::default();

    for index in 0..count {
        let Some(meeting) = generate_meeting(rng, previous_end, Utc::now(), topic, settings) else {
            warn!("meeting no: {index} would end past the last representable time");
            outcome.error_meetings += 1;
            continue;
        };

        match store.insert_meeting(&meeting).await {
            Ok(stored) => {
                debug!("inserted meeting no: {index} (id {})", stored.id);
                outcome.inserted_meetings += 1;
                previous_end = Some(stored.end_time);
            }
            Err(err) => {
                warn!("error saving meeting no: {index}: {err}");
                outcome.error_meetings += 1;
            }
        }
    }

    info!(
        inserted = outcome.inserted_meetings,
        failed = outcome.error_meetings,
        "finished meeting batch"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use meeting_insights_database::models::{Meeting, ParticipantNextMeeting};
    use meeting_insights_database::InMemoryMeetingStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn settings() -> GenerationSettings {
        GenerationSettings {
            participants: ["Ada", "Grace", "Linus", "Ken", "Barbara"]
                .map(str::to_owned)
                .to_vec(),
            hours_range: HoursRange {
                minimum: 1.0,
                maximum: 3.0,
            },
        }
    }

    #[test]
    fn generated_meeting_respects_roster_and_duration() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        let settings = settings();
        for _ in 0..200 {
            let meeting = generate_meeting(&mut rng, None, now, "Standup", &settings).unwrap();
            assert_eq!(meeting.start_time, now + Duration::hours(1));
            let hours = (meeting.end_time - meeting.start_time).num_hours();
            assert!((1..=3).contains(&hours));
            assert_eq!(meeting.topic, "Standup");
            assert!(!meeting.participants.is_empty());
            assert!(meeting
                .participants
                .iter()
                .all(|name| settings.participants.contains(name)));
        }
    }

    #[test]
    fn generated_meeting_follows_future_end() {
        let mut rng = StdRng::seed_from_u64(2);
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        let previous_end = now + Duration::hours(4);
        let meeting =
            generate_meeting(&mut rng, Some(previous_end), now, "Retro", &settings()).unwrap();
        assert_eq!(meeting.start_time, previous_end + Duration::minutes(5));
    }

    #[test]
    fn meeting_past_the_last_instant_is_not_generated() {
        let mut rng = StdRng::seed_from_u64(8);
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 8, 0, 0).unwrap();
        let near_end = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);
        assert!(generate_meeting(&mut rng, Some(near_end), now, "Standup", &settings()).is_none());
        assert!(generate_meeting(
            &mut rng,
            Some(DateTime::<Utc>::MAX_UTC),
            now,
            "Standup",
            &settings()
        )
        .is_none());

        let endless = GenerationSettings {
            hours_range: HoursRange {
                minimum: 1e10,
                maximum: 1e10,
            },
            ..settings()
        };
        assert!(generate_meeting(&mut rng, None, now, "Standup", &endless).is_none());
    }

    #[tokio::test]
    async fn batch_from_empty_store_is_chained() {
        let store = InMemoryMeetingStore::new();
        let mut rng = StdRng::seed_from_u64(3);
        let started = Utc::now();

        let outcome = bulk_generate(&store, &mut rng, 10, "Standup", &settings())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BatchOutcome {
                inserted_meetings: 10,
                error_meetings: 0
            }
        );

        let meetings = store.upcoming_meetings(started, 100).await.unwrap();
        assert_eq!(meetings.len(), 10);

        let first = meetings[0].start_time;
        assert!(first >= started + Duration::hours(1));
        assert!(first <= Utc::now() + Duration::hours(1));

        for pair in meetings.windows(2) {
            assert!(pair[0].end_time > pair[0].start_time);
            assert_eq!(pair[1].start_time, pair[0].end_time + Duration::minutes(5));
        }
    }

    #[tokio::test]
    async fn batch_continues_after_existing_future_meetings() {
        let store = InMemoryMeetingStore::new();
        let mut rng = StdRng::seed_from_u64(4);
        let seed_end = Utc::now() + Duration::days(2);
        store
            .insert_meeting(&NewMeeting {
                start_time: seed_end - Duration::hours(1),
                end_time: seed_end,
                topic: "Planning".to_owned(),
                participants: vec!["Ada".to_owned()],
            })
            .await
            .unwrap();

        bulk_generate(&store, &mut rng, 1, "Standup", &settings())
            .await
            .unwrap();

        let upcoming = store.upcoming_meetings(seed_end, 10).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].start_time, seed_end + Duration::minutes(5));
    }

    /// Keeps every accepted insert. Unless `reliable`, every other insert is
    /// rejected. Can refuse to hand out the seed.
    #[derive(Default)]
    struct ScriptedStore {
        inner: InMemoryMeetingStore,
        attempts: AtomicUsize,
        reliable: bool,
        broken_seed: bool,
        accepted: Mutex<Vec<NewMeeting>>,
    }

    fn query_failed() -> DatabaseError {
        DatabaseError::Database(diesel::result::Error::NotFound)
    }

    #[async_trait]
    impl MeetingStore for ScriptedStore {
        async fn last_meeting_end(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
            if self.broken_seed {
                return Err(query_failed());
            }
            self.inner.last_meeting_end().await
        }

        async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DatabaseError> {
            if !self.reliable && self.attempts.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                return Err(query_failed());
            }
            let stored = self.inner.insert_meeting(meeting).await?;
            self.accepted.lock().unwrap().push(meeting.clone());
            Ok(stored)
        }

        async fn average_participants(
            &self,
            now: DateTime<Utc>,
            total_meetings: i64,
        ) -> Result<Option<f64>, DatabaseError> {
            self.inner.average_participants(now, total_meetings).await
        }

        async fn average_meetings_per_month(&self) -> Result<Option<f64>, DatabaseError> {
            self.inner.average_meetings_per_month().await
        }

        async fn next_meeting_per_participant(
            &self,
            now: DateTime<Utc>,
        ) -> Result<Vec<ParticipantNextMeeting>, DatabaseError> {
            self.inner.next_meeting_per_participant(now).await
        }

        async fn upcoming_meetings(
            &self,
            now: DateTime<Utc>,
            limit: i64,
        ) -> Result<Vec<Meeting>, DatabaseError> {
            self.inner.upcoming_meetings(now, limit).await
        }

        async fn total_meetings(&self) -> Result<i64, DatabaseError> {
            self.inner.total_meetings().await
        }
    }

    #[tokio::test]
    async fn failed_inserts_are_counted_and_do_not_break_the_chain() {
        let store = ScriptedStore::default();
        let mut rng = StdRng::seed_from_u64(5);
        let started = Utc::now();

        let outcome = bulk_generate(&store, &mut rng, 6, "Standup", &settings())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BatchOutcome {
                inserted_meetings: 3,
                error_meetings: 3
            }
        );

        let stored = store.upcoming_meetings(started, 10).await.unwrap();
        assert_eq!(stored.len(), 3);
        for pair in stored.windows(2) {
            assert_eq!(pair[1].start_time, pair[0].end_time + Duration::minutes(5));
        }
    }

    fn as_new_meeting(meeting: Meeting) -> NewMeeting {
        NewMeeting {
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            topic: meeting.topic,
            participants: meeting.participants,
        }
    }

    #[tokio::test]
    async fn generated_meetings_read_back_unchanged() {
        let store = ScriptedStore {
            reliable: true,
            ..ScriptedStore::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let started = Utc::now();

        let outcome = bulk_generate(&store, &mut rng, 8, "Standup", &settings())
            .await
            .unwrap();
        assert_eq!(outcome.inserted_meetings, 8);

        let generated = store.accepted.lock().unwrap().clone();
        let read_back: Vec<NewMeeting> = store
            .upcoming_meetings(started, 100)
            .await
            .unwrap()
            .into_iter()
            .map(as_new_meeting)
            .collect();
        assert_eq!(generated.len(), 8);
        assert_eq!(read_back, generated);
    }

    #[tokio::test]
    async fn batch_at_the_end_of_time_counts_errors() {
        let store = InMemoryMeetingStore::new();
        let mut rng = StdRng::seed_from_u64(9);
        let seed_end = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);
        store
            .insert_meeting(&NewMeeting {
                start_time: seed_end - Duration::hours(1),
                end_time: seed_end,
                topic: "Planning".to_owned(),
                participants: vec!["Ada".to_owned()],
            })
            .await
            .unwrap();

        let outcome = bulk_generate(&store, &mut rng, 3, "Standup", &settings())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BatchOutcome {
                inserted_meetings: 0,
                error_meetings: 3
            }
        );
        assert_eq!(store.total_meetings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unreadable_seed_aborts_the_batch() {
        let store = ScriptedStore {
            broken_seed: true,
            ..ScriptedStore::default()
        };
        let mut rng = StdRng::seed_from_u64(6);

        let result = bulk_generate(&store, &mut rng, 3, "Standup", &settings()).await;
        assert!(result.is_err());
        assert_eq!(store.total_meetings().await.unwrap(), 0);
    }

    #[test]
    fn outcome_serializes_with_wire_names() {
        let outcome = BatchOutcome {
            inserted_meetings: 3,
            error_meetings: 0,
        };
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            serde_json::json!({"insertedMeetings": 3, "errorMeetings": 0})
        );
    }
}
