use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};

use crate::error::DatabaseError;
use crate::models::{Meeting, NewMeeting, ParticipantNextMeeting};
use crate::MeetingStore;

/// Process-local store with the same query semantics as [`crate::PgMeetingStore`].
#[derive(Default)]
pub struct InMemoryMeetingStore {
    meetings: Mutex<Vec<Meeting>>,
}

impl InMemoryMeetingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Meeting>> {
        self.meetings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upcoming meetings ordered by start. The sort is stable so equal starts keep insertion order.
    fn upcoming(&self, now: DateTime<Utc>) -> Vec<Meeting> {
        let mut upcoming: Vec<Meeting> = self
            .lock()
            .iter()
            .filter(|meeting| meeting.start_time >= now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|meeting| meeting.start_time);
        upcoming
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl ExactSizeIterator<Item = usize>) -> Option<f64> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    Some(values.sum::<usize>() as f64 / count as f64)
}

#[async_trait]
impl MeetingStore for InMemoryMeetingStore {
    async fn last_meeting_end(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        Ok(self.lock().iter().map(|meeting| meeting.end_time).max())
    }

    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DatabaseError> {
        let mut meetings = self.lock();
        let id = i32::try_from(meetings.len() + 1).unwrap_or(i32::MAX);
        let stored = Meeting {
            id,
            start_time: meeting.start_time,
            end_time: meeting.end_time,
            topic: meeting.topic.clone(),
            participants: meeting.participants.clone(),
        };
        meetings.push(stored.clone());
        Ok(stored)
    }

    async fn average_participants(
        &self,
        now: DateTime<Utc>,
        total_meetings: i64,
    ) -> Result<Option<f64>, DatabaseError> {
        let take = usize::try_from(total_meetings).unwrap_or(0);
        let upcoming = self.upcoming(now);
        Ok(mean(
            upcoming
                .iter()
                .take(take)
                .map(|meeting| meeting.participants.len()),
        ))
    }

    async fn average_meetings_per_month(&self) -> Result<Option<f64>, DatabaseError> {
        let mut per_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for meeting in self.lock().iter() {
            let key = (meeting.start_time.year(), meeting.start_time.month());
            *per_month.entry(key).or_default() += 1;
        }
        Ok(mean(per_month.into_values()))
    }

    async fn next_meeting_per_participant(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ParticipantNextMeeting>, DatabaseError> {
        let mut next: HashMap<String, ParticipantNextMeeting> = HashMap::new();
        for meeting in self.upcoming(now) {
            for name in &meeting.participants {
                if let Entry::Vacant(entry) = next.entry(name.clone()) {
                    entry.insert(ParticipantNextMeeting {
                        name: name.clone(),
                        start_time: meeting.start_time,
                        end_time: meeting.end_time,
                    });
                }
            }
        }
        Ok(next.into_values().collect())
    }

    async fn upcoming_meetings(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Meeting>, DatabaseError> {
        let take = usize::try_from(limit).unwrap_or(0);
        let mut upcoming = self.upcoming(now);
        upcoming.truncate(take);
        Ok(upcoming)
    }

    async fn total_meetings(&self) -> Result<i64, DatabaseError> {
        Ok(i64::try_from(self.lock().len()).unwrap_or(i64::MAX))
    }
}
