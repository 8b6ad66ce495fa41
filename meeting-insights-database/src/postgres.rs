use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Timestamptz};
use diesel_async::RunQueryDsl;

use crate::error::DatabaseError;
use crate::models::{Average, Meeting, NewMeeting, ParticipantNextMeeting};
use crate::schema::meetings;
use crate::{MeetingStore, Pool};

const AVERAGE_PARTICIPANTS: &str = "
SELECT AVG(cardinality(participants))::float8 AS average
FROM (
    SELECT participants FROM meetings
    WHERE start_time >= $1
    ORDER BY start_time ASC
    LIMIT $2
) AS upcoming";

const AVERAGE_MEETINGS_PER_MONTH: &str = "
SELECT AVG(per_month)::float8 AS average
FROM (
    SELECT COUNT(*) AS per_month FROM meetings
    GROUP BY to_char(start_time AT TIME ZONE 'UTC', 'YYYY-MM')
) AS months";

const NEXT_MEETING_PER_PARTICIPANT: &str = "
SELECT DISTINCT ON (p.name) p.name, m.start_time, m.end_time
FROM meetings AS m
CROSS JOIN LATERAL unnest(m.participants) AS p(name)
WHERE m.start_time >= $1
ORDER BY p.name, m.start_time ASC";

#[derive(Clone)]
pub struct PgMeetingStore {
    pool: Pool,
}

impl PgMeetingStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingStore for PgMeetingStore {
    async fn last_meeting_end(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(meetings::table
            .select(meetings::end_time)
            .order(meetings::end_time.desc())
            .first::<DateTime<Utc>>(&mut connection)
            .await
            .optional()?)
    }

    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(meetings::table)
            .values(meeting)
            .returning(Meeting::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    async fn average_participants(
        &self,
        now: DateTime<Utc>,
        total_meetings: i64,
    ) -> Result<Option<f64>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row: Average = diesel::sql_query(AVERAGE_PARTICIPANTS)
            .bind::<Timestamptz, _>(now)
            .bind::<BigInt, _>(total_meetings)
            .get_result(&mut connection)
            .await?;
        Ok(row.average)
    }

    async fn average_meetings_per_month(&self) -> Result<Option<f64>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let row: Average = diesel::sql_query(AVERAGE_MEETINGS_PER_MONTH)
            .get_result(&mut connection)
            .await?;
        Ok(row.average)
    }

    async fn next_meeting_per_participant(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ParticipantNextMeeting>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::sql_query(NEXT_MEETING_PER_PARTICIPANT)
            .bind::<Timestamptz, _>(now)
            .load(&mut connection)
            .await?)
    }

    async fn upcoming_meetings(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Meeting>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(meetings::table
            .filter(meetings::start_time.ge(now))
            .order(meetings::start_time.asc())
            .limit(limit)
            .select(Meeting::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn total_meetings(&self) -> Result<i64, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(meetings::table.count().get_result(&mut connection).await?)
    }
}
