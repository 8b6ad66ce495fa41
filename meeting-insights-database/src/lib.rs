pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::pooled_connection::deadpool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};
use error::DatabaseError;
use models::{Meeting, NewMeeting, ParticipantNextMeeting};
use tracing::info;

pub use memory::InMemoryMeetingStore;
pub use postgres::PgMeetingStore;

pub type Pool = deadpool::Pool<AsyncPgConnection>;

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

pub fn get_database_connection(database_url: &str) -> Result<Pool, DatabaseError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

pub async fn ensure_schema(pool: &Pool) -> Result<(), DatabaseError> {
    let mut connection = pool.get().await?;
    connection.batch_execute(schema::CREATE_MEETINGS).await?;
    info!("meetings table is ready");
    Ok(())
}

/// Storage used by the generator and the aggregation queries.
///
/// "Upcoming" always means `start_time >= now`, where `now` is supplied by the
/// caller so that one request sees a single consistent instant.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// End of the meeting that ends last, the seed for a new batch.
    async fn last_meeting_end(&self) -> Result<Option<DateTime<Utc>>, DatabaseError>;

    async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<Meeting, DatabaseError>;

    /// Mean participant count over the first `total_meetings` upcoming meetings.
    async fn average_participants(
        &self,
        now: DateTime<Utc>,
        total_meetings: i64,
    ) -> Result<Option<f64>, DatabaseError>;

    /// Mean number of meetings per `YYYY-MM` month (UTC), over every stored meeting.
    async fn average_meetings_per_month(&self) -> Result<Option<f64>, DatabaseError>;

    /// Earliest upcoming meeting of every participant, in no particular order.
    async fn next_meeting_per_participant(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ParticipantNextMeeting>, DatabaseError>;

    async fn upcoming_meetings(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Meeting>, DatabaseError>;

    async fn total_meetings(&self) -> Result<i64, DatabaseError>;
}
