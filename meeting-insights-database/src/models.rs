use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Double, Nullable, Text, Timestamptz};

use crate::schema::meetings;

#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = meetings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Meeting {
    pub id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub topic: String,
    pub participants: Vec<String>,
}

/// A meeting that has not been stored yet.
#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = meetings)]
pub struct NewMeeting {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub topic: String,
    pub participants: Vec<String>,
}

#[derive(QueryableByName, Debug, Clone, PartialEq, Eq)]
pub struct ParticipantNextMeeting {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Timestamptz)]
    pub start_time: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub end_time: DateTime<Utc>,
}

#[derive(QueryableByName)]
pub(crate) struct Average {
    #[diesel(sql_type = Nullable<Double>)]
    pub average: Option<f64>,
}
