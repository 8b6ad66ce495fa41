use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use meeting_insights_database::MeetingStore;

use crate::aggregation::{self, NextMeeting};
use crate::error::AppError;

/// `GET /meetings/next/perparticipant`
pub async fn next_meeting_per_participant(
    State(store): State<Arc<dyn MeetingStore>>,
) -> Result<Json<Vec<NextMeeting>>, AppError> {
    Ok(Json(
        aggregation::next_meeting_per_participant(store.as_ref(), Utc::now()).await?,
    ))
}
