use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use meeting_insights_database::MeetingStore;
use serde::Serialize;

use crate::aggregation;
use crate::error::AppError;

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalMeetings {
    pub total_meetings: i64,
}

/// `GET /meetings/total`
pub async fn total_meetings(
    State(store): State<Arc<dyn MeetingStore>>,
) -> Result<Json<TotalMeetings>, AppError> {
    let total_meetings = aggregation::total_meetings_count(store.as_ref()).await?;
    Ok(Json(TotalMeetings { total_meetings }))
}
