use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use meeting_insights_database::MeetingStore;
use serde::Deserialize;

use crate::aggregation::{self, UpcomingMeeting, DEFAULT_UPCOMING_LIMIT};
use crate::error::AppError;
use crate::routes::positive_param;

const INVALID_LIMIT: &str = "Invalid query param 'limit'. 'limit' must be number > 0";

#[derive(Deserialize, Debug, Default)]
pub struct UpcomingQuery {
    pub limit: Option<String>,
}

/// `GET /meetings/upcoming?limit=`
pub async fn upcoming(
    State(store): State<Arc<dyn MeetingStore>>,
    query: Result<Query<UpcomingQuery>, QueryRejection>,
) -> Result<Json<Vec<UpcomingMeeting>>, AppError> {
    let Query(query) = query.map_err(|_| AppError::Validation(INVALID_LIMIT.to_owned()))?;
    let limit = positive_param(query.limit.as_deref(), DEFAULT_UPCOMING_LIMIT, INVALID_LIMIT)?;

    Ok(Json(
        aggregation::upcoming_meetings(store.as_ref(), Utc::now(), limit).await?,
    ))
}
