use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use meeting_insights_database::MeetingStore;
use serde::{Deserialize, Serialize};

use crate::aggregation::{self, DEFAULT_AVERAGE_PARTICIPANTS_MEETINGS};
use crate::error::AppError;
use crate::routes::positive_param;

const INVALID_TOTAL_MEETINGS: &str =
    "Invalid query param 'totalMeetings'. 'totalMeetings' must be numbers > 0";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AverageParticipantsQuery {
    pub total_meetings: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AverageParticipants {
    pub average_participants: f64,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AverageMeetingsPerMonth {
    pub average_meetings_per_month: f64,
}

/// `GET /meetings/average/participants?totalMeetings=`
pub async fn average_participants(
    State(store): State<Arc<dyn MeetingStore>>,
    query: Result<Query<AverageParticipantsQuery>, QueryRejection>,
) -> Result<Json<AverageParticipants>, AppError> {
    let Query(query) =
        query.map_err(|_| AppError::Validation(INVALID_TOTAL_MEETINGS.to_owned()))?;
    let total_meetings = positive_param(
        query.total_meetings.as_deref(),
        DEFAULT_AVERAGE_PARTICIPANTS_MEETINGS,
        INVALID_TOTAL_MEETINGS,
    )?;

    let average_participants =
        aggregation::average_participants(store.as_ref(), Utc::now(), total_meetings).await?;

    Ok(Json(AverageParticipants {
        average_participants,
    }))
}

/// `GET /meetings/average/permonth`
pub async fn average_meetings_per_month(
    State(store): State<Arc<dyn MeetingStore>>,
) -> Result<Json<AverageMeetingsPerMonth>, AppError> {
    let average_meetings_per_month = aggregation::average_meetings_per_month(store.as_ref()).await?;

    Ok(Json(AverageMeetingsPerMonth {
        average_meetings_per_month,
    }))
}
