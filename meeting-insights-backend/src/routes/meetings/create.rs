use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use meeting_insights_database::MeetingStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::generator::{bulk_generate, BatchOutcome, GenerationSettings};

pub const MAX_MEETINGS_PER_BATCH: u32 = 5000;

const INVALID_TOTAL_MEETINGS: &str = "Invalid 'totalMeetings' passed in request body. \
                                      'totalMeetings' must be number > 0 and <= 5000";
const MISSING_TOPIC: &str = "Missing 'topic' from the request body.";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingsPayload {
    /// Number or numeric string, the page posts its text box as is.
    #[serde(default)]
    pub total_meetings: Value,
    pub topic: Option<String>,
}

impl CreateMeetingsPayload {
    pub fn total_meetings(&self) -> Result<u32, AppError> {
        let requested = match &self.total_meetings {
            Value::Null => return Ok(MAX_MEETINGS_PER_BATCH),
            Value::String(text) if text.trim().is_empty() => return Ok(MAX_MEETINGS_PER_BATCH),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            Value::Number(number) => number.as_i64(),
            _ => None,
        };
        requested
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| (1..=MAX_MEETINGS_PER_BATCH).contains(value))
            .ok_or_else(|| AppError::Validation(INVALID_TOTAL_MEETINGS.to_owned()))
    }

    pub fn topic(&self) -> Result<&str, AppError> {
        self.topic
            .as_deref()
            .filter(|topic| !topic.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING_TOPIC.to_owned()))
    }
}

/// `POST /meetings`
pub async fn create(
    State(store): State<Arc<dyn MeetingStore>>,
    State(settings): State<Arc<GenerationSettings>>,
    payload: Result<Json<CreateMeetingsPayload>, JsonRejection>,
) -> Result<Json<BatchOutcome>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let topic = payload.topic()?;
    let total_meetings = payload.total_meetings()?;

    let mut rng = StdRng::from_entropy();
    let outcome = bulk_generate(store.as_ref(), &mut rng, total_meetings, topic, &settings).await?;

    Ok(Json(outcome))
}
