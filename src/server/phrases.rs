//! Review endpoint handlers
//!
//! Thin JSON adapters over the scheduler. Both answer endpoints
//! (`/phrases/{id}/review` and the client's `/phrase_response`) go through
//! the same `record_answer` call; there is no second update formula.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::srs::models::{Phrase, ReviewStats};
use crate::srs::DEFAULT_LIMIT;

/// Liveness check.
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub limit: Option<i64>,
}

/// `GET /phrases/due?limit=N`
pub async fn due_phrases(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<Phrase>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let phrases = state.scheduler.select_due(limit, Utc::now())?;
    Ok(Json(phrases))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub correct: bool,
}

/// `POST /phrases/{id}/review`
pub async fn review_phrase(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<Phrase>, ApiError> {
    let phrase = state.scheduler.record_answer(id, body.correct, Utc::now())?;
    Ok(Json(phrase))
}

/// `GET /phrases/stats`
pub async fn phrase_stats(State(state): State<AppState>) -> Result<Json<ReviewStats>, ApiError> {
    Ok(Json(state.scheduler.stats()?))
}

#[derive(Debug, Serialize)]
pub struct DailyPhrases {
    pub phrases: Vec<Phrase>,
}

/// `GET /daily_phrases?limit=N`: the batch envelope the web client pulls
/// at session start.
pub async fn daily_phrases(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Result<Json<DailyPhrases>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let phrases = state.scheduler.select_due(limit, Utc::now())?;
    Ok(Json(DailyPhrases { phrases }))
}

#[derive(Debug, Deserialize)]
pub struct PhraseResponseRequest {
    pub phrase_id: i64,
    pub was_correct: bool,
}

/// `POST /phrase_response`: feedback callback from the web client.
pub async fn phrase_response(
    State(state): State<AppState>,
    Json(body): Json<PhraseResponseRequest>,
) -> Result<Json<Value>, ApiError> {
    let phrase = state.scheduler.record_answer(body.phrase_id, body.was_correct, Utc::now())?;
    Ok(Json(json!({ "phrase": phrase })))
}

/// `GET /system_prompt`: tutoring instructions for the speech model,
/// built from the current due batch.
pub async fn system_prompt(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let phrases = state.scheduler.select_due(DEFAULT_LIMIT, Utc::now())?;
    Ok(Json(json!({ "system_prompt": build_system_prompt(&phrases) })))
}

fn build_system_prompt(phrases: &[Phrase]) -> String {
    let mut prompt = String::from(
        "You are a patient Hindi tutor speaking with a learner over audio. \
         Work through today's phrases one at a time: say the phrase in Hindi, \
         have the learner repeat it, correct pronunciation gently, and explain \
         usage with the English meaning. Keep replies short and encouraging.\n\
         \nToday's phrases:\n",
    );

    if phrases.is_empty() {
        prompt.push_str("(none due today — review anything the learner asks about)\n");
        return prompt;
    }

    for phrase in phrases {
        if phrase.context.is_empty() {
            prompt.push_str(&format!("- {} — \"{}\"\n", phrase.hindi, phrase.english));
        } else {
            prompt.push_str(&format!(
                "- {} — \"{}\" ({})\n",
                phrase.hindi, phrase.english, phrase.context
            ));
        }
    }
    prompt
}
