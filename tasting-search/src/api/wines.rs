//! Wine search and selection endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::candidate::WineCandidate;
use crate::pipeline::{record_selection, UsageUpdate};
use crate::AppState;

/// Longest accepted search term, in characters
const MAX_TERM_CHARS: usize = 200;

/// Query parameters for wine search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub term: String,
    pub candidates: Vec<WineCandidate>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub candidate: WineCandidate,
    pub usage_recorded: bool,
}

/// GET /api/wines/search?term=pinot
///
/// Merged, deduplicated candidates from both collections. Terms below the
/// minimum length return an empty list.
pub async fn search_wines(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, WineApiError> {
    if query.term.chars().count() > MAX_TERM_CHARS {
        return Err(WineApiError::TermTooLong(MAX_TERM_CHARS));
    }

    let candidates = state.pipeline.run(&query.term).await;
    Ok(Json(SearchResponse {
        term: query.term,
        candidates,
    }))
}

/// POST /api/wines/select
///
/// Body is the selected candidate as returned by search. Records usage for
/// catalog wines (best effort) and echoes the candidate back for form fill,
/// carrying the stored usage count when the increment succeeded.
pub async fn select_wine(
    State(state): State<AppState>,
    Json(candidate): Json<WineCandidate>,
) -> Result<Json<SelectResponse>, WineApiError> {
    if candidate.source_id.trim().is_empty() {
        return Err(WineApiError::MissingSourceId);
    }

    let candidate = candidate.sanitized();
    let usage = record_selection(state.pipeline.store().as_ref(), &candidate).await;

    // Echo the stored count, not whatever the client sent
    let candidate = match usage {
        UsageUpdate::Recorded { new_count } => candidate.with_usage_count(new_count),
        UsageUpdate::NotTracked | UsageUpdate::Failed => candidate,
    };

    Ok(Json(SelectResponse {
        candidate,
        usage_recorded: usage.is_recorded(),
    }))
}

/// Wine API errors
#[derive(Debug, Error)]
pub enum WineApiError {
    #[error("Search term longer than {0} characters")]
    TermTooLong(usize),
    #[error("Candidate has no source_id")]
    MissingSourceId,
}

impl IntoResponse for WineApiError {
    fn into_response(self) -> Response {
        let status = match self {
            WineApiError::TermTooLong(_) | WineApiError::MissingSourceId => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
