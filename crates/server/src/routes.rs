use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{
        HeaderName, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, FEEDBACK_NOT_FOUND, error_response, panic_response};
use crate::identity::VoterId;
use crate::models::{DataResponse, FeedbackItem, ListParams, SubmitFeedback};
use crate::rate_limit::RatePolicy;
use crate::state::AppState;
use crate::validation::validate_submission;

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;

// ===== Router =====

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root).fallback(fallback))
        .route("/health", get(health).fallback(fallback))
        .route(
            "/feedback",
            get(list_feedback).post(submit_feedback).fallback(fallback),
        )
        .route("/feedback/:id/vote", post(vote_feedback).fallback(fallback))
        .fallback(fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

// ===== Handlers =====

async fn root() -> &'static str {
    "Feedback Service - GET /feedback to list, POST /feedback to submit"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "ok",
            "database": "connected"
        })),
        Err(err) => {
            tracing::warn!("Health check failed: {}", err);
            Json(serde_json::json!({
                "status": "error",
                "database": "disconnected"
            }))
        }
    }
}

/// Any method or path without a handler. `OPTIONS` never gets here: the CORS
/// layer answers every preflight.
async fn fallback() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn list_feedback(
    State(state): State<AppState>,
    voter: VoterId,
    Query(params): Query<ListParams>,
) -> Result<Json<DataResponse<Vec<FeedbackItem>>>, AppError> {
    let limit = parse_limit(params.limit.as_deref());
    let rows = state.store.list_open(limit).await?;

    let ids: Vec<Uuid> = rows.iter().map(|f| f.id).collect();
    let voted = state.store.voted_ids(voter.as_str(), &ids).await?;

    let items: Vec<FeedbackItem> = rows
        .into_iter()
        .map(|f| {
            let has_voted = voted.contains(&f.id);
            FeedbackItem::new(f, has_voted)
        })
        .collect();

    Ok(Json(DataResponse::new(items)))
}

async fn submit_feedback(
    State(state): State<AppState>,
    voter: VoterId,
    payload: Result<Json<SubmitFeedback>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    if !state
        .limiter
        .allow_policy(RatePolicy::SUBMIT, voter.as_str())
        .await
    {
        return Err(AppError::RateLimited);
    }

    let Json(payload) = payload.map_err(|rejection| {
        debug!("Rejected submit payload: {}", rejection.body_text());
        AppError::Validation("Invalid request body".to_string())
    })?;
    let new = validate_submission(payload)?;

    let created = state.store.insert_feedback(&new).await?;
    state.store.insert_vote(created.id, voter.as_str()).await?;
    info!(id = %created.id, category = %new.category, "Feedback submitted");

    // Re-read so upvotes includes the self-vote.
    let feedback = state
        .store
        .get_feedback(created.id)
        .await?
        .unwrap_or(created);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(FeedbackItem::new(feedback, true))),
    ))
}

async fn vote_feedback(
    State(state): State<AppState>,
    voter: VoterId,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<FeedbackItem>>, AppError> {
    if !state
        .limiter
        .allow_policy(RatePolicy::VOTE, voter.as_str())
        .await
    {
        return Err(AppError::RateLimited);
    }

    let not_found = || AppError::NotFound(FEEDBACK_NOT_FOUND.to_string());
    let id: Uuid = id.parse().map_err(|_| not_found())?;

    if state.store.get_feedback(id).await?.is_none() {
        return Err(not_found());
    }

    state.store.insert_vote(id, voter.as_str()).await.map_err(|err| {
        debug!(%id, "Vote rejected: {}", err);
        AppError::from(err)
    })?;

    let feedback = state.store.get_feedback(id).await?.ok_or_else(not_found)?;

    Ok(Json(DataResponse::with_message(
        FeedbackItem::new(feedback, true),
        "Vote recorded",
    )))
}

/// Missing, unparseable or non-positive limits use the default; large ones
/// are capped.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|limit| *limit > 0)
        .map_or(DEFAULT_LIST_LIMIT, |limit| limit.min(MAX_LIST_LIMIT))
}
