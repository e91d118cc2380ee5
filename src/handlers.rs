use crate::errors::AppError;
use crate::models::{
    GoalRename, GoalUpdate, OverviewResponse, PracticeCategory, PracticeRequest, PracticeUndo,
    PracticeUpdate, RenameOutcome, RenameRequest, StatsResponse, TodayResponse,
};
use crate::state::AppState;
use crate::tracker::DEFAULT_INCREMENT_MINUTES;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    Json(state.tracker.overview().await)
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    Json(state.tracker.today().await)
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.tracker.stats().await)
}

pub async fn record_practice(
    State(state): State<AppState>,
    Json(payload): Json<PracticeRequest>,
) -> Result<Json<PracticeUpdate>, AppError> {
    let category = payload
        .category
        .trim()
        .parse::<PracticeCategory>()
        .map_err(|err| AppError::bad_request(format!("category: {err}")))?;
    let minutes = payload.minutes.unwrap_or(DEFAULT_INCREMENT_MINUTES);

    Ok(Json(state.tracker.record_practice(category, minutes).await))
}

pub async fn undo_today(State(state): State<AppState>) -> Json<PracticeUndo> {
    Json(state.tracker.undo_today().await)
}

pub async fn increment_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<GoalUpdate>, AppError> {
    state
        .tracker
        .increment_goal(&goal_id)
        .await
        .map(Json)
        .ok_or_else(|| goal_not_found(&goal_id))
}

pub async fn reset_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
) -> Result<Json<GoalUpdate>, AppError> {
    state
        .tracker
        .reset_goal(&goal_id)
        .await
        .map(Json)
        .ok_or_else(|| goal_not_found(&goal_id))
}

pub async fn rename_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<GoalRename>, AppError> {
    let rename = state.tracker.rename_goal(&goal_id, &payload.title).await;
    if rename.outcome == RenameOutcome::NotFound {
        return Err(goal_not_found(&goal_id));
    }
    Ok(Json(rename))
}

pub async fn reload(State(state): State<AppState>) -> Result<Json<OverviewResponse>, AppError> {
    state.tracker.reload().await?;
    Ok(Json(state.tracker.overview().await))
}

fn goal_not_found(goal_id: &str) -> AppError {
    AppError::not_found(format!("no goal with id '{goal_id}'"))
}
