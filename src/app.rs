use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/today", get(handlers::get_today))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/practice", post(handlers::record_practice))
        .route("/api/practice/undo", post(handlers::undo_today))
        .route("/api/goals/:id/increment", post(handlers::increment_goal))
        .route("/api/goals/:id/reset", post(handlers::reset_goal))
        .route("/api/goals/:id/title", post(handlers::rename_goal))
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
}
