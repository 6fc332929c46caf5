// libs/schedule-cell/src/router.rs
use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::admin_middleware;

use crate::handlers::{self, ScheduleState};

/// Schedule configuration. Every route requires an administrator token.
pub fn schedule_routes(state: ScheduleState) -> Router {
    Router::new()
        .route("/", get(handlers::get_schedule))
        .route("/slots", get(handlers::list_weekly_rules).post(handlers::create_weekly_rule))
        .route("/slots/{rule_id}", put(handlers::update_weekly_rule).delete(handlers::delete_weekly_rule))
        .route("/exceptions", get(handlers::list_exceptions).post(handlers::upsert_exception))
        .route("/exceptions/{exception_id}", put(handlers::update_exception).delete(handlers::delete_exception))
        .layer(middleware::from_fn_with_state(state.config.clone(), admin_middleware))
        .with_state(state)
}
