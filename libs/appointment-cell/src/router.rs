// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::admin_middleware;
use shared_utils::rate_limit::rate_limit_middleware;

use crate::handlers::{self, AppointmentState};

/// Public slot lookups for the booking form.
pub fn availability_routes(state: AppointmentState) -> Router {
    Router::new()
        .route("/", get(handlers::get_available_slots))
        .route("/calendar", get(handlers::get_availability_calendar))
        .with_state(state)
}

pub fn appointment_routes(state: AppointmentState) -> Router {
    // Customers book without an account; the limiter keeps the form from being hammered
    let mut public_routes = Router::new()
        .route("/", post(handlers::book_appointment));

    if let Some(limiter) = state.rate_limiter.clone() {
        public_routes = public_routes.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    let admin_routes = Router::new()
        .route("/", get(handlers::list_appointments))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
