use axum::{
    Router,
    routing::get,
};

use appointment_cell::handlers::AppointmentState;
use appointment_cell::router::{appointment_routes, availability_routes};
use schedule_cell::handlers::ScheduleState;
use schedule_cell::router::schedule_routes;

pub fn create_router(appointments: AppointmentState, schedule: ScheduleState) -> Router {
    Router::new()
        .route("/", get(|| async { "Repair shop scheduling API is running!" }))
        .nest("/available-slots", availability_routes(appointments.clone()))
        .nest("/appointments", appointment_routes(appointments))
        .nest("/schedule", schedule_routes(schedule))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use appointment_cell::store::InMemoryAppointmentStore;
    use schedule_cell::services::ScheduleConfigService;
    use schedule_cell::store::{InMemoryScheduleStore, ScheduleStore};
    use shared_utils::clock::FixedClock;
    use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

    use super::*;

    fn app(config: &TestConfig) -> Router {
        let schedules: Arc<dyn ScheduleStore> = Arc::new(InMemoryScheduleStore::default());
        let appointments = AppointmentState::new(
            config.to_arc(),
            schedules.clone(),
            Arc::new(InMemoryAppointmentStore::default()),
            Arc::new(FixedClock("2026-10-17T08:00:00".parse().unwrap())),
            None,
        );
        let schedule = ScheduleState {
            config: config.to_arc(),
            service: Arc::new(ScheduleConfigService::new(schedules)),
        };
        create_router(appointments, schedule)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let app = app(&TestConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn schedule_edits_show_up_in_public_availability() {
        let config = TestConfig::default();
        let app = app(&config);
        let token = JwtTestUtils::bearer(&TestUser::admin("owner@example.com"), &config);

        let (status, _) = send(&app, Request::builder()
            .method("POST")
            .uri("/schedule/slots")
            .header("Authorization", &token)
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"dayOfWeek":1,"startTime":"09:00","endTime":"11:00","slotDurationMinutes":30}"#))
            .unwrap())
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Request::builder()
            .uri("/available-slots?date=2026-10-19")
            .body(Body::empty())
            .unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totalSlots"], 4);

        let (status, _) = send(&app, Request::builder()
            .method("POST")
            .uri("/schedule/exceptions")
            .header("Authorization", &token)
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"date":"2026-10-19","isAvailable":false,"reason":"Closed for inventory"}"#))
            .unwrap())
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, Request::builder()
            .uri("/available-slots?date=2026-10-19")
            .body(Body::empty())
            .unwrap())
            .await;
        assert_eq!(body["data"]["isOpen"], false);
        assert_eq!(body["data"]["reason"], "Closed for inventory");
    }
}
