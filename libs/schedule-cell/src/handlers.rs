// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::ApiJson;

use crate::models::{
    CreateWeeklyRuleRequest, ScheduleError, UpdateExceptionRequest, UpdateWeeklyRuleRequest,
    UpsertExceptionRequest,
};
use crate::services::ScheduleConfigService;

#[derive(Clone)]
pub struct ScheduleState {
    pub config: Arc<AppConfig>,
    pub service: Arc<ScheduleConfigService>,
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Validation(msg) => AppError::ValidationError(msg),
            ScheduleError::NotFound(msg) => AppError::NotFound(msg),
            ScheduleError::Conflict(msg) => AppError::Conflict(msg),
            ScheduleError::ConfigurationUnavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

// ==============================================================================
// SCHEDULE SNAPSHOT
// ==============================================================================

pub async fn get_schedule(
    State(state): State<ScheduleState>,
) -> Result<Json<Value>, AppError> {
    let schedule = state.service.get_schedule().await?;

    Ok(Json(json!({
        "success": true,
        "data": schedule
    })))
}

// ==============================================================================
// WEEKLY SLOT RULES
// ==============================================================================

pub async fn list_weekly_rules(
    State(state): State<ScheduleState>,
) -> Result<Json<Value>, AppError> {
    let rules = state.service.list_weekly_rules().await?;

    Ok(Json(json!({
        "success": true,
        "data": rules
    })))
}

pub async fn create_weekly_rule(
    State(state): State<ScheduleState>,
    ApiJson(request): ApiJson<CreateWeeklyRuleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let rule = state.service.create_weekly_rule(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "data": rule
    }))))
}

pub async fn update_weekly_rule(
    State(state): State<ScheduleState>,
    Path(rule_id): Path<String>,
    ApiJson(request): ApiJson<UpdateWeeklyRuleRequest>,
) -> Result<Json<Value>, AppError> {
    let rule = state.service.update_weekly_rule(&rule_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": rule
    })))
}

pub async fn delete_weekly_rule(
    State(state): State<ScheduleState>,
    Path(rule_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.service.delete_weekly_rule(&rule_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Weekly rule deleted"
    })))
}

// ==============================================================================
// DATE EXCEPTIONS
// ==============================================================================

pub async fn list_exceptions(
    State(state): State<ScheduleState>,
) -> Result<Json<Value>, AppError> {
    let exceptions = state.service.list_exceptions().await?;

    Ok(Json(json!({
        "success": true,
        "data": exceptions
    })))
}

pub async fn upsert_exception(
    State(state): State<ScheduleState>,
    ApiJson(request): ApiJson<UpsertExceptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let exception = state.service.upsert_exception(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "data": exception
    }))))
}

pub async fn update_exception(
    State(state): State<ScheduleState>,
    Path(exception_id): Path<String>,
    ApiJson(request): ApiJson<UpdateExceptionRequest>,
) -> Result<Json<Value>, AppError> {
    let exception = state.service.update_exception(&exception_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": exception
    })))
}

pub async fn delete_exception(
    State(state): State<ScheduleState>,
    Path(exception_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.service.delete_exception(&exception_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Date exception deleted"
    })))
}
