use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;

use pinguin_core::NotificationId;
use pinguin_store::ListFilter;

use crate::dto::{
    HealthResponse, ListQuery, ListResponse, NotificationDto, RuntimeConfigResponse, ScheduleRequest,
};
use crate::error::ApiError;
use crate::extractors::AdminSession;
use crate::state::AppState;

pub async fn runtime_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<RuntimeConfigResponse> {
    let api_base_url = state.api_base_url_override.clone().unwrap_or_else(|| {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        format!("https://{host}")
    });
    Json(RuntimeConfigResponse { api_base_url })
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_notifications(
    session: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let statuses = match query.status {
        Some(raw) => {
            let mut statuses = Vec::new();
            for part in raw.split(',') {
                let status = pinguin_core::NotificationStatus::from_str(part.trim())
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                statuses.push(status);
            }
            Some(statuses)
        }
        None => None,
    };

    let filter = ListFilter {
        statuses,
        limit: query.limit.unwrap_or(100),
        offset: query.offset.unwrap_or(0),
    };

    let notifications = state
        .store
        .list(&session.tenant.tenant_id, filter)
        .await
        .map_err(ApiError::from)?
        .into_iter()
        .map(NotificationDto::from)
        .collect();

    Ok(Json(ListResponse { notifications }))
}

pub async fn reschedule_notification(
    session: AdminSession,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<NotificationDto>, ApiError> {
    let updated = state
        .store
        .reschedule(
            &session.tenant.tenant_id,
            &NotificationId::new(notification_id),
            body.scheduled_time,
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(updated.into()))
}

pub async fn cancel_notification(
    session: AdminSession,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationDto>, ApiError> {
    let canceled = state
        .store
        .cancel(&session.tenant.tenant_id, &NotificationId::new(notification_id))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(canceled.into()))
}
