use axum::{
    routing::get,
    Router,
    Json,
    extract::{State, Path, Extension, Query},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use std::sync::Arc;

use crate::domain::models::event::{Event, EventDetail, EventListing, EventPatch, NewEvent};
use crate::domain::models::user::Principal;
use crate::domain::window::WindowQuery;
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::response::ApiResponse;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).patch(update_event).delete(delete_event))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    #[validate(range(min = 1970, max = 9999, message = "Year is out of range"))]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub start_month: Option<u32>,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub end_month: Option<u32>,
    pub grouped_by_month: Option<bool>,
}

impl From<ListEventsQuery> for WindowQuery {
    fn from(query: ListEventsQuery) -> Self {
        Self {
            year: query.year,
            start_month: query.start_month,
            end_month: query.end_month,
            grouped_by_month: query.grouped_by_month,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub thumbnail: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub datetime: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(request: UpdateEventRequest) -> Self {
        Self {
            title: request.title,
            datetime: request.datetime,
            location: request.location,
            thumbnail: request.thumbnail,
        }
    }
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<ApiResponse<EventListing>, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = state.event_service().list_events(query.into()).await?;

    Ok(ApiResponse::ok(listing, "Events retrieved successfully"))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<ApiResponse<Event>, AppError> {
    // 验证请求
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let event = state
        .event_service()
        .create_event(NewEvent {
            title: payload.title,
            datetime: payload.datetime,
            location: payload.location,
            thumbnail: payload.thumbnail,
            creator_id: principal.id,
        })
        .await?;

    Ok(ApiResponse::created(event, "Event created successfully"))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<EventDetail>, AppError> {
    let event = state.event_service().get_event(id).await?;

    Ok(ApiResponse::ok(event, "Event retrieved successfully"))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<ApiResponse<Event>, AppError> {
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let event = state.event_service().update_event(id, payload.into()).await?;

    Ok(ApiResponse::ok(event, "Event updated successfully"))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    state.event_service().delete_event(id).await?;

    Ok(ApiResponse::empty("Event deleted successfully"))
}
