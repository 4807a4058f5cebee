use axum::{
    routing::get,
    Router,
    Json,
    extract::{State, Path, Extension},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use std::sync::Arc;

use crate::domain::models::user::{Principal, Role, UserView};
use crate::domain::policy;
use crate::domain::services::user_service::{CreateUser, UserPatch};
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::response::ApiResponse;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).patch(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Lastname cannot be empty"))]
    pub lastname: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Lastname cannot be empty"))]
    pub lastname: Option<String>,
    pub role: Option<Role>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            name: request.name,
            lastname: request.lastname,
            role: request.role,
        }
    }
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiResponse<Vec<UserView>>, AppError> {
    let users = state.user_service().list_users(principal.id).await?;

    Ok(ApiResponse::ok(users, "Users found"))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<UserView>, AppError> {
    let user = state.user_service().get_user(id).await?;

    Ok(ApiResponse::ok(user, "User found"))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<ApiResponse<UserView>, AppError> {
    // 验证请求
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    // 受限角色只能创建默认角色的用户
    if let Some(role) = payload.role {
        if !policy::can_change_role(&principal, Role::default(), role).is_allowed() {
            return Err(AppError::Forbidden("You are not allowed to assign roles".to_string()));
        }
    }

    let user = state
        .user_service()
        .create_user(CreateUser {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            lastname: payload.lastname,
            role: payload.role,
        })
        .await?;

    Ok(ApiResponse::created(user, "User created"))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<ApiResponse<UserView>, AppError> {
    // 验证请求
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .user_service()
        .update_user(id, payload.into(), &principal)
        .await?;

    Ok(ApiResponse::ok(user, "User updated"))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    state.user_service().delete_user(id).await?;

    Ok(ApiResponse::empty("User deleted"))
}
