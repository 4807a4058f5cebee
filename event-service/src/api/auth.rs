use axum::{
    routing::post,
    Router,
    Json,
    extract::State,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use std::sync::Arc;

use crate::error::AppError;
use crate::server::AppState;
use crate::utils::response::ApiResponse;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    // 验证请求
    payload.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let auth_result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::ok(
        AuthResponse {
            access_token: auth_result.access_token,
            token_type: "Bearer".to_string(),
            expires_in: auth_result.expires_in,
        },
        "Login successful",
    ))
}
