use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// 统一响应包装: { statusCode, message, data }
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn ok(data: T, message: &str) -> Self {
        Self::with_status(StatusCode::OK, Some(data), message)
    }

    pub fn created(data: T, message: &str) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data), message)
    }

    pub fn with_status(status: StatusCode, data: Option<T>, message: &str) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.to_string(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// 无数据的成功响应（如删除）
    pub fn empty(message: &str) -> Self {
        Self::with_status(StatusCode::OK, None, message)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
