pub mod event_repository;
pub mod mysql;
pub mod user_repository;

use uuid::Uuid;

use crate::error::AppError;

/// 把 `users.email` 唯一约束冲突映射为 `DuplicateEmail`
pub(crate) fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::DuplicateEmail("This email is already in use".to_string());
        }
    }
    AppError::Database(err)
}

/// 创建者已被删除（令牌仍有效）时，外键冲突映射为 `NotFound`
pub(crate) fn map_missing_creator(err: sqlx::Error, creator_id: Uuid) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(format!("User with ID {} not found", creator_id));
        }
    }
    AppError::Database(err)
}
