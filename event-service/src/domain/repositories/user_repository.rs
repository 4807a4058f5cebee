use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::user::{NewUser, User, UserChanges, UserView};
use crate::error::AppError;

/// 除 `find_by_email_raw` 外，所有读取都不查询密码列。
///
/// 实现必须在存储层保证 `email` 唯一，并把唯一约束冲突报告为
/// [`AppError::DuplicateEmail`]。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<UserView, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, AppError>;

    /// 按创建时间倒序，排除指定用户
    async fn list_excluding(&self, id: Uuid) -> Result<Vec<UserView>, AppError>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserView>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// 包含密码哈希的完整记录，仅供凭证校验使用
    async fn find_by_email_raw(&self, email: &str) -> Result<Option<User>, AppError>;
}
