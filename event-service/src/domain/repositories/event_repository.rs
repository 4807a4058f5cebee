use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::event::{Event, EventDetail, EventPatch, NewEvent};
use crate::error::AppError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: NewEvent) -> Result<Event, AppError>;

    /// `datetime` 位于闭区间 `[from, to]` 内的活动，按时间升序
    async fn find_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    /// 连同创建者的精简信息一起查询
    async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<EventDetail>, AppError>;

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>, AppError>;

    /// 返回是否删除了记录
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
