use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub thumbnail: String,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(new_event: NewEvent) -> Self {
        // 与 DATETIME(6) 精度保持一致
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: Uuid::new_v4(),
            title: new_event.title,
            datetime: new_event.datetime.trunc_subsecs(6),
            location: new_event.location,
            thumbnail: new_event.thumbnail,
            creator_id: new_event.creator_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub datetime: DateTime<Utc>,
    pub location: String,
    pub thumbnail: String,
    pub creator_id: Uuid,
}

/// 部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub datetime: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub thumbnail: Option<String>,
}

/// 活动创建者的精简视图，不含密码
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub creator: CreatorSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventCollection {
    Flat(Vec<Event>),
    Grouped(IndexMap<String, Vec<Event>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    pub is_grouped: bool,
    pub events: EventCollection,
}
