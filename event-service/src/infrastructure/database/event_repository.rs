use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::domain::models::event::{CreatorSummary, Event, EventDetail, EventPatch, NewEvent};
use crate::domain::repositories::event_repository::EventRepository;
use crate::error::AppError;
use crate::infrastructure::database::map_missing_creator;

const EVENT_COLUMNS: &str =
    "id, title, datetime, location, thumbnail, creator_id, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EventDetailRow {
    id: Uuid,
    title: String,
    datetime: DateTime<Utc>,
    location: String,
    thumbnail: String,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    creator_name: String,
    creator_lastname: String,
    creator_email: String,
}

impl From<EventDetailRow> for EventDetail {
    fn from(row: EventDetailRow) -> Self {
        Self {
            creator: CreatorSummary {
                id: row.creator_id,
                name: row.creator_name,
                lastname: row.creator_lastname,
                email: row.creator_email,
            },
            event: Event {
                id: row.id,
                title: row.title,
                datetime: row.datetime,
                location: row.location,
                thumbnail: row.thumbnail,
                creator_id: row.creator_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

pub struct MySqlEventRepository {
    pool: MySqlPool,
}

impl MySqlEventRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for MySqlEventRepository {
    async fn create(&self, new_event: NewEvent) -> Result<Event, AppError> {
        let event = Event::new(new_event);

        sqlx::query(
            r#"
            INSERT INTO events (id, title, datetime, location, thumbnail, creator_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(event.id)
            .bind(&event.title)
            .bind(event.datetime)
            .bind(&event.location)
            .bind(&event.thumbnail)
            .bind(event.creator_id)
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_missing_creator(e, event.creator_id))?;

        Ok(event)
    }

    async fn find_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, AppError> {
        let sql = format!(
            "SELECT {} FROM events WHERE datetime >= ? AND datetime <= ? ORDER BY datetime ASC",
            EVENT_COLUMNS
        );

        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS);

        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<EventDetail>, AppError> {
        // 只投影创建者的公开字段
        let row = sqlx::query_as::<_, EventDetailRow>(
            r#"
            SELECT e.id, e.title, e.datetime, e.location, e.thumbnail, e.creator_id,
                   e.created_at, e.updated_at,
                   u.name AS creator_name, u.lastname AS creator_lastname, u.email AS creator_email
            FROM events e
            INNER JOIN users u ON u.id = e.creator_id
            WHERE e.id = ?
            "#,
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(EventDetail::from))
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>, AppError> {
        sqlx::query(
            r#"
            UPDATE events
            SET title = COALESCE(?, title),
                datetime = COALESCE(?, datetime),
                location = COALESCE(?, location),
                thumbnail = COALESCE(?, thumbnail),
                updated_at = ?
            WHERE id = ?
            "#,
        )
            .bind(patch.title)
            .bind(patch.datetime.map(|dt| dt.trunc_subsecs(6)))
            .bind(patch.location)
            .bind(patch.thumbnail)
            .bind(Utc::now().trunc_subsecs(6))
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM events WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
