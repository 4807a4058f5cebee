use std::sync::Arc;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::grouping::group_by_month;
use crate::domain::models::event::{
    Event, EventCollection, EventDetail, EventListing, EventPatch, NewEvent,
};
use crate::domain::repositories::event_repository::EventRepository;
use crate::domain::window::{self, WindowQuery};
use crate::error::AppError;

pub struct EventService {
    events: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    pub async fn create_event(&self, new_event: NewEvent) -> Result<Event, AppError> {
        self.ensure_future(new_event.datetime)?;

        let event = self.events.create(new_event).await?;
        tracing::info!(event_id = %event.id, creator_id = %event.creator_id, "Event created");

        Ok(event)
    }

    pub async fn list_events(&self, query: WindowQuery) -> Result<EventListing, AppError> {
        let window = window::resolve(&query, self.clock.now())?;
        tracing::debug!(from = %window.from, to = %window.to, grouped = window.is_grouped, "Resolved event window");

        // 分组依赖升序结果
        let events = self.events.find_in_window(window.from, window.to).await?;

        let events = if window.is_grouped {
            EventCollection::Grouped(group_by_month(events))
        } else {
            EventCollection::Flat(events)
        };

        Ok(EventListing {
            is_grouped: window.is_grouped,
            events,
        })
    }

    pub async fn get_event(&self, id: Uuid) -> Result<EventDetail, AppError> {
        self.events
            .find_detail_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, AppError> {
        // 检查活动是否存在
        if self.events.find_by_id(id).await?.is_none() {
            return Err(not_found(id));
        }

        if let Some(datetime) = patch.datetime {
            self.ensure_future(datetime)?;
        }

        let event = self
            .events
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(event_id = %id, "Event updated");

        Ok(event)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<(), AppError> {
        if self.events.find_by_id(id).await?.is_none() {
            return Err(not_found(id));
        }

        // 检查与删除之间被并发删除时同样视为不存在
        if !self.events.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(event_id = %id, "Event deleted");

        Ok(())
    }

    fn ensure_future(&self, datetime: DateTime<Utc>) -> Result<(), AppError> {
        if datetime <= self.clock.now() {
            return Err(AppError::InvalidSchedule);
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Event with ID {} not found", id))
}
