#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use event_service::config::{
    AuthConfig, Config, DatabaseConfig, HashConfig, LoggingConfig, ServerConfig,
};
use event_service::domain::clock::Clock;
use event_service::domain::hasher::Argon2Hasher;
use event_service::domain::models::event::{
    CreatorSummary, Event, EventDetail, EventPatch, NewEvent,
};
use event_service::domain::models::user::{NewUser, User, UserChanges, UserView};
use event_service::domain::repositories::event_repository::EventRepository;
use event_service::domain::repositories::user_repository::UserRepository;
use event_service::error::AppError;
use event_service::server::AppState;

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 内存用户表，模拟存储层的 email 唯一约束
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn stored(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

fn duplicate() -> AppError {
    AppError::DuplicateEmail("This email is already in use".to_string())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<UserView, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(duplicate());
        }
        let user = User::new(new_user);
        let view = user.view();
        users.push(user);
        Ok(view)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, AppError> {
        Ok(self.stored(id).map(|u| u.view()))
    }

    async fn list_excluding(&self, id: Uuid) -> Result<Vec<UserView>, AppError> {
        // 插入顺序倒序即创建时间倒序
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|u| u.id != id)
            .map(User::view)
            .collect())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserView>, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &changes.email {
            if users.iter().any(|u| &u.email == email && u.id != id) {
                return Err(duplicate());
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(lastname) = changes.lastname {
            user.lastname = lastname;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.view()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn find_by_email_raw(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

pub struct InMemoryEventRepository {
    events: Mutex<Vec<Event>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryEventRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            users,
        }
    }

    /// 绕过服务层直接写入（例如已经过去的活动）
    pub fn seed(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, new_event: NewEvent) -> Result<Event, AppError> {
        // 模拟 events.creator_id 外键
        if self.users.stored(new_event.creator_id).is_none() {
            return Err(AppError::NotFound(format!(
                "User with ID {} not found",
                new_event.creator_id
            )));
        }
        let event = Event::new(new_event);
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn find_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.datetime >= from && e.datetime <= to)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.datetime);
        Ok(events)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn find_detail_by_id(&self, id: Uuid) -> Result<Option<EventDetail>, AppError> {
        let Some(event) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let Some(creator) = self.users.stored(event.creator_id) else {
            return Ok(None);
        };

        Ok(Some(EventDetail {
            event,
            creator: CreatorSummary {
                id: creator.id,
                name: creator.name,
                lastname: creator.lastname,
                email: creator.email,
            },
        }))
    }

    async fn update(&self, id: Uuid, patch: EventPatch) -> Result<Option<Event>, AppError> {
        let mut events = self.events.lock().unwrap();
        let Some(event) = events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(datetime) = patch.datetime {
            event.datetime = datetime;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(thumbnail) = patch.thumbnail {
            event.thumbnail = thumbnail;
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() < before)
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
        },
        database: DatabaseConfig {
            url: "mysql://unused".to_string(),
            max_connections: 1,
            run_migrations: false,
        },
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_expiry_hours: 1,
        },
        hash: HashConfig {
            rounds: 1,
            memory_kib: 1024,
            parallelism: 1,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub events: Arc<InMemoryEventRepository>,
}

pub fn context(now: DateTime<Utc>) -> TestContext {
    let config = test_config();
    let users = Arc::new(InMemoryUserRepository::default());
    let events = Arc::new(InMemoryEventRepository::new(users.clone()));
    let hasher = Argon2Hasher::new(&config.hash).expect("valid test hash parameters");

    let state = AppState {
        config,
        events: events.clone(),
        users: users.clone(),
        clock: Arc::new(FixedClock(now)),
        hasher: Arc::new(hasher),
    };

    TestContext {
        state,
        users,
        events,
    }
}
