use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
};

use crate::api::{auth, events, users};
use crate::config::Config;
use crate::domain::clock::Clock;
use crate::domain::hasher::CredentialHasher;
use crate::domain::repositories::event_repository::EventRepository;
use crate::domain::repositories::user_repository::UserRepository;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::event_service::EventService;
use crate::domain::services::user_service::UserService;
use crate::error::AppError;
use crate::middleware::auth as auth_middleware;

/// 只持有无状态的协作者，服务按请求构建
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub events: Arc<dyn EventRepository>,
    pub users: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    pub fn event_service(&self) -> EventService {
        EventService::new(self.events.clone(), self.clock.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.users.clone(), self.hasher.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.user_service(), self.config.auth.clone())
    }
}

pub async fn create_app(state: AppState) -> Result<Router, AppError> {
    let app_state = Arc::new(state);

    // 健康检查路由
    let health_route = Router::new()
        .route("/health", get(|| async { "OK" }));

    // 需要认证的路由
    let protected_routes = Router::new()
        .nest("/events", events::routes())
        .nest("/users", users::routes())
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware::require_auth,
        ));

    // API 路由
    let api_routes = Router::new()
        .nest("/auth", auth::routes())
        .merge(protected_routes);

    // 组合所有路由
    let app = Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(app_state);

    Ok(app)
}
