use std::sync::Arc;

use event_service::config::Config;
use event_service::domain::clock::SystemClock;
use event_service::domain::hasher::Argon2Hasher;
use event_service::error::AppError;
use event_service::infrastructure::database::event_repository::MySqlEventRepository;
use event_service::infrastructure::database::mysql::init_mysql;
use event_service::infrastructure::database::user_repository::MySqlUserRepository;
use event_service::logging::init_logging;
use event_service::server::{self, create_app};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_logging(&config)?;

    tracing::info!("Starting event service");

    // 初始化数据库连接
    let db_pool = init_mysql(&config).await?;

    // 创建应用状态
    let app_state = server::AppState {
        config: config.clone(),
        events: Arc::new(MySqlEventRepository::new(db_pool.clone())),
        users: Arc::new(MySqlUserRepository::new(db_pool)),
        clock: Arc::new(SystemClock),
        hasher: Arc::new(Argon2Hasher::new(&config.hash)?),
    };

    // 创建并启动服务器
    let app = create_app(app_state).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}
