use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::config::Config;
use crate::error::AppError;

pub async fn init_mysql(config: &Config) -> Result<MySqlPool, AppError> {
    tracing::info!("Initializing MySQL connection pool");

    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    // 运行迁移
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
