use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::domain::models::user::{NewUser, Role, User, UserChanges, UserView};
use crate::domain::repositories::user_repository::UserRepository;
use crate::error::AppError;
use crate::infrastructure::database::map_unique_violation;

// 不含 password 列
const USER_VIEW_COLUMNS: &str = "id, email, name, lastname, role, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserViewRow {
    id: Uuid,
    email: String,
    name: String,
    lastname: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
    name: String,
    lastname: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(role: &str) -> Result<Role, AppError> {
    role.parse::<Role>()
        .map_err(|_| AppError::Internal(format!("Unknown role stored: {}", role)))
}

impl TryFrom<UserViewRow> for UserView {
    type Error = AppError;

    fn try_from(row: UserViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            lastname: row.lastname,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            name: row.name,
            lastname: row.lastname,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<UserView, AppError> {
        let user = User::new(new_user);

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, name, lastname, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.lastname)
            .bind(user.role.to_string())
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Ok(user.view())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE email = ?"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_VIEW_COLUMNS);

        sqlx::query_as::<_, UserViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserView::try_from)
            .transpose()
    }

    async fn list_excluding(&self, id: Uuid) -> Result<Vec<UserView>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id <> ? ORDER BY created_at DESC",
            USER_VIEW_COLUMNS
        );

        sqlx::query_as::<_, UserViewRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(UserView::try_from)
            .collect()
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserView>, AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                password = COALESCE(?, password),
                name = COALESCE(?, name),
                lastname = COALESCE(?, lastname),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            "#,
        )
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.name)
            .bind(changes.lastname)
            .bind(changes.role.map(|role| role.to_string()))
            .bind(Utc::now().trunc_subsecs(6))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_email_raw(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, name, lastname, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}
