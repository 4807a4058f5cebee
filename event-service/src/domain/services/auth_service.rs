use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::models::user::{Principal, Role};
use crate::domain::services::user_service::UserService;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // Subject (user ID)
    pub exp: usize,      // Expiration time
    pub iat: usize,      // Issued at time
    pub email: String,
    pub role: Role,
}

#[derive(Debug)]
pub struct AuthResult {
    pub access_token: String,
    pub expires_in: u64,
}

pub struct AuthService {
    users: UserService,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: UserService, config: AuthConfig) -> Self {
        Self { users, config }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AppError> {
        // 从数据库获取用户（含密码哈希）
        let user = self
            .users
            .find_by_email_raw(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        // 验证密码
        let is_valid = self
            .users
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !is_valid {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }

        let principal = Principal {
            id: user.id,
            email: user.email,
            role: user.role,
        };
        tracing::info!(user_id = %principal.id, "User logged in");

        self.issue_token(&principal)
    }

    pub fn issue_token(&self, principal: &Principal) -> Result<AuthResult, AppError> {
        let expiry_hours = self.config.token_expiry_hours;
        let secret = self.config.jwt_secret.as_bytes();

        let now = Utc::now();
        let exp = now
            .checked_add_signed(Duration::hours(expiry_hours as i64))
            .ok_or_else(|| AppError::Internal("Invalid token expiry".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: principal.id.to_string(),
            exp,
            iat: now.timestamp() as usize,
            email: principal.email.clone(),
            role: principal.role,
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            access_token,
            expires_in: expiry_hours * 3600,
        })
    }

    /// 解码并验证令牌，不访问存储
    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        decode_principal(&self.config, token)
    }
}

fn decode_principal(config: &AuthConfig, token: &str) -> Result<Principal, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
        .map_err(|_| AppError::Auth("Invalid token".to_string()))?;

    let id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Auth("Invalid token subject".to_string()))?;

    Ok(Principal {
        id,
        email: token_data.claims.email,
        role: token_data.claims.role,
    })
}

fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid email or password".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            token_expiry_hours: 1,
        }
    }

    fn encode_with(config: &AuthConfig, principal: &Principal) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: principal.id.to_string(),
            exp: now + 3600,
            iat: now,
            email: principal.email.clone(),
            role: principal.role,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn token_round_trips_principal() {
        let config = config("test-secret");
        let principal = Principal {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role: Role::ContentManager,
        };

        let token = encode_with(&config, &principal);

        assert_eq!(decode_principal(&config, &token).unwrap(), principal);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let principal = Principal {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role: Role::Admin,
        };
        let token = encode_with(&config("other-secret"), &principal);

        assert!(matches!(
            decode_principal(&config("test-secret"), &token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            decode_principal(&config("test-secret"), "not.a.jwt"),
            Err(AppError::Auth(_))
        ));
    }
}
