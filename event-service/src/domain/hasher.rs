use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::HashConfig;
use crate::error::AppError;

/// 单向密码哈希
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError>;
}

/// Argon2id，输出 PHC 字符串，校验参数从摘要中读取
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(config: &HashConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.rounds, config.parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid hash parameters: {}", e)))?;

        Ok(Self { params })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2.hash_password(plaintext.as_bytes(), &salt)?;

        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(digest)?;

        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
