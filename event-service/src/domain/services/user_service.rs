use std::sync::Arc;
use uuid::Uuid;

use crate::domain::hasher::CredentialHasher;
use crate::domain::models::user::{NewUser, Principal, Role, User, UserChanges, UserView};
use crate::domain::policy;
use crate::domain::repositories::user_repository::UserRepository;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub lastname: String,
    pub role: Option<Role>,
}

/// 部分更新，密码为明文，写入前会重新哈希
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub role: Option<Role>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn create_user(&self, input: CreateUser) -> Result<UserView, AppError> {
        // 检查邮箱是否已存在；并发写入由存储层唯一约束兜底
        if self.users.email_exists(&input.email).await? {
            tracing::warn!("Rejected user creation with an email already in use");
            return Err(duplicate_email("User already exists"));
        }

        let password_hash = self.hash_password(input.password).await?;

        let user = self
            .users
            .create(NewUser {
                email: input.email,
                password_hash,
                name: input.name,
                lastname: input.lastname,
                role: input.role.unwrap_or_default(),
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        Ok(user)
    }

    pub async fn list_users(&self, excluding: Uuid) -> Result<Vec<UserView>, AppError> {
        self.users.list_excluding(excluding).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserView, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        patch: UserPatch,
        acting: &Principal,
    ) -> Result<UserView, AppError> {
        // 检查权限
        if !policy::can_mutate(acting, id).is_allowed() {
            tracing::warn!(principal_id = %acting.id, target_id = %id, "User update denied");
            return Err(AppError::Forbidden("You can only update your own user".to_string()));
        }

        // 检查用户是否存在
        let current = self.get_user(id).await?;

        if let Some(role) = patch.role {
            if !policy::can_change_role(acting, current.role, role).is_allowed() {
                tracing::warn!(principal_id = %acting.id, target_id = %id, "Role change denied");
                return Err(AppError::Forbidden("You are not allowed to change roles".to_string()));
            }
        }

        // 邮箱变化时才检查唯一性
        let email = match patch.email {
            Some(email) if email != current.email => {
                if self.users.email_exists(&email).await? {
                    tracing::warn!(target_id = %id, "Rejected email change to an address already in use");
                    return Err(duplicate_email("This new email is already in use"));
                }
                Some(email)
            }
            _ => None,
        };

        let password_hash = match patch.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let changes = UserChanges {
            email,
            password_hash,
            name: patch.name,
            lastname: patch.lastname,
            role: patch.role,
        };

        let user = self
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(user_id = %id, principal_id = %acting.id, "User updated");

        Ok(user)
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        // 检查用户是否存在
        let _ = self.get_user(id).await?;

        if !self.users.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    /// 含密码哈希的完整记录，只供认证流程使用，不对外暴露
    pub(crate) async fn find_by_email_raw(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users.find_by_email_raw(email).await
    }

    pub(crate) async fn verify_password(&self, password: String, digest: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }

    // argon2 是 CPU 密集型，放到阻塞线程池
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("User with ID {} not found", id))
}

fn duplicate_email(message: &str) -> AppError {
    AppError::DuplicateEmail(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::user_repository::MockUserRepository;
    use chrono::Utc;

    struct PrefixHasher;

    impl CredentialHasher for PrefixHasher {
        fn hash(&self, plaintext: &str) -> Result<String, AppError> {
            Ok(format!("hashed:{}", plaintext))
        }

        fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
            Ok(digest == format!("hashed:{}", plaintext))
        }
    }

    fn view(id: Uuid, email: &str, role: Role) -> UserView {
        UserView {
            id,
            email: email.to_string(),
            name: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn principal(id: Uuid, role: Role) -> Principal {
        Principal {
            id,
            email: "acting@example.com".to_string(),
            role,
        }
    }

    fn service(repo: MockUserRepository) -> UserService {
        UserService::new(Arc::new(repo), Arc::new(PrefixHasher))
    }

    #[tokio::test]
    async fn create_rejects_existing_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists()
            .withf(|email| email.to_string() == "taken@example.com")
            .returning(|_| Ok(true));
        repo.expect_create().times(0);

        let result = service(repo)
            .create_user(CreateUser {
                email: "taken@example.com".to_string(),
                password: "password123".to_string(),
                name: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                role: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn create_stores_hash_and_defaults_role() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_create()
            .withf(|new_user| {
                new_user.password_hash == "hashed:password123"
                    && new_user.role == Role::ContentManager
            })
            .times(1)
            .returning(|new_user| Ok(User::new(new_user).view()));

        let user = service(repo)
            .create_user(CreateUser {
                email: "new@example.com".to_string(),
                password: "password123".to_string(),
                name: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                role: None,
            })
            .await
            .unwrap();

        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.role, Role::ContentManager);
    }

    #[tokio::test]
    async fn restricted_principal_cannot_update_others() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(0);
        repo.expect_update().times(0);

        let acting = principal(Uuid::new_v4(), Role::ContentManager);
        let result = service(repo)
            .update_user(Uuid::new_v4(), UserPatch::default(), &acting)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn restricted_principal_cannot_change_own_role() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(view(id, "me@example.com", Role::ContentManager))));
        repo.expect_update().times(0);

        let acting = principal(id, Role::ContentManager);
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..Default::default()
        };

        assert!(matches!(
            service(repo).update_user(id, patch, &acting).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn restricted_principal_may_restate_own_role() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(view(id, "me@example.com", Role::ContentManager))));
        repo.expect_update()
            .times(1)
            .returning(move |_, _| Ok(Some(view(id, "me@example.com", Role::ContentManager))));

        let acting = principal(id, Role::ContentManager);
        let patch = UserPatch {
            name: Some("Renamed".to_string()),
            role: Some(Role::ContentManager),
            ..Default::default()
        };

        assert!(service(repo).update_user(id, patch, &acting).await.is_ok());
    }

    #[tokio::test]
    async fn unchanged_email_skips_uniqueness_lookup() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(view(id, "same@example.com", Role::ContentManager))));
        repo.expect_email_exists().times(0);
        repo.expect_update()
            .withf(|_, changes| changes.email.is_none())
            .times(1)
            .returning(move |_, _| Ok(Some(view(id, "same@example.com", Role::ContentManager))));

        let acting = principal(id, Role::ContentManager);
        let patch = UserPatch {
            email: Some("same@example.com".to_string()),
            ..Default::default()
        };

        let user = service(repo).update_user(id, patch, &acting).await.unwrap();
        assert_eq!(user.email, "same@example.com");
    }

    #[tokio::test]
    async fn changed_email_already_taken_is_duplicate() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(view(id, "old@example.com", Role::Admin))));
        repo.expect_email_exists()
            .withf(|email| email.to_string() == "taken@example.com")
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_update().times(0);

        let acting = principal(Uuid::new_v4(), Role::Admin);
        let patch = UserPatch {
            email: Some("taken@example.com".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            service(repo).update_user(id, patch, &acting).await,
            Err(AppError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn password_change_is_rehashed() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(view(id, "me@example.com", Role::ContentManager))));
        repo.expect_update()
            .withf(|_, changes| changes.password_hash.as_deref() == Some("hashed:new-password"))
            .times(1)
            .returning(move |_, _| Ok(Some(view(id, "me@example.com", Role::ContentManager))));

        let acting = principal(id, Role::ContentManager);
        let patch = UserPatch {
            password: Some("new-password".to_string()),
            ..Default::default()
        };

        assert!(service(repo).update_user(id, patch, &acting).await.is_ok());
    }

    #[tokio::test]
    async fn update_of_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().times(0);

        let acting = principal(Uuid::new_v4(), Role::Admin);
        let result = service(repo)
            .update_user(Uuid::new_v4(), UserPatch::default(), &acting)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_of_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_delete().times(0);

        assert!(matches!(
            service(repo).delete_user(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
