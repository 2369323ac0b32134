//! Users service: registration, login and user lookups

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    lifecycle::Action,
    models::{user::RegisterUser, Principal, Role, User, UserClaims},
    repository::SharedStore,
};

use super::rejected;

#[derive(Clone)]
pub struct UsersService {
    store: SharedStore,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: SharedStore, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Register a new account. The role defaults to health staff.
    pub async fn register(&self, data: RegisterUser) -> AppResult<User> {
        data.validate()?;

        if self.store.find_user_by_email(&data.email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: data.name.trim().to_string(),
            email: data.email.trim().to_lowercase(),
            password: self.hash_password(&data.password)?,
            role: data.role.unwrap_or(Role::HealthStaff),
            successful_repairs: 0,
            failed_repairs: 0,
            created_at: Utc::now(),
        };
        self.store.create_user(user.clone()).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let invalid = || AppError::Authentication("Invalid email or password".to_string());

        let user = self.store.find_user_by_email(email.trim()).await?.ok_or_else(invalid)?;
        if !self.verify_password(&user, password)? {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }

        let token = self.create_token(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// All users, optionally restricted to one role
    pub async fn list_users(&self, actor: &Principal, role: Option<Role>) -> AppResult<Vec<User>> {
        actor
            .require(Action::ListUsers)
            .map_err(|r| rejected(Action::ListUsers, actor, r))?;
        self.store.list_users(role).await
    }

    /// Technicians, used to pick an assignee
    pub async fn list_technicians(&self) -> AppResult<Vec<User>> {
        self.store.list_users(Some(Role::Technician)).await
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            exp: (now + chrono::Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn service() -> UsersService {
        UsersService::new(Arc::new(MemoryStore::new()), AuthConfig::default())
    }

    fn registration(email: &str, role: Option<Role>) -> RegisterUser {
        RegisterUser {
            name: "Ayşe".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let users = service();
        let user = users.register(registration("Ayse@Hospital.test", None)).await.unwrap();
        assert_eq!(user.role, Role::HealthStaff);
        assert_eq!(user.email, "ayse@hospital.test");
        assert_ne!(user.password, "secret123");

        let (token, logged_in) = users.login("ayse@hospital.test", "secret123").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        let claims = UserClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.principal(), user.principal());

        assert_matches!(
            users.login("ayse@hospital.test", "wrong-password").await,
            Err(AppError::Authentication(_))
        );
        assert_matches!(
            users.login("nobody@hospital.test", "secret123").await,
            Err(AppError::Authentication(_))
        );
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let users = service();
        users.register(registration("a@hospital.test", None)).await.unwrap();
        assert_matches!(
            users.register(registration("A@hospital.test", None)).await,
            Err(AppError::Conflict(_))
        );
        assert_matches!(
            users.register(registration("not-an-email", None)).await,
            Err(AppError::Validation(_))
        );
    }

    #[tokio::test]
    async fn test_user_lists() {
        let users = service();
        let manager = users
            .register(registration("m@hospital.test", Some(Role::Manager)))
            .await
            .unwrap();
        let tech = users
            .register(registration("t@hospital.test", Some(Role::Technician)))
            .await
            .unwrap();

        assert_eq!(users.list_users(&manager.principal(), None).await.unwrap().len(), 2);
        assert_matches!(
            users.list_users(&tech.principal(), None).await,
            Err(AppError::Rejected(_))
        );
        let technicians = users.list_technicians().await.unwrap();
        assert_eq!(technicians.len(), 1);
        assert_eq!(technicians[0].id, tech.id);
    }
}
