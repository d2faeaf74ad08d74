//! User service: registration, login, bootstrap accounts.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use resolveit_common::{AppError, AppResult, IdGenerator, JwtKeys};
use resolveit_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    jwt_keys: JwtKeys,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    /// Full display name.
    #[validate(length(min = 1, max = 256, message = "Full name is required"))]
    pub full_name: String,

    /// Login email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    /// Plain-text password, hashed before storage.
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Login email.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    /// Plain-text password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, jwt_keys: JwtKeys) -> Self {
        Self {
            user_repo,
            jwt_keys,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a regular user account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        self.create_with_role(input, Role::User).await
    }

    /// Bootstrap an admin account.
    pub async fn create_admin(&self, input: RegisterInput) -> AppResult<user::Model> {
        self.create_with_role(input, Role::Admin).await
    }

    /// Bootstrap a staff account.
    pub async fn create_staff(&self, input: RegisterInput) -> AppResult<user::Model> {
        self.create_with_role(input, Role::Staff).await
    }

    /// Create an account with an explicit role.
    ///
    /// The unique index on email turns duplicate registrations into a 409.
    pub async fn create_with_role(
        &self,
        input: RegisterInput,
        role: Role,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            full_name: Set(input.full_name.trim().to_string()),
            email: Set(input.email.trim().to_lowercase()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, email = %user.email, role = ?user.role, "Created user");
        Ok(user)
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, input: LoginInput) -> AppResult<(user::Model, String)> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();

        // Same error for unknown email and bad password.
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.jwt_keys.issue(&user.email)?;
        Ok((user, token))
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_email(email).await
    }

    /// List staff members (assignment picker).
    pub async fn list_staff(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_by_role(Role::Staff).await
    }

    /// List escalation authorities: managers and admins.
    pub async fn list_authorities(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo
            .find_by_roles(&[Role::Manager, Role::Admin])
            .await
    }
}

/// Hash a password with argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("secret-password").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("secret-password").unwrap();
        assert!(verify_password("secret-password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_wrong() {
        let hash = hash_password("secret-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            full_name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            full_name: "Alice Example".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
