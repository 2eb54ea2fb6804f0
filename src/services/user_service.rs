use crate::config::AppConfig;
use crate::models::user::{
    NewUser, Role, User, UserLoginRequest, UserLoginResponse, UserProfile,
    UserRegistrationRequest,
};
use crate::store::SharedStore;
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;
use bcrypt::{hash, verify};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
    config: AppConfig,
}

impl UserService {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        UserService { store, config }
    }

    // Register a new user
    pub async fn register_user(&self, request: UserRegistrationRequest) -> AppResult<UserProfile> {
        request.validate()?;
        let user = self
            .insert_user(
                request.username,
                &request.password,
                request.email,
                request.first_name,
                request.last_name,
                Role::User,
            )
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user.into())
    }

    // Login user
    pub async fn login_user(&self, request: UserLoginRequest) -> AppResult<UserLoginResponse> {
        let user = self
            .store
            .get_user_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        // Verify password
        let password_matches = verify(request.password.as_bytes(), &user.password)?;

        if !password_matches {
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        let token = jwt::generate_token(&self.config, user.id, user.role)?;

        Ok(UserLoginResponse {
            token,
            user_id: user.id,
            role: user.role,
        })
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserProfile> {
        self.store
            .get_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Creates the configured administrator unless the username is taken.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<User> {
        if let Some(existing) = self.store.get_user_by_username(username).await? {
            if !existing.is_admin() {
                tracing::warn!(username, "bootstrap admin name belongs to a regular user");
            }
            return Ok(existing);
        }

        let user = self
            .insert_user(username.to_string(), password, None, None, None, Role::Admin)
            .await?;
        tracing::info!(user_id = user.id, username, "administrator account created");
        Ok(user)
    }

    async fn insert_user(
        &self,
        username: String,
        password: &str,
        email: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        role: Role,
    ) -> AppResult<User> {
        // Check if username already exists
        if self.store.get_user_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".into()));
        }

        // Hash password
        let hashed_password = hash(password.as_bytes(), self.config.bcrypt_cost)?;

        self.store
            .create_user(NewUser {
                username,
                password: hashed_password,
                email,
                first_name,
                last_name,
                role,
            })
            .await
    }
}
