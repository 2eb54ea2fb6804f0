use crate::models::user::{
    RegisterResponse, UserLoginRequest, UserLoginResponse, UserProfile, UserRegistrationRequest,
};
use crate::services::user_service::UserService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Create a driver account
#[openapi(tag = "Users")]
#[post("/register", format = "json", data = "<request>")]
pub async fn register(
    request: Json<UserRegistrationRequest>,
    user_service: &State<UserService>,
) -> Result<Created<Json<RegisterResponse>>, AppError> {
    let profile = user_service.register_user(request.into_inner()).await?;
    Ok(Created::new("/api/me").body(Json(RegisterResponse {
        user_id: profile.id,
        role: profile.role,
    })))
}

/// Exchange credentials for a bearer token
#[openapi(tag = "Users")]
#[post("/login", format = "json", data = "<request>")]
pub async fn login(
    request: Json<UserLoginRequest>,
    user_service: &State<UserService>,
) -> Result<Json<UserLoginResponse>, AppError> {
    Ok(Json(user_service.login_user(request.into_inner()).await?))
}

/// Profile of the calling account
#[openapi(tag = "Users")]
#[get("/me")]
pub async fn me(
    auth: AuthenticatedUser,
    user_service: &State<UserService>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(user_service.get_profile(auth.user_id).await?))
}
