use async_trait::async_trait;
use smart_parking::{
    config::AppConfig,
    models::user::{Role, UserLoginRequest, UserRegistrationRequest},
    services::user_service::UserService,
    store::ParkingStore,
    utils::{error::AppError, jwt},
};
use test_context::{test_context, AsyncTestContext};
use tokio::task::JoinSet;

mod common {
    pub mod test_utils;
}
use common::test_utils::{init_test_logging, TestStore};
use ctor::ctor;

#[ctor]
fn setup_logging() {
    init_test_logging();
}

struct UserServiceContext {
    db: TestStore,
    config: AppConfig,
    user_service: UserService,
}

#[async_trait]
impl AsyncTestContext for UserServiceContext {
    async fn setup() -> Self {
        let db = TestStore::new();
        let mut config = AppConfig::for_memory("user-service-secret");
        // cheapest cost bcrypt accepts
        config.bcrypt_cost = 4;
        let user_service = UserService::new(db.store.clone(), config.clone());

        UserServiceContext {
            db,
            config,
            user_service,
        }
    }
}

fn registration(username: &str) -> UserRegistrationRequest {
    UserRegistrationRequest {
        username: username.to_string(),
        password: "test_password123".to_string(),
        email: Some(format!("{}@example.com", username)),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
    }
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_user_registration_success(ctx: &UserServiceContext) {
    let user_id = ctx
        .user_service
        .register_user(registration("test_user_registration"))
        .await
        .unwrap()
        .id;

    assert!(user_id > 0, "User ID should be positive");

    let saved_user = ctx.db.store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(saved_user.username, "test_user_registration");
    assert_eq!(saved_user.role, Role::User);
    assert_ne!(saved_user.password, "test_password123", "password must be hashed");
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_duplicate_username_conflicts(ctx: &UserServiceContext) {
    ctx.user_service
        .register_user(registration("duplicate_user"))
        .await
        .unwrap();

    let result = ctx
        .user_service
        .register_user(registration("duplicate_user"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_registration_validation(ctx: &UserServiceContext) {
    let mut short = registration("ok_name");
    short.password = "123".to_string();
    assert!(matches!(
        ctx.user_service.register_user(short).await,
        Err(AppError::ValidationError(_))
    ));

    let mut bad_email = registration("other_name");
    bad_email.email = Some("not-an-email".to_string());
    assert!(matches!(
        ctx.user_service.register_user(bad_email).await,
        Err(AppError::ValidationError(_))
    ));
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_login_issues_token_for_user(ctx: &UserServiceContext) {
    let user_id = ctx
        .user_service
        .register_user(registration("login_user"))
        .await
        .unwrap()
        .id;

    let response = ctx
        .user_service
        .login_user(UserLoginRequest {
            username: "login_user".to_string(),
            password: "test_password123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.user_id, user_id);
    assert_eq!(response.role, Role::User);
    let claims = jwt::decode_token(&ctx.config, &response.token).unwrap();
    assert_eq!(claims.sub, user_id);
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_login_rejects_bad_credentials(ctx: &UserServiceContext) {
    ctx.user_service
        .register_user(registration("careful_user"))
        .await
        .unwrap();

    let wrong_password = ctx
        .user_service
        .login_user(UserLoginRequest {
            username: "careful_user".to_string(),
            password: "guess".to_string(),
        })
        .await;
    assert!(matches!(wrong_password, Err(AppError::AuthError(_))));

    let unknown = ctx
        .user_service
        .login_user(UserLoginRequest {
            username: "nobody".to_string(),
            password: "guess".to_string(),
        })
        .await;
    assert!(matches!(unknown, Err(AppError::AuthError(_))));
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_ensure_admin_is_idempotent(ctx: &UserServiceContext) {
    let first = ctx.user_service.ensure_admin("admin", "admin-pass").await.unwrap();
    let second = ctx.user_service.ensure_admin("admin", "other-pass").await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(first.is_admin());

    let login = ctx
        .user_service
        .login_user(UserLoginRequest {
            username: "admin".to_string(),
            password: "admin-pass".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.role, Role::Admin);
}

#[test_context(UserServiceContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_of_one_name(ctx: &UserServiceContext) {
    let mut join_set = JoinSet::new();
    for _ in 0..8 {
        let user_service = ctx.user_service.clone();
        join_set.spawn(async move { user_service.register_user(registration("racer")).await });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(result) = join_set.join_next().await {
        match result.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert!(ctx.db.store.get_user_by_username("racer").await.unwrap().is_some());
}

#[test_context(UserServiceContext)]
#[tokio::test]
async fn test_profile_lookup(ctx: &UserServiceContext) {
    let created = ctx
        .user_service
        .register_user(registration("profile_user"))
        .await
        .unwrap();
    assert_eq!(created.role, Role::User);

    let profile = ctx.user_service.get_profile(created.id).await.unwrap();
    assert_eq!(profile.username, "profile_user");
    assert_eq!(profile.email.as_deref(), Some("profile_user@example.com"));

    assert!(matches!(
        ctx.user_service.get_profile(9_999).await,
        Err(AppError::NotFound(_))
    ));
}
