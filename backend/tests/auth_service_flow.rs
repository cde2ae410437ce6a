mod support;

use chrono::{Duration, Utc};
use moodreel_auth::{
    error::AppError,
    repositories::{account as account_repo, session as session_repo},
    services::auth::AuthService,
    utils::token::hash_token,
};
use support::{test_config, test_pool, test_profile, unique_key_hash};

async fn service() -> AuthService {
    let pool = test_pool().await;
    AuthService::new(pool, &test_config())
}

#[tokio::test]
async fn signup_returns_public_fields_only() {
    let service = service().await;
    let key_hash = unique_key_hash();

    let account = service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    assert_eq!(account.display_name, "Ann");
    assert!(account.last_login_at.is_none());

    let json = serde_json::to_value(&account).expect("serialize");
    assert!(json.get("key_hash").is_none());
}

#[tokio::test]
async fn signup_with_registered_key_conflicts_and_keeps_the_original() {
    let pool = test_pool().await;
    let service = AuthService::new(pool.clone(), &test_config());
    let key_hash = unique_key_hash();

    let original = service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("first signup");

    let err = service
        .signup(&key_hash, test_profile("Impostor"))
        .await
        .expect_err("second signup must conflict");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.to_string(), "this access key is already registered");

    let stored = account_repo::find_account_by_key_hash(&pool, &key_hash)
        .await
        .expect("query account")
        .expect("account exists");
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.display_name, "Ann");
}

#[tokio::test]
async fn login_with_unregistered_key_fails_with_generic_message() {
    let service = service().await;

    let err = service
        .login(&unique_key_hash(), false, None)
        .await
        .expect_err("unknown key must fail");

    assert!(matches!(err, AppError::Auth(_)));
    assert_eq!(err.to_string(), "invalid access key");
}

#[tokio::test]
async fn login_issues_a_verifiable_token() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service
        .login(&key_hash, false, Some("moodreel-web/1.0"))
        .await
        .expect("login");

    let verification = service.verify(&login.token).await.expect("verify");
    assert!(verification.valid);

    let claims = verification.claims.expect("claims present");
    assert_eq!(claims.sub, login.account.id);
    assert_eq!(claims.name, "Ann");
}

#[tokio::test]
async fn login_stamps_last_login() {
    let pool = test_pool().await;
    let service = AuthService::new(pool.clone(), &test_config());
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    service.login(&key_hash, false, None).await.expect("login");

    let account = account_repo::find_account_by_key_hash(&pool, &key_hash)
        .await
        .expect("query account")
        .expect("account exists");
    assert!(account.last_login_at.is_some());
}

#[tokio::test]
async fn remember_me_selects_the_long_ttl_class() {
    let pool = test_pool().await;
    let service = AuthService::new(pool.clone(), &test_config());
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let short = service.login(&key_hash, false, None).await.expect("login");
    let long = service.login(&key_hash, true, None).await.expect("login");

    let short_session = session_repo::find_session_by_token_hash(&pool, &hash_token(&short.token))
        .await
        .expect("query session")
        .expect("session exists");
    let long_session = session_repo::find_session_by_token_hash(&pool, &hash_token(&long.token))
        .await
        .expect("query session")
        .expect("session exists");

    assert!(!short_session.is_remembered);
    assert!(long_session.is_remembered);

    let now = Utc::now();
    assert!(short_session.expires_at - now < Duration::days(2));
    assert!(long_session.expires_at - now > Duration::days(29));
}

#[tokio::test]
async fn concurrent_sessions_per_account_are_permitted() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let first = service.login(&key_hash, false, None).await.expect("login");
    let second = service.login(&key_hash, false, None).await.expect("login");

    assert_ne!(first.token, second.token);
    assert!(service.verify(&first.token).await.expect("verify").valid);
    assert!(service.verify(&second.token).await.expect("verify").valid);
}

#[tokio::test]
async fn logout_revokes_an_otherwise_valid_token() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    service.logout(&login.token).await.expect("logout");

    // Signature and expiry claim still pass; the deleted session row wins.
    let verification = service.verify(&login.token).await.expect("verify");
    assert!(!verification.valid);
    assert!(verification.claims.is_none());
}

#[tokio::test]
async fn logout_is_idempotent_and_accepts_garbage() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    service.logout(&login.token).await.expect("first logout");
    service.logout(&login.token).await.expect("second logout");
    service
        .logout("never.a.token")
        .await
        .expect("logout of an unknown token");
}

#[tokio::test]
async fn verify_rejects_a_session_row_that_lapsed_early() {
    let pool = test_pool().await;
    let service = AuthService::new(pool.clone(), &test_config());
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");

    // Force the server-side record past its deadline while the token's own
    // expiry claim is still a day away.
    sqlx::query("UPDATE sessions SET expires_at = $1 WHERE token_hash = $2")
        .bind(Utc::now() - Duration::minutes(5))
        .bind(hash_token(&login.token))
        .execute(&pool)
        .await
        .expect("expire session row");

    let verification = service.verify(&login.token).await.expect("verify");
    assert!(!verification.valid);
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_the_predecessor() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    let refreshed = service
        .refresh(&login.token, None)
        .await
        .expect("refresh");

    assert_ne!(refreshed.token, login.token);
    assert_eq!(refreshed.account.id, login.account.id);

    let old = service.verify(&login.token).await.expect("verify old");
    let new = service.verify(&refreshed.token).await.expect("verify new");
    assert!(!old.valid);
    assert!(new.valid);
}

#[tokio::test]
async fn refresh_preserves_the_remember_me_class() {
    let pool = test_pool().await;
    let service = AuthService::new(pool.clone(), &test_config());
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, true, None).await.expect("login");
    let refreshed = service
        .refresh(&login.token, None)
        .await
        .expect("refresh");

    let session = session_repo::find_session_by_token_hash(&pool, &hash_token(&refreshed.token))
        .await
        .expect("query session")
        .expect("session exists");
    assert!(session.is_remembered);
    assert!(session.expires_at - Utc::now() > Duration::days(29));
}

#[tokio::test]
async fn refresh_with_a_garbage_token_fails() {
    let service = service().await;

    let err = service
        .refresh("never.a.token", None)
        .await
        .expect_err("garbage token must fail");
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn refresh_after_logout_is_rejected() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    service.logout(&login.token).await.expect("logout");

    let err = service
        .refresh(&login.token, None)
        .await
        .expect_err("a revoked token must not refresh");
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn refresh_twice_with_the_same_token_is_rejected() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    service
        .refresh(&login.token, None)
        .await
        .expect("first refresh");

    let err = service
        .refresh(&login.token, None)
        .await
        .expect_err("a rotated-out token must not refresh again");
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn login_then_logout_then_verify_scenario() {
    let service = service().await;
    let key_hash = unique_key_hash();
    service
        .signup(&key_hash, test_profile("Ann"))
        .await
        .expect("signup");

    let login = service.login(&key_hash, false, None).await.expect("login");
    assert!(service.verify(&login.token).await.expect("verify").valid);

    service.logout(&login.token).await.expect("logout");
    assert!(!service.verify(&login.token).await.expect("verify").valid);
}
