//! Refresh-session lifecycle against a real database.

use chrono::{Duration, Utc};
use lao_cinema_core::types::DbId;
use lao_cinema_db::models::session::CreateSession;
use lao_cinema_db::models::user::CreateUser;
use lao_cinema_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

async fn user(pool: &PgPool) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "sessions@example.com".into(),
            password_hash: "not-a-real-hash".into(),
            display_name: None,
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn session(user_id: DbId, hash: &str, expires_in: Duration) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + expires_in,
        user_agent: Some("test".into()),
        ip_address: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_is_single_use(pool: PgPool) {
    let user_id = user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "h1", Duration::days(30)))
        .await
        .unwrap();

    let claimed = SessionRepo::claim(&pool, "h1", Utc::now()).await.unwrap();
    assert_eq!(claimed.map(|s| s.user_id), Some(user_id));
    assert!(SessionRepo::claim(&pool, "h1", Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_session_cannot_be_claimed(pool: PgPool) {
    let user_id = user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "old", Duration::minutes(5)))
        .await
        .unwrap();

    let later = Utc::now() + Duration::minutes(10);
    assert!(SessionRepo::claim(&pool, "old", later).await.unwrap().is_none());
    assert!(SessionRepo::claim(&pool, "unknown", Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoke_all_then_purge(pool: PgPool) {
    let user_id = user(&pool).await;
    for hash in ["a", "b"] {
        SessionRepo::create(&pool, &session(user_id, hash, Duration::days(30)))
            .await
            .unwrap();
    }
    SessionRepo::create(&pool, &session(user_id, "stale", -Duration::days(1)))
        .await
        .unwrap();

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 3);
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 0);

    // Only the expired row is older than the cutoff; revoked rows are recent.
    let purged = SessionRepo::purge_dead(&pool, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(purged, 1);

    let purged = SessionRepo::purge_dead(&pool, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(purged, 2);
}
