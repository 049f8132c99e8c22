//! Repository tests for rentals, pack access and anonymous migration.

use chrono::{Duration, Utc};
use lao_cinema_core::progress;
use lao_cinema_core::rental::{resolve_access, RentalAccess, Renter};
use lao_cinema_db::models::movie::CreateMovie;
use lao_cinema_db::models::rental::CreateRental;
use lao_cinema_db::models::short_pack::{AddPackItem, CreateShortPack};
use lao_cinema_db::models::user::CreateUser;
use lao_cinema_db::repositories::{
    MovieRepo, RentalRepo, ShortPackRepo, UserRepo, WatchProgressRepo,
};
use sqlx::PgPool;

const ANON: &str = "b9a1c2d4-0000-4000-8000-000000000001";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn movie(pool: &PgPool, slug: &str) -> i64 {
    MovieRepo::create(
        pool,
        &CreateMovie {
            slug: slug.to_string(),
            original_title: None,
            original_language: None,
            release_date: None,
            runtime_minutes: Some(15),
            status: Some("published".into()),
            video_path: Some(format!("movies/{slug}/master.m3u8")),
            rental_price_cents: Some(199),
            currency: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".into(),
            display_name: None,
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn pack_with(pool: &PgPool, slug: &str, movie_ids: &[i64]) -> i64 {
    let pack = ShortPackRepo::create(
        pool,
        &CreateShortPack {
            slug: slug.to_string(),
            price_cents: Some(499),
            currency: None,
            poster_path: None,
            is_published: true,
            translations: vec![],
        },
    )
    .await
    .unwrap();
    for &movie_id in movie_ids {
        ShortPackRepo::add_item(
            pool,
            pack.id,
            &AddPackItem {
                movie_id,
                display_order: None,
            },
        )
        .await
        .unwrap();
    }
    pack.id
}

fn rental(renter: &Renter, movie_id: Option<i64>, pack_id: Option<i64>, expires_in: Duration) -> CreateRental {
    let purchased_at = Utc::now() - Duration::days(10);
    CreateRental {
        user_id: renter.user_id(),
        anonymous_id: renter.anonymous_id().map(str::to_string),
        movie_id,
        pack_id,
        payment_reference: Some("test-payment".into()),
        amount_cents: 199,
        currency: "USD".into(),
        purchased_at,
        expires_at: Utc::now() + expires_in,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_latest_direct_rental_is_returned(pool: PgPool) {
    let movie_id = movie(&pool, "direct").await;
    let renter = Renter::User(user(&pool, "a@example.com").await);

    RentalRepo::create(&pool, &rental(&renter, Some(movie_id), None, -Duration::days(2)))
        .await
        .unwrap();
    let newer = RentalRepo::create(&pool, &rental(&renter, Some(movie_id), None, Duration::hours(3)))
        .await
        .unwrap();

    let found = RentalRepo::find_latest_direct(&pool, &renter, movie_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, newer.id);

    let stranger = Renter::Anonymous(ANON.into());
    assert!(RentalRepo::find_latest_direct(&pool, &stranger, movie_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_rentals_insert_only_once(pool: PgPool) {
    let movie_id = movie(&pool, "racing").await;
    let renter = Renter::Anonymous(ANON.into());
    let input = rental(&renter, Some(movie_id), None, Duration::days(2));
    let now = Utc::now();

    let (first, second) = tokio::join!(
        RentalRepo::create_if_no_active(&pool, &renter, &input, now),
        RentalRepo::create_if_no_active(&pool, &renter, &input, now),
    );
    let outcomes = [first.unwrap(), second.unwrap()];
    assert_eq!(outcomes.iter().filter(|r| r.is_some()).count(), 1);
    assert_eq!(outcomes.iter().filter(|r| r.is_none()).count(), 1);

    let listed = RentalRepo::list_for_renter(&pool, &renter, true, now).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lapsed_rental_does_not_block_a_new_one(pool: PgPool) {
    let movie_id = movie(&pool, "renewed").await;
    let pack_id = pack_with(&pool, "renewed-pack", &[movie_id]).await;
    let renter = Renter::User(user(&pool, "renew@example.com").await);

    RentalRepo::create(&pool, &rental(&renter, Some(movie_id), None, -Duration::minutes(5)))
        .await
        .unwrap();
    let renewed = RentalRepo::create_if_no_active(
        &pool,
        &renter,
        &rental(&renter, Some(movie_id), None, Duration::days(2)),
        Utc::now(),
    )
    .await
    .unwrap();
    assert!(renewed.is_some());

    // A direct rental does not block renting a pack that contains the movie.
    let pack = RentalRepo::create_if_no_active(
        &pool,
        &renter,
        &rental(&renter, None, Some(pack_id), Duration::days(7)),
        Utc::now(),
    )
    .await
    .unwrap();
    assert!(pack.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pack_rental_grants_access_to_members_only(pool: PgPool) {
    let inside = movie(&pool, "inside").await;
    let outside = movie(&pool, "outside").await;
    let pack_id = pack_with(&pool, "shorts-1", &[inside]).await;
    let renter = Renter::Anonymous(ANON.into());

    RentalRepo::create(&pool, &rental(&renter, None, Some(pack_id), Duration::days(3)))
        .await
        .unwrap();

    let via_pack = RentalRepo::find_latest_pack_for_movie(&pool, &renter, inside)
        .await
        .unwrap()
        .map(|r| r.window());
    let access = resolve_access(None, via_pack.as_ref(), Utc::now(), Duration::hours(2));
    assert!(matches!(access, RentalAccess::Pack { pack_id: p, .. } if p == pack_id));

    assert!(RentalRepo::find_latest_pack_for_movie(&pool, &renter, outside)
        .await
        .unwrap()
        .is_none());
    assert!(RentalRepo::find_latest_for_pack(&pool, &renter, pack_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_completed_payments_are_ignored(pool: PgPool) {
    let movie_id = movie(&pool, "refunded").await;
    let renter = Renter::Anonymous(ANON.into());
    let created = RentalRepo::create(&pool, &rental(&renter, Some(movie_id), None, Duration::days(1)))
        .await
        .unwrap();
    sqlx::query("UPDATE rentals SET payment_status = 'refunded' WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(RentalRepo::find_latest_direct(&pool, &renter, movie_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rental_owner_and_target_are_exclusive(pool: PgPool) {
    let movie_id = movie(&pool, "both").await;
    let user_id = user(&pool, "both@example.com").await;
    let mut input = rental(&Renter::User(user_id), Some(movie_id), None, Duration::days(1));
    input.anonymous_id = Some(ANON.into());

    let err = RentalRepo::create(&pool, &input).await.unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("ck_rentals_owner")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_for_renter_hides_expired_unless_asked(pool: PgPool) {
    let a = movie(&pool, "list-a").await;
    let b = movie(&pool, "list-b").await;
    let renter = Renter::Anonymous(ANON.into());
    RentalRepo::create(&pool, &rental(&renter, Some(a), None, Duration::days(1)))
        .await
        .unwrap();
    RentalRepo::create(&pool, &rental(&renter, Some(b), None, -Duration::days(1)))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::hours(2);
    let current = RentalRepo::list_for_renter(&pool, &renter, false, cutoff)
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].movie_id, Some(a));

    let all = RentalRepo::list_for_renter(&pool, &renter, true, cutoff)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_migrate_anonymous_moves_rentals_and_merges_progress(pool: PgPool) {
    let a = movie(&pool, "migrate-a").await;
    let b = movie(&pool, "migrate-b").await;
    let user_id = user(&pool, "new@example.com").await;
    let anon = Renter::Anonymous(ANON.into());
    let registered = Renter::User(user_id);

    RentalRepo::create(&pool, &rental(&anon, Some(a), None, Duration::days(1)))
        .await
        .unwrap();

    // The user watched `a` earlier; the anonymous session watched it later.
    WatchProgressRepo::upsert(&pool, &registered, a, &progress::normalize(100.0, 1000.0).unwrap())
        .await
        .unwrap();
    sqlx::query("UPDATE watch_progress SET updated_at = NOW() - INTERVAL '1 day' WHERE user_id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();
    WatchProgressRepo::upsert(&pool, &anon, a, &progress::normalize(600.0, 1000.0).unwrap())
        .await
        .unwrap();
    WatchProgressRepo::upsert(&pool, &anon, b, &progress::normalize(30.0, 900.0).unwrap())
        .await
        .unwrap();

    let summary = RentalRepo::migrate_anonymous(&pool, ANON, user_id)
        .await
        .unwrap();
    assert_eq!(summary.rentals, 1);
    assert_eq!(summary.watch_progress, 2);

    assert!(RentalRepo::find_latest_direct(&pool, &registered, a)
        .await
        .unwrap()
        .is_some());
    assert!(RentalRepo::find_latest_direct(&pool, &anon, a)
        .await
        .unwrap()
        .is_none());

    let merged = WatchProgressRepo::find(&pool, &registered, a)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(merged.position_secs, 600.0);
    assert!(WatchProgressRepo::find(&pool, &registered, b)
        .await
        .unwrap()
        .is_some());

    let leftover: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM watch_progress WHERE anonymous_id = $1")
            .bind(ANON)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(leftover, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_progress_upsert_and_continue_watching(pool: PgPool) {
    let a = movie(&pool, "progress-a").await;
    let b = movie(&pool, "progress-b").await;
    let renter = Renter::Anonymous(ANON.into());

    WatchProgressRepo::upsert(&pool, &renter, a, &progress::normalize(10.0, 100.0).unwrap())
        .await
        .unwrap();
    let updated =
        WatchProgressRepo::upsert(&pool, &renter, a, &progress::normalize(50.0, 100.0).unwrap())
            .await
            .unwrap();
    assert_eq!(updated.position_secs, 50.0);
    WatchProgressRepo::upsert(&pool, &renter, b, &progress::normalize(95.0, 100.0).unwrap())
        .await
        .unwrap();

    let rows = WatchProgressRepo::continue_watching(&pool, &renter, 10)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].movie_id, a);
}
