//! Rental purchase, listing, access resolution and anonymous migration.
//!
//! A renter is either a signed-in user or an anonymous visitor with a signed
//! `X-Anonymous-Id`. Payment happens elsewhere; a rental records the payment
//! reference the client was given and is created as `completed`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use lao_cinema_core::audit::{action_types, entity_types};
use lao_cinema_core::error::CoreError;
use lao_cinema_core::rental::{
    access_state, rental_expiry, resolve_access, AccessState, RentalAccess, Renter,
};
use lao_cinema_core::types::{Cents, DbId};
use lao_cinema_core::validation::{validate_currency, validate_price_cents};
use lao_cinema_db::models::rental::{CreateRental, MigrationSummary, Rental};
use lao_cinema_db::repositories::{RentalRepo, ShortPackRepo};
use serde::{Deserialize, Serialize};

use super::auth::migrate_if_present;
use super::movies::load_visible_movie;
use super::not_found;
use crate::audit::{self, AuditEntry};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::viewer::{anonymous_id_from_headers, Viewer};
use crate::query::IncludeExpiredParams;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_PAYMENT_REFERENCE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /rentals`. Exactly one of `movie_id` / `pack_id`.
#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub movie_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub payment_reference: Option<String>,
    /// Optional echo of the price the client was shown; must equal the
    /// catalogue price.
    pub amount_cents: Option<Cents>,
    /// Optional; must equal the catalogue currency.
    pub currency: Option<String>,
}

/// A rental plus where it sits relative to its expiry.
#[derive(Debug, Serialize)]
pub struct RentalView {
    #[serde(flatten)]
    pub rental: Rental,
    pub state: AccessState,
}

/// Body of `GET /movies/{id}/access`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccessResponse {
    /// `none`, `movie` or `pack`.
    pub access: &'static str,
    pub rental_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Last instant playback is allowed (expiry plus grace period).
    pub playable_until: Option<DateTime<Utc>>,
    pub in_grace_period: bool,
}

impl AccessResponse {
    pub fn from_access(access: &RentalAccess, grace: chrono::Duration) -> Self {
        let playable_until = access.playable_until(grace);
        match access {
            RentalAccess::None => AccessResponse {
                access: "none",
                rental_id: None,
                pack_id: None,
                expires_at: None,
                playable_until,
                in_grace_period: false,
            },
            RentalAccess::Movie {
                rental_id,
                expires_at,
                state,
            } => AccessResponse {
                access: "movie",
                rental_id: Some(*rental_id),
                pack_id: None,
                expires_at: Some(*expires_at),
                playable_until,
                in_grace_period: *state == AccessState::Grace,
            },
            RentalAccess::Pack {
                rental_id,
                pack_id,
                expires_at,
                state,
            } => AccessResponse {
                access: "pack",
                rental_id: Some(*rental_id),
                pack_id: Some(*pack_id),
                expires_at: Some(*expires_at),
                playable_until,
                in_grace_period: *state == AccessState::Grace,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve `renter`'s access to a movie: direct rental first, then any pack
/// containing the movie.
pub(crate) async fn resolve_movie_access(
    state: &AppState,
    renter: &Renter,
    movie_id: DbId,
    now: DateTime<Utc>,
) -> AppResult<RentalAccess> {
    let direct = RentalRepo::find_latest_direct(&state.pool, renter, movie_id)
        .await?
        .map(|r| r.window());
    let pack = RentalRepo::find_latest_pack_for_movie(&state.pool, renter, movie_id)
        .await?
        .map(|r| r.window());

    Ok(resolve_access(
        direct.as_ref(),
        pack.as_ref(),
        now,
        state.config.rentals.grace_period,
    ))
}

/// What is being rented, with its catalogue price.
struct RentalTarget {
    movie_id: Option<DbId>,
    pack_id: Option<DbId>,
    price_cents: Option<Cents>,
    currency: String,
    duration: chrono::Duration,
}

impl RentalTarget {
    /// The catalogue price; a target without one is free.
    fn amount_cents(&self) -> Cents {
        self.price_cents.unwrap_or(0)
    }

    /// Client-supplied payment details must agree with the catalogue.
    fn check_payment(&self, amount_cents: Option<Cents>, currency: Option<&str>) -> AppResult<()> {
        if amount_cents.is_some_and(|a| a != self.amount_cents()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "amount_cents does not match the price of {} cents",
                self.amount_cents()
            ))));
        }
        if currency.is_some_and(|c| c != self.currency) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "currency does not match the catalogue currency {}",
                self.currency
            ))));
        }
        Ok(())
    }
}

async fn load_target(
    state: &AppState,
    viewer: &Viewer,
    input: &CreateRentalRequest,
) -> AppResult<RentalTarget> {
    match (input.movie_id, input.pack_id) {
        (Some(movie_id), None) => {
            let movie = load_visible_movie(state, viewer, movie_id).await?;
            Ok(RentalTarget {
                movie_id: Some(movie.id),
                pack_id: None,
                price_cents: movie.rental_price_cents,
                currency: movie.currency,
                duration: state.config.rentals.movie_duration,
            })
        }
        (None, Some(pack_id)) => {
            let pack = ShortPackRepo::find_by_id(&state.pool, pack_id)
                .await?
                .filter(|p| p.is_published || viewer.can_edit())
                .ok_or_else(|| not_found("ShortPack", pack_id))?;
            Ok(RentalTarget {
                movie_id: None,
                pack_id: Some(pack.id),
                price_cents: pack.price_cents,
                currency: pack.currency,
                duration: state.config.rentals.pack_duration,
            })
        }
        _ => Err(AppError::Core(CoreError::Validation(
            "Exactly one of movie_id or pack_id is required".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/rentals
///
/// Record a paid rental at the catalogue price. A client-sent amount or
/// currency that disagrees with the catalogue is a 400. Renting something
/// the caller already holds an active (not merely in-grace) rental for is a
/// 409.
pub async fn create_rental(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(input): Json<CreateRentalRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RentalView>>)> {
    let renter = viewer.require_renter()?;

    validate_price_cents(input.amount_cents)?;
    if let Some(currency) = input.currency.as_deref() {
        validate_currency(currency)?;
    }
    let payment_reference = input
        .payment_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    if payment_reference
        .as_ref()
        .is_some_and(|r| r.len() > MAX_PAYMENT_REFERENCE_LEN)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "payment_reference must be at most {MAX_PAYMENT_REFERENCE_LEN} characters"
        ))));
    }

    let target = load_target(&state, &viewer, &input).await?;
    target.check_payment(input.amount_cents, input.currency.as_deref())?;

    let now = Utc::now();
    let rental = RentalRepo::create_if_no_active(
        &state.pool,
        &renter,
        &CreateRental {
            user_id: renter.user_id(),
            anonymous_id: renter.anonymous_id().map(str::to_string),
            movie_id: target.movie_id,
            pack_id: target.pack_id,
            payment_reference,
            amount_cents: target.amount_cents(),
            currency: target.currency.clone(),
            purchased_at: now,
            expires_at: rental_expiry(now, target.duration),
        },
        now,
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::Conflict("An active rental already exists".into())))?;

    tracing::info!(
        rental_id = rental.id,
        movie_id = ?rental.movie_id,
        pack_id = ?rental.pack_id,
        renter = %renter.rate_limit_key(),
        "Rental created"
    );
    audit::record(
        &state.pool,
        AuditEntry::new(action_types::RENTAL_CREATE)
            .by(renter.user_id())
            .entity(entity_types::RENTAL, rental.id)
            .details(serde_json::json!({
                "movie_id": rental.movie_id,
                "pack_id": rental.pack_id,
                "anonymous_id": rental.anonymous_id,
                "amount_cents": rental.amount_cents,
                "currency": rental.currency,
            }))
            .ip(viewer.client_ip.clone()),
    )
    .await;

    let view = RentalView {
        state: access_state(rental.expires_at, now, state.config.rentals.grace_period),
        rental,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/rentals
///
/// The caller's rentals, newest first. Rentals past their grace period are
/// hidden unless `?include_expired=true`.
pub async fn list_rentals(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<IncludeExpiredParams>,
) -> AppResult<Json<DataResponse<Vec<RentalView>>>> {
    let renter = viewer.require_renter()?;
    let now = Utc::now();
    let grace = state.config.rentals.grace_period;

    let rentals =
        RentalRepo::list_for_renter(&state.pool, &renter, params.include_expired, now - grace)
            .await?;

    let views = rentals
        .into_iter()
        .map(|rental| RentalView {
            state: access_state(rental.expires_at, now, grace),
            rental,
        })
        .collect();
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/movies/{id}/access
///
/// Guests always get `none`.
pub async fn movie_access(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(movie_id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccessResponse>>> {
    load_visible_movie(&state, &viewer, movie_id).await?;

    let access = match viewer.renter() {
        Some(renter) => resolve_movie_access(&state, &renter, movie_id, Utc::now()).await?,
        None => RentalAccess::None,
    };

    Ok(Json(DataResponse {
        data: AccessResponse::from_access(&access, state.config.rentals.grace_period),
    }))
}

/// POST /api/v1/rentals/migrate
///
/// Move the rentals and watch progress of the anonymous id in
/// `X-Anonymous-Id` to the signed-in user.
pub async fn migrate(
    State(state): State<AppState>,
    auth_user: AuthUser,
    headers: axum::http::HeaderMap,
) -> AppResult<Json<DataResponse<MigrationSummary>>> {
    let anonymous_id = anonymous_id_from_headers(&headers, &state)?.ok_or_else(|| {
        AppError::BadRequest("X-Anonymous-Id header is required".into())
    })?;

    let summary = migrate_if_present(&state, Some(&anonymous_id), auth_user.user_id, &headers)
        .await?
        .unwrap_or_default();

    Ok(Json(DataResponse { data: summary }))
}
