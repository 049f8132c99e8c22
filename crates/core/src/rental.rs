//! Rental access resolution.
//!
//! A viewer may hold a direct rental for a movie and/or a rental for a pack
//! of shorts that contains it. The direct rental is consulted first; the pack
//! rental only counts when there is no playable direct rental. Expired
//! rentals are treated as absent. After `expires_at` a rental stays playable
//! for a configurable grace period, but it no longer blocks a new purchase.

use chrono::Duration;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Who owns a rental: a registered user or an anonymous visitor, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Renter {
    User(DbId),
    Anonymous(String),
}

impl Renter {
    pub fn user_id(&self) -> Option<DbId> {
        match self {
            Renter::User(id) => Some(*id),
            Renter::Anonymous(_) => None,
        }
    }

    pub fn anonymous_id(&self) -> Option<&str> {
        match self {
            Renter::User(_) => None,
            Renter::Anonymous(aid) => Some(aid),
        }
    }

    /// Key used for per-identity rate limiting.
    pub fn rate_limit_key(&self) -> String {
        match self {
            Renter::User(id) => format!("user:{id}"),
            Renter::Anonymous(aid) => format!("anon:{aid}"),
        }
    }
}

/// The latest paid rental found for a movie or pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalWindow {
    pub rental_id: DbId,
    pub expires_at: Timestamp,
    /// Set when the rental was for a pack rather than the movie itself.
    pub pack_id: Option<DbId>,
}

/// Where a rental sits relative to its expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Before `expires_at`.
    Active,
    /// In `[expires_at, expires_at + grace)`: playable, but renewable.
    Grace,
    /// At or after `expires_at + grace`.
    Expired,
}

impl AccessState {
    pub fn is_playable(self) -> bool {
        matches!(self, AccessState::Active | AccessState::Grace)
    }
}

/// Classify a rental expiry against `now`.
pub fn access_state(expires_at: Timestamp, now: Timestamp, grace: Duration) -> AccessState {
    if now < expires_at {
        AccessState::Active
    } else if now < expires_at + grace {
        AccessState::Grace
    } else {
        AccessState::Expired
    }
}

/// Expiry of a rental purchased at `now`.
pub fn rental_expiry(now: Timestamp, duration: Duration) -> Timestamp {
    now + duration
}

/// Result of resolving a viewer's access to a movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalAccess {
    None,
    Movie {
        rental_id: DbId,
        expires_at: Timestamp,
        state: AccessState,
    },
    Pack {
        rental_id: DbId,
        pack_id: DbId,
        expires_at: Timestamp,
        state: AccessState,
    },
}

impl RentalAccess {
    pub fn is_granted(&self) -> bool {
        !matches!(self, RentalAccess::None)
    }

    /// Last instant at which playback is still permitted.
    pub fn playable_until(&self, grace: Duration) -> Option<Timestamp> {
        match self {
            RentalAccess::None => None,
            RentalAccess::Movie { expires_at, .. } | RentalAccess::Pack { expires_at, .. } => {
                Some(*expires_at + grace)
            }
        }
    }
}

/// Resolve access from the latest direct and pack rentals.
///
/// Direct rental wins whenever it is playable; otherwise a playable pack
/// rental grants access; otherwise there is no access.
pub fn resolve_access(
    direct: Option<&RentalWindow>,
    pack: Option<&RentalWindow>,
    now: Timestamp,
    grace: Duration,
) -> RentalAccess {
    if let Some(rental) = direct {
        let state = access_state(rental.expires_at, now, grace);
        if state.is_playable() {
            return RentalAccess::Movie {
                rental_id: rental.rental_id,
                expires_at: rental.expires_at,
                state,
            };
        }
    }

    if let Some(rental) = pack {
        let state = access_state(rental.expires_at, now, grace);
        if let (true, Some(pack_id)) = (state.is_playable(), rental.pack_id) {
            return RentalAccess::Pack {
                rental_id: rental.rental_id,
                pack_id,
                expires_at: rental.expires_at,
                state,
            };
        }
    }

    RentalAccess::None
}

/// Whether an existing rental blocks buying another one for the same target.
///
/// Only rentals still before their expiry block; a rental in its grace
/// period may be renewed.
pub fn blocks_new_rental(existing: Option<&RentalWindow>, now: Timestamp) -> bool {
    existing.is_some_and(|r| now < r.expires_at)
}
