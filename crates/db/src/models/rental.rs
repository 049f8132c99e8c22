//! Rental rows and DTOs.

use lao_cinema_core::rental::RentalWindow;
use lao_cinema_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Payment states. Must match `ck_rentals_payment_status`.
pub mod payment_status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const REFUNDED: &str = "refunded";
}

/// A row from the `rentals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rental {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub anonymous_id: Option<String>,
    pub movie_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub payment_reference: Option<String>,
    pub amount_cents: Cents,
    pub currency: String,
    pub payment_status: String,
    pub purchased_at: Timestamp,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Rental {
    pub fn window(&self) -> RentalWindow {
        RentalWindow {
            rental_id: self.id,
            expires_at: self.expires_at,
            pack_id: self.pack_id,
        }
    }
}

/// Insert payload. The owner and target are each exactly one of two columns;
/// the check constraints reject anything else.
#[derive(Debug, Clone)]
pub struct CreateRental {
    pub user_id: Option<DbId>,
    pub anonymous_id: Option<String>,
    pub movie_id: Option<DbId>,
    pub pack_id: Option<DbId>,
    pub payment_reference: Option<String>,
    pub amount_cents: Cents,
    pub currency: String,
    pub purchased_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Row counts moved by an anonymous-to-user migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub rentals: u64,
    pub watch_progress: u64,
}
