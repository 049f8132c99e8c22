//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod award_repo;
pub mod credit_repo;
mod filter;
pub mod genre_repo;
pub mod homepage_repo;
pub mod movie_repo;
pub mod person_repo;
pub mod production_company_repo;
pub mod rental_repo;
pub mod session_repo;
pub mod short_pack_repo;
pub mod trailer_repo;
pub mod user_repo;
pub mod watch_progress_repo;

pub use audit_repo::AuditLogRepo;
pub use award_repo::AwardRepo;
pub use credit_repo::CreditRepo;
pub use genre_repo::GenreRepo;
pub use homepage_repo::HomepageRepo;
pub use movie_repo::MovieRepo;
pub use person_repo::PersonRepo;
pub use production_company_repo::ProductionCompanyRepo;
pub use rental_repo::RentalRepo;
pub use session_repo::SessionRepo;
pub use short_pack_repo::ShortPackRepo;
pub use trailer_repo::TrailerRepo;
pub use user_repo::UserRepo;
pub use watch_progress_repo::WatchProgressRepo;
