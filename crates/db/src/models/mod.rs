//! Row models and DTOs, one module per table family.

pub mod audit;
pub mod award;
pub mod credit;
pub mod genre;
pub mod homepage;
pub mod movie;
pub mod person;
pub mod production_company;
pub mod rental;
pub mod session;
pub mod short_pack;
pub mod trailer;
pub mod user;
pub mod watch_progress;
