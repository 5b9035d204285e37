//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod temperature_repo;

pub use alert_repo::AlertRepo;
pub use temperature_repo::TemperatureRepo;
