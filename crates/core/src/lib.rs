//! Domain logic for the thermowatch temperature monitor.
//!
//! Everything in this crate is independent of the HTTP transport and the
//! database driver. Persistence, broadcasting and failure prediction are
//! reached through the collaborator traits in [`ingest`] and [`prediction`].

pub mod alert;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod prediction;
pub mod reading;
pub mod risk;
pub mod scripting;
pub mod types;
