//! 🍽 The reservation ledger and the request handler in front of it.
//!
//! The [ledger] owns all tables and reservations and enforces the rules that
//! keep the two in lockstep. The [dispatcher] decodes requests, serializes
//! access to the ledger and maps outcomes to HTTP statuses.

use table_booking_core::{Config, ConfigError};

pub mod dispatcher;
pub mod error;
pub mod ledger;
pub mod model;

pub use dispatcher::Dispatcher;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use model::{
    Confirmation, Field, PartySize, Reservation, ReservationDraft, ReservationPatch, Table,
    TableRef,
};

/// Entrypoint of the table booking system
///
/// Validates the configuration, seeds a [`Ledger`] with its tables and wraps
/// it in a [`Dispatcher`] which the surrounding infrastructure serves requests
/// to.
pub fn launch(config: &Config) -> Result<Dispatcher, ConfigError> {
    config.validate()?;

    let ledger = Ledger::new(&config.tables);
    tracing::info!(tables = config.tables.len(), "ledger seeded");
    Ok(Dispatcher::new(ledger))
}
