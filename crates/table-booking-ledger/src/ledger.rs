//! Implementation of the reservation ledger

use table_booking_core::{ReservationId, TableId, TableSpec};

use crate::error::{LedgerError, Result};
use crate::model::{Confirmation, Field, Reservation, ReservationDraft, ReservationPatch, Table};

const MISSING_DETAILS: &str = "Missing required reservation details.";
const INVALID_GUESTS: &str = "Guest count must be a positive number.";
const RESERVATION_NOT_FOUND: &str = "Reservation not found.";

/// Single authority over table occupancy and reservation records
///
/// A table is occupied if and only if exactly one reservation refers to it.
/// Only [`Ledger::reserve`] occupies a table and only [`Ledger::cancel`] frees
/// it again.
#[derive(Clone, Debug)]
pub struct Ledger {
    /// Tables in seed order
    tables: Vec<Table>,

    /// Live reservations, ordered by id
    reservations: Vec<Reservation>,

    /// Highest reservation id ever handed out, `0` before the first one
    last_issued: ReservationId,
}

impl Ledger {
    /// Create a [`Ledger`] with the given tables, all of them free
    ///
    /// The table ids are expected to be unique, see
    /// [`Config::validate()`](table_booking_core::Config::validate).
    pub fn new(tables: &[TableSpec]) -> Self {
        Self {
            tables: tables.iter().map(Table::new).collect(),
            reservations: Vec::new(),
            last_issued: 0,
        }
    }

    /// All tables, reserved or not
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Tables nobody has reserved, in seed order
    pub fn available_tables(&self) -> impl Iterator<Item = &Table> + '_ {
        self.tables.iter().filter(|t| !t.is_occupied())
    }

    /// All live reservations in creation order
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.position(id).map(|i| &self.reservations[i])
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id() == id)
    }

    fn position(&self, id: ReservationId) -> Option<usize> {
        // ids are issued in increasing order and removal keeps the order
        self.reservations.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Reserve a table
    ///
    /// Checks, in this order, that all fields are filled in, that the guest
    /// count is a positive integer, that the table exists, that it is free and
    /// that the party fits. The first failing check determines the error.
    pub fn reserve(&mut self, draft: ReservationDraft) -> Result<Confirmation> {
        let ReservationDraft {
            table_id,
            customer_name,
            guests,
            time,
        } = draft;

        let (Some(table_ref), Some(customer_name), Some(guests), Some(time)) = (
            table_id.filter(|t| !t.is_blank()),
            customer_name.filter(|n| !n.is_empty()),
            guests.filter(|g| !g.is_blank()),
            time.filter(|t| !t.is_empty()),
        ) else {
            return Err(LedgerError::Validation(MISSING_DETAILS.into()));
        };

        let guests = guests
            .positive()
            .ok_or_else(|| LedgerError::Validation(INVALID_GUESTS.into()))?;

        let table = table_ref
            .resolve()
            .and_then(|id| self.tables.iter_mut().find(|t| t.id() == id))
            .ok_or_else(|| LedgerError::NotFound(format!("Table {table_ref} not found.")))?;

        if table.is_occupied() {
            return Err(LedgerError::Conflict(format!(
                "Table {} is already reserved.",
                table.id()
            )));
        }

        if guests > table.capacity() {
            return Err(LedgerError::Capacity(format!(
                "Table {} only has capacity for {} guests. Cannot accommodate {guests} guests.",
                table.id(),
                table.capacity()
            )));
        }

        table.set_occupied(true);
        let table_id = table.id();

        self.last_issued += 1;
        let reservation = Reservation {
            id: self.last_issued,
            table_id,
            customer_name,
            guests,
            time,
        };
        self.reservations.push(reservation.clone());

        Ok(Confirmation {
            message: format!(
                "Table {table_id} reserved for {} ({guests} guests) at {}",
                reservation.customer_name, reservation.time
            ),
            reservation,
        })
    }

    /// Change the fields of a reservation that `patch` sets
    ///
    /// A new guest count must be a positive integer that fits the table. The
    /// name and time are stored as given. Nothing is written unless all checks
    /// pass.
    pub fn update(&mut self, id: ReservationId, patch: ReservationPatch) -> Result<Confirmation> {
        let index = self
            .position(id)
            .ok_or_else(|| LedgerError::NotFound(RESERVATION_NOT_FOUND.into()))?;

        let guests = match patch.guests.as_ref() {
            Field::Unset => None,
            Field::Set(size) => {
                let guests = size
                    .positive()
                    .ok_or_else(|| LedgerError::Validation(INVALID_GUESTS.into()))?;

                if let Some(table) = self.table(self.reservations[index].table_id) {
                    if guests > table.capacity() {
                        return Err(LedgerError::Capacity(format!(
                            "Table {} only has capacity for {} guests. Cannot update to {guests} guests.",
                            table.id(),
                            table.capacity()
                        )));
                    }
                }
                Some(guests)
            }
        };

        let reservation = &mut self.reservations[index];
        if let Some(guests) = guests {
            reservation.guests = guests;
        }
        if let Field::Set(name) = patch.customer_name {
            reservation.customer_name = name;
        }
        if let Field::Set(time) = patch.time {
            reservation.time = time;
        }

        Ok(Confirmation {
            message: format!("Reservation {id} updated successfully."),
            reservation: reservation.clone(),
        })
    }

    /// Remove a reservation and free its table
    ///
    /// The returned confirmation carries the reservation as it was before it
    /// got removed.
    pub fn cancel(&mut self, id: ReservationId) -> Result<Confirmation> {
        let index = self
            .position(id)
            .ok_or_else(|| LedgerError::NotFound(RESERVATION_NOT_FOUND.into()))?;

        let reservation = self.reservations.remove(index);
        if let Some(table) = self
            .tables
            .iter_mut()
            .find(|t| t.id() == reservation.table_id)
        {
            table.set_occupied(false);
        }

        Ok(Confirmation {
            message: format!("Reservation {id} canceled successfully."),
            reservation,
        })
    }
}
