//! Implementation of the request dispatcher
use parking_lot::Mutex;
use table_booking_core::{BodyError, Request, RequestHandler, RequestKind, ReservationId};
use tracing::{debug, info, info_span};

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::model::{ReservationDraft, ReservationPatch, Table};

/// Request handler in front of the [`Ledger`]
///
/// Every ledger operation runs with the lock held from validation to
/// mutation, so concurrent requests on the same table cannot interleave.
/// Payloads are decoded and responses are sent outside the lock.
pub struct Dispatcher {
    ledger: Mutex<Ledger>,
}

impl Dispatcher {
    /// Create a new [`Dispatcher`]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }

    /// Run `f` on the ledger while holding the lock
    pub fn inspect<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.ledger.lock())
    }

    fn reserve(&self, mut rq: Request) {
        let draft: ReservationDraft = match rq.read_json() {
            Ok(draft) => draft,
            Err(err) => return reject_body(rq, err),
        };

        let outcome = self.ledger.lock().reserve(draft);
        match outcome {
            Ok(confirmation) => {
                info!(
                    reservation = confirmation.reservation.id,
                    table = confirmation.reservation.table_id,
                    guests = confirmation.reservation.guests,
                    "reservation created"
                );
                rq.respond_with_json(201, &confirmation);
            }
            Err(err) => reject(rq, err),
        }
    }

    fn update(&self, mut rq: Request, id: Option<ReservationId>) {
        let Some(id) = id else {
            return reject(rq, LedgerError::NotFound("Reservation not found.".into()));
        };
        let patch: ReservationPatch = match rq.read_json() {
            Ok(patch) => patch,
            Err(err) => return reject_body(rq, err),
        };

        let outcome = self.ledger.lock().update(id, patch);
        match outcome {
            Ok(confirmation) => {
                info!(reservation = id, "reservation updated");
                rq.respond_with_json(200, &confirmation);
            }
            Err(err) => reject(rq, err),
        }
    }

    fn cancel(&self, rq: Request, id: Option<ReservationId>) {
        let Some(id) = id else {
            return reject(rq, LedgerError::NotFound("Reservation not found.".into()));
        };

        let outcome = self.ledger.lock().cancel(id);
        match outcome {
            Ok(confirmation) => {
                info!(
                    reservation = id,
                    table = confirmation.reservation.table_id,
                    "reservation canceled"
                );
                rq.respond_with_message(200, confirmation.message);
            }
            Err(err) => reject(rq, err),
        }
    }
}

impl RequestHandler for Dispatcher {
    fn handle(&self, rq: Request) {
        let span = info_span!(
            "request",
            id = %rq.id(),
            method = %rq.method(),
            url = rq.url()
        );
        let _guard = span.enter();

        match *rq.kind() {
            RequestKind::ListTables => {
                let tables: Vec<Table> = self.ledger.lock().available_tables().cloned().collect();
                rq.respond_with_json(200, &tables);
            }
            RequestKind::ListReservations => {
                let reservations = self.ledger.lock().reservations().to_vec();
                rq.respond_with_json(200, &reservations);
            }
            RequestKind::Reserve => self.reserve(rq),
            RequestKind::Update(id) => self.update(rq, id),
            RequestKind::Cancel(id) => self.cancel(rq, id),
        }
    }

    fn shutdown(self) {
        let ledger = self.ledger.into_inner();
        info!(
            reservations = ledger.reservations().len(),
            available_tables = ledger.available_tables().count(),
            "ledger shut down"
        );
    }
}

/// Respond with the status and message of a refused operation
fn reject(rq: Request, err: LedgerError) {
    debug!(kind = err.kind(), message = err.message(), "request refused");
    rq.respond_with_message(err.status(), err.message());
}

fn reject_body(rq: Request, err: BodyError) {
    debug!(%err, "malformed request body");
    rq.respond_with_message(400, format!("Malformed request body: {err}"));
}
