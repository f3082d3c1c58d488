use eyre::Result;
use table_booking_core::{Config, TableSpec};
use table_booking_ledger::Ledger;

mod api;
pub use api::{Api, ApiError, ApiResponse, Message, RequestOptions};

pub struct TestCtxBuilder {
    /// Tables the ledger is seeded with
    pub tables: Vec<TableSpec>,
    /// Count of worker threads feeding the dispatcher
    pub worker_threads: u16,
}

impl Default for TestCtxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCtxBuilder {
    /// Create a new test context builder with the default five tables
    pub fn new() -> Self {
        TestCtxBuilder {
            tables: Config::default().tables,
            worker_threads: 2,
        }
    }

    /// Replace the seed tables
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = TableSpec>) -> Self {
        self.tables = tables.into_iter().collect();
        self
    }

    /// Set the number of worker threads to use
    pub fn with_worker_threads(mut self, threads: u16) -> Self {
        assert_ne!(threads, 0);
        self.worker_threads = threads;
        self
    }

    /// Get the [`Config`] for launching the table booking system
    fn config(&self) -> Config {
        Config {
            tables: self.tables.clone(),
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let (dispatcher, api) = api::mock::start(self.worker_threads, self.config()).await?;

        Ok(TestCtx {
            api,
            dispatcher,
            tables: self.tables,
            drop_bomb: DropBomb,
        })
    }
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the table booking system
    pub api: Api,
    dispatcher: api::mock::MockDispatcher,
    /// Tables the ledger was seeded with
    pub tables: Vec<TableSpec>,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Look at the ledger behind the API
    pub fn inspect<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        self.dispatcher.inspect(f)
    }

    /// Number of requests each worker thread has handled so far
    pub fn handled_per_worker(&self) -> Vec<usize> {
        self.dispatcher.handled_per_worker()
    }

    /// Assert the occupancy invariant of the ledger behind the API
    pub fn assert_consistent(&self) {
        self.inspect(assert_consistent);
    }

    /// Shut the table booking system down and finish the test
    pub async fn finish(self) {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        self.dispatcher.shutdown().await
    }
}

/// Assert that every table is occupied iff exactly one reservation refers to
/// it, and that reservation ids are strictly increasing
pub fn assert_consistent(ledger: &Ledger) {
    for table in ledger.tables() {
        let holders = ledger
            .reservations()
            .iter()
            .filter(|r| r.table_id == table.id())
            .count();
        assert!(
            holders <= 1,
            "Table {} is referenced by {holders} reservations.",
            table.id()
        );
        assert_eq!(
            table.is_occupied(),
            holders == 1,
            "Table {} must be occupied exactly when a reservation refers to it.",
            table.id()
        );
    }

    for pair in ledger.reservations().windows(2) {
        assert!(
            pair[0].id < pair[1].id,
            "Reservations must be listed in creation order."
        );
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!(
            "@TestAuthor: You should call `ctx.finish().await` to shut the table booking system down"
        );
    }
}
