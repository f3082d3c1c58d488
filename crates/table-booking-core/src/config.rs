use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::TableId;

/// A table as it is seeded at startup
#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Debug)]
pub struct TableSpec {
    /// Unique, positive table number
    pub id: TableId,
    /// Maximum number of guests the table seats
    pub capacity: u32,
}

impl TableSpec {
    /// Shorthand constructor
    pub const fn new(id: TableId, capacity: u32) -> Self {
        Self { id, capacity }
    }
}

/// Configuration of the table booking system
#[derive(Clone, PartialEq, Eq, Deserialize, Debug)]
pub struct Config {
    /// The fixed set of tables, in the order they are listed to clients
    pub tables: Vec<TableSpec>,
}

/// Reasons a [`Config`] is rejected
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No tables were configured
    #[error("at least one table must be configured")]
    NoTables,
    /// Table ids must be positive
    #[error("table ids must be positive")]
    ZeroTableId,
    /// The same id was used for two tables
    #[error("table {0} is configured more than once")]
    DuplicateTable(TableId),
    /// A table that seats nobody
    #[error("table {0} must have a positive capacity")]
    ZeroCapacity(TableId),
    /// The TOML document could not be parsed
    #[error("invalid table configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tables: vec![
                TableSpec::new(1, 4),
                TableSpec::new(2, 4),
                TableSpec::new(3, 6),
                TableSpec::new(4, 2),
                TableSpec::new(5, 8),
            ],
        }
    }
}

impl Config {
    /// Parse a TOML document of `[[tables]]` entries and validate it
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the seed tables can back a ledger
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables.is_empty() {
            return Err(ConfigError::NoTables);
        }

        let mut seen = HashSet::with_capacity(self.tables.len());
        for table in &self.tables {
            if table.id == 0 {
                return Err(ConfigError::ZeroTableId);
            }
            if table.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(table.id));
            }
            if !seen.insert(table.id) {
                return Err(ConfigError::DuplicateTable(table.id));
            }
        }
        Ok(())
    }
}
