//! 🏗 Infrastructure for handling requests, etc.
#![warn(missing_docs)]

mod config;
mod request;

pub use config::{Config, ConfigError, TableSpec};
pub use request::{
    parse_id, BodyError, RawRequest, Request, RequestHandler, RequestKind, RequestMethod,
    ReservationId, TableId,
};
