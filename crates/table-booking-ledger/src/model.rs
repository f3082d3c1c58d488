//! Tables, reservations and the inputs that create or change them

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use table_booking_core::{parse_id, ReservationId, TableId, TableSpec};

/// A seating unit
///
/// Serializes to `{id, capacity}`, occupancy stays internal.
#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct Table {
    id: TableId,
    capacity: u32,
    #[serde(skip)]
    occupied: bool,
}

impl Table {
    pub(crate) fn new(spec: &TableSpec) -> Self {
        Self {
            id: spec.id,
            capacity: spec.capacity,
            occupied: false,
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether a live reservation refers to this table
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub(crate) fn set_occupied(&mut self, occupied: bool) {
        self.occupied = occupied;
    }
}

/// A party booked at a table
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub table_id: TableId,
    pub customer_name: String,
    pub guests: u32,
    /// Opaque time token, e.g. `"19:00"`
    pub time: String,
}

/// Successful outcome of a ledger operation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Confirmation {
    /// Human-readable summary
    pub message: String,
    /// The reservation as it is after the operation
    pub reservation: Reservation,
}

/// Number of guests as submitted by a client
///
/// Anything that is not a JSON integer ends up in [`PartySize::Other`] so that
/// the ledger, not the decoder, decides how to reject it.
#[derive(Clone, PartialEq, Deserialize, Debug)]
#[serde(untagged)]
pub enum PartySize {
    Count(i64),
    Other(Value),
}

impl PartySize {
    /// Whether the value counts as not filled in
    pub fn is_blank(&self) -> bool {
        match self {
            PartySize::Count(n) => *n == 0,
            PartySize::Other(v) => is_blank_value(v),
        }
    }

    /// The guest count, if it is a positive integer
    ///
    /// Whole-valued floats such as `2.0` count as integers.
    pub fn positive(&self) -> Option<u32> {
        let n = match self {
            PartySize::Count(n) => *n,
            PartySize::Other(v) => whole_number(v)?,
        };
        u32::try_from(n).ok().filter(|&n| n > 0)
    }
}

impl From<u32> for PartySize {
    fn from(n: u32) -> Self {
        PartySize::Count(n.into())
    }
}

/// Table as referenced by a client, by number or by numeric string
#[derive(Clone, PartialEq, Deserialize, Debug)]
#[serde(untagged)]
pub enum TableRef {
    Id(i64),
    Text(String),
    Other(Value),
}

impl TableRef {
    /// Whether the value counts as not filled in
    pub fn is_blank(&self) -> bool {
        match self {
            TableRef::Id(n) => *n == 0,
            TableRef::Text(s) => s.is_empty(),
            TableRef::Other(v) => is_blank_value(v),
        }
    }

    /// The table id this refers to, if it is one at all
    pub fn resolve(&self) -> Option<TableId> {
        match self {
            TableRef::Id(n) => TableId::try_from(*n).ok(),
            TableRef::Text(s) => parse_id(s),
            // fractional ids are cut off, like their leading digits in text
            TableRef::Other(v) => v
                .as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0)
                .and_then(|n| TableId::try_from(n.trunc() as i64).ok()),
        }
    }
}

impl From<TableId> for TableRef {
    fn from(id: TableId) -> Self {
        TableRef::Id(id.into())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Id(n) => write!(f, "{n}"),
            TableRef::Text(s) => f.write_str(s),
            TableRef::Other(v) => write!(f, "{v}"),
        }
    }
}

fn whole_number(v: &Value) -> Option<i64> {
    let n = v.as_f64()?;
    (n.fract() == 0.0).then_some(n as i64)
}

/// `null`, `false`, `0` and `""`
fn is_blank_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Payload of a reservation request, not yet validated
#[derive(Clone, Default, PartialEq, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub table_id: Option<TableRef>,
    pub customer_name: Option<String>,
    pub guests: Option<PartySize>,
    pub time: Option<String>,
}

impl ReservationDraft {
    /// A draft with all four fields filled in
    pub fn new(
        table_id: TableId,
        customer_name: impl Into<String>,
        guests: u32,
        time: impl Into<String>,
    ) -> Self {
        Self {
            table_id: Some(table_id.into()),
            customer_name: Some(customer_name.into()),
            guests: Some(guests.into()),
            time: Some(time.into()),
        }
    }
}

/// A field of a [`ReservationPatch`]
///
/// A key missing from the JSON payload is [`Field::Unset`] and leaves the
/// stored value alone. Any value that is present, `null` included, is
/// [`Field::Set`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Field<T> {
    Unset,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> Field<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Unset => Field::Unset,
            Field::Set(v) => Field::Set(v),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Unset => None,
            Field::Set(v) => Some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Field::Set)
    }
}

/// Payload of an update request
///
/// The table of a reservation cannot be changed, a `tableId` key is ignored.
#[derive(Clone, Default, PartialEq, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    #[serde(default)]
    pub customer_name: Field<String>,
    #[serde(default)]
    pub guests: Field<PartySize>,
    #[serde(default)]
    pub time: Field<String>,
}

impl ReservationPatch {
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Field::Set(name.into());
        self
    }

    pub fn guests(mut self, guests: impl Into<PartySize>) -> Self {
        self.guests = Field::Set(guests.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Field::Set(time.into());
        self
    }
}
