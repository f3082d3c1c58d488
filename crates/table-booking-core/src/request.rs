use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a table
pub type TableId = u32;

/// Identifier of a reservation
pub type ReservationId = u32;

/// Kind of the request
///
/// The variants map one-to-one to the routes of the HTTP API.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestKind {
    /// `GET /api/tables`: list the tables that are not reserved
    ListTables,

    /// `GET /api/reservations`: list all live reservations
    ListReservations,

    /// `POST /api/reserve`: reserve a table, the payload is a JSON object
    /// `{tableId, customerName, guests, time}`
    Reserve,

    /// `PUT /api/update/:id`: change some fields of a reservation
    ///
    /// The id is [`None`] if the path segment is not a number. Such a request
    /// cannot refer to any reservation.
    Update(Option<ReservationId>),

    /// `DELETE /api/cancel/:id`: cancel a reservation and free its table
    Cancel(Option<ReservationId>),
}

impl RequestKind {
    /// Match an HTTP method and URL against the API routes
    ///
    /// Query strings and a single trailing slash are ignored. Returns [`None`]
    /// for anything that is not an API call.
    pub fn route(method: RequestMethod, url: &str) -> Option<Self> {
        use RequestMethod::*;

        let path = url.split('?').next().unwrap_or(url);
        let path = match path.strip_suffix('/') {
            Some(p) if !p.is_empty() => p,
            _ => path,
        };

        match (method, path) {
            (Get, "/api/tables") => Some(RequestKind::ListTables),
            (Get, "/api/reservations") => Some(RequestKind::ListReservations),
            (Post, "/api/reserve") => Some(RequestKind::Reserve),
            (Put, path) => id_segment(path, "/api/update/").map(RequestKind::Update),
            (Delete, path) => id_segment(path, "/api/cancel/").map(RequestKind::Cancel),
            _ => None,
        }
    }

    /// The HTTP method of this kind of request
    pub fn method(&self) -> RequestMethod {
        match self {
            RequestKind::ListTables | RequestKind::ListReservations => RequestMethod::Get,
            RequestKind::Reserve => RequestMethod::Post,
            RequestKind::Update(_) => RequestMethod::Put,
            RequestKind::Cancel(_) => RequestMethod::Delete,
        }
    }

    /// The canonical URL of this kind of request
    pub fn path(&self) -> String {
        fn with_id(prefix: &str, id: Option<ReservationId>) -> String {
            match id {
                Some(id) => format!("{prefix}{id}"),
                None => format!("{prefix}unknown"),
            }
        }

        match self {
            RequestKind::ListTables => "/api/tables".into(),
            RequestKind::ListReservations => "/api/reservations".into(),
            RequestKind::Reserve => "/api/reserve".into(),
            RequestKind::Update(id) => with_id("/api/update/", *id),
            RequestKind::Cancel(id) => with_id("/api/cancel/", *id),
        }
    }
}

/// Extract the `:id` segment following `prefix`
///
/// The outer [`Option`] tells whether the route matched at all, the inner one
/// whether the segment starts with a number.
fn id_segment(path: &str, prefix: &str) -> Option<Option<ReservationId>> {
    let segment = path.strip_prefix(prefix)?;
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    Some(parse_id(segment))
}

/// Parse the decimal number an id string starts with
///
/// Leading whitespace is skipped and anything after the digits is ignored, so
/// `" 12abc"` yields `12`. Returns [`None`] if there are no digits or the
/// number does not fit.
pub fn parse_id(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let digits = s
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s, |end| &s[..end]);
    digits.parse().ok()
}

/// Request sent from a web browser
///
/// Request handlers primarily interact with instances of this type.
pub struct Request {
    kind: RequestKind,
    id: Uuid,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, has a payload
    Post,
    /// PUT request, has a payload
    Put,
    /// DELETE request
    Delete,
    /// CORS preflight
    Options,
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Options => "OPTIONS",
        })
    }
}

/// Interface for handling requests from a web browser
pub trait RequestHandler {
    /// Handle a request from a web browser
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the table booking system down
    fn shutdown(self);
}

/// A raw request, implemented by the HTTP server
///
/// Besides the HTTP server, the mock transport of the test harness implements
/// it.
pub trait RawRequest {
    /// Get the URL
    fn url(&self) -> &str;
    /// Get the request method
    fn method(&self) -> RequestMethod;

    /// Read the request body as bytes
    fn read_bytes(&mut self) -> io::Result<Vec<u8>>;

    /// Respond with a JSON document
    fn respond(self: Box<Self>, status: u16, json: Vec<u8>, request_id: Uuid);
}

/// Failure to read a JSON payload
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body could not be received
    #[error("could not read request body: {0}")]
    Io(#[from] io::Error),
    /// The body is not the expected JSON document
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the request id
    ///
    /// Taken from the `X-Request-Id` header if the client sent one, randomly
    /// generated otherwise. It is echoed back in the response.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the request URL
    #[inline]
    pub fn url(&self) -> &str {
        self.raw.url()
    }

    /// Get the request method
    #[inline]
    pub fn method(&self) -> RequestMethod {
        self.raw.method()
    }

    /// Parse the payload as JSON
    ///
    /// An empty payload is treated as the empty object `{}`, so that requests
    /// without a body still deserialize into structs whose fields are all
    /// optional.
    ///
    /// This method has side effects and should be called only once per
    /// request.
    pub fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.raw.read_bytes()?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Respond with `body` serialized as JSON
    ///
    /// This method blocks until the response has been sent.
    pub fn respond_with_json<T: Serialize + ?Sized>(self, status: u16, body: &T) {
        match serde_json::to_vec(body) {
            Ok(json) => self.raw.respond(status, json, self.id),
            Err(err) => self.respond_with_message(500, format!("Could not encode response: {err}")),
        }
    }

    /// Respond with a JSON object `{"message": ...}`
    ///
    /// This method blocks until the response has been sent.
    pub fn respond_with_message(self, status: u16, message: impl Into<String>) {
        let message: String = message.into();
        let json = serde_json::json!({ "message": message });
        self.raw.respond(status, json.to_string().into_bytes(), self.id);
    }

    /// Create a new request from a [`RawRequest`]
    ///
    /// Called by transports after they matched the route.
    #[inline]
    pub fn from_raw(kind: RequestKind, id: Uuid, raw: Box<dyn RawRequest + Send>) -> Self {
        Self { kind, id, raw }
    }
}
