//! 🏗 HTTP request implementation

use std::io;
use std::io::{Cursor, Read};

use table_booking_core::{RawRequest, Request, RequestKind, RequestMethod};
use tiny_http::{Header, Method, Response, ResponseBox};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::Assets;

const ROUTES_HELP: &str = "Valid requests are: \
GET /api/tables, \
GET /api/reservations, \
POST /api/reserve, \
PUT /api/update/:id, \
DELETE /api/cancel/:id";

struct HTTPRequest {
    inner: tiny_http::Request,
    method: RequestMethod,
}

impl RawRequest for HTTPRequest {
    fn url(&self) -> &str {
        self.inner.url()
    }

    fn method(&self) -> RequestMethod {
        self.method
    }

    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.inner.body_length().unwrap_or(0));
        self.inner.as_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn respond(self: Box<Self>, status: u16, json: Vec<u8>, request_id: Uuid) {
        respond_json(self.inner, status, json, request_id);
    }
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was not an API call and has already
/// been answered (CORS preflight, static asset, or an error).
pub fn parse(rq: tiny_http::Request, assets: &Assets) -> Option<Request> {
    info!("{} {}", rq.method(), rq.url());

    let request_id = request_id(&rq);
    match route(rq.method(), rq.url(), assets) {
        Route::Api(kind, method) => {
            let raw = HTTPRequest { inner: rq, method };
            Some(Request::from_raw(kind, request_id, Box::new(raw)))
        }
        Route::Answer(res) => {
            send(rq, res, request_id);
            None
        }
    }
}

/// Where a request goes: to the request handler, or straight back
enum Route {
    Api(RequestKind, RequestMethod),
    Answer(ResponseBox),
}

fn route(method: &Method, url: &str, assets: &Assets) -> Route {
    let method = match method {
        Method::Get => RequestMethod::Get,
        Method::Post => RequestMethod::Post,
        Method::Put => RequestMethod::Put,
        Method::Delete => RequestMethod::Delete,
        Method::Options => return Route::Answer(Response::empty(204).boxed()),
        _ => return Route::Answer(Response::empty(405).boxed()),
    };

    if let Some(kind) = RequestKind::route(method, url) {
        Route::Api(kind, method)
    } else if url.starts_with("/api") {
        let body = serde_json::json!({ "message": ROUTES_HELP });
        Route::Answer(json_response(404, body.to_string().into_bytes()).boxed())
    } else if method == RequestMethod::Get {
        Route::Answer(assets.response(url))
    } else {
        Route::Answer(Response::empty(405).boxed())
    }
}

/// The client's `X-Request-Id` if it is a UUID, a fresh one otherwise
fn request_id(rq: &tiny_http::Request) -> Uuid {
    rq.headers()
        .iter()
        .find(|hdr| hdr.field.equiv("x-request-id"))
        .and_then(|hdr| Uuid::parse_str(hdr.value.as_str()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

fn json_response(status: u16, json: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let mut res = Response::from_data(json).with_status_code(status);
    add_header(&mut res, "Content-Type", "application/json; charset=utf-8");
    res
}

fn respond_json(rq: tiny_http::Request, status: u16, json: Vec<u8>, request_id: Uuid) {
    send(rq, json_response(status, json), request_id);
}

/// Add CORS and `X-Request-Id` headers to `res` and send it
fn send<R: Read>(rq: tiny_http::Request, res: Response<R>, request_id: Uuid) {
    if let Err(err) = rq.respond(with_common_headers(res, request_id)) {
        warn!(%err, %request_id, "HTTP response failed");
    }
}

fn with_common_headers<R: Read>(mut res: Response<R>, request_id: Uuid) -> Response<R> {
    add_header(&mut res, "Access-Control-Allow-Origin", "*");
    add_header(&mut res, "Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS");
    add_header(&mut res, "Access-Control-Allow-Headers", "*");
    add_header(&mut res, "Access-Control-Expose-Headers", "*");
    add_header(&mut res, "X-Request-Id", &request_id.hyphenated().to_string());
    res
}

pub fn add_header<R: Read>(res: &mut Response<R>, field: &str, value: &str) {
    match Header::from_bytes(field.as_bytes(), value.as_bytes()) {
        Ok(header) => res.add_header(header),
        Err(()) => warn!(field, value, "invalid response header"),
    }
}
