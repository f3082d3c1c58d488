use std::sync::Arc;

use eyre::{eyre, Result};
use flume::Sender;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use table_booking_core::{RequestKind, ReservationId, TableId, TableSpec};
use table_booking_ledger::{Confirmation, Reservation};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

#[derive(Debug, Error)]
#[error("Error {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
struct Response {
    status: u16,
    json: Vec<u8>,
    request_id: Uuid,
}

impl Response {
    fn into_api_response<T: DeserializeOwned>(
        self,
        rq_kind: RequestKind,
    ) -> Result<ApiResponse<T>> {
        let result = if (200..300).contains(&self.status) {
            Ok(serde_json::from_slice(&self.json).map_err(|err| {
                eyre!("{rq_kind:?} answered with an unexpected body ({err}): {}", self.body())
            })?)
        } else {
            let Message { message } = serde_json::from_slice(&self.json).map_err(|err| {
                eyre!("{rq_kind:?} failed without a message ({err}): {}", self.body())
            })?;
            Err(ApiError {
                status: self.status,
                message,
            })
        };

        Ok(ApiResponse {
            status: self.status,
            request_id: self.request_id,
            result,
        })
    }

    fn body(&self) -> String {
        String::from_utf8_lossy(&self.json).into_owned()
    }
}

/// Body of responses that only carry a message
#[derive(Clone, PartialEq, Eq, Deserialize, Debug)]
pub struct Message {
    pub message: String,
}

struct RequestMsg {
    kind: RequestKind,
    payload: Option<Vec<u8>>,
    request_id: Uuid,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per worker thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Api {
    /// `n` clients, each cloned from the previous one, so that they spread
    /// round-robin over all worker threads
    pub fn clients(&self, n: usize) -> Vec<Api> {
        std::iter::successors(Some(self.clone()), |api| Some(api.clone()))
            .take(n)
            .collect()
    }

    /// Index of the worker thread this client sends its requests to
    pub fn worker_index(&self) -> usize {
        self.my_index
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

const NO_REQUEST_OPTIONS: RequestOptions = RequestOptions { request_id: None };

impl Api {
    async fn make_request(
        &self,
        kind: RequestKind,
        payload: Option<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            payload,
            request_id: options.request_id.unwrap_or_else(Uuid::new_v4),
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    /// Send `payload` verbatim, e.g. to check how malformed bodies are handled
    pub async fn send_raw(
        &self,
        kind: RequestKind,
        payload: impl Into<Vec<u8>>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<serde_json::Value>> {
        let response = self.make_request(kind, Some(payload.into()), options);
        response.await?.into_api_response(kind)
    }

    pub async fn get_tables(&self) -> Result<ApiResponse<Vec<TableSpec>>> {
        let kind = RequestKind::ListTables;
        let response = self.make_request(kind, None, &NO_REQUEST_OPTIONS);
        response.await?.into_api_response(kind)
    }

    pub async fn get_reservations(&self) -> Result<ApiResponse<Vec<Reservation>>> {
        let kind = RequestKind::ListReservations;
        let response = self.make_request(kind, None, &NO_REQUEST_OPTIONS);
        response.await?.into_api_response(kind)
    }

    /// Submit an arbitrary reservation payload
    pub async fn reserve<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<ApiResponse<Confirmation>> {
        let kind = RequestKind::Reserve;
        let payload = serde_json::to_vec(body)?;
        let response = self.make_request(kind, Some(payload), &NO_REQUEST_OPTIONS);
        response.await?.into_api_response(kind)
    }

    /// Submit a complete, well-formed reservation
    pub async fn reserve_table(
        &self,
        table_id: TableId,
        customer_name: &str,
        guests: u32,
        time: &str,
    ) -> Result<ApiResponse<Confirmation>> {
        self.reserve(&serde_json::json!({
            "tableId": table_id,
            "customerName": customer_name,
            "guests": guests,
            "time": time,
        }))
        .await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: ReservationId,
        body: &B,
    ) -> Result<ApiResponse<Confirmation>> {
        let kind = RequestKind::Update(Some(id));
        let payload = serde_json::to_vec(body)?;
        let response = self.make_request(kind, Some(payload), &NO_REQUEST_OPTIONS);
        response.await?.into_api_response(kind)
    }

    pub async fn cancel(&self, id: ReservationId) -> Result<ApiResponse<Message>> {
        let kind = RequestKind::Cancel(Some(id));
        let response = self.make_request(kind, None, &NO_REQUEST_OPTIONS);
        response.await?.into_api_response(kind)
    }

    /// Ids of the tables currently offered to clients
    pub async fn available_table_ids(&self) -> Result<Vec<TableId>> {
        let tables = self.get_tables().await?.result?;
        Ok(tables.into_iter().map(|t| t.id).collect())
    }
}

pub struct ApiResponse<T> {
    pub status: u16,
    pub request_id: Uuid,
    pub result: ApiResult<T>,
}

impl<T> ApiResponse<T> {
    /// The error of a response that must have failed
    pub fn expect_err(self) -> Result<ApiError> {
        match self.result {
            Ok(_) => Err(eyre!(
                "Request succeeded with status {} when it shall have failed.",
                self.status
            )),
            Err(err) => Ok(err),
        }
    }
}

#[derive(Copy, Clone, Default)]
pub struct RequestOptions {
    pub request_id: Option<Uuid>,
}
