//! Mock API implementation directly using the `table-booking-ledger` crate

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eyre::Result;
use table_booking_core::{Config, RawRequest, Request, RequestHandler, RequestKind};
use table_booking_ledger::{Dispatcher, Ledger};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use uuid::Uuid;

use super::{Api, RequestMsg, Response};

pub struct MockDispatcher {
    dispatcher: Arc<Dispatcher>,
    join_handles: Vec<JoinHandle<()>>,
    /// Requests handled, per worker thread
    handled: Arc<Vec<AtomicUsize>>,
}

struct MockRawRequest {
    kind: RequestKind,
    url: String,
    payload: Option<Vec<u8>>,
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(threads: u16, config: Config) -> Result<(MockDispatcher, Api)> {
    let dispatcher = task::spawn_blocking(move || table_booking_ledger::launch(&config)).await??;
    let dispatcher = Arc::new(dispatcher);
    let handled: Arc<Vec<AtomicUsize>> =
        Arc::new((0..threads).map(|_| AtomicUsize::new(0)).collect());

    let it = (0..threads as usize).map(|i| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let dispatcher = dispatcher.clone();
        let handled = handled.clone();
        let handle = task::spawn_blocking(move || {
            let dispatcher = &*dispatcher;
            for msg in receiver.into_iter() {
                handled[i].fetch_add(1, Ordering::Relaxed);
                let raw = Box::new(MockRawRequest {
                    kind: msg.kind,
                    url: msg.kind.path(),
                    payload: msg.payload,
                    response_channel: msg.response_channel,
                });
                dispatcher.handle(Request::from_raw(msg.kind, msg.request_id, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_dispatcher = MockDispatcher {
        dispatcher,
        join_handles,
        handled,
    };
    Ok((mock_dispatcher, Api::new(senders)))
}

impl MockDispatcher {
    pub fn inspect<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        self.dispatcher.inspect(f)
    }

    pub fn handled_per_worker(&self) -> Vec<usize> {
        self.handled
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .collect()
    }

    pub async fn shutdown(self) {
        for handle in self.join_handles {
            handle.await.unwrap()
        }
        task::spawn_blocking(move || Arc::into_inner(self.dispatcher).unwrap().shutdown())
            .await
            .unwrap();
    }
}

impl RawRequest for MockRawRequest {
    fn url(&self) -> &str {
        &self.url
    }

    fn method(&self) -> table_booking_core::RequestMethod {
        self.kind.method()
    }

    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.payload.take().unwrap_or_default())
    }

    fn respond(self: Box<Self>, status: u16, json: Vec<u8>, request_id: Uuid) {
        let response = Response {
            status,
            json,
            request_id,
        };
        self.response_channel.send(response).unwrap()
    }
}
