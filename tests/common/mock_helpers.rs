//! Mock construction helpers

use std::collections::VecDeque;
use std::sync::Mutex;

use etl_designer::service::{
    HttpRequest, HttpResponse, ServiceClient, Transport, TransportFailure,
};

/// Transport that replays queued replies and records every request.
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, response: HttpResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn fail(self, failure: TransportFailure) -> Self {
        self.push(Err(failure));
        self
    }

    fn push(&self, reply: Result<HttpResponse, TransportFailure>) {
        self.replies
            .lock()
            .expect("stub reply queue poisoned")
            .push_back(reply);
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().expect("stub request log poisoned").clone()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.sent
            .lock()
            .expect("stub request log poisoned")
            .push(request.clone());
        self.replies
            .lock()
            .expect("stub reply queue poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::Network("no reply queued".to_string())))
    }
}

impl Transport for &StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        (**self).send(request)
    }
}

/// Client against a fake base URL, sending through `transport`.
pub fn stub_client(transport: &StubTransport) -> ServiceClient<&StubTransport> {
    ServiceClient::new("http://backend.test/", transport)
}
