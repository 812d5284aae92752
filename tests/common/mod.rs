// tests/common/mod.rs
//! Scripted in-memory page used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mock_replay_engine::interception::{
    Hook, HookEvent, InterceptedRequest, InterceptedResponse, InterceptionTarget, ListenerId,
    RespondSpec, TargetId,
};
use mock_replay_engine::{EngineError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// What the engine did with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Continued,
    Responded(RespondSpec),
}

pub struct FakeRequest {
    method: String,
    url: String,
    post_data: Option<String>,
    outcome: Mutex<Option<RequestOutcome>>,
}

impl FakeRequest {
    pub fn new(method: &str, url: &str, post_data: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            method: method.to_string(),
            url: url.to_string(),
            post_data: post_data.map(str::to_string),
            outcome: Mutex::new(None),
        })
    }

    pub fn get(url: &str) -> Arc<Self> {
        Self::new("GET", url, None)
    }

    pub fn outcome(&self) -> Option<RequestOutcome> {
        self.outcome.lock().clone()
    }

    pub fn was_continued(&self) -> bool {
        self.outcome() == Some(RequestOutcome::Continued)
    }

    pub fn responded_body(&self) -> Option<String> {
        match self.outcome() {
            Some(RequestOutcome::Responded(spec)) => Some(spec.body),
            _ => None,
        }
    }
}

#[async_trait]
impl InterceptedRequest for FakeRequest {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn method(&self) -> String {
        self.method.clone()
    }

    fn post_data(&self) -> Option<String> {
        self.post_data.clone()
    }

    fn headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    async fn continue_request(&self) -> Result<()> {
        *self.outcome.lock() = Some(RequestOutcome::Continued);
        Ok(())
    }

    async fn respond(&self, response: RespondSpec) -> Result<()> {
        *self.outcome.lock() = Some(RequestOutcome::Responded(response));
        Ok(())
    }
}

pub struct FakeResponse {
    request: Arc<FakeRequest>,
    body: std::result::Result<String, String>,
}

#[async_trait]
impl InterceptedResponse for FakeResponse {
    fn request(&self) -> Arc<dyn InterceptedRequest> {
        self.request.clone()
    }

    async fn text(&self) -> Result<String> {
        tokio::task::yield_now().await;
        self.body.clone().map_err(EngineError::HostFailure)
    }
}

/// A page with a fake live network keyed by URL
pub struct FakePage {
    id: TargetId,
    interception: Mutex<bool>,
    next_listener: AtomicU64,
    hooks: Mutex<Vec<(ListenerId, Hook)>>,
    network: Mutex<HashMap<String, std::result::Result<String, String>>>,
    network_hits: AtomicUsize,
}

impl FakePage {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: TargetId::new(id),
            interception: Mutex::new(false),
            next_listener: AtomicU64::new(1),
            hooks: Mutex::new(Vec::new()),
            network: Mutex::new(HashMap::new()),
            network_hits: AtomicUsize::new(0),
        })
    }

    /// Register what the live backend answers for `url`
    pub fn serve(&self, url: &str, body: &str) {
        self.network.lock().insert(url.to_string(), Ok(body.to_string()));
    }

    /// Make reading the live body for `url` fail
    pub fn serve_broken(&self, url: &str) {
        self.network
            .lock()
            .insert(url.to_string(), Err("connection reset".to_string()));
    }

    pub fn network_hits(&self) -> usize {
        self.network_hits.load(Ordering::SeqCst)
    }

    pub fn interception_enabled(&self) -> bool {
        *self.interception.lock()
    }

    pub fn listener_count(&self) -> usize {
        self.hooks.lock().len()
    }

    /// Fire the request hooks; with no hooks the request goes live untouched
    pub async fn dispatch_request(&self, request: &Arc<FakeRequest>) {
        let handlers: Vec<_> = self
            .hooks
            .lock()
            .iter()
            .filter_map(|(_, hook)| match hook {
                Hook::Request(handler) => Some(handler.clone()),
                Hook::Response(_) => None,
            })
            .collect();

        if handlers.is_empty() {
            *request.outcome.lock() = Some(RequestOutcome::Continued);
        }

        let request: Arc<dyn InterceptedRequest> = request.clone();
        for handler in handlers {
            handler(request.clone()).await;
        }
    }

    /// Answer a continued request from the fake network and fire the response hooks
    pub async fn deliver_response(&self, request: &Arc<FakeRequest>) {
        self.network_hits.fetch_add(1, Ordering::SeqCst);

        let body = self
            .network
            .lock()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));

        let response: Arc<dyn InterceptedResponse> = Arc::new(FakeResponse {
            request: request.clone(),
            body,
        });

        let handlers: Vec<_> = self
            .hooks
            .lock()
            .iter()
            .filter_map(|(_, hook)| match hook {
                Hook::Response(handler) => Some(handler.clone()),
                Hook::Request(_) => None,
            })
            .collect();

        for handler in handlers {
            handler(response.clone()).await;
        }
    }

    /// Full exchange: request hooks, then the live response if it was continued
    pub async fn fetch(&self, method: &str, url: &str, body: Option<&str>) -> Arc<FakeRequest> {
        let request = FakeRequest::new(method, url, body);
        self.dispatch_request(&request).await;

        if request.was_continued() {
            self.deliver_response(&request).await;
        }

        request
    }

    pub async fn get(&self, url: &str) -> Arc<FakeRequest> {
        self.fetch("GET", url, None).await
    }
}

#[async_trait]
impl InterceptionTarget for FakePage {
    fn target_id(&self) -> TargetId {
        self.id.clone()
    }

    async fn set_request_interception(&self, enabled: bool) -> Result<()> {
        *self.interception.lock() = enabled;
        Ok(())
    }

    fn on(&self, hook: Hook) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.hooks.lock().push((id, hook));
        id
    }

    fn remove_listener(&self, event: HookEvent, listener: ListenerId) {
        self.hooks
            .lock()
            .retain(|(id, hook)| !(*id == listener && hook.event() == event));
    }
}
