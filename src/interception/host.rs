// src/interception/host.rs
//! Browser-automation host interface
//!
//! The engine never drives a browser itself. A host (a CDP page, a WebDriver
//! tab, a scripted fake in tests) implements these traits and feeds request and
//! response events into the hooks installed by the session manager.

use crate::utils::errors::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Identity of a page/target, used to enforce one live session per target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle returned by [`InterceptionTarget::on`], used to remove the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Host events the engine subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Request,
    Response,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::Request => "request",
            HookEvent::Response => "response",
        }
    }
}

/// Response fulfilled by the engine instead of the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondSpec {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RespondSpec {
    /// Canned 200 `"OK"` for ok-listed URLs
    pub fn synthetic_ok() -> Self {
        Self::replay("OK")
    }

    /// 200 response carrying a stored payload
    pub fn replay(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: permissive_json_headers(),
            body: body.into(),
        }
    }
}

fn permissive_json_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Access-Control-Allow-Headers".into(), "Content-Type".into());
    headers.insert("Access-Control-Allow-Origin".into(), "*".into());
    headers.insert("Content-Type".into(), "application/json".into());
    headers
}

/// An intercepted outbound request, paused until continued or responded
#[async_trait]
pub trait InterceptedRequest: Send + Sync {
    fn url(&self) -> String;

    fn method(&self) -> String;

    /// Request body, `None` when the request carries none
    fn post_data(&self) -> Option<String>;

    fn headers(&self) -> HashMap<String, String>;

    /// Forward the request to the live network unmodified
    async fn continue_request(&self) -> Result<()>;

    /// Fulfill the request without touching the network
    async fn respond(&self, response: RespondSpec) -> Result<()>;
}

/// A response received from the live network
#[async_trait]
pub trait InterceptedResponse: Send + Sync {
    /// Back-reference to the originating request
    fn request(&self) -> Arc<dyn InterceptedRequest>;

    /// Full response body
    async fn text(&self) -> Result<String>;
}

pub type RequestHandler =
    Arc<dyn Fn(Arc<dyn InterceptedRequest>) -> BoxFuture<'static, ()> + Send + Sync>;

pub type ResponseHandler =
    Arc<dyn Fn(Arc<dyn InterceptedResponse>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A listener registered on a target
#[derive(Clone)]
pub enum Hook {
    Request(RequestHandler),
    Response(ResponseHandler),
}

impl Hook {
    pub fn event(&self) -> HookEvent {
        match self {
            Hook::Request(_) => HookEvent::Request,
            Hook::Response(_) => HookEvent::Response,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.event()).finish()
    }
}

/// A page/target that emits request and response events
#[async_trait]
pub trait InterceptionTarget: Send + Sync {
    fn target_id(&self) -> TargetId;

    async fn set_request_interception(&self, enabled: bool) -> Result<()>;

    fn on(&self, hook: Hook) -> ListenerId;

    fn remove_listener(&self, event: HookEvent, listener: ListenerId);
}

impl fmt::Debug for dyn InterceptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionTarget")
            .field("target_id", &self.target_id())
            .finish()
    }
}
