// src/interception/mod.rs
//! Request interception layer
//!
//! - **Policy**: classifies URLs as bypass, synthetic-OK or mockable
//! - **Host**: traits a browser-automation host implements
//! - **Handlers**: the request and response hooks

pub mod handlers;
pub mod host;
pub mod policy;

// Re-export commonly used types
pub use handlers::{handle_request, handle_response, HandlerContext};
pub use host::{
    Hook, HookEvent, InterceptedRequest, InterceptedResponse, InterceptionTarget, ListenerId,
    RequestHandler, RespondSpec, ResponseHandler, TargetId,
};
pub use policy::{classify, Classification, PolicyConfig, UrlList};
