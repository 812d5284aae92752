// src/interception/handlers.rs
//! Request and response hooks
//!
//! Both handlers are plain async functions over a [`HandlerContext`]. They only
//! touch the store and the pending tracker; registering them on a target is the
//! session manager's job.

use crate::interception::host::{InterceptedRequest, InterceptedResponse, RespondSpec};
use crate::interception::policy::{Classification, PolicyConfig};
use crate::observability::counters;
use crate::recording::fingerprint::{fingerprint, Fingerprint, RequestDescriptor};
use crate::recording::record::MockRecord;
use crate::recording::store::MockStore;
use crate::recording::tracker::{PendingTracker, Settlement};
use crate::utils::errors::EngineError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a hook needs, shared by the request and response handlers
#[derive(Debug)]
pub struct HandlerContext {
    pub policy: PolicyConfig,
    pub store: MockStore,
    pub tracker: Arc<PendingTracker>,
    pub skip_query_params: Vec<String>,
    pub skip_post_params: Vec<String>,
    pub force: bool,
    pub verbose: bool,
}

impl HandlerContext {
    pub fn fingerprint(&self, descriptor: &RequestDescriptor) -> Fingerprint {
        fingerprint(descriptor, &self.skip_query_params, &self.skip_post_params)
    }

    fn strict(&self) -> bool {
        self.tracker.is_strict()
    }
}

/// Handle an intercepted request
///
/// Bypass is forwarded, ok-listed URLs get a synthetic 200, mockable URLs are
/// replayed from the store or forwarded live and tracked until recorded.
/// With `force` every mockable request goes live so its record is refreshed.
pub async fn handle_request(ctx: &HandlerContext, request: Arc<dyn InterceptedRequest>) {
    let descriptor = RequestDescriptor::from_request(request.as_ref());
    let classification = ctx.policy.classify(&descriptor.url);
    counters::record_request(classification);

    if ctx.verbose {
        info!("Request {} {} → {}", descriptor.method, descriptor.url, classification);
    } else {
        debug!("Request {} {} → {}", descriptor.method, descriptor.url, classification);
    }

    match classification {
        Classification::Bypass => forward(request.as_ref(), &descriptor).await,
        Classification::SyntheticOk => {
            if let Err(e) = request.respond(RespondSpec::synthetic_ok()).await {
                warn!("Failed to send synthetic OK for {}: {}", descriptor.url, e);
            }
        }
        Classification::Mockable => {
            let fp = ctx.fingerprint(&descriptor);

            let stored = if ctx.force {
                Err(EngineError::StoreReadFailure(format!("re-recording {fp}")))
            } else {
                ctx.store.read(&fp).await
            };

            match stored {
                Ok(raw) => {
                    let record = MockRecord::parse(&raw);
                    debug!("Replaying {} from store", fp);
                    counters::record_replay();

                    if let Err(e) = request.respond(RespondSpec::replay(record.body)).await {
                        warn!("Failed to replay {} for {}: {}", fp, descriptor.url, e);
                    }
                }
                Err(e) => {
                    debug!("No stored mock for {} ({}), forwarding live", fp, e);

                    // Track before forwarding so the response can never outrun it
                    ctx.tracker.on_dispatch(&fp.key());
                    forward(request.as_ref(), &descriptor).await;
                }
            }
        }
    }
}

/// Handle a live response for a previously forwarded request
pub async fn handle_response(ctx: &HandlerContext, response: Arc<dyn InterceptedResponse>) {
    let request = response.request();
    let descriptor = RequestDescriptor::from_request(request.as_ref());

    if !ctx.policy.classify(&descriptor.url).is_tracked() {
        return;
    }

    let fp = ctx.fingerprint(&descriptor);
    let key = fp.key();

    if !ctx.tracker.is_pending(&key) {
        debug!("Response for {} was not forwarded by this session, skipping", fp);
        return;
    }

    let written = match response.text().await {
        Ok(text) => {
            let contents = MockRecord::render(
                &descriptor.method,
                &descriptor.url,
                descriptor.post_body_or_empty(),
                &text,
            );
            ctx.store.write(&fp, &contents, ctx.force).await
        }
        Err(e) => Err(e),
    };

    let settlement = match written {
        Ok(outcome) => {
            counters::record_recorded();
            Settlement::Recorded(outcome.path)
        }
        Err(reason) => {
            counters::record_store_failure();
            report_failure(ctx, &fp, &reason);
            Settlement::Failed {
                method: descriptor.method.to_uppercase(),
                url: descriptor.url.clone(),
                reason,
            }
        }
    };

    ctx.tracker.on_settled(&key, settlement);
}

async fn forward(request: &dyn InterceptedRequest, descriptor: &RequestDescriptor) {
    if let Err(e) = request.continue_request().await {
        warn!("Failed to forward {} {}: {}", descriptor.method, descriptor.url, e);
    }
}

fn report_failure(ctx: &HandlerContext, fp: &Fingerprint, reason: &EngineError) {
    if ctx.strict() {
        // escalated by the tracker
        return;
    }

    if ctx.verbose {
        warn!("Failed to record {}: {}", fp, reason);
    } else {
        debug!("Failed to record {}: {}", fp, reason);
    }
}
