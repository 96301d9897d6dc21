//! Per-message processing, run in a detached task per accepted event.
//!
//! Resolution failures map to fixed outcomes: an unresolvable alias
//! ends silently, a missing or unreachable user record sends the
//! access notice, a lapsed subscription sends the renewal notice.
//! Nothing here propagates past the task boundary.

use super::Services;
use crate::tools::ToolContext;
use finbot_core::{
    error::ResolveError,
    event::WahaEvent,
    identity::{AccessDecision, DenialReason},
    messages::base,
    phone,
};
use finbot_memory::audit::{AuditEntry, AuditStatus};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Process one accepted webhook event end to end.
pub async fn process(services: Arc<Services>, event: WahaEvent) {
    let started = Instant::now();
    let sender = event.payload.from_id.clone();
    let body = phone::strip_accents(event.payload.body.trim());

    info!("processing message {} from {sender}", event.payload.id);

    let mut entry = AuditEntry {
        sender_id: sender.clone(),
        phone: None,
        user_id: None,
        input_text: body.clone(),
        output_text: None,
        provider_used: None,
        model: None,
        processing_ms: None,
        status: AuditStatus::Error,
        denial_reason: None,
    };

    // Alias resolution. An unresolvable alias has no reply address, so
    // the message ends silently.
    let reply_phone = match services.mapping.resolve_sender_phone(&sender).await {
        Ok(p) => p,
        Err(e) => {
            warn!("dropping message from {sender}: {e}");
            entry.denial_reason = Some(e.to_string());
            finish(&services, entry, started).await;
            return;
        }
    };
    entry.phone = Some(phone::clean_phone(
        &reply_phone,
        true,
        services.mapping.country_code(),
    ));

    // User lookup and access check.
    let resolved = match services.mapping.resolve_user_by_phone(&reply_phone).await {
        Ok(r) => r,
        Err(ResolveError::NotFound) | Err(ResolveError::Upstream(_)) => {
            // An unreachable backend is indistinguishable to the user
            // from having no account; both get the access notice.
            let notice = base::user_not_found();
            send(&services, &reply_phone, &notice).await;
            entry.output_text = Some(notice);
            entry.status = AuditStatus::Denied;
            entry.denial_reason = Some("no account".into());
            finish(&services, entry, started).await;
            return;
        }
        Err(e) => {
            warn!("resolution failed for {sender}: {e}");
            entry.denial_reason = Some(e.to_string());
            finish(&services, entry, started).await;
            return;
        }
    };
    entry.user_id = Some(resolved.user.id.to_string());

    if let AccessDecision::Denied(reason) = resolved.access {
        let notice = match reason {
            DenialReason::SubscriptionExpired => base::expired_subscription(),
        };
        send(&services, &reply_phone, &notice).await;
        entry.output_text = Some(notice);
        entry.status = AuditStatus::Denied;
        entry.denial_reason = Some("subscription expired".into());
        finish(&services, entry, started).await;
        return;
    }

    // Agent run with the per-task identity.
    let identity = resolved.identity();
    let ctx = ToolContext {
        identity: &identity,
        api: &services.api,
        mapping: &services.mapping,
    };
    let reply = services.agent.run(&ctx, &body).await;

    if reply.text.trim().is_empty() {
        info!("empty agent response for {sender}, nothing sent");
    } else {
        send(&services, &reply_phone, &reply.text).await;
    }

    entry.output_text = Some(reply.text);
    entry.provider_used = reply.provider;
    entry.model = reply.model;
    entry.status = if reply.failed {
        AuditStatus::Error
    } else {
        AuditStatus::Ok
    };
    finish(&services, entry, started).await;
}

async fn send(services: &Services, phone_raw: &str, text: &str) {
    if let Err(e) = services.waha.send_text(phone_raw, text).await {
        error!("reply delivery failed: {e}");
    }
}

/// Stamp the elapsed time and write the audit entry (best effort).
async fn finish(services: &Services, mut entry: AuditEntry, started: Instant) {
    entry.processing_ms = Some(started.elapsed().as_millis() as i64);
    if let Err(e) = services.audit.log(&entry).await {
        error!("audit write failed: {e}");
    }
}
