//! Identity resolution: inbound sender identifier → backend user.
//!
//! One `MappingService` is constructed at startup and shared by the
//! pipeline and the tool layer — an explicit dependency, not a lazy
//! singleton. LID bindings are never cached: the directory owns them
//! and can rebind, so every aliased message pays one fresh lookup.

use crate::api_client::ApiClient;
use chrono::{DateTime, Utc};
use finbot_channels::WahaClient;
use finbot_core::{
    category::Category,
    error::{ApiError, ResolveError},
    identity::{AccessDecision, DenialReason, ResolvedUser},
    phone,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Resolves sender identifiers, users, and category names.
pub struct MappingService {
    waha: Arc<WahaClient>,
    api: Arc<ApiClient>,
    country_code: String,
}

/// Evaluate subscription access. Returns the decision and whether the
/// active flag must be flipped off (expiry passed while still active).
fn evaluate_access(
    active: bool,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (AccessDecision, bool) {
    match (active, expires_at) {
        (true, Some(expiry)) if expiry < now => (
            AccessDecision::Denied(DenialReason::SubscriptionExpired),
            true,
        ),
        (true, _) => (AccessDecision::Granted, false),
        (false, _) => (
            AccessDecision::Denied(DenialReason::SubscriptionExpired),
            false,
        ),
    }
}

fn map_api_error(e: ApiError) -> ResolveError {
    match e {
        ApiError::NotFound => ResolveError::NotFound,
        other => ResolveError::Upstream(other.to_string()),
    }
}

impl MappingService {
    pub fn new(waha: Arc<WahaClient>, api: Arc<ApiClient>, country_code: String) -> Self {
        Self {
            waha,
            api,
            country_code,
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Resolve an inbound sender identifier to a canonical phone.
    ///
    /// Plain identifiers pass through; LID aliases go through the
    /// directory. An unresolvable alias aborts resolution.
    pub async fn resolve_sender_phone(&self, sender: &str) -> Result<String, ResolveError> {
        if !phone::is_lid(sender) {
            return Ok(sender.to_string());
        }

        info!("lid detected: {sender}, resolving to phone");
        let resolved = self.waha.resolve_lid(sender).await?;
        info!("lid resolved to {resolved}");
        Ok(resolved)
    }

    /// Look up the user behind a canonical phone and evaluate access.
    ///
    /// When the subscription is still flagged active but the expiry has
    /// passed, the flag is flipped off and persisted before the access
    /// decision is returned.
    pub async fn resolve_user_by_phone(&self, phone_raw: &str) -> Result<ResolvedUser, ResolveError> {
        let clean = phone::clean_phone(phone_raw, true, &self.country_code);

        let mut user = self
            .api
            .user_by_phone(&clean)
            .await
            .map_err(map_api_error)?;

        let (access, needs_flip) =
            evaluate_access(user.subscription_active, user.subscription_expires_at, Utc::now());

        if needs_flip {
            info!(
                "subscription expired for {} ({}), flipping active flag",
                user.username, user.id
            );
            user.subscription_active = false;
            if let Err(e) = self.api.update_subscription(user.id, false).await {
                // Access is still denied this message; the flip retries next time.
                warn!("failed to persist subscription flip for {}: {e}", user.id);
            }
        }

        Ok(ResolvedUser { user, access })
    }

    /// Full resolution: sender identifier (phone or alias) → user.
    pub async fn resolve_user(&self, sender: &str) -> Result<ResolvedUser, ResolveError> {
        let phone = self.resolve_sender_phone(sender).await?;
        self.resolve_user_by_phone(&phone).await
    }

    /// Resolution down to just the stable user id.
    pub async fn resolve_user_id(&self, sender: &str) -> Result<Uuid, ResolveError> {
        Ok(self.resolve_user(sender).await?.user.id)
    }

    /// Resolve free text to a category id via the synonym table and the
    /// backend lookup. Unknown text falls back to "outros" before the
    /// lookup; a backend miss is a genuine `NotFound`.
    pub async fn category_id(&self, text: &str) -> Result<(Category, Uuid), ResolveError> {
        let category = Category::from_text(text);
        let id_ref = self
            .api
            .category_by_name(category.name())
            .await
            .map_err(map_api_error)?;
        Ok((category, id_ref.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use finbot_core::config::{BackendConfig, WahaConfig};

    #[test]
    fn test_access_granted_with_future_expiry() {
        let now = Utc::now();
        let (access, flip) = evaluate_access(true, Some(now + Duration::days(30)), now);
        assert_eq!(access, AccessDecision::Granted);
        assert!(!flip);
    }

    #[test]
    fn test_access_granted_without_expiry() {
        let now = Utc::now();
        let (access, flip) = evaluate_access(true, None, now);
        assert_eq!(access, AccessDecision::Granted);
        assert!(!flip);
    }

    #[test]
    fn test_expired_yesterday_flips_and_denies() {
        let now = Utc::now();
        let (access, flip) = evaluate_access(true, Some(now - Duration::days(1)), now);
        assert_eq!(
            access,
            AccessDecision::Denied(DenialReason::SubscriptionExpired)
        );
        assert!(flip);
    }

    #[test]
    fn test_inactive_denied_without_flip() {
        let now = Utc::now();
        let (access, flip) = evaluate_access(false, None, now);
        assert_eq!(
            access,
            AccessDecision::Denied(DenialReason::SubscriptionExpired)
        );
        assert!(!flip);
    }

    fn unreachable_service() -> MappingService {
        // Port 1 is never bound in the test environment, so every call
        // fails at connect.
        let waha = WahaClient::new(
            &WahaConfig {
                base_url: "http://127.0.0.1:1".into(),
                api_key: "test".into(),
                session: "default".into(),
            },
            "55",
        );
        let api = ApiClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:1".into(),
            api_key: "test".into(),
        });
        MappingService::new(Arc::new(waha), Arc::new(api), "55".into())
    }

    #[tokio::test]
    async fn test_plain_sender_passes_through_without_lookup() {
        // No directory round trip happens for a non-lid sender, so this
        // succeeds even with an unreachable gateway.
        let service = unreachable_service();
        let phone = service
            .resolve_sender_phone("5519992115781@c.us")
            .await
            .unwrap();
        assert_eq!(phone, "5519992115781@c.us");
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_unresolvable() {
        let service = unreachable_service();
        let err = service
            .resolve_sender_phone("140084804370526@lid")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unresolvable(_)));
    }

    #[tokio::test]
    async fn test_resolve_user_id_maps_unreachable_backend_to_upstream() {
        let service = unreachable_service();
        let err = service
            .resolve_user_id("5519992115781@c.us")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Upstream(_)));
    }

    #[test]
    fn test_map_api_error_kinds() {
        assert!(matches!(
            map_api_error(ApiError::NotFound),
            ResolveError::NotFound
        ));
        assert!(matches!(
            map_api_error(ApiError::Transport("connect refused".into())),
            ResolveError::Upstream(_)
        ));
        assert!(matches!(
            map_api_error(ApiError::Status {
                status: 500,
                body: String::new()
            }),
            ResolveError::Upstream(_)
        ));
    }
}
