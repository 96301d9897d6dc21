//! Audit log — records every inbound message finbot processes.

use finbot_core::error::BotError;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// An entry to write to the audit log.
pub struct AuditEntry {
    /// Raw sender identifier from the webhook (may be a LID).
    pub sender_id: String,
    /// Resolved phone, when resolution got that far.
    pub phone: Option<String>,
    /// Resolved user id, when resolution got that far.
    pub user_id: Option<String>,
    pub input_text: String,
    pub output_text: Option<String>,
    pub provider_used: Option<String>,
    pub model: Option<String>,
    pub processing_ms: Option<i64>,
    pub status: AuditStatus,
    pub denial_reason: Option<String>,
}

/// Status of an audited interaction.
pub enum AuditStatus {
    /// Agent ran and a reply was produced.
    Ok,
    /// Identity or access check stopped processing before the agent.
    Denied,
    /// Processing failed; the user got a generic error (or nothing).
    Error,
}

impl AuditStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Denied => "denied",
            Self::Error => "error",
        }
    }
}

/// Audit logger backed by SQLite.
#[derive(Clone)]
pub struct AuditLogger {
    pool: SqlitePool,
}

impl AuditLogger {
    /// Create a new audit logger sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write an entry to the audit log.
    pub async fn log(&self, entry: &AuditEntry) -> Result<(), BotError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO audit_log \
             (id, sender_id, phone, user_id, input_text, output_text, \
              provider_used, model, processing_ms, status, denial_reason) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.sender_id)
        .bind(&entry.phone)
        .bind(&entry.user_id)
        .bind(&entry.input_text)
        .bind(&entry.output_text)
        .bind(&entry.provider_used)
        .bind(&entry.model)
        .bind(entry.processing_ms)
        .bind(entry.status.as_str())
        .bind(&entry.denial_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| BotError::Audit(format!("audit log write failed: {e}")))?;

        debug!(
            "audit: {} [{}] {}",
            entry.sender_id,
            entry.status.as_str(),
            truncate(&entry.input_text, 80)
        );

        Ok(())
    }
}

/// Truncate at a char boundary at or below `max` bytes.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use sqlx::Row;

    #[tokio::test]
    async fn test_log_inserts_entry() {
        let store = Store::new(":memory:").await.unwrap();
        let logger = AuditLogger::new(store.pool().clone());

        let entry = AuditEntry {
            sender_id: "5519992115781@c.us".to_string(),
            phone: Some("19992115781".to_string()),
            user_id: Some("550e8400-e29b-41d4-a716-446655440000".to_string()),
            input_text: "gastei 50 no almoco".to_string(),
            output_text: Some("✅ *GASTO REGISTRADO COM SUCESSO!*".to_string()),
            provider_used: Some("groq".to_string()),
            model: Some("llama-3.3-70b-versatile".to_string()),
            processing_ms: Some(812),
            status: AuditStatus::Ok,
            denial_reason: None,
        };

        logger.log(&entry).await.unwrap();

        let row = sqlx::query("SELECT sender_id, phone, status, processing_ms FROM audit_log")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("sender_id"), "5519992115781@c.us");
        assert_eq!(
            row.get::<Option<String>, _>("phone"),
            Some("19992115781".to_string())
        );
        assert_eq!(row.get::<String, _>("status"), "ok");
        assert_eq!(row.get::<Option<i64>, _>("processing_ms"), Some(812));
    }

    #[tokio::test]
    async fn test_log_denied_entry() {
        let store = Store::new(":memory:").await.unwrap();
        let logger = AuditLogger::new(store.pool().clone());

        let entry = AuditEntry {
            sender_id: "140084804370526@lid".to_string(),
            phone: None,
            user_id: None,
            input_text: "oi".to_string(),
            output_text: None,
            provider_used: None,
            model: None,
            processing_ms: Some(45),
            status: AuditStatus::Denied,
            denial_reason: Some("unresolvable lid".to_string()),
        };
        logger.log(&entry).await.unwrap();

        let row = sqlx::query("SELECT status, denial_reason FROM audit_log")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("status"), "denied");
        assert_eq!(
            row.get::<Option<String>, _>("denial_reason"),
            Some("unresolvable lid".to_string())
        );
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // "almoço" — 'ç' is 2 bytes; byte 5 falls inside it.
        let s = "almoço";
        let result = truncate(s, 5);
        assert_eq!(result, "almo");
    }
}
