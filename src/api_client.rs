//! Typed client for the finance backend's REST API.
//!
//! Authenticates with the static `X-API-Key` header; 404 maps to
//! `ApiError::NotFound`, other non-2xx to `ApiError::Status`, so callers
//! branch on kinds instead of status-code strings.

use chrono::NaiveDate;
use finbot_core::{
    config::BackendConfig,
    error::ApiError,
    model::{Expense, ExpensePage, ExpenseUpdate, Goal, GoalPage, IdRef, NewExpense, NewGoal, User},
};
use reqwest::{Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Per-request timeout for backend calls.
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend REST client.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Create from config values.
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("api: {method} {path}");
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("X-API-Key", &self.api_key)
            .timeout(API_TIMEOUT)
    }

    /// Send, map status codes, and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| ApiError::Transport(format!("response decode failed: {e}")))
    }

    /// Send and discard the body, mapping status codes the same way.
    async fn execute_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    // --- Users ---

    /// Look up a user by canonical local phone.
    pub async fn user_by_phone(&self, phone: &str) -> Result<User, ApiError> {
        self.execute(self.request(Method::GET, &format!("/users/by-phone/{phone}")))
            .await
    }

    /// Persist a subscription-flag change (lazy expiry flip).
    pub async fn update_subscription(&self, user_id: Uuid, active: bool) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PATCH, &format!("/users/{user_id}/subscription"))
            .json(&serde_json::json!({ "subscription_active": active }));
        self.execute_empty(builder).await
    }

    // --- Categories ---

    /// Resolve a canonical category name to its id.
    pub async fn category_by_name(&self, name: &str) -> Result<IdRef, ApiError> {
        self.execute(self.request(Method::GET, &format!("/categorias/by-name/{name}")))
            .await
    }

    // --- Expenses ---

    pub async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, ApiError> {
        let builder = self.request(Method::POST, "/bot/").json(expense);
        self.execute(builder).await
    }

    pub async fn get_expense(&self, id: Uuid) -> Result<Expense, ApiError> {
        self.execute(self.request(Method::GET, &format!("/bot/gastos/{id}")))
            .await
    }

    /// List a user's expenses, newest first, optionally bounded by dates.
    pub async fn list_expenses(
        &self,
        user_id: Uuid,
        limit: u32,
        period: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ExpensePage, ApiError> {
        let mut query: Vec<(&str, String)> =
            vec![("limit", limit.to_string()), ("offset", "0".to_string())];
        if let Some((start, end)) = period {
            query.push(("start_date", start.to_string()));
            query.push(("end_date", end.to_string()));
        }
        let builder = self
            .request(Method::GET, &format!("/bot/user/{user_id}"))
            .query(&query);
        self.execute(builder).await
    }

    /// Fetch the user's most recent expense.
    pub async fn last_expense(&self, user_id: Uuid) -> Result<ExpensePage, ApiError> {
        self.execute(self.request(Method::GET, &format!("/bot/user/{user_id}/ultimo-gasto")))
            .await
    }

    pub async fn update_expense(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: &ExpenseUpdate,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &format!("/bot/gastos/{id}/{user_id}"))
            .json(update);
        self.execute_empty(builder).await
    }

    pub async fn delete_expense(&self, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, &format!("/bot/gastos/{id}/{user_id}")))
            .await
    }

    // --- Goals ---

    pub async fn create_goal(&self, goal: &NewGoal) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "/bot/metas").json(goal);
        self.execute_empty(builder).await
    }

    pub async fn get_goal(&self, id: Uuid) -> Result<Goal, ApiError> {
        self.execute(self.request(Method::GET, &format!("/bot/metas/{id}")))
            .await
    }

    pub async fn list_goals(&self, user_id: Uuid, limit: u32) -> Result<GoalPage, ApiError> {
        let builder = self
            .request(Method::GET, &format!("/bot/metas/user/{user_id}"))
            .query(&[("limit", limit.to_string()), ("offset", "0".to_string())]);
        self.execute(builder).await
    }

    /// Set a goal's accumulated amount (already clamped by the caller).
    pub async fn update_goal_progress(
        &self,
        id: Uuid,
        value_actual: Decimal,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PATCH, &format!("/bot/metas/{id}"))
            .query(&[("value_actual", value_actual.to_string())]);
        self.execute_empty(builder).await
    }

    pub async fn delete_goal(&self, id: Uuid) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, &format!("/bot/metas/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbot_core::config::BackendConfig;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new(&BackendConfig {
            base_url: "http://localhost:8000/".into(),
            api_key: "key".into(),
        });
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
