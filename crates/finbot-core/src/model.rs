//! Wire types for the backend REST API.
//!
//! These mirror the backend's JSON payloads. Currency amounts travel as
//! strings and are parsed into `Decimal` so arithmetic stays exact.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A backend user as returned by `/users/by-phone/{phone}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Canonical local phone (no country code, no suffix).
    pub phone: String,
    #[serde(default)]
    pub subscription_active: bool,
    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

/// An expense record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    /// Free-text description (accent-stripped on write).
    pub message: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    pub categoria_id: Uuid,
    /// Canonical category name, when the backend joins it in.
    #[serde(default)]
    pub categoria_name: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Paged expense listing (`/bot/user/{id}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpensePage {
    #[serde(default)]
    pub gastos: Vec<Expense>,
}

/// A savings goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    /// Target amount.
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    /// Accumulated amount, clamped to `[0, value]` on every update.
    #[serde(with = "rust_decimal::serde::str")]
    pub value_actual: Decimal,
    /// Deadline date.
    pub time: NaiveDate,
    pub user_id: Uuid,
}

/// Paged goal listing (`/bot/metas/user/{id}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalPage {
    #[serde(default)]
    pub metas: Vec<Goal>,
}

/// Minimal `{ "id": ... }` reference returned by lookup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdRef {
    pub id: Uuid,
}

/// Request body for creating an expense.
#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub message: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    pub categoria_id: Uuid,
    pub user_id: Uuid,
}

/// Request body for updating an expense.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseUpdate {
    pub message: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    pub categoria_id: Uuid,
}

/// Request body for creating a goal.
#[derive(Debug, Clone, Serialize)]
pub struct NewGoal {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub value_actual: Decimal,
    pub time: NaiveDate,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_expense_decimal_round_trip() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "message": "almoco",
            "value": "50.00",
            "categoria_id": "650e8400-e29b-41d4-a716-446655440000",
            "categoria_name": "alimentacao",
            "user_id": "750e8400-e29b-41d4-a716-446655440000",
            "created_at": "2026-08-30T12:00:00Z"
        }"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.value, dec("50.00"));
        assert_eq!(expense.message, "almoco");

        let back = serde_json::to_value(&expense).unwrap();
        assert_eq!(back["value"], "50.00");
    }

    #[test]
    fn test_goal_deserializes_date() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "carro novo",
            "value": "10000.00",
            "value_actual": "0.00",
            "time": "2027-10-20",
            "user_id": "750e8400-e29b-41d4-a716-446655440000"
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.time, NaiveDate::from_ymd_opt(2027, 10, 20).unwrap());
        assert_eq!(goal.value_actual, Decimal::ZERO);
    }

    #[test]
    fn test_user_defaults_for_subscription_fields() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "username": "alice",
            "email": "alice@example.com",
            "phone": "19992115781"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.subscription_active);
        assert!(user.subscription_expires_at.is_none());
    }

    #[test]
    fn test_empty_pages_default() {
        let page: ExpensePage = serde_json::from_str("{}").unwrap();
        assert!(page.gastos.is_empty());
        let page: GoalPage = serde_json::from_str("{}").unwrap();
        assert!(page.metas.is_empty());
    }
}
