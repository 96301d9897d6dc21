//! # finbot-core
//!
//! Core types, traits, configuration, and error handling for finbot.

pub mod category;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod messages;
pub mod model;
pub mod phone;
pub mod traits;
