//! # finbot-channels
//!
//! Client for the WAHA chat gateway: outbound text delivery and LID
//! (alias) resolution. Both talk to the same instance with the same
//! `X-Api-Key` auth, so they live on one client.

pub mod waha;

pub use waha::WahaClient;
