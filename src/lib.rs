//! Elderly-Care Monitoring Core
//!
//! The shared client core behind the monitoring app's views: the health
//! record store the dashboard and health form write to and read from, the
//! status classifier, the chat assistant's context builder and completion
//! client, reminder scheduling, and the account API client.

pub mod api;
pub mod assistant;
pub mod db;
pub mod models;
pub mod reminders;
pub mod status;
pub mod store;
