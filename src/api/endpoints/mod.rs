//! API endpoint handlers, one module per feature.

pub mod chat;
pub mod feedback;
pub mod health;
pub mod pollution;
