//! API Routes

pub mod chat;
pub mod health;
