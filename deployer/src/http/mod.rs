//! HTTP layer

pub mod client;
pub mod engine;
