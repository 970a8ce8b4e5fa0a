//! Data models shared across the comparison pipeline.

pub mod config;
pub mod page;
pub mod report;
