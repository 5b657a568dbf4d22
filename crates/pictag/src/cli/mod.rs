//! Command implementations.

pub mod config;
pub mod keywords;
pub mod models;
pub mod tag;
