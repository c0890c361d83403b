//! Shared types.

pub mod config;
pub mod errors;
pub mod grid;
pub mod requests;
pub mod responses;
