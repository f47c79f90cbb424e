//! CLI command implementations.

pub mod gateway;
pub mod verify;
