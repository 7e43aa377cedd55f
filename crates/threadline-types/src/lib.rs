//! Shared domain types for Threadline.
//!
//! This crate contains the types used across the Threadline workspace:
//! credentials, remote assistant handles, run status, the local chat
//! transcript entries, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod assistant;
pub mod chat;
pub mod config;
pub mod error;
