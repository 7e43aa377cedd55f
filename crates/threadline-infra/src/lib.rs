//! Infrastructure implementations for Threadline.
//!
//! Concrete adapters for the ports defined in `threadline-core`:
//! the OpenAI Assistants HTTP client, plus configuration loading and
//! data directory resolution.

pub mod assistant;
pub mod config;
