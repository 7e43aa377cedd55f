//! Assistant service adapters.

pub mod openai;
pub mod wire;

pub use openai::{OpenAiAssistantClient, OpenAiConnector};
