//! Assistant service abstractions.
//!
//! - `AssistantClient`: RPITIT trait for the remote operations a session needs
//! - `AssistantConnector`: builds a client bound to a set of credentials
//! - `reply`: picks the reply of a run out of a thread listing

pub mod client;
pub mod reply;
