//! Conversation logic and the assistant service port for Threadline.
//!
//! This crate defines the [`assistant::client::AssistantClient`] port that the
//! infrastructure layer implements, plus everything that runs on top of it:
//! run polling, reply selection, and the [`session::ConversationSession`]
//! itself. It depends only on `threadline-types` -- never on
//! `threadline-infra` or any HTTP crate.

pub mod assistant;
pub mod run;
pub mod session;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;
