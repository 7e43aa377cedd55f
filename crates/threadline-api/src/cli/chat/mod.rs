//! Interactive terminal chat.
//!
//! Credential prompts, the welcome banner, slash commands, a waiting
//! spinner while a run is pending, and markdown rendering of replies.
//! Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
