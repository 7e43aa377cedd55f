//! Banners printed around a chat session.

use console::style;

use threadline_types::assistant::{Assistant, ThreadId};
use threadline_types::error::InitializationFailure;

/// Print the welcome banner once the session is ready.
pub fn print_welcome_banner(assistant: &Assistant, thread_id: &ThreadId) {
    let name = assistant.name.as_deref().unwrap_or(assistant.id.as_str());

    println!();
    println!("  {} {}", style("*").cyan(), style(name).cyan().bold());
    println!();
    if let Some(model) = &assistant.model {
        println!("  {}   {}", style("Model:").bold(), style(model).dim());
    }
    println!("  {}  {}", style("Thread:").bold(), style(thread_id).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}

/// Print the error banner shown when a session could not be set up.
///
/// The message stays generic; the underlying cause is in the logs.
pub fn print_init_error(error: &InitializationFailure) {
    eprintln!();
    eprintln!(
        "  {} {}",
        style("!").red().bold(),
        style(capitalize(&error.to_string())).red().bold()
    );
    eprintln!(
        "  {}",
        style("Check the API key and assistant id, then try again.").dim()
    );
    eprintln!();
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
