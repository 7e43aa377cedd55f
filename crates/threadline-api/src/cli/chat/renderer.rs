//! Terminal rendering for the chat loop.
//!
//! Assistant replies are markdown and go through `termimad`; user lines
//! are echoed plainly in the history view.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::MadSkin;
use termimad::crossterm::style::Color;

use threadline_types::chat::ChatMessage;

/// Longest history preview before truncation, in characters.
const PREVIEW_CHARS: usize = 100;

pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render markdown to an ANSI string, indented two columns.
    pub fn render(&self, markdown: &str) -> String {
        let rendered = self.skin.term_text(markdown).to_string();
        rendered
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Print an assistant message under the assistant's name.
    pub fn print_assistant(&self, name: &str, message: &ChatMessage) {
        println!();
        println!("  {}", style(name).cyan().bold());
        println!("{}", self.render(&message.content));
        println!();
    }

    /// Print the footer under a delivered reply.
    ///
    /// Format: "| run_abc . 3 checks . 12.4s"
    pub fn print_stats_footer(&self, run_id: &str, polls: u32, elapsed: Duration) {
        let checks = if polls == 1 { "check" } else { "checks" };
        println!(
            "  {} {} {} {} {} {} {:.1}s",
            style("|").dim(),
            style(run_id).dim(),
            style("\u{00b7}").dim(),
            style(polls).dim(),
            style(checks).dim(),
            style("\u{00b7}").dim(),
            elapsed.as_secs_f64(),
        );
        println!();
    }

    /// Print the whole local transcript.
    pub fn print_history(&self, assistant_name: &str, messages: &[ChatMessage]) {
        println!();
        for message in messages {
            let label = if message.is_user {
                style("You").green().bold()
            } else {
                style(assistant_name).cyan().bold()
            };
            println!("  {} {}", label, preview(&message.content));
        }
        println!();
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A steady-ticking spinner with the given message.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(spinner_style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Single-line preview of a message, truncated on a char boundary.
fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
    format!("{cut}...")
}
