//! Credential resolution for `chat` and `ask`.
//!
//! Flags and environment variables win; anything missing is prompted for
//! (interactive commands only).

use anyhow::{Result, bail};
use console::style;
use dialoguer::{Input, Password};

use threadline_types::assistant::Credentials;

use super::CredentialArgs;

/// Build credentials from flags alone. Used by non-interactive commands.
pub fn from_args(args: &CredentialArgs) -> Result<Credentials> {
    let Some(api_key) = non_blank(args.api_key.as_deref()) else {
        bail!("missing API key: pass --api-key or set OPENAI_API_KEY");
    };
    let Some(assistant_id) = non_blank(args.assistant_id.as_deref()) else {
        bail!("missing assistant id: pass --assistant-id or set OPENAI_ASSISTANT_ID");
    };
    Ok(Credentials::new(api_key, assistant_id))
}

/// Build credentials from flags, prompting for whatever is missing.
pub fn resolve_interactive(args: &CredentialArgs) -> Result<Credentials> {
    let api_key = match non_blank(args.api_key.as_deref()) {
        Some(key) => key.to_string(),
        None => prompt_api_key()?,
    };
    let assistant_id = match non_blank(args.assistant_id.as_deref()) {
        Some(id) => id.to_string(),
        None => prompt_assistant_id(None)?,
    };
    Ok(Credentials::new(api_key, assistant_id))
}

/// Prompt for both values again after a failed initialization.
///
/// The previous assistant id is offered as the default.
pub fn reenter(previous_assistant_id: &str) -> Result<Credentials> {
    let api_key = prompt_api_key()?;
    let assistant_id = prompt_assistant_id(Some(previous_assistant_id))?;
    Ok(Credentials::new(api_key, assistant_id))
}

fn prompt_api_key() -> Result<String> {
    Ok(Password::new()
        .with_prompt(format!("Enter your {}", style("OpenAI API key").bold()))
        .interact()?)
}

fn prompt_assistant_id(default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(format!("Enter the {}", style("assistant id").bold()));
    if let Some(default) = default {
        input = input.default(default.to_string());
    }
    Ok(input.interact_text()?)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
