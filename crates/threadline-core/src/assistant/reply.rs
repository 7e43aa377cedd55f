//! Reply selection for a finished run.

use threadline_types::assistant::{MessageRole, RemoteMessage, RunId};

/// Pick the reply a run produced from a thread listing.
///
/// Only assistant-authored messages tagged with `run_id` and carrying text
/// qualify. Among those the most recent wins: highest `created_at`, and on
/// a tie the entry that appears later in `messages`. The result does not
/// depend on whether the listing is sorted ascending or descending.
pub fn select_reply<'a>(messages: &'a [RemoteMessage], run_id: &RunId) -> Option<&'a RemoteMessage> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .filter(|m| m.run_id.as_ref() == Some(run_id))
        .filter(|m| m.text.is_some())
        .max_by_key(|m| m.created_at)
}
