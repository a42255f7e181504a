//! The yes/no sub-dialog after a tool switch was proposed.

use crate::error::ConversationError;
use crate::missing::missing_parameters;
use crate::prompts::parameter_label;
use crate::state::ConversationState;
use tooling::{Tool, ToolCatalog};
use tracing::{debug, info, warn};

const CONFIRM_WORDS: [&str; 8] = ["y", "ya", "yea", "yeah", "yep", "yup", "yes", "ok"];
const CONFIRM_STEMS: [&str; 3] = ["sure", "okay", "confirm"];
const CANCEL_WORDS: [&str; 8] = ["n", "no", "nah", "nope", "not", "don't", "dont", "never"];
const CANCEL_STEMS: [&str; 3] = ["cancel", "stop", "nevermind"];

/// How the user answered the switch question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReply {
    Confirm,
    Cancel,
    Unclear,
}

impl PendingReply {
    /// Classify a reply, ignoring case.
    ///
    /// The first word that is a yes or no keyword decides. A word matches
    /// when it equals a short keyword or starts with a stem, so "yeah",
    /// "confirmed" and "cancelled" are recognised. Negations count as no,
    /// which makes "not sure" a cancel and "sure, no problem" a confirm.
    pub fn classify(utterance: &str) -> Self {
        let lowered = utterance.to_lowercase().replace('\u{2019}', "'");
        lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .map(|w| w.trim_matches('\''))
            .filter(|w| !w.is_empty())
            .find_map(Self::keyword)
            .unwrap_or(PendingReply::Unclear)
    }

    fn keyword(word: &str) -> Option<Self> {
        let matches = |words: &[&str], stems: &[&str]| {
            words.contains(&word) || stems.iter().any(|s| word.starts_with(s))
        };
        if matches(&CANCEL_WORDS[..], &CANCEL_STEMS[..]) {
            Some(PendingReply::Cancel)
        } else if matches(&CONFIRM_WORDS[..], &CONFIRM_STEMS[..]) {
            Some(PendingReply::Confirm)
        } else {
            None
        }
    }
}

/// Reply text and the state to carry forward.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub message: String,
    pub state: ConversationState,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PendingSwitchResolver;

impl PendingSwitchResolver {
    /// Resolve a pending switch. `missing` is computed for the pre-switch tool.
    pub fn resolve(
        &self,
        utterance: &str,
        state: &ConversationState,
        missing: &[String],
        tools: &[Tool],
    ) -> Resolution {
        let (Some(current), Some(pending)) = (state.tool_name.as_deref(), state.tool_pending.as_deref())
        else {
            let err = ConversationError::StateCorruption(
                "switch pending without both the current and the proposed tool".to_string(),
            );
            warn!(error = %err, "resetting conversation state");
            return Resolution {
                message: "Something went wrong with this conversation, so I've started over. What would you like to do?"
                    .to_string(),
                state: ConversationState::default(),
            };
        };

        match PendingReply::classify(utterance) {
            PendingReply::Confirm => Self::confirm(current, pending, tools),
            PendingReply::Cancel => Self::cancel(current, state, missing, tools),
            PendingReply::Unclear => {
                debug!(current, pending, "unclear answer to switch question");
                Resolution {
                    message: format!(
                        "Please answer yes to switch to {} or no to continue with {}.",
                        pending, current
                    ),
                    state: state.clone(),
                }
            }
        }
    }

    fn confirm(current: &str, pending: &str, tools: &[Tool]) -> Resolution {
        let Some(tool) = ToolCatalog::find_tool(tools, pending) else {
            warn!(tool = pending, "confirmed switch to a tool that is no longer available");
            return Resolution {
                message: format!("{} is no longer available. What would you like to do?", pending),
                state: ConversationState::default(),
            };
        };

        info!(from = current, to = %tool.name, "switched tool");
        let state = ConversationState::for_tool(tool.name.clone());
        let missing = missing_parameters(Some(&tool.input_schema), &state.collected_inputs);
        let message = match missing.first() {
            Some(first) => format!(
                "Switched to {}. Please provide {}.",
                tool.name,
                parameter_label(tool, first)
            ),
            None => format!(
                "Switched to {}. No parameters needed. Say \"run it\" to execute it.",
                tool.name
            ),
        };
        Resolution { message, state }
    }

    fn cancel(current: &str, state: &ConversationState, missing: &[String], tools: &[Tool]) -> Resolution {
        let mut next = state.clone();
        next.context_state_pending = false;
        next.tool_pending = None;

        let follow_up = match (missing.first(), ToolCatalog::find_tool(tools, current)) {
            (Some(first), Some(tool)) => format!("Please provide {}.", parameter_label(tool, first)),
            (Some(first), None) => format!("Please provide {}.", first),
            (None, _) => "Everything is ready. Say \"run it\" to execute it.".to_string(),
        };
        debug!(tool = current, "switch declined");
        Resolution {
            message: format!("OK, continuing with {}. {}", current, follow_up),
            state: next,
        }
    }
}
