//! Continue, execute or switch: the decision made on every turn of an
//! active tool flow.
//!
//! Rules, first match wins:
//! 1. no active tool: pass through to intent detection
//! 2. an execution phrase with nothing missing: execute
//! 3. another tool referenced: propose a switch and wait for yes/no
//! 4. otherwise: continue collecting parameters
//!
//! Rule 3 is delegated to a [`SwitchHeuristic`]. The default
//! [`KeywordSwitchHeuristic`] matches words, not meaning, so a parameter value
//! that happens to share a word with another tool's description will trigger
//! a proposal. The user can decline it, which resumes the current flow.

use crate::state::ConversationState;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tooling::Tool;
use tracing::debug;

fn execution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(run it|execute|go ahead|do it|submit)\b").expect("execution pattern is a valid regex")
    })
}

/// Whether the utterance asks to run the tool now.
pub fn is_execution_request(utterance: &str) -> bool {
    execution_pattern().is_match(utterance)
}

/// Finds a tool other than the current one that the utterance refers to.
pub trait SwitchHeuristic: Send + Sync {
    fn candidate<'a>(&self, utterance: &str, current: &str, tools: &'a [Tool]) -> Option<&'a Tool>;
}

/// Keyword overlap between the utterance and each other tool's name and
/// description.
///
/// A tool's name matches as a phrase (`create_repo` also as `create repo`).
/// Description words longer than three characters are keywords; an
/// utterance word longer than three characters matches a keyword when one is
/// a prefix of the other, so "repo" matches "repository". The tool with the
/// most matches wins, ties going to catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSwitchHeuristic;

impl KeywordSwitchHeuristic {
    fn words(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 3)
            .map(str::to_lowercase)
    }

    fn score(utterance: &str, utterance_words: &[String], tool: &Tool) -> usize {
        let name = tool.name.to_lowercase();
        let spaced = name.replace(['_', '-'], " ");
        let mut score = 0;
        if utterance.contains(&name) || utterance.contains(&spaced) {
            score += 1;
        }

        if let Some(description) = tool.description.as_deref() {
            let mut keywords: Vec<String> = Self::words(description).collect();
            keywords.sort();
            keywords.dedup();
            score += keywords
                .iter()
                .filter(|k| {
                    utterance_words
                        .iter()
                        .any(|w| k.starts_with(w.as_str()) || w.starts_with(k.as_str()))
                })
                .count();
        }
        score
    }
}

impl SwitchHeuristic for KeywordSwitchHeuristic {
    fn candidate<'a>(&self, utterance: &str, current: &str, tools: &'a [Tool]) -> Option<&'a Tool> {
        let lowered = utterance.to_lowercase();
        let utterance_words: Vec<String> = Self::words(&lowered).collect();

        let mut best: Option<(&Tool, usize)> = None;
        for tool in tools.iter().filter(|t| !t.name.eq_ignore_ascii_case(current)) {
            let score = Self::score(&lowered, &utterance_words, tool);
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((tool, score));
            }
        }
        best.map(|(tool, _)| tool)
    }
}

/// Outcome of [`ContextSwitchDetector::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchDecision {
    /// No tool flow is active.
    PassThrough,

    /// Run `tool` with `arguments`; the conversation state resets afterwards.
    Execute {
        tool: String,
        arguments: Map<String, Value>,
    },

    /// Ask whether to switch; `state` is pending with the candidate.
    Propose {
        message: String,
        state: ConversationState,
    },

    /// Keep collecting parameters for the current tool.
    Continue { state: ConversationState },
}

pub struct ContextSwitchDetector {
    heuristic: Box<dyn SwitchHeuristic>,
}

impl Default for ContextSwitchDetector {
    fn default() -> Self {
        Self::new(Box::new(KeywordSwitchHeuristic))
    }
}

impl ContextSwitchDetector {
    pub fn new(heuristic: Box<dyn SwitchHeuristic>) -> Self {
        Self { heuristic }
    }

    /// Decide what this turn does. `missing` is computed for `state.tool_name`.
    pub fn evaluate(
        &self,
        utterance: &str,
        state: &ConversationState,
        missing: &[String],
        tools: &[Tool],
    ) -> SwitchDecision {
        let Some(current) = state.tool_name.as_deref() else {
            return SwitchDecision::PassThrough;
        };

        if missing.is_empty() && is_execution_request(utterance) {
            debug!(tool = current, "execution requested");
            return SwitchDecision::Execute {
                tool: current.to_string(),
                arguments: state.collected_inputs.clone(),
            };
        }

        if let Some(candidate) = self.heuristic.candidate(utterance, current, tools) {
            debug!(from = current, to = %candidate.name, "proposing tool switch");
            let mut next = state.clone();
            next.context_state_pending = true;
            next.tool_pending = Some(candidate.name.clone());
            return SwitchDecision::Propose {
                message: switch_question(current, candidate),
                state: next,
            };
        }

        let mut next = state.clone();
        next.finished = missing.is_empty();
        SwitchDecision::Continue { state: next }
    }
}

fn switch_question(current: &str, candidate: &Tool) -> String {
    match candidate.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!(
            "It sounds like you want to use {} ({}) instead of {}. Do you want to switch? (yes/no)",
            candidate.name, description, current
        ),
        None => format!(
            "It sounds like you want to use {} instead of {}. Do you want to switch? (yes/no)",
            candidate.name, current
        ),
    }
}
