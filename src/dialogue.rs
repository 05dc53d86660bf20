// SPDX-License-Identifier: MIT
//! Multi-turn conversations, modelled as explicit state machines.
//!
//! Two flows exist: capturing a nickname for a user the bot cannot name yet,
//! and confirming a shutdown request. While a dialogue is active for a user,
//! the service routes that user's utterances here instead of the command
//! router. There is no timeout-driven termination; an active dialogue ends
//! only through one of its transitions.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

static RE_YES: OnceLock<Regex> = OnceLock::new();
static RE_NO: OnceLock<Regex> = OnceLock::new();

fn re_yes() -> &'static Regex {
    RE_YES.get_or_init(|| {
        Regex::new(r"(?i)^(yes|yea|yup|yep|ya|sure|ok|okay|y|yeah|yah)\b").expect("yes regex")
    })
}

fn re_no() -> &'static Regex {
    RE_NO.get_or_init(|| Regex::new(r"(?i)^(no|nah|nope|n)\b").expect("no regex"))
}

/// Terminal result of a finished dialogue, handed back to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueOutcome {
    /// The user confirmed this nickname; the service persists it and replies.
    NameConfirmed(String),
    /// The nickname flow was stopped before completion.
    NameAborted,
    ShutdownConfirmed,
    ShutdownDeclined,
}

/// One advance of the state machine: what to say, and — when the dialogue
/// just reached a terminal state — its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub reply: Option<String>,
    pub outcome: Option<DialogueOutcome>,
}

impl Step {
    fn say(reply: impl Into<String>) -> Self {
        Step {
            reply: Some(reply.into()),
            outcome: None,
        }
    }

    fn finish(reply: Option<String>, outcome: DialogueOutcome) -> Self {
        Step {
            reply,
            outcome: Some(outcome),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameState {
    AwaitingName,
    AwaitingConfirmation { pending: String },
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialogue {
    NameCapture { state: NameState },
    ConfirmShutdown,
}

impl Dialogue {
    /// Start the nickname flow. The opening line is what the bot says when
    /// `who am i` finds no stored name.
    pub fn name_capture() -> (Self, String) {
        (
            Dialogue::NameCapture {
                state: NameState::AwaitingName,
            },
            "I do not know your name yet! What should I call you?".to_string(),
        )
    }

    pub fn confirm_shutdown() -> (Self, String) {
        (
            Dialogue::ConfirmShutdown,
            "Are you sure you want me to shutdown?".to_string(),
        )
    }

    /// Advance the machine with the user's next utterance. A `Step` with an
    /// outcome means the dialogue is over and must be dropped by the caller.
    pub fn advance(&mut self, text: &str) -> Step {
        let text = text.trim();
        match self {
            Dialogue::NameCapture { state } => Self::advance_name(state, text),
            Dialogue::ConfirmShutdown => {
                if re_yes().is_match(text) {
                    Step::finish(Some("Bye!".to_string()), DialogueOutcome::ShutdownConfirmed)
                } else {
                    // Anything that is not an explicit yes declines.
                    Step::finish(Some("*Phew!*".to_string()), DialogueOutcome::ShutdownDeclined)
                }
            }
        }
    }

    fn advance_name(state: &mut NameState, text: &str) -> Step {
        match state {
            NameState::AwaitingName => {
                if text.is_empty() {
                    return Step::say("What should I call you?");
                }
                let pending = text.to_string();
                debug!(pending = %pending, "nickname proposed");
                let ask = format!("You want me to call you `{pending}`?");
                *state = NameState::AwaitingConfirmation { pending };
                Step::say(ask)
            }
            NameState::AwaitingConfirmation { pending } => {
                if re_yes().is_match(text) {
                    let name = pending.clone();
                    *state = NameState::Done;
                    Step::finish(None, DialogueOutcome::NameConfirmed(name))
                } else if re_no().is_match(text) {
                    *state = NameState::Aborted;
                    Step::finish(
                        Some("OK, nevermind!".to_string()),
                        DialogueOutcome::NameAborted,
                    )
                } else {
                    // Neither yes nor no: repeat the question.
                    Step::say(format!("You want me to call you `{pending}`?"))
                }
            }
            // Terminal states never receive input; the service drops
            // finished dialogues. Treat a stray call as an abort.
            NameState::Done | NameState::Aborted => {
                Step::finish(None, DialogueOutcome::NameAborted)
            }
        }
    }
}
