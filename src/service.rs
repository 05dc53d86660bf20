// SPDX-License-Identifier: MIT
//! BotService — the dependency-injected core the transport talks to.
//!
//! One call per inbound utterance: `handle(user_id, text)` classifies the
//! text (or feeds it to the user's active dialogue), runs the matching
//! operation against the injected store, and returns the reply to relay.
//! No reply is produced before the persistence round-trip has completed.
//!
//! Commands for the same user are serialized through a keyed mutex, closing
//! the read-modify-write race between near-simultaneous commands. Distinct
//! users never block each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::dialogue::{Dialogue, DialogueOutcome};
use crate::groceries::{self, reply};
use crate::profile;
use crate::retry::{retry_store, RetryConfig};
use crate::router::{classify, Command};
use crate::store::UserStore;

/// Side effect the transport must carry out after relaying the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub action: Option<Action>,
}

impl Reply {
    fn say(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            action: None,
        }
    }
}

pub struct BotService {
    store: Arc<dyn UserStore>,
    retry: RetryConfig,
    bot_name: String,
    started_at: Instant,
    host_name: String,
    /// Per-user command serialization (see module docs).
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Active multi-turn conversations, keyed by user id.
    dialogues: Mutex<HashMap<String, Dialogue>>,
}

impl BotService {
    pub fn new(store: Arc<dyn UserStore>, bot_name: impl Into<String>) -> Self {
        BotService {
            store,
            retry: RetryConfig::default(),
            bot_name: bot_name.into(),
            started_at: Instant::now(),
            host_name: sysinfo::System::host_name()
                .unwrap_or_else(|| "unknown-host".to_string()),
            user_locks: Mutex::new(HashMap::new()),
            dialogues: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Handle one utterance. `Ok(None)` means the text matched nothing and
    /// the bot stays silent. Store failures come back as errors; the caller
    /// replies with a generic failure line — other users are unaffected.
    pub async fn handle(&self, user_id: &str, text: &str) -> Result<Option<Reply>> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        // An active dialogue consumes the utterance before any routing.
        if let Some(reply) = self.advance_dialogue(user_id, text).await? {
            return Ok(Some(reply));
        }

        let Some(command) = classify(text) else {
            return Ok(None);
        };
        info!(user = user_id, ?command, "command");

        let reply = match command {
            Command::Hello => match self.get_name(user_id).await? {
                Some(name) => Reply::say(format!("Hello {name}!!")),
                None => Reply::say("Hello."),
            },
            Command::SetName(name) => {
                let stored = retry_store(&self.retry, || {
                    profile::set_name(self.store.as_ref(), user_id, &name)
                })
                .await
                .context("storing nickname failed")?;
                Reply::say(format!("Got it. I will call you {stored} from now on."))
            }
            Command::WhoAmI => match self.get_name(user_id).await? {
                Some(name) => Reply::say(format!("Your name is {name}")),
                None => {
                    let (dialogue, opening) = Dialogue::name_capture();
                    self.dialogues
                        .lock()
                        .await
                        .insert(user_id.to_string(), dialogue);
                    Reply::say(opening)
                }
            },
            Command::Identify => Reply::say(format!(
                ":robot_face: I am a bot named {}. I have been running for {} on {}.",
                self.bot_name,
                format_uptime(self.started_at.elapsed()),
                self.host_name
            )),
            Command::Shutdown => {
                let (dialogue, opening) = Dialogue::confirm_shutdown();
                self.dialogues
                    .lock()
                    .await
                    .insert(user_id.to_string(), dialogue);
                Reply::say(opening)
            }
            Command::Add(raw) => {
                let outcome = retry_store(&self.retry, || {
                    groceries::add(self.store.as_ref(), user_id, &raw)
                })
                .await
                .context("adding items failed")?;
                Reply::say(reply::render_add(&outcome))
            }
            Command::Remove(item) => {
                let outcome = retry_store(&self.retry, || {
                    groceries::remove(self.store.as_ref(), user_id, &item)
                })
                .await
                .context("removing item failed")?;
                Reply::say(reply::render_remove(&outcome))
            }
            Command::Clear => {
                retry_store(&self.retry, || {
                    groceries::clear(self.store.as_ref(), user_id)
                })
                .await
                .context("clearing list failed")?;
                Reply::say(reply::render_clear())
            }
            Command::Print => {
                let list = retry_store(&self.retry, || {
                    groceries::print(self.store.as_ref(), user_id)
                })
                .await
                .context("reading list failed")?;
                Reply::say(reply::render_print(&list))
            }
        };
        Ok(Some(reply))
    }

    /// Feed the utterance to the user's active dialogue, if any. Returns the
    /// dialogue's reply, or `None` when no dialogue is running.
    async fn advance_dialogue(&self, user_id: &str, text: &str) -> Result<Option<Reply>> {
        let mut dialogues = self.dialogues.lock().await;
        let Some(dialogue) = dialogues.get_mut(user_id) else {
            return Ok(None);
        };

        let step = dialogue.advance(text);
        let Some(outcome) = step.outcome else {
            // Dialogue continues; keep it registered.
            return Ok(Some(Reply::say(step.reply.unwrap_or_default())));
        };

        dialogues.remove(user_id);
        drop(dialogues);

        let reply = match outcome {
            DialogueOutcome::NameConfirmed(name) => {
                let stored = retry_store(&self.retry, || {
                    profile::set_name(self.store.as_ref(), user_id, &name)
                })
                .await
                .context("storing nickname failed")?;
                Reply::say(format!(
                    "OK! I will update my dossier...\nGot it. I will call you {stored} from now on."
                ))
            }
            DialogueOutcome::NameAborted => {
                Reply::say(step.reply.unwrap_or_else(|| "OK, nevermind!".to_string()))
            }
            DialogueOutcome::ShutdownConfirmed => {
                warn!(user = user_id, "shutdown confirmed");
                Reply {
                    text: step.reply.unwrap_or_else(|| "Bye!".to_string()),
                    action: Some(Action::Shutdown),
                }
            }
            DialogueOutcome::ShutdownDeclined => {
                Reply::say(step.reply.unwrap_or_else(|| "*Phew!*".to_string()))
            }
        };
        Ok(Some(reply))
    }

    async fn get_name(&self, user_id: &str) -> Result<Option<String>> {
        retry_store(&self.retry, || {
            profile::get_name(self.store.as_ref(), user_id)
        })
        .await
        .context("reading nickname failed")
    }

    async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// "47 seconds" / "1 minute" / "3.2 hours" — the identity reply's age.
fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (value, unit) = if secs < 60 {
        (secs as f64, "second")
    } else if secs < 3600 {
        (secs as f64 / 60.0, "minute")
    } else {
        (secs as f64 / 3600.0, "hour")
    };
    // One decimal at most; "1 minute" not "1.0 minutes".
    let rounded = (value * 10.0).round() / 10.0;
    let shown = if rounded.fract() == 0.0 {
        format!("{}", rounded as u64)
    } else {
        format!("{rounded:.1}")
    };
    let plural = if rounded == 1.0 { "" } else { "s" };
    format!("{shown} {unit}{plural}")
}
