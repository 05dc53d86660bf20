// SPDX-License-Identifier: MIT
//! Utterance router — classifies a raw chat line into a bot command.
//!
//! Pure `&str -> Option<Command>` matching, no I/O. Keyword alternations are
//! case-insensitive and anchored to the whole (trimmed) utterance; the
//! free-text argument is captured with the command keyword already stripped.
//!
//! Ordering matters in one place: the clear forms ("empty list",
//! "remove list", "delete list") are tried before `remove <text>`, so
//! "remove list" empties the list instead of removing an item named "list".

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hello,
    SetName(String),
    WhoAmI,
    Identify,
    Shutdown,
    Add(String),
    Remove(String),
    Clear,
    Print,
}

struct Rule {
    pattern: Regex,
    build: fn(Option<&str>) -> Command,
}

fn rule(pattern: &str, build: fn(Option<&str>) -> Command) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("command pattern: invalid regex"),
        build,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"(?i)^(?:empty|remove|delete) list$", |_| Command::Clear),
        rule(r"(?i)^(?:print|my) list$", |_| Command::Print),
        rule(r"(?i)^(?:add|include)\s+(.+)$", |c| {
            Command::Add(capture(c))
        }),
        rule(r"(?i)^(?:remove|erase)\s+(.+)$", |c| {
            Command::Remove(capture(c))
        }),
        rule(r"(?i)^(?:call me|my name is)\s+(.+)$", |c| {
            Command::SetName(capture(c))
        }),
        rule(r"(?i)^(?:what is my name|who am i)\??$", |_| Command::WhoAmI),
        rule(
            r"(?i)^(?:uptime|identify yourself|who are you|what is your name)\??$",
            |_| Command::Identify,
        ),
        rule(r"(?i)^shutdown$", |_| Command::Shutdown),
        rule(r"(?i)^(?:hello|hi)[.!]*$", |_| Command::Hello),
    ]
});

fn capture(text: Option<&str>) -> String {
    text.unwrap_or_default().trim().to_string()
}

/// Classify an utterance. `None` means the bot stays silent.
pub fn classify(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for rule in RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            return Some((rule.build)(caps.get(1).map(|m| m.as_str())));
        }
    }
    None
}
