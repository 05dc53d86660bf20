// SPDX-License-Identifier: MIT
//! grocerd — grocery-list bot core.
//!
//! The library is transport-agnostic: a [`service::BotService`] takes
//! `(user id, utterance)` pairs and returns reply strings, with all state
//! living in an injected [`store::UserStore`]. The `grocerd` binary wraps
//! it in a local console loop; a chat transport would do the same with
//! messages off the wire.

pub mod config;
pub mod dialogue;
pub mod groceries;
pub mod profile;
pub mod retry;
pub mod router;
pub mod service;
pub mod store;
pub mod user;

pub use service::{Action, BotService, Reply};
