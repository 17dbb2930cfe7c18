//! Telegram → email file relay.
//!
//! One workflow, two deployment shapes: the `postbot` binary long-polls
//! Telegram and stages files in a scratch directory, the `webhook` binary
//! serves Telegram webhook POSTs and keeps file bytes in memory. Both
//! compose the same [`router::App`] over a [`fetch::FileFetcher`]
//! implementation picked at startup.

pub mod config;
pub mod event;
pub mod fetch;
pub mod mailer;
pub mod notify;
pub mod router;
