//! Session & broadcast engine for the relay bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the `MessagingPort`
//! trait implemented in the adapter crate; inbound updates arrive as
//! `IncomingUpdate` and are dispatched by `RelayRouter`.

pub mod aggregator;
pub mod broadcast;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gate;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod relay;
pub mod sessions;
pub mod subscribers;

pub use errors::{DeliveryError, DeliveryResult, Error, Result};
