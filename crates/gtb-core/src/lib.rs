//! Core domain + application logic for the gated translator bot.
//!
//! This crate is framework-agnostic. Telegram and the translation service
//! live behind ports (traits) implemented in adapter crates.

pub mod backup;
pub mod config;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod ports;
pub mod roster;
pub mod session;
pub mod translation;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
