//! Messenger-facing abstractions (Telegram today, anything with buttons later).

pub mod port;
pub mod throttled;
pub mod types;
