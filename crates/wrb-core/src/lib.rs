//! Core domain + application logic for the wallet roast bot.
//!
//! This crate is framework-agnostic. Telegram, Groq, CoinGecko and Etherscan
//! live behind ports (traits) implemented in adapter crates.

pub mod activity;
pub mod address;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod roast;

pub use errors::{Error, Result};
