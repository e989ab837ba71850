//! `cw-domain`: shared types for the Chatwoot gateway crates.
//!
//! Holds the TOML configuration model, the widget option set edited through
//! the admin form, visitor/customer types handed to the identity assembler,
//! the shared error type and structured trace events.

pub mod config;
pub mod error;
pub mod settings;
pub mod trace;
pub mod visitor;
