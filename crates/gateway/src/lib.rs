//! `cw-gateway`: the `chatwoot-gate` server.
//!
//! Serves the site's pages with the Chatwoot widget injected, exposes the
//! sign-out hook and the widget fragment API, and hosts the admin settings
//! form.  Rendering itself lives in `cw-widget`; this crate wires it into
//! HTTP.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod inject;
pub mod render;
pub mod settings_store;
pub mod state;
pub mod visitor;
