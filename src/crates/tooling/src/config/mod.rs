//! Environment-driven configuration helpers.
//!
//! Used by the server's config loader for `CONDUCTOR_*` overrides and for
//! `${VAR}` interpolation of secrets in config files.

pub mod env;

pub use env::{expand_env_vars, get_env, get_env_parse};
