//! Core library for the `sustain` CLI.
//!
//! `sustain` keeps a fixed pool of workers sending requests to one endpoint
//! for a bounded duration. A background resolver follows DNS changes and the
//! pool is replaced whenever the target's addresses change. Everything hangs
//! off one cancellation tree: run scope, per-worker scope, per-request
//! deadline.
//!
//! The primary user-facing interface is the `sustain` binary; the library
//! APIs exist so the run lifecycle can be driven and tested with substitute
//! resolvers and transports.
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod runner;
pub(crate) mod system;
pub mod target;
