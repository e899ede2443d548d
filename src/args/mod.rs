//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::RunArgs;
pub use types::{HttpMethod, PositiveUsize};

pub(crate) use defaults::{DEFAULT_USER_AGENT, MAX_DURATION, MAX_READ_LIMIT};
pub(crate) use parsers::{parse_duration_arg, parse_header};
