mod app;
mod config;
mod resolve;
mod transport;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use resolve::ResolveError;
pub use transport::TransportError;
pub use validation::ValidationError;
