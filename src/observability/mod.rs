//! Logging setup for embedding hosts.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging - respects RUST_LOG env var, defaults to INFO.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
