use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "glbind=info";

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default
/// `glbind=info`). Does nothing if a global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
        tracing::info!("logging initialized twice");
    }
}
