use tracing_subscriber::EnvFilter;

/// Installs the stderr diagnostics subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` turns on debug output for this
/// crate and everything else stays at `warn`. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "sar=debug" } else { "sar=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
