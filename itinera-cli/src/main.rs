//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;

fn main() -> eyre::Result<()> {
    init_logging();
    itinera_cli::run()?;
    Ok(())
}

/// Install a formatter honouring `RUST_LOG`, defaulting to `info`.
///
/// Library crates log through the `log` facade, which the subscriber
/// bridges.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        log::debug!("a global subscriber was already installed");
    }
}
