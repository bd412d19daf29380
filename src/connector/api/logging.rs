use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the level is `info`, or `debug` when `verbose`.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
