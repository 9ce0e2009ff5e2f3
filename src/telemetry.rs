use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::{ChatGraphError, Result};

const DEFAULT_FILTER: &str = "chatgraph=info";

/// Install the global subscriber. Logs go to stderr so stdout stays the dialogue.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|err| ChatGraphError::Config(format!("failed to install tracing subscriber: {err}")))
}
