//! Tracing setup for processes embedding the aggregator.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber: `RUST_LOG` directives plus
/// `default_directive` (e.g. `"aggregator=info"`).
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .json()
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directive() {
        assert!(init_tracing("aggregator=loud").is_err());
    }
}
