use crate::{errors::Error, Result};

/// Initialize logging/tracing for the relay.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::External(format!("failed to install tracing subscriber: {e}")))
}

/// Info for our crates, warn for everything else.
fn default_directives(service_name: &str) -> String {
    format!("warn,relaycast=info,relaycast_core=info,relaycast_telegram=info,{service_name}=info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_quiet_for_dependencies() {
        let directives = default_directives("relaycast");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("relaycast_core=info"));
        assert!(directives.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }
}
