use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the bot.
pub fn init(service_name: &str) -> Result<()> {
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))
}

/// Info for the bot crates and everything else.
fn default_directives(service_name: &str) -> String {
    let service = service_name.replace('-', "_");
    let mut directives = vec!["info".to_string()];
    for krate in ["wrb_core", "wrb_groq", "wrb_market", "wrb_telegram"] {
        directives.push(format!("{krate}=info"));
    }
    if !directives.iter().any(|d| d == &format!("{service}=info")) {
        directives.push(format!("{service}=info"));
    }
    directives.join(",")
}
