#![forbid(unsafe_code)]

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

pub const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Installs the stderr subscriber. `RUST_LOG` wins over `level`; a second call is a no-op.
pub fn init(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| EnvFilter::new(directive(level)), EnvFilter::new);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    if LEVELS.contains(&level.as_str()) {
        format!("tasklist={level}")
    } else {
        "tasklist=warn".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_to_crate() {
        assert_eq!(directive("debug"), "tasklist=debug");
        assert_eq!(directive(" INFO "), "tasklist=info");
        assert_eq!(directive("loud"), "tasklist=warn");
    }
}
