use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default filter for a `-v` count: 0 info, 1 debug, 2+ trace.
const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. `BARRAGE_LOG` wins over `RUST_LOG`, which
/// wins over the verbosity flag. Safe to call more than once.
pub fn init_logging(verbosity: u8, no_color: bool) {
    let fallback = default_directive(verbosity);
    let filter = std::env::var("BARRAGE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(fallback),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(0, true);
        init_logging(2, true);
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(0), "info");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(7), "trace");
    }
}
