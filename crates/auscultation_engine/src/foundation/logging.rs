//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace, LevelFilter};

/// Initialize the logging system at `Info`, honouring `RUST_LOG` overrides
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize the logging system with a default level
///
/// `RUST_LOG` still takes precedence for individual modules. Calling this
/// more than once is harmless; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
    if let Err(e) = result {
        log::debug!("Keeping existing logger: {}", e);
    }
}

/// Parse a textual log level ("trace" .. "error", "off")
///
/// Unknown values fall back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_repeated_init_keeps_first_logger() {
        init_with_level(LevelFilter::Debug);
        init_with_level(LevelFilter::Error);
        assert!(log::max_level() >= LevelFilter::Error);
    }
}
