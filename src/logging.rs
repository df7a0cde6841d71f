//! Structured logging setup.
//!
//! `RUST_LOG` selects the filter (default `gpio_canary=info`) and `RUST_LOG_FORMAT=json`
//! switches the output to JSON lines. Logs go to stderr so stdout only carries the
//! canary's progress lines.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "gpio_canary=info";

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Install the global subscriber. Repeated calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let format = std::env::var("RUST_LOG_FORMAT").ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if wants_json(format.as_deref()) {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
    }

    #[test]
    fn json_format_is_case_insensitive() {
        assert!(wants_json(Some("JSON")));
        assert!(wants_json(Some("json")));
        assert!(!wants_json(Some("pretty")));
        assert!(!wants_json(None));
    }
}
