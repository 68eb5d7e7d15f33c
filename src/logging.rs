use tracing_subscriber::EnvFilter;

/// Default filter directive for the `-v`/`--quiet` flags. `RUST_LOG` overrides it.
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Logs go to stderr so rendered reports on stdout stay machine-readable.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbosity() {
        assert_eq!(level_for(2, true), "error");
    }

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(level_for(0, false), "warn");
        assert_eq!(level_for(1, false), "info");
        assert_eq!(level_for(5, false), "debug");
    }
}
