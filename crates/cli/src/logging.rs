use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DOCDRIFT_LOG";

/// Install the stderr subscriber. Library crates log through `log`; the
/// subscriber picks those records up as well.
///
/// `-v` / `-vv` win over `DOCDRIFT_LOG`, which wins over the `warn` default.
pub fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    // Already installed: keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init();
}
