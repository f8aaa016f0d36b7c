use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const LEVELS: [LevelFilter; 5] = [
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
    LevelFilter::TRACE,
];

/// Filter directive for a configured base level raised by `verbose` steps.
///
/// A base that isn't a plain level (e.g. `checktree::ops=debug`) is used
/// verbatim when `verbose` is 0; otherwise counting starts from `warn`.
pub fn effective_directive(base: &str, verbose: u8) -> String {
    if verbose == 0 {
        return base.to_string();
    }
    let start = base
        .trim()
        .parse::<LevelFilter>()
        .ok()
        .and_then(|lf| LEVELS.iter().position(|l| *l == lf))
        .unwrap_or(1);
    let idx = (start + usize::from(verbose)).min(LEVELS.len() - 1);
    LEVELS[idx].to_string().to_lowercase()
}

/// Install the stderr subscriber. `RUST_LOG`, when set, wins over the
/// configured level and `-v`.
pub fn init_subscriber(base: &str, verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(effective_directive(base, verbose))
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
