use tracing::Level;

/// Install a formatted stderr subscriber at `level` ("error" through "trace").
/// Unknown levels fall back to `info`; a second call is a no-op.
pub fn init_tracing(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(%level, "tracing initialised");
    }
}
