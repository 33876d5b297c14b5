use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Default directive; the tool takes no flags or environment
const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the stderr subscriber used by the binary.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init()
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(DEFAULT_DIRECTIVE))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
