use env_logger::{Builder, Env};
use log::debug;
use std::io::Write;

/// Initializes the global logger with a `[timestamp] [level] message` format.
///
/// `RUST_LOG` wins over the default filter; `verbose` lowers the default to
/// debug.
pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        writeln!(
            buf,
            "[{}] [{}] {}",
            timestamp,
            record.level(),
            record.args()
        )
    });

    // A second init (tests, embedders) keeps the first logger.
    if builder.try_init().is_err() {
        debug!("Logger already initialized");
    }
}
