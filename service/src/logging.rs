use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ConfigBuilder, TermLogger};

/// Dependency modules whose output is dropped below TRACE. The socket and HTTP
/// stacks log every frame and request at DEBUG, which drowns out relay events.
const QUIET_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "tower",
    "tracing",
    "hyper",
    "axum",
    "tungstenite",
    "reqwest",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the configured verbosity.
    ///
    /// Fails only if another logger was already installed in this process.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;

        TermLogger::init(
            level,
            Self::build_log_config(level),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::silenced_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }

    /// Modules to silence at `level`. TRACE shows everything.
    fn silenced_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            QUIET_MODULES
        }
    }
}
