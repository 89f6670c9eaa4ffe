//! Logging infrastructure - structured tracing to file and host console
//!
//! Events go to two places:
//! - the log file in the base directory, filtered by `log_level` (or
//!   `RUST_LOG` when set), compact or json
//! - the host console, for events at or above `console_log_level`, once
//!   the host reports its console ready

use std::fs::File;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::{Config, LogFormat};

mod console;
pub use console::{ConsoleLayer, ConsoleSink, HostConsole};

/// What the first `init` installed
struct Logger {
    installed: bool,
    /// Keeps the file writer's worker alive for the rest of the process
    _guard: Option<WorkerGuard>,
}

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// Install the global subscriber
///
/// Only the first call does anything. If another subscriber is already
/// installed (e.g. by the host application) ours is skipped and events
/// keep going to the existing one. If the log file cannot be created the
/// subscriber is installed without the file layer and a warning names the
/// path.
pub fn init(config: &Config, base_dir: &Path) {
    LOGGER.get_or_init(|| {
        let settings = &config.unrealsdk;
        let log_path = config.log_path(base_dir);

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

        let (file_layer, guard, open_error) = match File::create(&log_path) {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                let layer = build_file_layer(writer, settings.log_format).with_filter(filter);
                (Some(layer), Some(guard), None)
            }
            Err(err) => (None, None, Some(err)),
        };

        let installed = tracing_subscriber::registry()
            .with(file_layer)
            .with(ConsoleLayer::new(HostConsole, settings.console_level()))
            .try_init()
            .is_ok();

        if let Some(err) = open_error {
            warn!(path = %log_path.display(), error = %err, "log file unavailable, logging to the console only");
        }

        Logger {
            installed,
            _guard: guard.filter(|_| installed),
        }
    });
}

fn build_file_layer(writer: NonBlocking, format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Compact => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(cfg!(debug_assertions))
            .compact()
            .boxed(),
        LogFormat::Json => fmt::layer().with_writer(writer).json().boxed(),
    }
}

/// Whether our subscriber is the global one
pub fn is_initialized() -> bool {
    LOGGER.get().is_some_and(|logger| logger.installed)
}
