// In: src/logging.rs

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at Info level, writing `[LEVEL] message`
/// lines to stderr or, when `log_file` is given, appending to that file.
///
/// Only the first call has any effect. If the file cannot be opened the
/// logger falls back to stderr.
pub fn enable_verbose_logging(log_file: Option<&Path>) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        let mut open_error = None;
        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => open_error = Some((path.display().to_string(), e)),
            }
        }

        let _ = builder.try_init();

        if let Some((path, e)) = open_error {
            log::warn!("Could not open log file {}: {}; logging to stderr", path, e);
        }
    });
}
