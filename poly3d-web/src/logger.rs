/// `log` sink that writes to the browser console
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use wasm_bindgen::JsValue;
use web_sys::console;

pub struct ConsoleLogger {
    level: LevelFilter,
}

static LOGGER: ConsoleLogger = ConsoleLogger::new(if cfg!(debug_assertions) {
    LevelFilter::Debug
} else {
    LevelFilter::Info
});

impl ConsoleLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from(format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record<'_>) -> String {
    format!("[{} {}] {}", record.level(), record.target(), record.args())
}

/// Route the `log` macros to the console. Fails if a logger is already set.
pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(LOGGER.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let logger = ConsoleLogger::new(LevelFilter::Info);
        let metadata = |level| Metadata::builder().level(level).target("poly3d_web").build();
        assert!(logger.enabled(&metadata(Level::Warn)));
        assert!(logger.enabled(&metadata(Level::Info)));
        assert!(!logger.enabled(&metadata(Level::Debug)));
        assert!(!ConsoleLogger::new(LevelFilter::Off).enabled(&metadata(Level::Error)));
    }

    #[test]
    fn test_record_format() {
        assert_eq!(
            format_record(
                &Record::builder()
                    .level(Level::Debug)
                    .target("poly3d_web::gl")
                    .args(format_args!("released buffers of mesh {}", 3))
                    .build()
            ),
            "[DEBUG poly3d_web::gl] released buffers of mesh 3"
        );
    }
}
