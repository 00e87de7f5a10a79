use std::sync::Once;

use crate::util::config::marshal_config;

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        // stderr: stdout may belong to the foreign host.
        eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;
static INIT: Once = Once::new();

/// Install the console logger unless the host already installed one.
pub fn init_logger() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(marshal_config().log_level);
        }
    });
}
