use crate::config::{BLUE, GRAY, GREEN, RED, RESET, YELLOW};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = match record.level() {
            Level::Error => RED,
            Level::Warn => YELLOW,
            Level::Info => GREEN,
            Level::Debug => BLUE,
            Level::Trace => GRAY,
        };
        println!("{}[{:>5}] {}{}", color, record.level(), record.args(), RESET);
    }

    fn flush(&self) {}
}

fn level_from(name: Option<&str>) -> LevelFilter {
    match name {
        Some("error") | Some("ERROR") => LevelFilter::Error,
        Some("warn") | Some("WARN") => LevelFilter::Warn,
        Some("debug") | Some("DEBUG") => LevelFilter::Debug,
        Some("trace") | Some("TRACE") => LevelFilter::Trace,
        Some("off") | Some("OFF") => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Install the serial logger; the level is fixed at build time by `LOG`.
pub fn init() {
    static LOGGER: KernelLogger = KernelLogger;
    // a second call keeps the first logger
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_from(option_env!("LOG")));
}
