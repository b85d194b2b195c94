use slog::{o, Discard, Drain, Level, LevelFilter, Logger};

pub use slog_async::Async;
pub use slog_term::TermDecorator;

/// Creates the root [`Logger`] writing compact records to the terminal.
///
/// Every record carries the `service` key and records below `level` are dropped.
pub fn new_logger(service: &str, level: Level) -> Logger {
    let decorator = TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    let drain = Async::new(drain).build().fuse();

    Logger::root(drain, o!("service" => service.to_string()))
}

/// A [`Logger`] that discards every record, used in tests.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}
