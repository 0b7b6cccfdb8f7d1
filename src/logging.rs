/// writes `time level message` lines to standard error
pub struct ConsoleLogger {
    level: log::LevelFilter,
}

impl ConsoleLogger {
    pub fn new(level: log::LevelFilter) -> Self {
        Self { level }
    }

    fn format(&self, time: &chrono::DateTime<chrono::Local>, record: &log::Record) -> String {
        format!(
            "{:} {:<5} {:}",
            time.format(&crate::DATETIME_FORMAT),
            record.level(),
            record.args()
        )
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:}", self.format(&chrono::Local::now(), record));
        }
    }

    fn flush(&self) {}
}

/// install the console logger as the global logger
pub fn init(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(ConsoleLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use log::Log;

    #[test]
    fn test_enabled() {
        let logger = ConsoleLogger::new(log::LevelFilter::Info);

        let info = log::Metadata::builder().level(log::Level::Info).build();
        let debug = log::Metadata::builder().level(log::Level::Debug).build();

        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_format() {
        let logger = ConsoleLogger::new(log::LevelFilter::Debug);
        let time = chrono::Local
            .with_ymd_and_hms(2023, 5, 19, 12, 30, 0)
            .unwrap();

        let line = logger.format(
            &time,
            &log::Record::builder()
                .args(format_args!("landed after {:} steps", 3))
                .level(log::Level::Info)
                .build(),
        );

        assert_eq!(line, "2023-05-19 12:30:00 INFO  landed after 3 steps");
    }
}
