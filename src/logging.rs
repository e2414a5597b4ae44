//! Logger setup.

/// Installs a `fern` logger writing timestamped lines to stderr.
pub fn setup_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // SDL and GL loader chatter is not interesting at debug level.
        .level_for("sdl2", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
}
