//! Logging setup: a colored stdout sink, plus an optional date-based
//! rolling file sink when a log directory is configured.

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::str::FromStr;

/// Initializes the global logger. Call once at process startup.
pub fn init(level: &str, log_dir: Option<&str>) -> Result<(), fern::InitError> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let stdout = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new().level(level).chain(stdout);

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir).map_err(fern::InitError::Io)?;
        let file_sink = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .chain(fern::DateBased::new(format!("{dir}/worker."), "%Y-%m-%d.log"));
        dispatch = dispatch.chain(file_sink);
    }

    dispatch.apply()?;
    Ok(())
}
