use colored::{ColoredString, Colorize};
use fern::Dispatch;
use log::{Level, LevelFilter};

const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Tints a log line by severity.
fn tint(level: Level, line: &str) -> ColoredString {
    match level {
        Level::Error => line.bright_red(),
        Level::Warn => line.bright_yellow(),
        Level::Info => line.normal(),
        Level::Debug | Level::Trace => line.dimmed(),
    }
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Setup the logger.
pub(crate) fn setup(verbose: bool, no_color: bool) {
    let level = level_filter(verbose);
    Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
            let line = format!("[{now}] {message}");
            out.finish(format_args!("{}", tint(record.level(), &line)));
        })
        .level(LevelFilter::Warn)
        .level_for("tactile_probe", level)
        .level_for("tactile_device", level)
        .level_for("tactile_profile", level)
        .chain(std::io::stdout())
        .apply()
        .expect("Unable to set up logger");

    if no_color {
        colored::control::set_override(false);
    }
}
