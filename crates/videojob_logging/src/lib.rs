#![deny(missing_docs)]
//! Logging for the videojob crates.
//!
//! All poll, store and transport messages go through the `videojob_*`
//! macros. They forward to the `log` facade re-exported here, so a crate
//! that logs only needs this crate as a dependency. The binary picks the
//! backend; tests call [`initialize_for_tests`].

#[doc(hidden)]
pub use log as __log;

/// Targets of the HTTP stack that drown out poll messages at debug level.
pub const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "wiremock"];

/// Logs at an explicit [`log::Level`].
#[macro_export]
macro_rules! videojob_log {
    ($level:expr, $($arg:tt)+) => {
        $crate::__log::log!($level, $($arg)+)
    };
}

/// Logs a trace-level message.
#[macro_export]
macro_rules! videojob_trace {
    ($($arg:tt)+) => {
        $crate::videojob_log!($crate::__log::Level::Trace, $($arg)+)
    };
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! videojob_debug {
    ($($arg:tt)+) => {
        $crate::videojob_log!($crate::__log::Level::Debug, $($arg)+)
    };
}

/// Logs an info-level message.
#[macro_export]
macro_rules! videojob_info {
    ($($arg:tt)+) => {
        $crate::videojob_log!($crate::__log::Level::Info, $($arg)+)
    };
}

/// Logs a warn-level message.
#[macro_export]
macro_rules! videojob_warn {
    ($($arg:tt)+) => {
        $crate::videojob_log!($crate::__log::Level::Warn, $($arg)+)
    };
}

/// Logs an error-level message.
#[macro_export]
macro_rules! videojob_error {
    ($($arg:tt)+) => {
        $crate::videojob_log!($crate::__log::Level::Error, $($arg)+)
    };
}

/// Level used by [`initialize_for_tests`].
///
/// `VIDEOJOB_TEST_TRACE` turns on every tick; otherwise debug builds log at
/// debug and release builds at info.
pub fn test_level() -> log::LevelFilter {
    if std::env::var_os("VIDEOJOB_TEST_TRACE").is_some() {
        log::LevelFilter::Trace
    } else if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Installs a terminal logger for tests, without the HTTP stack's chatter.
///
/// Does nothing if a logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let mut config = ConfigBuilder::new();
    for target in NOISY_TARGETS.iter().copied() {
        config.add_filter_ignore_str(target);
    }

    let _ = TermLogger::init(
        test_level(),
        config.build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_accept_format_arguments() {
        initialize_for_tests();
        let job = "job-1";
        videojob_trace!("tick {} for {}", 1, job);
        videojob_debug!("job {job} pending");
        videojob_info!("done");
        videojob_warn!("retrying {}", job);
        videojob_error!("failed: {:?}", Some(job));
        videojob_log!(log::Level::Info, "explicit level");
    }

    #[test]
    fn level_is_at_least_info() {
        assert!(test_level() >= log::LevelFilter::Info);
    }
}
