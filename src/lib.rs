/// Macro for prefixed status logging to stderr (only when stderr is a terminal).
///
/// Usage:
/// ```ignore
/// log_status!("build", "Build finished in {}s", seconds);
/// log_status!("archive", "Copied archive to {}", dest.display());
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        if ::std::io::IsTerminal::is_terminal(&::std::io::stderr()) {
            eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
        }
    };
}

pub mod core;

// Re-export everything from core for ergonomic library use
// Users can write `shipit::options` instead of `shipit::core::options`
pub use core::*;
