pub mod game;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100th occurrence of a counter when the perf_stats feature is enabled.
///
/// When the perf_stats feature is disabled, this macro compiles to nothing and
/// its arguments are not evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(stats.searches, "{} searches so far", stats.searches);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {
        if $count % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($count:expr, $($arg:tt)*) => {};
}
