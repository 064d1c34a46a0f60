//! Duration formatting shared by the live sink and reports.

use chrono::Duration;

/// Summary duration: `"Xh Ym"` from one hour up, `"Ym"` below.
///
/// Negative durations are shown as `0m`.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Live running time: `"Xh MMm SSs"` from one hour up, `"Mm SSs"` below.
pub fn format_running_time(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = total_seconds % 3600 / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}
