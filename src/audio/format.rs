// Time display helpers for the recording and playback screens

/// Whole seconds in a millisecond value (floor division)
pub fn millis_to_secs(ms: u64) -> u64 {
    ms / 1000
}

/// Format elapsed seconds as `MM:SS`.
///
/// Minutes are not wrapped into hours; a 61 minute recording shows `61:00`.
pub fn format_time(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Format a playback position against the total duration.
///
/// Renders `H:MM:SS` when the total is an hour or longer so position and
/// total line up, `MM:SS` otherwise.
pub fn format_playback_time(secs: u64, total_secs: u64) -> String {
    if total_secs >= 3600 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        format!("{}:{:02}:{:02}", hours, minutes, secs % 60)
    } else {
        format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
    }
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;
