//! Durations given on the command line or in `SHORTLOAD_*` variables
//!
//! Files go through `humantime_serde`; this is the same grammar for plain
//! strings, plus a bare integer meaning whole seconds.

use std::time::Duration;

/// Parse `90`, `90s`, `500ms`, `5m` or `1h 30m`
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    humantime::parse_duration(raw).map_err(|e| format!("invalid duration '{}': {}", raw, e))
}
