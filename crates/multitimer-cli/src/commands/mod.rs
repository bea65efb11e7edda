pub mod config;
pub mod run;
pub mod sequence;

/// Parse `SS`, `MM:SS` or `HH:MM:SS` into seconds.
///
/// Groups after the first must be below 60; the leading group may be any
/// size, so `90` and `1:30` are the same duration.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(format!("invalid duration '{input}', expected SS, MM:SS or HH:MM:SS"));
    }
    let mut total = 0u64;
    for (i, part) in parts.iter().enumerate() {
        let value: u64 = part
            .parse()
            .map_err(|_| format!("invalid duration '{input}': '{part}' is not a number"))?;
        if i > 0 && value >= 60 {
            return Err(format!("invalid duration '{input}': '{part}' must be below 60"));
        }
        total = total
            .checked_mul(60)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| format!("duration '{input}' is too large"))?;
    }
    Ok(total)
}

/// `HH:MM:SS`, or `MM:SS` under an hour.
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
