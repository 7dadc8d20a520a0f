//! Small UI helpers: sizes, durations, truncation.

pub fn gb(v: Option<f64>) -> String {
    match v {
        Some(g) if g >= 1024.0 => format!("{:.2}TB", g / 1024.0),
        Some(g) => format!("{g:.1}GB"),
        None => "-".into(),
    }
}

pub fn uptime(secs: Option<u64>) -> String {
    let Some(s) = secs else { return "-".into() };
    let days = s / 86_400;
    let hours = (s % 86_400) / 3600;
    let mins = (s % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

pub fn or_dash(s: Option<&str>) -> &str {
    match s {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// Shorten `s` to at most `max` chars by cutting out the middle.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}
