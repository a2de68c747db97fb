//! Display helpers shared by the pages.

/// `Xh Ym`, or `—` when there is nothing to show
pub fn fmt_time_minutes(minutes: Option<u32>) -> String {
    match minutes {
        Some(total) => format!("{}h {}m", total / 60, total % 60),
        None => "—".to_string(),
    }
}

/// Label for a daily limit: `2h max`, `1.5h max`, `45 min max`
pub fn limit_label(minutes: u32) -> String {
    if minutes >= 60 {
        let hours = f64::from(minutes) / 60.0;
        let rounded = (hours * 10.0).round() / 10.0;
        if rounded.fract() == 0.0 {
            format!("{}h max", rounded as u32)
        } else {
            format!("{:.1}h max", rounded)
        }
    } else {
        format!("{} min max", minutes)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Hours with two decimals, e.g. `1.25`
pub fn hours_label(hours: f64) -> String {
    format!("{:.2}", round2(hours))
}

/// Whole hours for the time-limit slider, clamped to its range
pub fn minutes_to_slider_hours(minutes: u32, min_hours: u32, max_hours: u32) -> u32 {
    let hours = (f64::from(minutes) / 60.0).round() as u32;
    hours.clamp(min_hours, max_hours)
}
