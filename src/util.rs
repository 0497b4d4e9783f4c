/// Format a number of seconds as m:ss (or h:mm:ss past the hour)
pub fn format_duration(total_secs: f64) -> String {
    let secs = total_secs.max(0.0).floor() as u64;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Format a countdown with sub-second precision, e.g. "12.4s"
pub fn format_countdown(remaining_secs: f64) -> String {
    format!("{:.1}s", remaining_secs.max(0.0))
}

/// Format a weight, dropping the fraction when it is whole (e.g. "60" / "22.5")
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{:.1}", weight)
    }
}

/// Completed/total as a ratio in [0, 1]; empty totals count as zero progress
pub fn completion_ratio(completed: usize, total: usize) -> f64 {
    match total {
        positive if positive > 0 => completed as f64 / total as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.9), "0:59");
        assert_eq!(format_duration(61.0), "1:01");
        assert_eq!(format_duration(600.0), "10:00");
    }

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }

    #[test]
    fn test_format_duration_negative_clamps() {
        assert_eq!(format_duration(-5.0), "0:00");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(12.44), "12.4s");
        assert_eq!(format_countdown(0.0), "0.0s");
        assert_eq!(format_countdown(-1.0), "0.0s");
    }

    #[test]
    fn test_format_weight_whole() {
        assert_eq!(format_weight(60.0), "60");
        assert_eq!(format_weight(0.0), "0");
    }

    #[test]
    fn test_format_weight_fractional() {
        assert_eq!(format_weight(22.5), "22.5");
        assert_eq!(format_weight(102.25), "102.2");
    }

    #[test]
    fn test_completion_ratio() {
        assert_eq!(completion_ratio(0, 5), 0.0);
        assert_eq!(completion_ratio(2, 5), 0.4);
        assert_eq!(completion_ratio(5, 5), 1.0);
    }

    #[test]
    fn test_completion_ratio_empty_total() {
        assert_eq!(completion_ratio(0, 0), 0.0);
        assert_eq!(completion_ratio(3, 0), 0.0);
    }
}
