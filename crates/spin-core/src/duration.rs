/// Format a whole-second count as `M:SS`, or `H:MM:SS` once it reaches an hour.
pub fn format_duration(secs: u32) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h == 0 {
        format!("{}:{:02}", m, s)
    } else {
        format!("{}:{:02}:{:02}", h, m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_an_hour() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(298), "4:58");
        assert_eq!(format_duration(3599), "59:59");
    }

    #[test]
    fn test_hours_pad_minutes() {
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
        assert_eq!(format_duration(36_000 + 59), "10:00:59");
    }
}
