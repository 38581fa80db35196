use chrono::{Local, Timelike};

/// Format a 24-hour time as `H:MM AM` / `H:MM PM`
pub fn format_time(hour: u32, minute: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, minute, suffix)
}

/// The local wall clock time, formatted by [`format_time`]
pub fn current_time() -> String {
    let now = Local::now();
    format_time(now.hour(), now.minute())
}

/// The last word of a user agent string, which is where the embedding application
/// puts its own name. The separating space is kept. Without any space only the last
/// character is returned
pub fn navi_name(user_agent: &str) -> &str {
    match user_agent.rfind(' ') {
        Some(idx) => &user_agent[idx..],
        None => user_agent
            .char_indices()
            .last()
            .map_or("", |(idx, _)| &user_agent[idx..]),
    }
}

#[cfg(test)]
#[test]
fn test_format_time() {
    assert_eq!(format_time(0, 5), "12:05 AM");
    assert_eq!(format_time(9, 30), "9:30 AM");
    assert_eq!(format_time(11, 59), "11:59 AM");
    assert_eq!(format_time(12, 0), "12:00 PM");
    assert_eq!(format_time(13, 7), "1:07 PM");
    assert_eq!(format_time(23, 45), "11:45 PM");
}

#[cfg(test)]
#[test]
fn test_current_time_shape() {
    let time = current_time();
    assert!(time.ends_with(" AM") || time.ends_with(" PM"), "{}", time);
    assert!(time.contains(':'));
}

#[cfg(test)]
#[test]
fn test_navi_name() {
    assert_eq!(
        navi_name("Mozilla/5.0 (Windows; U) Gecko/20070725 NaviDemo/1.0"),
        " NaviDemo/1.0"
    );
    assert_eq!(navi_name("trailing "), " ");
    assert_eq!(navi_name("Solo"), "o");
    assert_eq!(navi_name(""), "");
}
