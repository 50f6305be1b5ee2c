/// Minute-of-day. Buffered windows may dip below zero and decoded tokens
/// may exceed 1439; neither is clamped anywhere in the pipeline.
pub type Minute = i32;

/// Extracts the first window of 4 consecutive digits found anywhere in the
/// token and reads it as HHMM. No range validation is performed: "2500"
/// decodes to 1500 minutes. Returns None when no such window exists.
pub fn decode_time(token: &str) -> Option<Minute> {
    let bytes = token.as_bytes();
    let window = bytes
        .windows(4)
        .find(|w| w.iter().all(|b| b.is_ascii_digit()))?;
    let digit = |b: u8| (b - b'0') as Minute;
    let hours = digit(window[0]) * 10 + digit(window[1]);
    let minutes = digit(window[2]) * 10 + digit(window[3]);
    Some(hours * 60 + minutes)
}

/// Renders a minute-of-day as zero-padded HH:MM, or "--:--" for absent
/// input. The hour component is plain integer division, never wrapped.
pub fn format_time(minutes: Option<Minute>) -> String {
    match minutes {
        Some(m) => format!("{:02}:{:02}", m / 60, m % 60),
        None => "--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_token() {
        assert_eq!(Some(570), decode_time("0930"));
        assert_eq!(Some(0), decode_time("0000"));
        assert_eq!(Some(23 * 60 + 59), decode_time("2359"));
    }

    #[test]
    fn test_decode_with_location_prefix() {
        assert_eq!(Some(570), decode_time("PDR-0930"));
        assert_eq!(Some(10 * 60), decode_time("ARK - 1000"));
    }

    #[test]
    fn test_decode_no_digit_run() {
        assert_eq!(None, decode_time("PDR-INVALID"));
        assert_eq!(None, decode_time(""));
        assert_eq!(None, decode_time("ARK-930"));
        assert_eq!(None, decode_time("12:34"));
    }

    #[test]
    fn test_decode_impossible_time_passes_through() {
        // 25 hours, 00 minutes
        assert_eq!(Some(1500), decode_time("PDR-2500"));
        assert_eq!(Some(25 * 60 + 99), decode_time("2599"));
    }

    #[test]
    fn test_decode_takes_first_window_of_longer_run() {
        // "2500" out of "25000": 25 hours, 00 minutes
        assert_eq!(Some(25 * 60), decode_time("25000"));
    }

    #[test]
    fn test_format_zero_padded() {
        assert_eq!("09:30", format_time(Some(570)));
        assert_eq!("00:00", format_time(Some(0)));
        assert_eq!("08:05", format_time(Some(485)));
    }

    #[test]
    fn test_format_absent() {
        assert_eq!("--:--", format_time(None));
    }

    #[test]
    fn test_decode_format_round_trip() {
        for token in ["0800", "0930", "1045", "1700", "2359"] {
            let minute = decode_time(token).unwrap();
            let rendered = format_time(Some(minute));
            assert_eq!(format!("{}:{}", &token[..2], &token[2..]), rendered);
        }
    }
}
