use crate::error::{Result, ReviewError};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format a duration as `m:ss.ss`, the way moment lengths are shown.
pub fn format_clock(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    let remaining = seconds - minutes * 60.0;
    format!("{}:{:05.2}", minutes as u64, remaining)
}

/// Parse an `HH:MM:SS,mmm` timecode into seconds.
pub fn parse_timecode(code: &str) -> Result<f64> {
    let invalid = || ReviewError::InvalidTimecode {
        input: code.to_string(),
    };

    let mut parts = code.trim().split(':');
    let (Some(hh), Some(mm), Some(ssms), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let (ss, ms) = ssms.split_once(',').ok_or_else(invalid)?;

    let field = |s: &str| s.parse::<u32>().map_err(|_| invalid());
    let hours = field(hh)?;
    let minutes = field(mm)?;
    let secs = field(ss)?;
    let millis = field(ms)?;

    Ok(f64::from(hours) * 3600.0
        + f64::from(minutes) * 60.0
        + f64::from(secs)
        + f64::from(millis) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timecode() {
        let seconds = parse_timecode("00:01:23,456").unwrap();
        assert!((seconds - 83.456).abs() < 1e-9);
        assert_eq!(parse_timecode("01:00:00,000").unwrap(), 3600.0);
    }

    #[test]
    fn rejects_malformed_timecodes() {
        for input in ["", "01:23,456", "00:01:23.456", "aa:01:23,456", "00:00:01:23,4"] {
            assert!(
                matches!(parse_timecode(input), Err(ReviewError::InvalidTimecode { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn formats_timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(83.4), "01:23");
        assert_eq!(format_clock(83.456), "1:23.46");
        assert_eq!(format_clock(5.0), "0:05.00");
    }
}
