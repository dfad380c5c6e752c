//! Normalization of source platform encodings into canonical item fields.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").unwrap()
});

static VIDEO_ID_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]v=([^&#]+)").unwrap());

/// Parse an ISO-8601 duration such as `PT1H2M3S` into seconds.
///
/// Only the day and time components are supported (the source platform never
/// emits years or months). Anything unparsable yields 0.
pub fn parse_iso8601_duration(value: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(value.trim()) else {
        return 0;
    };

    let part = |idx: usize| -> u64 {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    part(1) * 86_400 + part(2) * 3_600 + part(3) * 60 + part(4)
}

/// Compact view count label.
///
/// `>= 1_000_000` renders millions with one decimal, `>= 1_000` thousands
/// with one decimal, anything smaller as the raw integer.
pub fn format_view_count(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

/// Render seconds as `m:ss`, or `h:mm:ss` once an hour is reached.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Extract the video id from a watch URL (`...?v=<id>`).
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_count_thresholds() {
        assert_eq!(format_view_count(0), "0");
        assert_eq!(format_view_count(999), "999");
        assert_eq!(format_view_count(1_000), "1.0K");
        assert_eq!(format_view_count(1_500), "1.5K");
        assert_eq!(format_view_count(999_999), "1000.0K");
        assert_eq!(format_view_count(1_000_000), "1.0M");
        assert_eq!(format_view_count(2_300_000), "2.3M");
        assert_eq!(format_view_count(1_234_567_890), "1234.6M");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_iso8601_duration("PT4M13S"), 253);
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3_723);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT10M"), 600);
        assert_eq!(parse_iso8601_duration("PT2H"), 7_200);
        assert_eq!(parse_iso8601_duration("P1DT1S"), 86_401);
    }

    #[test]
    fn test_parse_duration_degenerate() {
        // Live streams report P0D
        assert_eq!(parse_iso8601_duration("P0D"), 0);
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("garbage"), 0);
        assert_eq!(parse_iso8601_duration("4M13S"), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(253), "4:13");
        assert_eq!(format_duration(3_723), "1:02:03");
        assert_eq!(format_duration(36_000), "10:00:00");
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=abc&v=xyz123&t=10"),
            Some("xyz123".to_string())
        );
        assert_eq!(extract_video_id("https://www.youtube.com/"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(extract_video_id("https://example.com/?video=1"), None);
    }

    #[test]
    fn test_watch_url_round_trips_id() {
        let url = watch_url("abc_DEF-12");
        assert_eq!(extract_video_id(&url), Some("abc_DEF-12".to_string()));
    }
}
