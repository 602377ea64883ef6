use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A clock time pulled out of a message. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedTime {
    pub hour: u32,
    pub minute: u32,
}

impl fmt::Display for DetectedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

/// How a meridiem-suffixed time is folded into 24-hour form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeridiemConversion {
    /// `(hour + 12) % 24` applied uniformly, so "12:00pm" becomes 0:00 and
    /// "am" times land in the afternoon. This matches the long-standing
    /// behavior users of the bot have come to expect.
    #[default]
    Legacy,
    /// Conventional am/pm arithmetic.
    Correct,
}

fn meridiem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)(0?\d|1[0-2]):([0-5]\d) ?([ap]m|[AP]M)(?:$|\s)")
            .expect("Will never fail.")
    })
}

fn twenty_four_hour_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)([01]?\d|2[0-3]):([0-5]\d)(?:$|\s)").expect("Will never fail.")
    })
}

/// Scans `text` for an embedded clock time.
///
/// A meridiem-suffixed match always wins over a bare 24-hour match, even when
/// both appear. Returns `None` when the message mentions no time; callers
/// treat that as "no reply".
pub fn detect(text: &str) -> Option<DetectedTime> {
    detect_with(text, MeridiemConversion::default())
}

pub fn detect_with(text: &str, conversion: MeridiemConversion) -> Option<DetectedTime> {
    if let Some(caps) = meridiem_re().captures(text) {
        let hour: u32 = caps[1].parse().expect("Will never fail.");
        let minute: u32 = caps[2].parse().expect("Will never fail.");
        let is_pm = caps[3].eq_ignore_ascii_case("pm");
        let hour = match conversion {
            MeridiemConversion::Legacy => (hour + 12) % 24,
            MeridiemConversion::Correct => match (is_pm, hour) {
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, 12) => 0,
                (false, h) => h,
            },
        };
        return Some(DetectedTime { hour, minute });
    }

    if let Some(caps) = twenty_four_hour_re().captures(text) {
        let hour: u32 = caps[1].parse().expect("Will never fail.");
        let minute: u32 = caps[2].parse().expect("Will never fail.");
        return Some(DetectedTime { hour, minute });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn detected(text: &str) -> String {
        detect(text).expect("expected a time mention").to_string()
    }

    #[test]
    fn afternoon_mention_is_converted() {
        assert_eq!(detected("meet at 3:15pm"), "15:15");
    }

    #[test]
    fn twenty_four_hour_mention_passes_through() {
        assert_eq!(detected("meet at 15:15"), "15:15");
    }

    #[test]
    fn morning_mention_without_meridiem_passes_through() {
        assert_eq!(detected("call me at 9:05"), "9:05");
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert_eq!(detect("no time here"), None);
    }

    #[test]
    fn noon_wraps_to_midnight_by_default() {
        // Long-standing conversion quirk, asserted so nobody "fixes" it by
        // accident and silently changes replies.
        assert_eq!(detected("12:00pm"), "0:00");
    }

    #[test]
    fn noon_stays_noon_with_correct_conversion() {
        let time = detect_with("12:00pm", MeridiemConversion::Correct).unwrap();
        assert_eq!(time.to_string(), "12:00");
    }

    #[test]
    fn midnight_with_correct_conversion() {
        let time = detect_with("12:30am", MeridiemConversion::Correct).unwrap();
        assert_eq!(time.to_string(), "0:30");
    }

    #[test]
    fn meridiem_match_wins_over_24_hour_match() {
        assert_eq!(detected("either 18:00 or 7:00 pm"), "19:00");
    }

    #[test]
    fn space_before_meridiem_is_allowed() {
        assert_eq!(detected("3:15 PM works for me"), "15:15");
    }

    #[test]
    fn digits_glued_to_the_time_are_not_a_mention() {
        assert_eq!(detect("version 12:003 shipped"), None);
        assert_eq!(detect("id-3:15"), None);
    }

    #[test]
    fn out_of_range_minutes_are_ignored() {
        assert_eq!(detect("score was 4:70"), None);
    }

    proptest! {
        #[test]
        fn any_24_hour_clock_time_is_detected(hour in 0u32..24, minute in 0u32..60) {
            let text = format!("see you at {hour}:{minute:02} then");
            let time = detect(&text).expect("in-range time should be detected");
            prop_assert_eq!(time, DetectedTime { hour, minute });
        }
    }
}
