use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::detect::DetectedTime;
use crate::timezone;

fn format_date<T>(timestamp: &DateTime<T>) -> String
where
    T: TimeZone,
    T::Offset: std::fmt::Display,
{
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Builds the multi-zone listing for a detected time mention.
///
/// The timestamp is "today" in the speaker's zone with the mentioned hour and
/// minute substituted in; the date comes from `now`, not from the message.
/// Roster entries matching the speaker's canonical zone are skipped, the rest
/// are listed in roster order. An empty roster yields an empty string, which
/// callers treat as "send nothing".
pub fn compose(time: DetectedTime, speaker: Tz, roster: &[String], now: DateTime<Utc>) -> String {
    if roster.is_empty() {
        return String::new();
    }

    let local_time = now
        .with_timezone(&speaker)
        .with_hour(time.hour)
        .and_then(|t| t.with_minute(time.minute));
    let Some(local_time) = local_time else {
        // The mentioned wall-clock time does not exist in the speaker's zone
        // today (DST gap). Nothing sensible to broadcast.
        return String::new();
    };

    let mut reply = format!(
        "{} {}, in different timezones (24h clock):\n--------",
        format_date(&local_time),
        speaker
    );
    for entry in roster {
        let Some(tz) = timezone::resolve(entry) else {
            log::warn!("Skipping unresolvable roster entry {entry:?}");
            continue;
        };
        if tz.name() == speaker.name() {
            continue;
        }
        let converted = local_time.with_timezone(&tz);
        reply.push_str(&format!("\n{} - *{}*", format_date(&converted), tz));
    }
    reply
}
