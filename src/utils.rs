use chrono::{DateTime, Datelike, Months, NaiveDateTime, Timelike, Utc};

use crate::{
    error::{AppError, Result},
    types::{MonthBucket, MonthlyBuckets, SavedTrack},
};

/// Layout of `added_at` timestamps. Spotify always sends UTC with second
/// precision; anything else is rejected.
pub const SAVED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses an `added_at` timestamp in exactly the [`SAVED_AT_FORMAT`] layout.
///
/// chrono alone accepts unpadded fields, signed or short years and leap
/// seconds, so the parsed value must format back to the input unchanged.
///
/// # Errors
///
/// Returns [`AppError::TimestampParse`] for any other layout.
///
/// # Example
///
/// ```
/// let liked = parse_saved_at("2022-10-02T13:14:15Z")?;
/// assert_eq!(month_playlist_name(liked), "October '22");
/// ```
pub fn parse_saved_at(value: &str) -> Result<DateTime<Utc>> {
    let invalid = |reason: String| AppError::TimestampParse {
        value: value.to_string(),
        reason,
    };

    let date = NaiveDateTime::parse_from_str(value, SAVED_AT_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;
    if date.nanosecond() != 0 || date.format(SAVED_AT_FORMAT).to_string() != value {
        return Err(invalid(format!("expected layout {}", SAVED_AT_FORMAT)));
    }

    Ok(date.and_utc())
}

/// Playlist name for a month, e.g. `October '22`.
pub fn month_playlist_name(date: DateTime<Utc>) -> String {
    date.format("%B '%y").to_string()
}

pub fn bucket_key(added_at: &str) -> Result<String> {
    Ok(month_playlist_name(parse_saved_at(added_at)?))
}

/// Groups tracks by the month they were liked. Order inside a bucket follows
/// the input order.
pub fn bucketize(tracks: &[SavedTrack]) -> Result<MonthlyBuckets> {
    let mut buckets = MonthlyBuckets::new();

    for track in tracks {
        let added_at = parse_saved_at(&track.added_at)?;
        buckets
            .entry((added_at.year(), added_at.month()))
            .or_insert_with(|| MonthBucket {
                name: month_playlist_name(added_at),
                tracks: Vec::new(),
            })
            .tracks
            .push(track.clone());
    }

    Ok(buckets)
}

/// The moment `months` calendar months before `now`. Day overflow clamps to
/// the end of the target month.
pub fn lookback_cutoff(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
