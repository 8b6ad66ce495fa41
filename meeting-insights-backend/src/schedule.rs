use chrono::{DateTime, Duration, Utc};

/// Gap between consecutive meetings of a batch.
pub const GAP_MINUTES: i64 = 5;
/// Lead time before the first meeting when there is nothing to follow.
pub const FIRST_MEETING_LEAD_HOURS: i64 = 1;

/// Start of the next meeting.
///
/// A previous end that is missing or not in the future counts as "no previous
/// meeting" and the next one starts an hour from `now`. `None` once the
/// chain has run past the last representable instant.
#[must_use]
pub fn next_start_time(
    previous_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match previous_end {
        Some(end) if end > now => end.checked_add_signed(Duration::minutes(GAP_MINUTES)),
        _ => now.checked_add_signed(Duration::hours(FIRST_MEETING_LEAD_HOURS)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn nothing_before_starts_an_hour_from_now() {
        assert_eq!(next_start_time(None, now()), Some(now() + Duration::hours(1)));
    }

    #[test]
    fn past_end_is_ignored() {
        let past = now() - Duration::days(3);
        assert_eq!(
            next_start_time(Some(past), now()),
            Some(now() + Duration::hours(1))
        );
    }

    #[test]
    fn end_equal_to_now_is_not_in_the_future() {
        assert_eq!(
            next_start_time(Some(now()), now()),
            Some(now() + Duration::hours(1))
        );
    }

    #[test]
    fn future_end_is_followed_after_five_minutes() {
        let future = now() + Duration::hours(7);
        assert_eq!(
            next_start_time(Some(future), now()),
            Some(future + Duration::minutes(5))
        );
    }

    #[test]
    fn end_at_the_last_instant_has_no_successor() {
        assert_eq!(next_start_time(Some(DateTime::<Utc>::MAX_UTC), now()), None);
    }

    #[test]
    fn wall_clock_now_is_about_an_hour_ahead() {
        let before = Utc::now();
        let start = next_start_time(None, Utc::now()).unwrap();
        let after = Utc::now();
        assert!(start >= before + Duration::hours(1));
        assert!(start <= after + Duration::hours(1));
    }
}
