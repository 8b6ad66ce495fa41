use rand::Rng;

/// Uniform integer in `ceil(min)..=floor(max)`.
///
/// # Panics
///
/// If the rounded range is empty or not finite.
#[allow(clippy::cast_possible_truncation, reason = "bounds are rounded first")]
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> i64 {
    let (min, max) = (min.ceil(), max.floor());
    assert!(
        min.is_finite() && max.is_finite() && min <= max,
        "empty range {min}..={max}"
    );
    rng.gen_range(min as i64..=max as i64)
}

/// Random contiguous, non-empty run of the roster.
///
/// Two indices are drawn independently and ordered. Equal indices widen the
/// upper bound by one, which is a no-op when it is already the last entry.
pub fn random_participant_slice<'a, T, R: Rng + ?Sized>(rng: &mut R, roster: &'a [T]) -> &'a [T] {
    let Some(last) = roster.len().checked_sub(1) else {
        return roster;
    };
    let mut start = rng.gen_range(0..=last);
    let mut end = rng.gen_range(0..=last);

    if start > end {
        core::mem::swap(&mut start, &mut end);
    } else if start == end {
        end += 1;
    }

    &roster[start..=end.min(last)]
}
