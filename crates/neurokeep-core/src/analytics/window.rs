/// Whether `now` lies in `[start, end]`.
///
/// All three are zero-padded `HH:MM` strings, so lexicographic order is time
/// order. Both ends are inclusive. Windows crossing midnight are not supported.
pub fn is_within_window(start: &str, end: &str, now: &str) -> bool {
    start <= now && now <= end
}
