//! Routine rotation - which routine is due today
//!
//! The pool is the first `active_count` routines. Each day that had at
//! least one session before today moves the pointer one slot forward.

use chrono::NaiveDate;

use crate::history::last_entry_before;
use crate::model::{HistoryEntry, Routine};

/// Pool index assigned to `today`.
///
/// Entries dated today or later are ignored, so finishing a session does not
/// advance the pointer until tomorrow. The modulo uses the current pool
/// size, even if the pool was larger when an entry was recorded.
pub fn resolve_today_index(
    today: NaiveDate,
    routines: &[Routine],
    active_count: i64,
    history: &[HistoryEntry],
) -> usize {
    if routines.is_empty() || active_count <= 0 {
        return 0;
    }

    let pool_size = usize::try_from(active_count)
        .unwrap_or(usize::MAX)
        .min(routines.len());

    match last_entry_before(history, today) {
        Some(last) => (last.routine_index % pool_size + 1) % pool_size,
        None => 0,
    }
}

/// Today's routine with its pool index, or None without routines
pub fn todays_routine<'a>(
    today: NaiveDate,
    routines: &'a [Routine],
    active_count: i64,
    history: &[HistoryEntry],
) -> Option<(usize, &'a Routine)> {
    let index = resolve_today_index(today, routines, active_count, history);
    routines.get(index).map(|r| (index, r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn routines(n: usize) -> Vec<Routine> {
        (0..n)
            .map(|i| Routine {
                id: format!("r{}", i),
                name: format!("Routine {}", i),
                exercises: vec![],
            })
            .collect()
    }

    fn entry(day: &str, index: usize) -> HistoryEntry {
        HistoryEntry {
            id: format!("{}-{}", day, index),
            date: date(day),
            routine_id: None,
            routine_name: String::new(),
            routine_index: index,
        }
    }

    #[test]
    fn test_empty_routines_is_zero() {
        let history = vec![entry("2024-01-01", 1)];
        assert_eq!(resolve_today_index(date("2024-01-05"), &[], 3, &history), 0);
    }

    #[test]
    fn test_non_positive_active_count_is_zero() {
        let history = vec![entry("2024-01-01", 1)];
        let r = routines(3);
        assert_eq!(resolve_today_index(date("2024-01-05"), &r, 0, &history), 0);
        assert_eq!(resolve_today_index(date("2024-01-05"), &r, -2, &history), 0);
    }

    #[test]
    fn test_fresh_user_starts_at_zero() {
        assert_eq!(resolve_today_index(date("2024-01-05"), &routines(3), 3, &[]), 0);
    }

    #[test]
    fn test_only_today_or_future_entries_is_zero() {
        let history = vec![entry("2024-01-05", 1), entry("2024-01-09", 2)];
        assert_eq!(resolve_today_index(date("2024-01-05"), &routines(3), 3, &history), 0);
    }

    #[test]
    fn test_advances_after_last_prior_day() {
        let history = vec![entry("2024-01-01", 0), entry("2024-01-02", 1)];
        assert_eq!(resolve_today_index(date("2024-01-03"), &routines(5), 3, &history), 2);
    }

    #[test]
    fn test_same_day_entry_ignored() {
        let history = vec![entry("2024-01-01", 0), entry("2024-01-02", 1)];
        assert_eq!(resolve_today_index(date("2024-01-02"), &routines(5), 3, &history), 1);
    }

    #[test]
    fn test_wraps_around_pool() {
        let history = vec![entry("2024-01-01", 2)];
        assert_eq!(resolve_today_index(date("2024-01-02"), &routines(5), 3, &history), 0);
    }

    #[test]
    fn test_pool_capped_by_routine_count() {
        let history = vec![entry("2024-01-01", 1)];
        assert_eq!(resolve_today_index(date("2024-01-02"), &routines(2), 10, &history), 0);
    }

    #[test]
    fn test_shrunk_pool_wraps_by_current_size() {
        // recorded at slot 3 of a 4-routine pool, pool now 2
        let history = vec![entry("2024-01-01", 3)];
        assert_eq!(resolve_today_index(date("2024-01-02"), &routines(4), 2, &history), 0);
    }

    #[test]
    fn test_unsorted_history_uses_latest_date() {
        let history = vec![entry("2024-01-04", 0), entry("2024-01-02", 1)];
        assert_eq!(resolve_today_index(date("2024-01-06"), &routines(3), 3, &history), 1);
    }

    #[test]
    fn test_multiple_sessions_same_day_last_appended_wins() {
        let history = vec![entry("2024-01-01", 0), entry("2024-01-01", 2)];
        assert_eq!(resolve_today_index(date("2024-01-02"), &routines(3), 3, &history), 0);
    }

    #[test]
    fn test_idempotent() {
        let history = vec![entry("2024-01-01", 0), entry("2024-01-02", 1)];
        let r = routines(5);
        let first = resolve_today_index(date("2024-01-03"), &r, 3, &history);
        let second = resolve_today_index(date("2024-01-03"), &r, 3, &history);
        assert_eq!(first, second);
    }

    #[test]
    fn test_todays_routine() {
        let r = routines(3);
        let history = vec![entry("2024-01-01", 0)];
        let (index, routine) = todays_routine(date("2024-01-02"), &r, 3, &history).unwrap();
        assert_eq!(index, 1);
        assert_eq!(routine.id, "r1");
        assert!(todays_routine(date("2024-01-02"), &[], 3, &history).is_none());
    }
}
