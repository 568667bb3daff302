//! History recorder and calendar queries

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::model::{HistoryEntry, Routine};

impl HistoryEntry {
    /// Entry for a session of `routine` held on `date` at pool slot `routine_index`
    pub fn new(date: NaiveDate, routine: &Routine, routine_index: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            routine_id: Some(routine.id.clone()),
            routine_name: routine.name.clone(),
            routine_index,
        }
    }
}

/// Append; multiple entries on one day are kept
pub fn record(history: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    history.push(entry);
}

/// Chronologically last entry dated strictly before `date`.
///
/// Same-day entries keep their append order (stable sort), so the last one
/// appended wins.
pub fn last_entry_before(history: &[HistoryEntry], date: NaiveDate) -> Option<&HistoryEntry> {
    let mut prior: Vec<&HistoryEntry> = history.iter().filter(|h| h.date < date).collect();
    prior.sort_by_key(|h| h.date);
    prior.last().copied()
}

/// Distinct days in a month with at least one session, ascending
pub fn trained_days(history: &[HistoryEntry], year: i32, month: u32) -> Vec<NaiveDate> {
    history
        .iter()
        .filter(|h| h.date.year() == year && h.date.month() == month)
        .map(|h| h.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Entries for one day, append order
pub fn entries_on(history: &[HistoryEntry], date: NaiveDate) -> Vec<&HistoryEntry> {
    history.iter().filter(|h| h.date == date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(id: &str, day: &str, index: usize) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            date: date(day),
            routine_id: None,
            routine_name: format!("Routine {}", index),
            routine_index: index,
        }
    }

    #[test]
    fn test_new_entry_snapshots_routine() {
        let routine = Routine {
            id: "r1".to_string(),
            name: "Legs".to_string(),
            exercises: vec![],
        };
        let e = HistoryEntry::new(date("2024-03-01"), &routine, 2);
        assert_eq!(e.routine_id.as_deref(), Some("r1"));
        assert_eq!(e.routine_name, "Legs");
        assert_eq!(e.routine_index, 2);
        assert!(!e.id.is_empty());

        let other = HistoryEntry::new(date("2024-03-01"), &routine, 2);
        assert_ne!(e.id, other.id);
    }

    #[test]
    fn test_last_entry_before_ignores_same_day_and_future() {
        let history = vec![
            entry("a", "2024-01-01", 0),
            entry("b", "2024-01-03", 2),
            entry("c", "2024-01-02", 1),
        ];
        assert_eq!(last_entry_before(&history, date("2024-01-03")).unwrap().id, "c");
        assert_eq!(last_entry_before(&history, date("2024-01-02")).unwrap().id, "a");
        assert!(last_entry_before(&history, date("2024-01-01")).is_none());
    }

    #[test]
    fn test_last_entry_before_same_day_keeps_append_order() {
        let history = vec![
            entry("first", "2024-01-01", 0),
            entry("second", "2024-01-01", 1),
        ];
        assert_eq!(last_entry_before(&history, date("2024-01-05")).unwrap().id, "second");
    }

    #[test]
    fn test_trained_days_distinct_and_sorted() {
        let history = vec![
            entry("a", "2024-02-10", 0),
            entry("b", "2024-02-03", 1),
            entry("c", "2024-02-10", 2),
            entry("d", "2024-03-01", 0),
            entry("e", "2023-02-05", 0),
        ];
        assert_eq!(
            trained_days(&history, 2024, 2),
            vec![date("2024-02-03"), date("2024-02-10")]
        );
        assert!(trained_days(&history, 2024, 4).is_empty());
    }

    #[test]
    fn test_entries_on() {
        let mut history = vec![entry("a", "2024-02-10", 0)];
        record(&mut history, entry("b", "2024-02-11", 1));
        record(&mut history, entry("c", "2024-02-10", 2));

        let ids: Vec<_> = entries_on(&history, date("2024-02-10")).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
